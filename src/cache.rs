//! On-disk cache for upstream documents.
//!
//! Entries are plain files under the data directory, keyed by a relative path
//! such as `anidb/1.xml`. Freshness is judged by file modification time, so an
//! operator can force a refetch by deleting or touching files.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Fetch failed with no cached copy: {0}")]
    Fetch(String),
}

impl CacheError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
}

fn namespace(key: &str) -> String {
    key.split('/').next().unwrap_or(key).to_string()
}

fn record_miss(key: &str) {
    metrics::counter!("animeta_cache_misses_total", "namespace" => namespace(key)).increment(1);
}

impl FileCache {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Returns the cached text if the entry exists and is younger than `max_age`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] for failures other than a missing file.
    pub async fn read_fresh(&self, key: &str, max_age: Duration) -> Result<Option<String>, CacheError> {
        let path = self.path_for(key);
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                record_miss(key);
                return Ok(None);
            }
            Err(e) => return Err(CacheError::io(&path, e)),
        };

        let modified = metadata.modified().map_err(|e| CacheError::io(&path, e))?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);

        // A zero max age always refetches, even for an entry written this instant.
        if max_age.is_zero() || age > max_age {
            debug!(key, age_secs = age.as_secs(), "Cache entry is stale");
            record_miss(key);
            return Ok(None);
        }

        let content = self.read(key).await?;
        if content.is_some() {
            metrics::counter!("animeta_cache_hits_total", "namespace" => namespace(key))
                .increment(1);
            debug!(key, "Cache hit");
        } else {
            record_miss(key);
        }
        Ok(content)
    }

    /// Returns the cached text regardless of age.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] for failures other than a missing file.
    pub async fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(&path, e)),
        }
    }

    /// Writes an entry through a temporary file so readers never see partial content.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the directory or file cannot be written.
    pub async fn write(&self, key: &str, content: &str) -> Result<(), CacheError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CacheError::io(parent, e))?;
        }

        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| CacheError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| CacheError::io(&path, e))?;
        Ok(())
    }

    /// Serves a fresh entry or calls `fetch` and stores its result.
    ///
    /// When `fetch` fails and a stale copy exists, the stale copy is returned.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Fetch`] when `fetch` fails and nothing is cached,
    /// or [`CacheError::Io`] when the cache cannot be read.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        max_age: Duration,
        fetch: F,
    ) -> Result<String, CacheError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = anyhow::Result<String>> + Send,
    {
        if let Some(content) = self.read_fresh(key, max_age).await? {
            return Ok(content);
        }

        match fetch().await {
            Ok(content) => {
                if let Err(e) = self.write(key, &content).await {
                    warn!(key, error = %e, "Failed to write cache entry");
                }
                Ok(content)
            }
            Err(fetch_err) => match self.read(key).await? {
                Some(stale) => {
                    warn!(key, error = %fetch_err, "Fetch failed, serving stale cache entry");
                    Ok(stale)
                }
                None => Err(CacheError::Fetch(format!("{fetch_err:#}"))),
            },
        }
    }
}
