use super::list::{MappingError, MappingList};
use crate::sources::MappingSource;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Lazily loaded, shared snapshot of the mapping list.
///
/// The first [`get`](Self::get) loads the list from its source; every later
/// call returns the same `Arc` until [`reload`](Self::reload) swaps in a new
/// snapshot. Loads happen under the write lock, so concurrent first callers
/// trigger a single fetch and readers never see a partial list.
pub struct MappingListCache {
    source: Arc<dyn MappingSource>,
    snapshot: RwLock<Option<Arc<MappingList>>>,
}

impl MappingListCache {
    #[must_use]
    pub fn new(source: Arc<dyn MappingSource>) -> Self {
        Self {
            source,
            snapshot: RwLock::new(None),
        }
    }

    /// Wraps an already built list; the source is only used by `reload`.
    #[must_use]
    pub fn with_snapshot(source: Arc<dyn MappingSource>, list: MappingList) -> Self {
        Self {
            source,
            snapshot: RwLock::new(Some(Arc::new(list))),
        }
    }

    /// Returns the current snapshot, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Load`] if the source fails and
    /// [`MappingError::Parse`] if the document is malformed.
    pub async fn get(&self) -> Result<Arc<MappingList>, MappingError> {
        if let Some(list) = self.snapshot.read().await.as_ref() {
            return Ok(Arc::clone(list));
        }

        let mut guard = self.snapshot.write().await;
        if let Some(list) = guard.as_ref() {
            debug!("Mapping list loaded by a concurrent caller");
            return Ok(Arc::clone(list));
        }

        let list = self.load(false).await?;
        *guard = Some(Arc::clone(&list));
        Ok(list)
    }

    /// Refetches the mapping file and replaces the snapshot.
    ///
    /// Callers holding the previous `Arc` keep using it until they drop it.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get); on failure the previous snapshot stays in place.
    pub async fn reload(&self) -> Result<Arc<MappingList>, MappingError> {
        let mut guard = self.snapshot.write().await;
        let list = self.load(true).await?;
        *guard = Some(Arc::clone(&list));
        Ok(list)
    }

    #[instrument(skip(self))]
    async fn load(&self, force_refresh: bool) -> Result<Arc<MappingList>, MappingError> {
        let start = Instant::now();
        let xml = self.source.mapping_xml(force_refresh).await?;

        let list = tokio::task::spawn_blocking(move || MappingList::parse(&xml))
            .await
            .map_err(|e| MappingError::Load(format!("Mapping list parse task failed: {e}")))??;

        info!(
            event = "mapping_list_loaded",
            series = list.len(),
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Loaded anime mapping list"
        );

        Ok(Arc::new(list))
    }
}
