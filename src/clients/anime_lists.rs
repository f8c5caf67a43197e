//! Downloads `anime-list.xml` from the Anime-Lists project and keeps a copy in
//! the file cache.

use crate::cache::FileCache;
use crate::config::MappingConfig;
use crate::sources::MappingSource;
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{info, instrument};

const CACHE_KEY: &str = "mapping/anime-list.xml";

pub struct AnimeListsClient {
    client: Client,
    url: String,
    cache: FileCache,
    max_age: Duration,
}

impl AnimeListsClient {
    #[must_use]
    pub fn new(config: &MappingConfig, cache: FileCache) -> Self {
        Self::with_url(&config.url, cache, config.max_age())
    }

    #[must_use]
    pub fn with_url(url: &str, cache: FileCache, max_age: Duration) -> Self {
        Self {
            client: super::http_client(),
            url: url.to_string(),
            cache,
            max_age,
        }
    }

    #[instrument(skip(self))]
    async fn download(&self) -> Result<String> {
        let started = std::time::Instant::now();
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to download anime-list.xml")?
            .error_for_status()
            .context("anime-list.xml download returned an error status")?;

        let xml = response.text().await?;
        info!(
            event = "mapping_list_downloaded",
            bytes = xml.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Downloaded anime-list.xml"
        );
        Ok(xml)
    }
}

#[async_trait::async_trait]
impl MappingSource for AnimeListsClient {
    async fn mapping_xml(&self, force_refresh: bool) -> Result<String> {
        let max_age = if force_refresh {
            Duration::ZERO
        } else {
            self.max_age
        };

        let xml = self
            .cache
            .get_or_fetch(CACHE_KEY, max_age, || self.download())
            .await?;
        Ok(xml)
    }
}
