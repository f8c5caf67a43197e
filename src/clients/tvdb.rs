//! TheTVDB v2 JSON API client.

use crate::cache::FileCache;
use crate::config::TvDbConfig;
use crate::constants::limits::TVDB_MAX_PAGES;
use crate::domain::{Source, TvDbSeriesId};
use crate::models::tvdb::{TvDbEpisode, TvDbSeries};
use crate::sources::TvDbSource;
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

#[derive(Serialize)]
struct LoginRequest<'a> {
    apikey: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize)]
struct SeriesResponse {
    data: SeriesRecord,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesRecord {
    id: i32,
    series_name: Option<String>,
    overview: Option<String>,
    first_aired: Option<String>,
    #[serde(default)]
    genre: Vec<String>,
    network: Option<String>,
    status: Option<String>,
}

#[derive(Deserialize)]
struct EpisodesPage {
    #[serde(default)]
    links: Links,
    #[serde(default)]
    data: Vec<EpisodeRecord>,
}

#[derive(Deserialize, Default)]
struct Links {
    next: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpisodeRecord {
    id: i32,
    aired_season: Option<i32>,
    aired_episode_number: Option<i32>,
    absolute_number: Option<i32>,
    episode_name: Option<String>,
    overview: Option<String>,
    first_aired: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<SeriesRecord> for TvDbSeries {
    fn from(r: SeriesRecord) -> Self {
        Self {
            id: TvDbSeriesId::new(r.id),
            name: r.series_name.unwrap_or_default(),
            overview: non_empty(r.overview),
            first_aired: non_empty(r.first_aired),
            genres: r.genre,
            network: non_empty(r.network),
            status: non_empty(r.status),
        }
    }
}

impl EpisodeRecord {
    fn into_episode(self) -> Option<TvDbEpisode> {
        Some(TvDbEpisode {
            id: self.id,
            aired_season: self.aired_season?,
            aired_episode_number: self.aired_episode_number?,
            absolute_number: self.absolute_number,
            name: non_empty(self.episode_name),
            overview: non_empty(self.overview),
            first_aired: non_empty(self.first_aired),
        })
    }
}

pub struct TvDbClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    language: String,
    cache: FileCache,
    max_age: Duration,
    token: Mutex<Option<String>>,
}

impl TvDbClient {
    #[must_use]
    pub fn new(config: &TvDbConfig, cache: FileCache) -> Self {
        Self {
            client: super::http_client(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            language: config.language.clone(),
            cache,
            max_age: config.max_age(),
            token: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_base_url(base_url: &str, api_key: &str, cache: FileCache) -> Self {
        let config = TvDbConfig {
            base_url: base_url.to_string(),
            api_key: Some(api_key.to_string()),
            ..TvDbConfig::default()
        };
        Self::new(&config, cache)
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn token(&self) -> Result<String> {
        let mut token = self.token.lock().await;
        if let Some(t) = token.as_ref() {
            return Ok(t.clone());
        }

        let api_key = self
            .api_key
            .as_deref()
            .context("TvDB API key is not configured")?;

        super::record_request(Source::TvDb);
        let response: LoginResponse = self
            .client
            .post(super::join_url(&self.base_url, "login"))
            .json(&LoginRequest { apikey: api_key })
            .send()
            .await
            .context("Failed to log in to TvDB")?
            .error_for_status()
            .context("TvDB rejected the API key")?
            .json()
            .await?;

        info!(event = "tvdb_login", "Logged in to TvDB");
        *token = Some(response.token.clone());
        Ok(response.token)
    }

    /// Sends an authorised GET, logging in again once if the token expired.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        let url = super::join_url(&self.base_url, path);
        let build = |token: &str| -> RequestBuilder {
            self.client
                .get(&url)
                .bearer_auth(token)
                .header("Accept-Language", &self.language)
                .query(query)
        };

        super::record_request(Source::TvDb);
        let token = self.token().await?;
        let response = build(&token).send().await.context("TvDB request failed")?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("TvDB token rejected, logging in again");
        *self.token.lock().await = None;
        super::record_request(Source::TvDb);
        let token = self.token().await?;
        build(&token).send().await.context("TvDB request failed")
    }

    #[instrument(skip(self), fields(tvdb_id = %id))]
    async fn fetch_series(&self, id: TvDbSeriesId) -> Result<Option<TvDbSeries>> {
        let response = self.get(&format!("series/{id}"), &[]).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: SeriesResponse = response
            .error_for_status()
            .context("TvDB series lookup failed")?
            .json()
            .await
            .context("TvDB series response is malformed")?;
        Ok(Some(body.data.into()))
    }

    #[instrument(skip(self), fields(tvdb_id = %id))]
    async fn fetch_episodes(&self, id: TvDbSeriesId) -> Result<Option<Vec<TvDbEpisode>>> {
        let mut episodes = Vec::new();
        let mut page = 1;

        loop {
            let response = self
                .get(&format!("series/{id}/episodes"), &[("page", page.to_string())])
                .await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(if page == 1 { None } else { Some(episodes) });
            }

            let body: EpisodesPage = response
                .error_for_status()
                .context("TvDB episode lookup failed")?
                .json()
                .await
                .context("TvDB episodes response is malformed")?;

            episodes.extend(body.data.into_iter().filter_map(EpisodeRecord::into_episode));

            match body.links.next {
                Some(next) if next > page && next <= TVDB_MAX_PAGES => page = next,
                Some(next) if next > TVDB_MAX_PAGES => {
                    warn!(tvdb_id = %id, pages = TVDB_MAX_PAGES, "TvDB episode list truncated");
                    break;
                }
                _ => break,
            }
        }

        debug!(tvdb_id = %id, count = episodes.len(), "Fetched TvDB episodes");
        Ok(Some(episodes))
    }

    async fn cached<T, F, Fut>(&self, key: &str, fetch: F) -> Result<Option<T>>
    where
        T: Serialize + serde::de::DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        if let Some(json) = self.cache.read_fresh(key, self.max_age).await? {
            match serde_json::from_str(&json) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => warn!(key, error = %e, "Discarding unreadable TvDB cache entry"),
            }
        }

        let Some(value) = fetch().await? else {
            return Ok(None);
        };

        let json = serde_json::to_string(&value)?;
        if let Err(e) = self.cache.write(key, &json).await {
            warn!(key, error = %e, "Failed to cache TvDB response");
        }
        Ok(Some(value))
    }
}

#[async_trait::async_trait]
impl TvDbSource for TvDbClient {
    async fn series(&self, id: TvDbSeriesId) -> Result<Option<TvDbSeries>> {
        if !self.is_configured() {
            debug!(tvdb_id = %id, "No TvDB API key, skipping series lookup");
            return Ok(None);
        }
        self.cached(&format!("tvdb/{id}/series.json"), || self.fetch_series(id))
            .await
    }

    async fn episodes(&self, id: TvDbSeriesId) -> Result<Option<Vec<TvDbEpisode>>> {
        if !self.is_configured() {
            debug!(tvdb_id = %id, "No TvDB API key, skipping episode lookup");
            return Ok(None);
        }
        self.cached(&format!("tvdb/{id}/episodes.json"), || self.fetch_episodes(id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_records_without_aired_numbers_are_dropped() {
        let page: EpisodesPage = serde_json::from_str(
            r#"{
                "links": {"first": 1, "last": 1, "next": null},
                "data": [
                    {"id": 1, "airedSeason": 1, "airedEpisodeNumber": 2, "absoluteNumber": 2,
                     "episodeName": "Two", "overview": "", "firstAired": "2010-01-08"},
                    {"id": 2, "airedSeason": null, "airedEpisodeNumber": 3}
                ]
            }"#,
        )
        .unwrap();

        let episodes: Vec<_> = page
            .data
            .into_iter()
            .filter_map(EpisodeRecord::into_episode)
            .collect();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].name.as_deref(), Some("Two"));
        assert!(episodes[0].overview.is_none());
        assert!(page.links.next.is_none());
    }

    #[tokio::test]
    async fn unconfigured_client_answers_none() {
        let cache = FileCache::new(std::env::temp_dir().join(format!("animeta-tvdb-{}", uuid::Uuid::new_v4())));
        let client = TvDbClient::new(&TvDbConfig::default(), cache);
        assert!(!client.is_configured());
        assert!(client.series(TvDbSeriesId::new(1)).await.unwrap().is_none());
        assert!(client.episodes(TvDbSeriesId::new(1)).await.unwrap().is_none());
    }
}
