//! AniDB HTTP API client.
//!
//! AniDB serves one gzip-compressed XML document per anime and bans clients
//! that request more than once every two seconds, so every request goes
//! through [`AniDbClient::rate_limit`] and successful documents are cached on
//! disk.

use crate::cache::FileCache;
use crate::config::AniDbConfig;
use crate::domain::{AniDbSeriesId, Source};
use crate::models::anidb::{
    AniDbCharacter, AniDbCreator, AniDbEpisode, AniDbEpisodeNumber, AniDbSeiyuu, AniDbSeries,
    AniDbTag, AniDbTitle,
};
use crate::sources::AniDbSource;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

pub struct AniDbClient {
    client: Client,
    base_url: String,
    client_name: String,
    client_version: u32,
    rate_limit: Duration,
    cache: FileCache,
    max_age: Duration,
    last_request: Mutex<Option<Instant>>,
}

#[derive(Deserialize)]
struct AnimeXml {
    #[serde(rename = "@id")]
    id: i32,
    #[serde(rename = "type")]
    series_type: Option<String>,
    episodecount: Option<i32>,
    startdate: Option<String>,
    enddate: Option<String>,
    #[serde(default)]
    titles: TitlesXml,
    description: Option<String>,
    picture: Option<String>,
    ratings: Option<RatingsXml>,
    #[serde(default)]
    tags: TagsXml,
    #[serde(default)]
    creators: CreatorsXml,
    #[serde(default)]
    characters: CharactersXml,
    #[serde(default)]
    episodes: EpisodesXml,
}

#[derive(Deserialize, Default)]
struct TitlesXml {
    #[serde(rename = "title", default)]
    titles: Vec<TitleXml>,
}

#[derive(Deserialize)]
struct TitleXml {
    #[serde(rename = "@lang", alias = "@xml:lang")]
    language: String,
    #[serde(rename = "@type")]
    kind: Option<String>,
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Deserialize)]
struct RatingsXml {
    permanent: Option<RatingXml>,
}

#[derive(Deserialize)]
struct RatingXml {
    #[serde(rename = "$text")]
    value: f32,
}

#[derive(Deserialize, Default)]
struct TagsXml {
    #[serde(rename = "tag", default)]
    tags: Vec<TagXml>,
}

#[derive(Deserialize)]
struct TagXml {
    #[serde(rename = "@weight", default)]
    weight: i32,
    name: String,
}

#[derive(Deserialize, Default)]
struct CreatorsXml {
    #[serde(rename = "name", default)]
    creators: Vec<CreatorXml>,
}

#[derive(Deserialize)]
struct CreatorXml {
    #[serde(rename = "@id")]
    id: i32,
    #[serde(rename = "@type")]
    kind: String,
    #[serde(rename = "$text", default)]
    name: String,
}

#[derive(Deserialize, Default)]
struct CharactersXml {
    #[serde(rename = "character", default)]
    characters: Vec<CharacterXml>,
}

#[derive(Deserialize)]
struct CharacterXml {
    #[serde(rename = "@id")]
    id: i32,
    #[serde(rename = "@type")]
    role: Option<String>,
    name: Option<String>,
    seiyuu: Option<SeiyuuXml>,
}

#[derive(Deserialize)]
struct SeiyuuXml {
    #[serde(rename = "@id")]
    id: i32,
    #[serde(rename = "@picture")]
    picture: Option<String>,
    #[serde(rename = "$text", default)]
    name: String,
}

#[derive(Deserialize, Default)]
struct EpisodesXml {
    #[serde(rename = "episode", default)]
    episodes: Vec<EpisodeXml>,
}

#[derive(Deserialize)]
struct EpisodeXml {
    #[serde(rename = "@id")]
    id: i32,
    epno: EpnoXml,
    length: Option<i32>,
    airdate: Option<String>,
    rating: Option<RatingXml>,
    #[serde(rename = "title", default)]
    titles: Vec<TitleXml>,
    summary: Option<String>,
}

#[derive(Deserialize)]
struct EpnoXml {
    #[serde(rename = "@type")]
    type_code: Option<i32>,
    #[serde(rename = "$text", default)]
    value: String,
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<TitleXml> for AniDbTitle {
    fn from(t: TitleXml) -> Self {
        Self {
            language: t.language,
            kind: t.kind,
            value: t.value.trim().to_string(),
        }
    }
}

/// Returns the message of an AniDB `<error>` document, or `None` for any other document.
#[must_use]
pub fn error_message(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut in_error = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if in_error || e.name().as_ref() != b"error" {
                    return in_error.then(String::new);
                }
                in_error = true;
            }
            Ok(Event::Empty(e)) => {
                return (e.name().as_ref() == b"error").then(String::new);
            }
            Ok(Event::Text(text)) if in_error => {
                return Some(String::from_utf8_lossy(&text).trim().to_string());
            }
            Ok(Event::End(_)) if in_error => return Some(String::new()),
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

/// Parses an AniDB `anime` document.
///
/// # Errors
///
/// Returns an error if the document is not a well-formed `anime` record.
pub fn parse_anime_xml(xml: &str) -> Result<AniDbSeries> {
    let anime: AnimeXml =
        quick_xml::de::from_str(xml).context("Failed to parse AniDB anime document")?;

    let episodes = anime
        .episodes
        .episodes
        .into_iter()
        .filter_map(|e| {
            let Some(number) = AniDbEpisodeNumber::parse(&e.epno.value, e.epno.type_code) else {
                debug!(episode_id = e.id, epno = %e.epno.value, "Skipping episode with unusable epno");
                return None;
            };
            Some(AniDbEpisode {
                id: e.id,
                number,
                titles: e.titles.into_iter().map(AniDbTitle::from).collect(),
                air_date: parse_date(e.airdate.as_deref()),
                length: e.length,
                rating: e.rating.map(|r| r.value),
                summary: non_empty(e.summary),
            })
        })
        .collect();

    Ok(AniDbSeries {
        id: AniDbSeriesId::new(anime.id),
        series_type: non_empty(anime.series_type),
        episode_count: anime.episodecount,
        start_date: parse_date(anime.startdate.as_deref()),
        end_date: parse_date(anime.enddate.as_deref()),
        titles: anime
            .titles
            .titles
            .into_iter()
            .map(AniDbTitle::from)
            .collect(),
        description: non_empty(anime.description),
        picture: non_empty(anime.picture),
        rating: anime.ratings.and_then(|r| r.permanent).map(|r| r.value),
        tags: anime
            .tags
            .tags
            .into_iter()
            .map(|t| AniDbTag {
                name: t.name,
                weight: t.weight,
            })
            .collect(),
        creators: anime
            .creators
            .creators
            .into_iter()
            .map(|c| AniDbCreator {
                id: c.id,
                kind: c.kind,
                name: c.name.trim().to_string(),
            })
            .collect(),
        characters: anime
            .characters
            .characters
            .into_iter()
            .filter_map(|c| {
                let name = non_empty(c.name)?;
                Some(AniDbCharacter {
                    id: c.id,
                    name,
                    role: c.role,
                    seiyuu: c.seiyuu.map(|s| AniDbSeiyuu {
                        id: s.id,
                        name: s.name.trim().to_string(),
                        picture: s.picture,
                    }),
                })
            })
            .collect(),
        episodes,
    })
}

impl AniDbClient {
    #[must_use]
    pub fn new(config: &AniDbConfig, cache: FileCache) -> Self {
        Self {
            client: super::http_client(),
            base_url: config.base_url.clone(),
            client_name: config.client_name.clone(),
            client_version: config.client_version,
            rate_limit: Duration::from_millis(config.rate_limit_ms),
            cache,
            max_age: config.max_age(),
            last_request: Mutex::new(None),
        }
    }

    /// Waits until the configured interval has passed since the previous request.
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.rate_limit {
                let wait = self.rate_limit - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "AniDB rate limit");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    #[instrument(skip(self), fields(anidb_id = %id))]
    async fn fetch(&self, id: AniDbSeriesId) -> Result<String> {
        self.rate_limit().await;
        super::record_request(Source::AniDb);

        let client_version = self.client_version.to_string();
        let aid = id.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("request", "anime"),
                ("client", self.client_name.as_str()),
                ("clientver", client_version.as_str()),
                ("protover", "1"),
                ("aid", aid.as_str()),
            ])
            .send()
            .await
            .context("Failed to fetch from AniDB")?
            .error_for_status()
            .context("AniDB returned an error status")?;

        Ok(response.text().await?)
    }

    /// Returns the raw anime document, from cache when fresh.
    ///
    /// `Ok(None)` when AniDB reports the anime does not exist.
    ///
    /// # Errors
    ///
    /// Fails on transport errors and on any other AniDB error document.
    pub async fn series_xml(&self, id: AniDbSeriesId) -> Result<Option<String>> {
        let key = format!("anidb/{id}.xml");
        if let Some(xml) = self.cache.read_fresh(&key, self.max_age).await? {
            return Ok(Some(xml));
        }

        let xml = self.fetch(id).await?;
        match error_message(&xml) {
            Some(message) if message.to_ascii_lowercase().contains("not found") => {
                debug!(anidb_id = %id, "AniDB has no such anime");
                return Ok(None);
            }
            Some(message) => {
                anyhow::bail!("AniDB returned an error for anime {id}: {message}");
            }
            None => {}
        }

        if let Err(e) = self.cache.write(&key, &xml).await {
            warn!(anidb_id = %id, error = %e, "Failed to cache AniDB document");
        }
        info!(event = "anidb_series_fetched", anidb_id = %id, bytes = xml.len());
        Ok(Some(xml))
    }
}

#[async_trait::async_trait]
impl AniDbSource for AniDbClient {
    async fn series(&self, id: AniDbSeriesId) -> Result<Option<AniDbSeries>> {
        let Some(xml) = self.series_xml(id).await? else {
            return Ok(None);
        };
        parse_anime_xml(&xml)
            .with_context(|| format!("AniDB document for anime {id} is malformed"))
            .map(Some)
    }
}
