use crate::config::AniListConfig;
use crate::domain::Source;
use crate::models::anilist::{AniListSeries, AniListStaff, AniListTitle};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const SEARCH_QUERY: &str = r#"
    query ($search: String) {
        Page(page: 1, perPage: 5) {
            media(search: $search, type: ANIME) {
                id
                title { romaji english native }
                synonyms
                averageScore
                genres
                studios(isMain: true) {
                    nodes {
                        name
                        isAnimationStudio
                    }
                }
                staff(perPage: 25, sort: RELEVANCE) {
                    edges {
                        role
                        node {
                            name { full }
                            image { large }
                        }
                    }
                }
            }
        }
    }
"#;

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    variables: Variables<'a>,
}

#[derive(Serialize)]
struct Variables<'a> {
    search: &'a str,
}

#[derive(Deserialize)]
struct GraphQLResponse {
    data: Option<Data>,
    #[serde(default)]
    errors: Vec<GraphQLError>,
}

#[derive(Deserialize)]
struct GraphQLError {
    message: String,
}

#[derive(Deserialize)]
struct Data {
    #[serde(rename = "Page")]
    page: Page,
}

#[derive(Deserialize)]
struct Page {
    media: Vec<Media>,
}

#[derive(Deserialize)]
struct Media {
    id: i32,
    title: Title,
    #[serde(default)]
    synonyms: Vec<String>,
    #[serde(rename = "averageScore")]
    average_score: Option<i32>,
    genres: Option<Vec<String>>,
    studios: Option<Studios>,
    staff: Option<Staff>,
}

#[derive(Deserialize)]
struct Studios {
    nodes: Vec<StudioNode>,
}

#[derive(Deserialize)]
struct StudioNode {
    name: String,
    #[serde(rename = "isAnimationStudio")]
    is_animation_studio: bool,
}

#[derive(Deserialize)]
struct Staff {
    edges: Vec<StaffEdge>,
}

#[derive(Deserialize)]
struct StaffEdge {
    role: Option<String>,
    node: StaffNode,
}

#[derive(Deserialize)]
struct StaffNode {
    name: StaffName,
    image: Option<StaffImage>,
}

#[derive(Deserialize)]
struct StaffName {
    full: Option<String>,
}

#[derive(Deserialize)]
struct StaffImage {
    large: Option<String>,
}

#[derive(Deserialize)]
struct Title {
    romaji: Option<String>,
    english: Option<String>,
    native: Option<String>,
}

impl Media {
    fn matches(&self, wanted: &str) -> bool {
        [&self.title.romaji, &self.title.english, &self.title.native]
            .into_iter()
            .flatten()
            .chain(self.synonyms.iter())
            .any(|t| t.trim().eq_ignore_ascii_case(wanted))
    }
}

#[derive(Clone)]
pub struct AniListClient {
    client: Client,
    base_url: String,
}

impl AniListClient {
    #[must_use]
    pub fn new(config: &AniListConfig) -> Self {
        Self::with_base_url(&config.base_url)
    }

    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: super::http_client(),
            base_url: base_url.to_string(),
        }
    }

    /// Searches AniList by title and returns the exact title match, or the
    /// top-ranked result when nothing matches exactly.
    #[instrument(skip(self))]
    pub async fn find_series(&self, title: &str) -> Result<Option<AniListSeries>> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }

        let request_body = GraphQLRequest {
            query: SEARCH_QUERY,
            variables: Variables { search: title },
        };

        super::record_request(Source::AniList);
        let response: GraphQLResponse = self
            .client
            .post(&self.base_url)
            .json(&request_body)
            .send()
            .await
            .context("Failed to query AniList")?
            .error_for_status()
            .context("AniList returned an error status")?
            .json()
            .await
            .context("AniList response is malformed")?;

        if let Some(error) = response.errors.first() {
            anyhow::bail!("AniList query failed: {}", error.message);
        }

        let mut media = response.data.map(|d| d.page.media).unwrap_or_default();
        if media.is_empty() {
            debug!(title, "No AniList match");
            return Ok(None);
        }

        let index = media.iter().position(|m| m.matches(title)).unwrap_or(0);
        Ok(Some(Self::map_media(media.swap_remove(index))))
    }

    fn map_media(m: Media) -> AniListSeries {
        let studios = m
            .studios
            .map(|s| {
                s.nodes
                    .into_iter()
                    .filter(|n| n.is_animation_studio)
                    .map(|n| n.name)
                    .collect()
            })
            .unwrap_or_default();

        let staff = m
            .staff
            .map(|s| {
                s.edges
                    .into_iter()
                    .filter_map(|e| {
                        Some(AniListStaff {
                            name: e.node.name.full?,
                            role: e.role.unwrap_or_default(),
                            image: e.node.image.and_then(|i| i.large),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        AniListSeries {
            id: m.id,
            title: AniListTitle {
                romaji: m.title.romaji,
                english: m.title.english,
                native: m.title.native,
            },
            average_score: m.average_score,
            genres: m.genres.unwrap_or_default(),
            studios,
            staff,
        }
    }
}
