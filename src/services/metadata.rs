//! Turns reconciled source data into the records a media server consumes.

use crate::config::MetadataConfig;
use crate::constants::{provider_ids, urls};
use crate::mapping::DefaultTvDbSeason;
use crate::models::anidb::{AniDbSeries, AniDbTag};
use crate::models::anilist::AniListSeries;
use crate::models::data::{EpisodeData, SeriesData};
use crate::services::titles::{TitlePreference, main_title, select_anilist_title, select_title};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub type ProviderIds = BTreeMap<&'static str, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PersonKind {
    Actor,
    Director,
    Writer,
    Composer,
    Producer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonMetadata {
    pub name: String,
    pub kind: PersonKind,
    /// Character name for actors, the credited role otherwise.
    pub role: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesMetadata {
    pub name: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub premiere_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub production_year: Option<i32>,
    pub community_rating: Option<f32>,
    pub genres: Vec<String>,
    pub studios: Vec<String>,
    pub image_url: Option<String>,
    pub provider_ids: ProviderIds,
    pub people: Vec<PersonMetadata>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonMetadata {
    pub index: i32,
    pub name: Option<String>,
    pub provider_ids: ProviderIds,
}

#[derive(Debug, Clone, Serialize)]
pub struct EpisodeMetadata {
    pub name: Option<String>,
    pub overview: Option<String>,
    pub index: i32,
    pub parent_index: i32,
    pub absolute_index: Option<i32>,
    pub premiere_date: Option<NaiveDate>,
    pub runtime_minutes: Option<i32>,
    pub community_rating: Option<f32>,
    pub airs_before_season: Option<i32>,
    pub airs_before_episode: Option<i32>,
    pub provider_ids: ProviderIds,
}

/// Replaces AniDB's inline `http://anidb.net/ch123 [Name]` links with their label.
#[must_use]
pub fn clean_description(description: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"https?://anidb\.net/\S+\s*\[([^\]]+)\]").expect("Invalid regex")
    });
    re.replace_all(description, "$1").trim().to_string()
}

fn kind_for_role(role: &str) -> Option<PersonKind> {
    let role = role.to_ascii_lowercase();
    if role.contains("direct") {
        Some(PersonKind::Director)
    } else if ["composition", "original", "script", "screenplay", "story"]
        .iter()
        .any(|k| role.contains(k))
    {
        Some(PersonKind::Writer)
    } else if role.contains("music") {
        Some(PersonKind::Composer)
    } else if role.contains("producer") {
        Some(PersonKind::Producer)
    } else {
        None
    }
}

fn title_case(tag: &str) -> String {
    tag.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_tvdb_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
}

fn push_unique(genres: &mut Vec<String>, genre: String) {
    if !genres.iter().any(|g| g.eq_ignore_ascii_case(&genre)) {
        genres.push(genre);
    }
}

pub struct MetadataFactory {
    title_preference: TitlePreference,
    min_genre_weight: i32,
    max_genres: usize,
}

impl MetadataFactory {
    #[must_use]
    pub const fn new(title_preference: TitlePreference, min_genre_weight: i32, max_genres: usize) -> Self {
        Self {
            title_preference,
            min_genre_weight,
            max_genres,
        }
    }

    #[must_use]
    pub fn from_config(config: &MetadataConfig) -> Self {
        Self::new(config.title_preference(), config.min_genre_weight, config.max_genres)
    }

    fn genres(&self, tags: &[AniDbTag], anilist: Option<&AniListSeries>) -> Vec<String> {
        let mut weighted: Vec<&AniDbTag> = tags
            .iter()
            .filter(|t| t.weight >= self.min_genre_weight)
            .collect();
        weighted.sort_by(|a, b| b.weight.cmp(&a.weight));

        let mut genres = Vec::new();
        for tag in weighted {
            push_unique(&mut genres, title_case(&tag.name));
        }
        for genre in anilist.iter().flat_map(|a| a.genres.iter()) {
            push_unique(&mut genres, genre.clone());
        }
        genres.truncate(self.max_genres);
        genres
    }

    pub fn series_metadata(&self, data: &SeriesData, anilist: Option<&AniListSeries>) -> SeriesMetadata {
        let anidb = data.anidb();

        let name = select_title(&anidb.titles, &self.title_preference)
            .map(str::to_string)
            .or_else(|| data.tvdb().map(|t| t.name.clone()))
            .or_else(|| {
                anilist
                    .and_then(|a| select_anilist_title(&a.title, &self.title_preference))
                    .map(str::to_string)
            });

        let overview = anidb
            .description
            .as_deref()
            .map(clean_description)
            .or_else(|| data.tvdb().and_then(|t| t.overview.clone()));

        let community_rating = anilist
            .and_then(|a| a.average_score)
            .map(|score| score as f32 / 10.0)
            .or(anidb.rating);

        let mut studios: Vec<String> = anilist.map(|a| a.studios.clone()).unwrap_or_default();
        if studios.is_empty() {
            studios = anidb
                .creators
                .iter()
                .filter(|c| c.kind == "Animation Work")
                .map(|c| c.name.clone())
                .collect();
        }

        let mut ids = ProviderIds::new();
        ids.insert(provider_ids::ANIDB, anidb.id.to_string());
        if let Some(mapping) = data.mapping() {
            if let Some(tvdb_id) = mapping.ids.tvdb_id {
                ids.insert(provider_ids::TVDB, tvdb_id.to_string());
            }
            if let Some(imdb_id) = &mapping.ids.imdb_id {
                ids.insert(provider_ids::IMDB, imdb_id.clone());
            }
            if let Some(tmdb_id) = mapping.ids.tmdb_id {
                ids.insert(provider_ids::TMDB, tmdb_id.to_string());
            }
        }
        if let Some(anilist) = anilist {
            ids.insert(provider_ids::ANILIST, anilist.id.to_string());
        }

        SeriesMetadata {
            name,
            original_title: main_title(&anidb.titles).map(str::to_string),
            overview,
            premiere_date: anidb.start_date,
            end_date: anidb.end_date,
            production_year: anidb.start_date.map(|d| d.year()),
            community_rating,
            genres: self.genres(&anidb.tags, anilist),
            studios,
            image_url: anidb
                .picture
                .as_ref()
                .map(|p| format!("{}/{p}", urls::ANIDB_IMAGES)),
            provider_ids: ids,
            people: self.people(anidb, anilist),
        }
    }

    pub fn season_metadata(&self, data: &SeriesData) -> SeasonMetadata {
        let index = match data.mapping().map(|m| m.default_tvdb_season) {
            Some(DefaultTvDbSeason::Season(season)) => season,
            Some(DefaultTvDbSeason::Absolute) | None => 1,
        };

        let mut ids = ProviderIds::new();
        ids.insert(provider_ids::ANIDB, data.anidb().id.to_string());
        if let Some(tvdb_id) = data.mapping().and_then(|m| m.ids.tvdb_id) {
            ids.insert(provider_ids::TVDB, tvdb_id.to_string());
        }

        SeasonMetadata {
            index,
            name: select_title(&data.anidb().titles, &self.title_preference).map(str::to_string),
            provider_ids: ids,
        }
    }

    /// `None` when nothing is known about the episode.
    pub fn episode_metadata(&self, data: &EpisodeData) -> Option<EpisodeMetadata> {
        let anidb = data.anidb()?;
        let tvdb = data.tvdb();

        let (index, parent_index, absolute_index) = match tvdb {
            Some(t) => (t.aired_episode_number, t.aired_season, t.absolute_number),
            None => (anidb.number.number, anidb.number.season_number(), None),
        };

        let mut ids = ProviderIds::new();
        ids.insert(provider_ids::ANIDB, anidb.id.to_string());
        if let Some(t) = tvdb {
            ids.insert(provider_ids::TVDB, t.id.to_string());
        }

        let following = data.following().tvdb();

        Some(EpisodeMetadata {
            name: select_title(&anidb.titles, &self.title_preference)
                .map(str::to_string)
                .or_else(|| tvdb.and_then(|t| t.name.clone())),
            overview: anidb
                .summary
                .as_deref()
                .map(clean_description)
                .or_else(|| tvdb.and_then(|t| t.overview.clone())),
            index,
            parent_index,
            absolute_index,
            premiere_date: anidb
                .air_date
                .or_else(|| parse_tvdb_date(tvdb.and_then(|t| t.first_aired.as_deref()))),
            runtime_minutes: anidb.length,
            community_rating: anidb.rating,
            airs_before_season: following.map(|f| f.aired_season),
            airs_before_episode: following.map(|f| f.aired_episode_number),
            provider_ids: ids,
        })
    }

    pub fn people(&self, series: &AniDbSeries, anilist: Option<&AniListSeries>) -> Vec<PersonMetadata> {
        let mut people: Vec<PersonMetadata> = series
            .characters
            .iter()
            .filter_map(|c| {
                let seiyuu = c.seiyuu.as_ref()?;
                Some(PersonMetadata {
                    name: seiyuu.name.clone(),
                    kind: PersonKind::Actor,
                    role: Some(c.name.clone()),
                    image_url: seiyuu
                        .picture
                        .as_ref()
                        .map(|p| format!("{}/{p}", urls::ANIDB_IMAGES)),
                })
            })
            .collect();

        for creator in &series.creators {
            if let Some(kind) = kind_for_role(&creator.kind) {
                people.push(PersonMetadata {
                    name: creator.name.clone(),
                    kind,
                    role: Some(creator.kind.clone()),
                    image_url: None,
                });
            }
        }

        for staff in anilist.iter().flat_map(|a| a.staff.iter()) {
            let Some(kind) = kind_for_role(&staff.role) else {
                continue;
            };
            let known = people
                .iter()
                .any(|p| p.kind == kind && p.name.eq_ignore_ascii_case(&staff.name));
            if !known {
                people.push(PersonMetadata {
                    name: staff.name.clone(),
                    kind,
                    role: Some(staff.role.clone()),
                    image_url: staff.image.clone(),
                });
            }
        }

        people
    }
}
