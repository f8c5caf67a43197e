use crate::domain::TvDbSeriesId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvDbEpisode {
    pub id: i32,
    pub aired_season: i32,
    pub aired_episode_number: i32,
    pub absolute_number: Option<i32>,
    pub name: Option<String>,
    pub overview: Option<String>,
    /// `YYYY-MM-DD`; TvDB leaves it blank for unaired episodes.
    pub first_aired: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvDbSeries {
    pub id: TvDbSeriesId,
    pub name: String,
    pub overview: Option<String>,
    pub first_aired: Option<String>,
    pub genres: Vec<String>,
    pub network: Option<String>,
    pub status: Option<String>,
}
