use crate::domain::AniDbSeriesId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// AniDB episode categories, in the order of the numeric `epno type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpisodeType {
    Normal,
    Special,
    Credit,
    Trailer,
    Parody,
    Other,
}

impl EpisodeType {
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Normal),
            2 => Some(Self::Special),
            3 => Some(Self::Credit),
            4 => Some(Self::Trailer),
            5 => Some(Self::Parody),
            6 => Some(Self::Other),
            _ => None,
        }
    }

    const fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            'S' => Some(Self::Special),
            'C' => Some(Self::Credit),
            'T' => Some(Self::Trailer),
            'P' => Some(Self::Parody),
            'O' => Some(Self::Other),
            _ => None,
        }
    }

    const fn prefix(self) -> &'static str {
        match self {
            Self::Normal => "",
            Self::Special => "S",
            Self::Credit => "C",
            Self::Trailer => "T",
            Self::Parody => "P",
            Self::Other => "O",
        }
    }
}

/// An AniDB `epno`: `"12"` for a standard episode, `"S1"` for the first special.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AniDbEpisodeNumber {
    pub raw: String,
    pub episode_type: EpisodeType,
    pub number: i32,
}

impl AniDbEpisodeNumber {
    #[must_use]
    pub fn new(episode_type: EpisodeType, number: i32) -> Self {
        Self {
            raw: format!("{}{number}", episode_type.prefix()),
            episode_type,
            number,
        }
    }

    #[must_use]
    pub fn standard(number: i32) -> Self {
        Self::new(EpisodeType::Normal, number)
    }

    #[must_use]
    pub fn special(number: i32) -> Self {
        Self::new(EpisodeType::Special, number)
    }

    /// Parses the `epno` text, using the numeric type attribute when AniDB supplied one.
    ///
    /// Returns `None` when the text carries no usable index.
    #[must_use]
    pub fn parse(raw: &str, type_code: Option<i32>) -> Option<Self> {
        let raw = raw.trim();
        let first = raw.chars().next()?;

        let (prefix_type, digits) = if first.is_ascii_digit() {
            (EpisodeType::Normal, raw)
        } else {
            (
                EpisodeType::from_prefix(first.to_ascii_uppercase())?,
                &raw[first.len_utf8()..],
            )
        };

        let number = digits.parse().ok()?;
        let episode_type = type_code
            .and_then(EpisodeType::from_code)
            .unwrap_or(prefix_type);

        Some(Self {
            raw: raw.to_string(),
            episode_type,
            number,
        })
    }

    /// AniDB only has two "seasons": 1 for standard episodes and 0 for everything else.
    #[must_use]
    pub const fn season_number(&self) -> i32 {
        match self.episode_type {
            EpisodeType::Normal => 1,
            _ => 0,
        }
    }

    #[must_use]
    pub fn is_special(&self) -> bool {
        self.episode_type == EpisodeType::Special
    }
}

impl fmt::Display for AniDbEpisodeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AniDbTitle {
    pub language: String,
    /// `main`, `official`, `synonym` or `short`. Episode titles carry no kind.
    pub kind: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AniDbEpisode {
    pub id: i32,
    pub number: AniDbEpisodeNumber,
    pub titles: Vec<AniDbTitle>,
    pub air_date: Option<NaiveDate>,
    /// Minutes.
    pub length: Option<i32>,
    pub rating: Option<f32>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AniDbTag {
    pub name: String,
    pub weight: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AniDbCreator {
    pub id: i32,
    /// Role as AniDB names it, e.g. `Direction`, `Music`, `Animation Work`.
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AniDbSeiyuu {
    pub id: i32,
    pub name: String,
    pub picture: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AniDbCharacter {
    pub id: i32,
    pub name: String,
    pub role: Option<String>,
    pub seiyuu: Option<AniDbSeiyuu>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AniDbSeries {
    pub id: AniDbSeriesId,
    pub series_type: Option<String>,
    pub episode_count: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub titles: Vec<AniDbTitle>,
    pub description: Option<String>,
    pub picture: Option<String>,
    pub rating: Option<f32>,
    pub tags: Vec<AniDbTag>,
    pub creators: Vec<AniDbCreator>,
    pub characters: Vec<AniDbCharacter>,
    pub episodes: Vec<AniDbEpisode>,
}

impl AniDbSeries {
    /// Finds an episode by AniDB season (1 standard, 0 other) and index.
    #[must_use]
    pub fn find_episode(&self, season: i32, index: i32) -> Option<&AniDbEpisode> {
        self.episodes
            .iter()
            .find(|e| e.number.season_number() == season && e.number.number == index)
    }

    #[must_use]
    pub fn find_by_number(&self, number: &AniDbEpisodeNumber) -> Option<&AniDbEpisode> {
        self.episodes
            .iter()
            .find(|e| e.number.episode_type == number.episode_type && e.number.number == number.number)
    }
}
