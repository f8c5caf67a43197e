//! Identifier newtypes for the three metadata sources.
//!
//! AniDB and TvDB both number their series with small integers, so a bare
//! `i32` invites passing one where the other is expected. These wrappers make
//! the mapping code state which id space it is working in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an AniDB anime (`aid`).
///
/// # Examples
///
/// ```rust
/// use animeta::domain::AniDbSeriesId;
///
/// let id: AniDbSeriesId = "1".parse().unwrap();
/// assert_eq!(id.value(), 1);
/// assert_eq!(id.to_string(), "1");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct AniDbSeriesId(i32);

impl AniDbSeriesId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for AniDbSeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AniDbSeriesId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<i32> for AniDbSeriesId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

/// Identifier of a TvDB series.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct TvDbSeriesId(i32);

impl TvDbSeriesId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for TvDbSeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TvDbSeriesId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<i32> for TvDbSeriesId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

/// Which metadata source an identifier or record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    AniDb,
    TvDb,
    AniList,
}

impl Source {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AniDb => "anidb",
            Self::TvDb => "tvdb",
            Self::AniList => "anilist",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
