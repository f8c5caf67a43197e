//! Results of reconciling one series or episode across sources.

use crate::mapping::SeriesMapping;
use crate::models::anidb::{AniDbEpisode, AniDbSeries};
use crate::models::tvdb::{TvDbEpisode, TvDbSeries};

#[derive(Debug, Clone)]
pub enum SeriesData {
    /// No usable TvDB counterpart.
    AniDbOnly {
        anidb: AniDbSeries,
        mapping: Option<SeriesMapping>,
    },
    Combined {
        anidb: AniDbSeries,
        tvdb: TvDbSeries,
        mapping: SeriesMapping,
    },
}

impl SeriesData {
    #[must_use]
    pub const fn anidb(&self) -> &AniDbSeries {
        match self {
            Self::AniDbOnly { anidb, .. } | Self::Combined { anidb, .. } => anidb,
        }
    }

    #[must_use]
    pub const fn mapping(&self) -> Option<&SeriesMapping> {
        match self {
            Self::AniDbOnly { mapping, .. } => mapping.as_ref(),
            Self::Combined { mapping, .. } => Some(mapping),
        }
    }

    #[must_use]
    pub const fn tvdb(&self) -> Option<&TvDbSeries> {
        match self {
            Self::AniDbOnly { .. } => None,
            Self::Combined { tvdb, .. } => Some(tvdb),
        }
    }
}

/// The TvDB episode a special airs before, or an explicit lack of one.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FollowingEpisode {
    TvDb(TvDbEpisode),
    #[default]
    NoData,
}

impl FollowingEpisode {
    #[must_use]
    pub const fn tvdb(&self) -> Option<&TvDbEpisode> {
        match self {
            Self::TvDb(episode) => Some(episode),
            Self::NoData => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum EpisodeData {
    AniDbOnly {
        anidb: AniDbEpisode,
        following: FollowingEpisode,
    },
    Combined {
        anidb: AniDbEpisode,
        tvdb: TvDbEpisode,
        following: FollowingEpisode,
    },
    /// Nothing is known about the requested episode.
    None,
}

impl EpisodeData {
    #[must_use]
    pub const fn anidb(&self) -> Option<&AniDbEpisode> {
        match self {
            Self::AniDbOnly { anidb, .. } | Self::Combined { anidb, .. } => Some(anidb),
            Self::None => None,
        }
    }

    #[must_use]
    pub const fn tvdb(&self) -> Option<&TvDbEpisode> {
        match self {
            Self::Combined { tvdb, .. } => Some(tvdb),
            _ => None,
        }
    }

    #[must_use]
    pub fn following(&self) -> &FollowingEpisode {
        static NO_DATA: FollowingEpisode = FollowingEpisode::NoData;
        match self {
            Self::AniDbOnly { following, .. } | Self::Combined { following, .. } => following,
            Self::None => &NO_DATA,
        }
    }
}
