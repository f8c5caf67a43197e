//! Translation of episode indices between AniDB and TvDB numbering.
//!
//! [`EpisodeMapper`] picks a strategy per episode: a matching
//! [`EpisodeGroupMapping`] wins, otherwise the series' default season applies.
//! Every gap in the data (no TvDB id, no episode list, no matching episode)
//! ends in `None`; nothing here is treated as a failure.

use super::episode_group::EpisodeGroupMapping;
use super::series_mapping::{DefaultTvDbSeason, SeriesMapping};
use crate::domain::TvDbSeriesId;
use crate::models::anidb::AniDbEpisodeNumber;
use crate::models::tvdb::TvDbEpisode;
use crate::sources::TvDbSource;
use std::sync::Arc;
use tracing::{debug, warn};

async fn tvdb_episodes(source: &dyn TvDbSource, series_id: TvDbSeriesId) -> Option<Vec<TvDbEpisode>> {
    match source.episodes(series_id).await {
        Ok(Some(episodes)) => Some(episodes),
        Ok(None) => {
            debug!(tvdb_id = %series_id, "TvDB has no episodes for series");
            None
        }
        Err(e) => {
            warn!(tvdb_id = %series_id, error = %e, "Failed to fetch TvDB episodes");
            None
        }
    }
}

fn find_by_season(episodes: Vec<TvDbEpisode>, season: i32, index: i32) -> Option<TvDbEpisode> {
    episodes
        .into_iter()
        .find(|e| e.aired_season == season && e.aired_episode_number == index)
}

fn anidb_number(anidb_season: i32, index: i32) -> AniDbEpisodeNumber {
    if anidb_season == 1 {
        AniDbEpisodeNumber::standard(index)
    } else {
        AniDbEpisodeNumber::special(index)
    }
}

fn tvdb_id(series: &SeriesMapping) -> Option<TvDbSeriesId> {
    let id = series.ids.tvdb_id;
    if id.is_none() {
        debug!(anidb_id = %series.ids.anidb_id, "Series mapping has no TvDB id");
    }
    id
}

/// Translation through an explicit `<mapping>` group.
#[derive(Clone)]
pub struct GroupMappingEpisodeMapper {
    tvdb: Arc<dyn TvDbSource>,
}

impl GroupMappingEpisodeMapper {
    #[must_use]
    pub fn new(tvdb: Arc<dyn TvDbSource>) -> Self {
        Self { tvdb }
    }

    pub async fn map_anidb_episode(
        &self,
        anidb_episode_index: i32,
        series: &SeriesMapping,
        group: &EpisodeGroupMapping,
    ) -> Option<TvDbEpisode> {
        let series_id = tvdb_id(series)?;
        let season = group.tvdb_season_index;
        let index = group.tvdb_episode_index(anidb_episode_index)?;

        let episodes = tvdb_episodes(self.tvdb.as_ref(), series_id).await?;
        let found = find_by_season(episodes, season, index);
        if found.is_none() {
            debug!(
                tvdb_id = %series_id,
                season,
                episode = index,
                "No TvDB episode at group-mapped position"
            );
        }
        found
    }

    /// Reverse translation; the AniDB season comes from the group.
    #[must_use]
    pub fn map_tvdb_episode(
        &self,
        tvdb_episode_index: i32,
        group: &EpisodeGroupMapping,
    ) -> Option<AniDbEpisodeNumber> {
        let index = group.anidb_episode_index(tvdb_episode_index)?;
        Some(anidb_number(group.anidb_season_index, index))
    }
}

/// Translation through the series' default season and offset.
#[derive(Clone)]
pub struct DefaultSeasonEpisodeMapper {
    tvdb: Arc<dyn TvDbSource>,
}

impl DefaultSeasonEpisodeMapper {
    #[must_use]
    pub fn new(tvdb: Arc<dyn TvDbSource>) -> Self {
        Self { tvdb }
    }

    /// `Season(s)` looks up `(s, index + offset)`; `Absolute` looks up the
    /// episode whose absolute number is the raw AniDB index.
    pub async fn map_anidb_episode(
        &self,
        anidb_episode_index: i32,
        series: &SeriesMapping,
    ) -> Option<TvDbEpisode> {
        let series_id = tvdb_id(series)?;
        let episodes = tvdb_episodes(self.tvdb.as_ref(), series_id).await?;

        let found = match series.default_tvdb_season {
            DefaultTvDbSeason::Season(season) => {
                let Some(index) =
                    anidb_episode_index.checked_add(series.default_tvdb_episode_index_offset)
                else {
                    debug!(
                        anidb_episode = anidb_episode_index,
                        offset = series.default_tvdb_episode_index_offset,
                        "Default-season episode index overflows"
                    );
                    return None;
                };
                find_by_season(episodes, season, index)
            }
            DefaultTvDbSeason::Absolute => episodes
                .into_iter()
                .find(|e| e.absolute_number == Some(anidb_episode_index)),
        };

        if found.is_none() {
            debug!(
                tvdb_id = %series_id,
                anidb_episode = anidb_episode_index,
                default_season = ?series.default_tvdb_season,
                "No TvDB episode at default-season position"
            );
        }
        found
    }

    pub async fn map_tvdb_episode(
        &self,
        tvdb_season_index: i32,
        tvdb_episode_index: i32,
        series: &SeriesMapping,
    ) -> Option<AniDbEpisodeNumber> {
        match series.default_tvdb_season {
            DefaultTvDbSeason::Season(season) => {
                if season != tvdb_season_index {
                    debug!(
                        anidb_id = %series.ids.anidb_id,
                        season = tvdb_season_index,
                        "TvDB season is not this series' default season"
                    );
                    return None;
                }
                let index =
                    tvdb_episode_index.checked_sub(series.default_tvdb_episode_index_offset)?;
                (index > 0).then(|| AniDbEpisodeNumber::standard(index))
            }
            DefaultTvDbSeason::Absolute => {
                let series_id = tvdb_id(series)?;
                let episodes = tvdb_episodes(self.tvdb.as_ref(), series_id).await?;
                let absolute = find_by_season(episodes, tvdb_season_index, tvdb_episode_index)?
                    .absolute_number?;
                Some(AniDbEpisodeNumber::standard(absolute))
            }
        }
    }
}

/// Chooses group or default-season translation for each episode.
#[derive(Clone)]
pub struct EpisodeMapper {
    default_mapper: DefaultSeasonEpisodeMapper,
    group_mapper: GroupMappingEpisodeMapper,
}

impl EpisodeMapper {
    #[must_use]
    pub fn new(tvdb: Arc<dyn TvDbSource>) -> Self {
        Self {
            default_mapper: DefaultSeasonEpisodeMapper::new(Arc::clone(&tvdb)),
            group_mapper: GroupMappingEpisodeMapper::new(tvdb),
        }
    }

    pub async fn map_anidb_episode(
        &self,
        anidb_episode_index: i32,
        series: &SeriesMapping,
        group: Option<&EpisodeGroupMapping>,
    ) -> Option<TvDbEpisode> {
        match group {
            Some(group) => {
                self.group_mapper
                    .map_anidb_episode(anidb_episode_index, series, group)
                    .await
            }
            None => {
                self.default_mapper
                    .map_anidb_episode(anidb_episode_index, series)
                    .await
            }
        }
    }

    /// Maps a TvDB position back to an AniDB episode number.
    pub async fn map_tvdb_episode(
        &self,
        tvdb_season_index: i32,
        tvdb_episode_index: i32,
        series: &SeriesMapping,
        group: Option<&EpisodeGroupMapping>,
    ) -> Option<AniDbEpisodeNumber> {
        match group {
            Some(group) => self.group_mapper.map_tvdb_episode(tvdb_episode_index, group),
            None => {
                self.default_mapper
                    .map_tvdb_episode(tvdb_season_index, tvdb_episode_index, series)
                    .await
            }
        }
    }
}
