//! Combines one AniDB series or episode with its TvDB counterpart.

use crate::domain::TvDbSeriesId;
use crate::mapping::{EpisodeMapper, MappingError, MappingList, MappingListCache, SeriesMapping};
use crate::models::anidb::{AniDbEpisode, AniDbEpisodeNumber, AniDbSeries};
use crate::models::data::{EpisodeData, FollowingEpisode, SeriesData};
use crate::models::tvdb::TvDbEpisode;
use crate::sources::{AniDbSource, TvDbSource};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub struct DataMapper {
    mappings: Arc<MappingListCache>,
    anidb: Arc<dyn AniDbSource>,
    tvdb: Arc<dyn TvDbSource>,
    episode_mapper: EpisodeMapper,
}

impl DataMapper {
    #[must_use]
    pub fn new(
        mappings: Arc<MappingListCache>,
        anidb: Arc<dyn AniDbSource>,
        tvdb: Arc<dyn TvDbSource>,
    ) -> Self {
        Self {
            mappings,
            anidb,
            episode_mapper: EpisodeMapper::new(Arc::clone(&tvdb)),
            tvdb,
        }
    }

    /// The current snapshot, or `None` when it cannot be loaded.
    async fn mapping_list(&self) -> Option<Arc<MappingList>> {
        match self.mappings.get().await {
            Ok(list) => Some(list),
            Err(e) => {
                warn!(error = %e, "Mapping list unavailable");
                None
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`MappingError::Ambiguous`] when the AniDB id has more than one mapping.
    #[instrument(skip_all, fields(anidb_id = %anidb.id))]
    pub async fn map_series_data(&self, anidb: &AniDbSeries) -> Result<SeriesData, MappingError> {
        let Some(list) = self.mapping_list().await else {
            return Ok(SeriesData::AniDbOnly {
                anidb: anidb.clone(),
                mapping: None,
            });
        };

        let Some(mapping) = list.series_mapping_from_anidb(anidb.id)?.cloned() else {
            return Ok(SeriesData::AniDbOnly {
                anidb: anidb.clone(),
                mapping: None,
            });
        };

        let Some(tvdb_id) = mapping.ids.tvdb_id else {
            debug!("Series mapping has no TvDB id");
            return Ok(SeriesData::AniDbOnly {
                anidb: anidb.clone(),
                mapping: Some(mapping),
            });
        };

        match self.tvdb.series(tvdb_id).await {
            Ok(Some(tvdb)) => Ok(SeriesData::Combined {
                anidb: anidb.clone(),
                tvdb,
                mapping,
            }),
            Ok(None) => {
                debug!(tvdb_id = %tvdb_id, "TvDB has no such series");
                Ok(SeriesData::AniDbOnly {
                    anidb: anidb.clone(),
                    mapping: Some(mapping),
                })
            }
            Err(e) => {
                warn!(tvdb_id = %tvdb_id, error = %e, "Failed to fetch TvDB series");
                Ok(SeriesData::AniDbOnly {
                    anidb: anidb.clone(),
                    mapping: Some(mapping),
                })
            }
        }
    }

    /// Mapping for the series, with ambiguity and load failures reported as absent.
    async fn series_mapping(&self, series: &AniDbSeries) -> Option<SeriesMapping> {
        let list = self.mapping_list().await?;
        match list.series_mapping_from_anidb(series.id) {
            Ok(mapping) => mapping.cloned(),
            Err(e) => {
                warn!(error = %e, "Ignoring ambiguous series mapping");
                None
            }
        }
    }

    /// Translates an AniDB episode into TvDB through its group, or through the
    /// default season when no group covers it.
    async fn tvdb_episode(&self, mapping: &SeriesMapping, number: &AniDbEpisodeNumber) -> Option<TvDbEpisode> {
        let group = mapping.episode_group_mapping(number);
        self.episode_mapper
            .map_anidb_episode(number.number, mapping, group)
            .await
    }

    async fn following_for(
        &self,
        mapping: &SeriesMapping,
        series: &AniDbSeries,
        number: &AniDbEpisodeNumber,
    ) -> FollowingEpisode {
        let Some(position) = mapping.special_episode_position(number) else {
            return FollowingEpisode::NoData;
        };

        let Some(following) = series.find_episode(1, position.following_standard_episode_index) else {
            debug!(
                special = %number,
                following = position.following_standard_episode_index,
                "Following standard episode is not in the AniDB series"
            );
            return FollowingEpisode::NoData;
        };

        match self.tvdb_episode(mapping, &following.number).await {
            Some(episode) => FollowingEpisode::TvDb(episode),
            None => FollowingEpisode::NoData,
        }
    }

    /// The TvDB episode a special airs before, or [`FollowingEpisode::NoData`].
    pub async fn following_tvdb_episode(
        &self,
        series: &AniDbSeries,
        episode: &AniDbEpisode,
    ) -> FollowingEpisode {
        match self.series_mapping(series).await {
            Some(mapping) => self.following_for(&mapping, series, &episode.number).await,
            None => FollowingEpisode::NoData,
        }
    }

    #[instrument(skip_all, fields(anidb_id = %series.id, episode = %episode.number))]
    pub async fn map_episode_data(&self, series: &AniDbSeries, episode: &AniDbEpisode) -> EpisodeData {
        let Some(mapping) = self.series_mapping(series).await else {
            return EpisodeData::AniDbOnly {
                anidb: episode.clone(),
                following: FollowingEpisode::NoData,
            };
        };

        let following = self.following_for(&mapping, series, &episode.number).await;
        match self.tvdb_episode(&mapping, &episode.number).await {
            Some(tvdb) => EpisodeData::Combined {
                anidb: episode.clone(),
                tvdb,
                following,
            },
            None => EpisodeData::AniDbOnly {
                anidb: episode.clone(),
                following,
            },
        }
    }

    /// AniDB episode at a TvDB position; the first mapping of the TvDB series
    /// that resolves to an existing AniDB episode wins.
    #[instrument(skip(self))]
    pub async fn map_tvdb_episode(
        &self,
        tvdb_id: TvDbSeriesId,
        season: i32,
        index: i32,
    ) -> Option<AniDbEpisode> {
        let list = self.mapping_list().await?;

        for mapping in list.series_mappings_from_tvdb(tvdb_id) {
            let group = mapping.tvdb_episode_group_mapping(season, index);
            let Some(number) = self
                .episode_mapper
                .map_tvdb_episode(season, index, mapping, group)
                .await
            else {
                continue;
            };

            let anidb_id = mapping.ids.anidb_id;
            let series = match self.anidb.series(anidb_id).await {
                Ok(Some(series)) => series,
                Ok(None) => {
                    debug!(anidb_id = %anidb_id, "AniDB has no such series");
                    continue;
                }
                Err(e) => {
                    warn!(anidb_id = %anidb_id, error = %e, "Failed to fetch AniDB series");
                    continue;
                }
            };

            if let Some(episode) = series.find_by_number(&number) {
                return Some(episode.clone());
            }
            debug!(anidb_id = %anidb_id, episode = %number, "Mapped AniDB episode does not exist");
        }

        None
    }
}
