use super::anime_list::AniDbSeriesMappingData;
use super::episode_group::{EpisodeGroupMapping, SpecialEpisodePosition, parse_special_episode_positions};
use crate::constants::ABSOLUTE_SEASON_MARKER;
use crate::domain::{AniDbSeriesId, TvDbSeriesId};
use crate::models::anidb::AniDbEpisodeNumber;
use std::str::FromStr;
use tracing::debug;

/// Identifiers of one series across the sources the mapping file knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesIds {
    pub anidb_id: AniDbSeriesId,
    pub tvdb_id: Option<TvDbSeriesId>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<i32>,
}

/// The TvDB season AniDB standard episodes land in when no group claims them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultTvDbSeason {
    Season(i32),
    /// TvDB episodes are addressed by their absolute number.
    Absolute,
}

impl DefaultTvDbSeason {
    /// Season index to show the host; absolute-numbered series live in season 1.
    #[must_use]
    pub const fn display_index(self) -> i32 {
        match self {
            Self::Season(index) => index,
            Self::Absolute => 1,
        }
    }
}

impl FromStr for DefaultTvDbSeason {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == ABSOLUTE_SEASON_MARKER {
            return Ok(Self::Absolute);
        }
        s.parse().map(Self::Season)
    }
}

/// Everything the mapping file says about one AniDB series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesMapping {
    pub ids: SeriesIds,
    pub name: Option<String>,
    pub default_tvdb_season: DefaultTvDbSeason,
    pub default_tvdb_episode_index_offset: i32,
    pub episode_group_mappings: Vec<EpisodeGroupMapping>,
    pub special_episode_positions: Vec<SpecialEpisodePosition>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl SeriesMapping {
    /// Builds a mapping from one `<anime>` row.
    ///
    /// Returns `None` when the AniDB id is not an `i32` or the default season
    /// is neither an integer nor `"a"`. A row without a default season uses
    /// season 1. Malformed groups and position segments are dropped.
    #[must_use]
    pub fn from_data(data: &AniDbSeriesMappingData) -> Option<Self> {
        let Ok(anidb_id) = data.anidb_id.parse::<AniDbSeriesId>() else {
            debug!(anidb_id = %data.anidb_id, "Skipping mapping row with invalid AniDB id");
            return None;
        };

        let default_tvdb_season = match non_empty(data.default_tvdb_season.as_ref()) {
            None => DefaultTvDbSeason::Season(1),
            Some(raw) => {
                let Ok(season) = raw.parse() else {
                    debug!(%anidb_id, season = raw, "Skipping mapping row with invalid default season");
                    return None;
                };
                season
            }
        };

        let default_tvdb_episode_index_offset = non_empty(data.episode_offset.as_ref())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        let ids = SeriesIds {
            anidb_id,
            tvdb_id: non_empty(data.tvdb_id.as_ref()).and_then(|v| v.parse().ok()),
            imdb_id: non_empty(data.imdb_id.as_ref()).map(str::to_string),
            tmdb_id: non_empty(data.tmdb_id.as_ref()).and_then(|v| v.parse().ok()),
        };

        let episode_group_mappings = data
            .mapping_list
            .as_ref()
            .map(|list| {
                list.mappings
                    .iter()
                    .filter_map(EpisodeGroupMapping::from_data)
                    .collect()
            })
            .unwrap_or_default();

        let special_episode_positions = data
            .special_episode_positions
            .as_deref()
            .map(parse_special_episode_positions)
            .unwrap_or_default();

        Some(Self {
            ids,
            name: non_empty(data.name.as_ref()).map(str::to_string),
            default_tvdb_season,
            default_tvdb_episode_index_offset,
            episode_group_mappings,
            special_episode_positions,
        })
    }

    /// First group, in declaration order, that accepts the episode.
    #[must_use]
    pub fn episode_group_mapping(&self, number: &AniDbEpisodeNumber) -> Option<&EpisodeGroupMapping> {
        let season = number.season_number();
        self.episode_group_mappings
            .iter()
            .find(|g| g.anidb_season_index == season && g.can_map_anidb_episode(number.number))
    }

    #[must_use]
    pub fn tvdb_episode_group_mapping(
        &self,
        tvdb_season_index: i32,
        tvdb_episode_index: i32,
    ) -> Option<&EpisodeGroupMapping> {
        self.episode_group_mappings.iter().find(|g| {
            g.tvdb_season_index == tvdb_season_index && g.can_map_tvdb_episode(tvdb_episode_index)
        })
    }

    /// Position of a special episode; always `None` for other episode types.
    #[must_use]
    pub fn special_episode_position(
        &self,
        number: &AniDbEpisodeNumber,
    ) -> Option<&SpecialEpisodePosition> {
        if !number.is_special() {
            return None;
        }
        self.special_episode_positions
            .iter()
            .find(|p| p.special_episode_index == number.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::anime_list::{AniDbEpisodeGroupMappingData, MappingListData};
    use crate::mapping::episode_group::EpisodeMapping;

    fn row(anidb_id: &str, season: Option<&str>) -> AniDbSeriesMappingData {
        AniDbSeriesMappingData {
            anidb_id: anidb_id.to_string(),
            tvdb_id: Some("72025".to_string()),
            default_tvdb_season: season.map(str::to_string),
            episode_offset: Some("4".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn parses_ids_season_and_offset() {
        let m = SeriesMapping::from_data(&row("1", Some("35"))).unwrap();
        assert_eq!(m.ids.anidb_id, AniDbSeriesId::new(1));
        assert_eq!(m.ids.tvdb_id, Some(TvDbSeriesId::new(72025)));
        assert_eq!(m.default_tvdb_season, DefaultTvDbSeason::Season(35));
        assert_eq!(m.default_tvdb_episode_index_offset, 4);
    }

    #[test]
    fn absolute_marker_is_accepted() {
        let m = SeriesMapping::from_data(&row("1", Some("a"))).unwrap();
        assert_eq!(m.default_tvdb_season, DefaultTvDbSeason::Absolute);
        assert_eq!(m.default_tvdb_season.display_index(), 1);
    }

    #[test]
    fn rejects_bad_anidb_id() {
        assert!(SeriesMapping::from_data(&row("abc", Some("1"))).is_none());
        assert!(SeriesMapping::from_data(&row("3000000000", Some("1"))).is_none());
        assert!(SeriesMapping::from_data(&row("", Some("1"))).is_none());
    }

    #[test]
    fn rejects_bad_default_season() {
        assert!(SeriesMapping::from_data(&row("1", Some("x"))).is_none());
        assert!(SeriesMapping::from_data(&row("1", Some("A1"))).is_none());
    }

    #[test]
    fn missing_default_season_means_season_one() {
        let m = SeriesMapping::from_data(&row("1", None)).unwrap();
        assert_eq!(m.default_tvdb_season, DefaultTvDbSeason::Season(1));
    }

    #[test]
    fn non_numeric_tvdb_id_is_absent() {
        let mut data = row("23", Some("1"));
        data.tvdb_id = Some("movie".to_string());
        data.episode_offset = Some(String::new());
        let m = SeriesMapping::from_data(&data).unwrap();
        assert_eq!(m.ids.tvdb_id, None);
        assert_eq!(m.default_tvdb_episode_index_offset, 0);
    }

    #[test]
    fn group_lookup_uses_season_and_first_match() {
        let mut data = row("1", Some("1"));
        data.mapping_list = Some(MappingListData {
            mappings: vec![
                AniDbEpisodeGroupMappingData {
                    anidb_season: "1".to_string(),
                    tvdb_season: "2".to_string(),
                    start: Some("1".to_string()),
                    end: Some("10".to_string()),
                    offset: Some("0".to_string()),
                    episode_mappings: None,
                },
                AniDbEpisodeGroupMappingData {
                    anidb_season: "1".to_string(),
                    tvdb_season: "3".to_string(),
                    start: Some("5".to_string()),
                    end: Some("12".to_string()),
                    offset: Some("-4".to_string()),
                    episode_mappings: None,
                },
                AniDbEpisodeGroupMappingData {
                    anidb_season: "0".to_string(),
                    tvdb_season: "0".to_string(),
                    episode_mappings: Some(";1-4;".to_string()),
                    ..Default::default()
                },
            ],
        });
        let m = SeriesMapping::from_data(&data).unwrap();

        let overlapping = m.episode_group_mapping(&AniDbEpisodeNumber::standard(7)).unwrap();
        assert_eq!(overlapping.tvdb_season_index, 2);

        let later = m.episode_group_mapping(&AniDbEpisodeNumber::standard(11)).unwrap();
        assert_eq!(later.tvdb_season_index, 3);

        let special = m.episode_group_mapping(&AniDbEpisodeNumber::special(1)).unwrap();
        assert_eq!(special.episode_mappings, vec![EpisodeMapping::new(1, 4)]);

        assert!(m.episode_group_mapping(&AniDbEpisodeNumber::special(2)).is_none());
        assert!(m.episode_group_mapping(&AniDbEpisodeNumber::standard(13)).is_none());

        let reverse = m.tvdb_episode_group_mapping(3, 8).unwrap();
        assert_eq!(reverse.anidb_season_index, 1);
        assert_eq!(reverse.anidb_episode_index(8), Some(12));
    }

    #[test]
    fn special_positions_only_apply_to_specials() {
        let mut data = row("1", Some("1"));
        data.special_episode_positions = Some(";1-9;bad;2-13;".to_string());
        let m = SeriesMapping::from_data(&data).unwrap();

        assert_eq!(m.special_episode_positions.len(), 2);
        let pos = m.special_episode_position(&AniDbEpisodeNumber::special(1)).unwrap();
        assert_eq!(pos.following_standard_episode_index, 9);
        assert!(m.special_episode_position(&AniDbEpisodeNumber::standard(1)).is_none());
        assert!(m.special_episode_position(&AniDbEpisodeNumber::special(3)).is_none());
    }
}
