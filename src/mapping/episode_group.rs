use super::anime_list::AniDbEpisodeGroupMappingData;
use super::parser::parse_index_pairs;
use tracing::debug;

/// Overrides the arithmetic offset for a single episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeMapping {
    pub anidb_episode_index: i32,
    pub tvdb_episode_index: i32,
}

impl EpisodeMapping {
    #[must_use]
    pub const fn new(anidb_episode_index: i32, tvdb_episode_index: i32) -> Self {
        Self {
            anidb_episode_index,
            tvdb_episode_index,
        }
    }
}

/// A special episode and the standard episode it airs before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialEpisodePosition {
    pub special_episode_index: i32,
    pub following_standard_episode_index: i32,
}

impl SpecialEpisodePosition {
    #[must_use]
    pub const fn new(special_episode_index: i32, following_standard_episode_index: i32) -> Self {
        Self {
            special_episode_index,
            following_standard_episode_index,
        }
    }
}

#[must_use]
pub fn parse_episode_mappings(text: &str) -> Vec<EpisodeMapping> {
    parse_index_pairs(text)
        .into_iter()
        .map(|(anidb, tvdb)| EpisodeMapping::new(anidb, tvdb))
        .collect()
}

#[must_use]
pub fn parse_special_episode_positions(text: &str) -> Vec<SpecialEpisodePosition> {
    parse_index_pairs(text)
        .into_iter()
        .map(|(special, following)| SpecialEpisodePosition::new(special, following))
        .collect()
}

/// Maps a range of one AniDB season onto one TvDB season.
///
/// Episodes inside `start..=end` translate by adding `tvdb_episode_index_offset`;
/// entries in `episode_mappings` take precedence and may sit outside the range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeGroupMapping {
    pub anidb_season_index: i32,
    pub tvdb_season_index: i32,
    pub tvdb_episode_index_offset: i32,
    pub start_anidb_episode_index: i32,
    pub end_anidb_episode_index: i32,
    pub episode_mappings: Vec<EpisodeMapping>,
}

impl EpisodeGroupMapping {
    #[must_use]
    pub const fn new(
        anidb_season_index: i32,
        tvdb_season_index: i32,
        tvdb_episode_index_offset: i32,
        start_anidb_episode_index: i32,
        end_anidb_episode_index: i32,
        episode_mappings: Vec<EpisodeMapping>,
    ) -> Self {
        Self {
            anidb_season_index,
            tvdb_season_index,
            tvdb_episode_index_offset,
            start_anidb_episode_index,
            end_anidb_episode_index,
            episode_mappings,
        }
    }

    /// Builds a group from a `<mapping>` element.
    ///
    /// Seasons are required. `start`, `end` and `offset` default to 0 when
    /// absent or empty; a present but non-numeric value drops the group.
    #[must_use]
    pub fn from_data(data: &AniDbEpisodeGroupMappingData) -> Option<Self> {
        let anidb_season_index = data.anidb_season.trim().parse().ok()?;
        let tvdb_season_index = data.tvdb_season.trim().parse().ok()?;

        let optional_int = |value: Option<&String>, field: &str| -> Option<i32> {
            match value.map(|v| v.trim()).filter(|v| !v.is_empty()) {
                None => Some(0),
                Some(v) => {
                    let parsed = v.parse().ok();
                    if parsed.is_none() {
                        debug!(field, value = v, "Dropping mapping group with bad attribute");
                    }
                    parsed
                }
            }
        };

        let start = optional_int(data.start.as_ref(), "start")?;
        let end = optional_int(data.end.as_ref(), "end")?;
        let offset = optional_int(data.offset.as_ref(), "offset")?;

        let episode_mappings = data
            .episode_mappings
            .as_deref()
            .map(parse_episode_mappings)
            .unwrap_or_default();

        Some(Self::new(
            anidb_season_index,
            tvdb_season_index,
            offset,
            start,
            end,
            episode_mappings,
        ))
    }

    #[must_use]
    pub fn can_map_anidb_episode(&self, anidb_episode_index: i32) -> bool {
        (self.start_anidb_episode_index..=self.end_anidb_episode_index)
            .contains(&anidb_episode_index)
            || self
                .episode_mappings
                .iter()
                .any(|m| m.anidb_episode_index == anidb_episode_index)
    }

    #[must_use]
    pub fn can_map_tvdb_episode(&self, tvdb_episode_index: i32) -> bool {
        let shifted = self
            .start_anidb_episode_index
            .checked_add(self.tvdb_episode_index_offset)
            .zip(
                self.end_anidb_episode_index
                    .checked_add(self.tvdb_episode_index_offset),
            );
        if shifted.is_none() {
            debug!(
                offset = self.tvdb_episode_index_offset,
                "Group range overflows when shifted to TvDB numbering"
            );
        }

        shifted.is_some_and(|(start, end)| (start..=end).contains(&tvdb_episode_index))
            || self
                .episode_mappings
                .iter()
                .any(|m| m.tvdb_episode_index == tvdb_episode_index)
    }

    /// Explicit override for an AniDB index, if the group declares one.
    #[must_use]
    pub fn mapping_for_anidb(&self, anidb_episode_index: i32) -> Option<&EpisodeMapping> {
        self.episode_mappings
            .iter()
            .find(|m| m.anidb_episode_index == anidb_episode_index)
    }

    #[must_use]
    pub fn mapping_for_tvdb(&self, tvdb_episode_index: i32) -> Option<&EpisodeMapping> {
        self.episode_mappings
            .iter()
            .find(|m| m.tvdb_episode_index == tvdb_episode_index)
    }

    /// TvDB episode index for an AniDB index: the override, else the offset.
    /// Override if present, else `index + offset`. `None` when that overflows.
    #[must_use]
    pub fn tvdb_episode_index(&self, anidb_episode_index: i32) -> Option<i32> {
        if let Some(m) = self.mapping_for_anidb(anidb_episode_index) {
            return Some(m.tvdb_episode_index);
        }
        let index = anidb_episode_index.checked_add(self.tvdb_episode_index_offset);
        if index.is_none() {
            debug!(
                anidb_episode = anidb_episode_index,
                offset = self.tvdb_episode_index_offset,
                "TvDB episode index overflows"
            );
        }
        index
    }

    #[must_use]
    pub fn anidb_episode_index(&self, tvdb_episode_index: i32) -> Option<i32> {
        if let Some(m) = self.mapping_for_tvdb(tvdb_episode_index) {
            return Some(m.anidb_episode_index);
        }
        let index = tvdb_episode_index.checked_sub(self.tvdb_episode_index_offset);
        if index.is_none() {
            debug!(
                tvdb_episode = tvdb_episode_index,
                offset = self.tvdb_episode_index_offset,
                "AniDB episode index overflows"
            );
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(overrides: Vec<EpisodeMapping>) -> EpisodeGroupMapping {
        EpisodeGroupMapping::new(1, 3, 6, 3, 6, overrides)
    }

    #[test]
    fn range_membership_maps_with_offset() {
        let g = group(vec![]);
        for idx in 3..=6 {
            assert!(g.can_map_anidb_episode(idx));
            assert_eq!(g.tvdb_episode_index(idx), Some(idx + 6));
        }
        assert!(!g.can_map_anidb_episode(2));
        assert!(!g.can_map_anidb_episode(7));
        assert_eq!(g.tvdb_episode_index(4), Some(10));
    }

    #[test]
    fn override_wins_over_offset_and_range() {
        let g = group(vec![EpisodeMapping::new(5, 33), EpisodeMapping::new(20, 1)]);
        assert_eq!(g.tvdb_episode_index(5), Some(33));
        assert!(g.can_map_anidb_episode(20));
        assert_eq!(g.tvdb_episode_index(20), Some(1));
    }

    #[test]
    fn tvdb_side_agrees_with_shifted_range_or_override() {
        let g = group(vec![EpisodeMapping::new(20, 1)]);
        assert!(g.can_map_tvdb_episode(9));
        assert!(g.can_map_tvdb_episode(12));
        assert!(!g.can_map_tvdb_episode(13));
        assert!(g.can_map_tvdb_episode(1));
        assert_eq!(g.anidb_episode_index(10), Some(4));
        assert_eq!(g.anidb_episode_index(1), Some(20));
    }

    #[test]
    fn from_data_defaults_missing_range_to_zero() {
        let data = AniDbEpisodeGroupMappingData {
            anidb_season: "0".to_string(),
            tvdb_season: "0".to_string(),
            episode_mappings: Some(";1-5;2-6;".to_string()),
            ..Default::default()
        };
        let g = EpisodeGroupMapping::from_data(&data).unwrap();
        assert_eq!(g.start_anidb_episode_index, 0);
        assert_eq!(g.end_anidb_episode_index, 0);
        assert_eq!(g.tvdb_episode_index_offset, 0);
        assert_eq!(
            g.episode_mappings,
            vec![EpisodeMapping::new(1, 5), EpisodeMapping::new(2, 6)]
        );
        assert!(g.can_map_anidb_episode(2));
        assert!(!g.can_map_anidb_episode(3));
    }

    #[test]
    fn from_data_rejects_bad_seasons_and_attributes() {
        let no_season = AniDbEpisodeGroupMappingData {
            anidb_season: "x".to_string(),
            tvdb_season: "1".to_string(),
            ..Default::default()
        };
        assert!(EpisodeGroupMapping::from_data(&no_season).is_none());

        let bad_offset = AniDbEpisodeGroupMappingData {
            anidb_season: "1".to_string(),
            tvdb_season: "1".to_string(),
            offset: Some("ten".to_string()),
            ..Default::default()
        };
        assert!(EpisodeGroupMapping::from_data(&bad_offset).is_none());
    }

    #[test]
    fn extreme_offsets_translate_to_nothing() {
        let g = EpisodeGroupMapping::new(1, 2, i32::MAX, 1, 10, vec![EpisodeMapping::new(3, 7)]);
        assert_eq!(g.tvdb_episode_index(1), None);
        assert_eq!(g.tvdb_episode_index(3), Some(7));
        assert!(!g.can_map_tvdb_episode(5));
        assert!(g.can_map_tvdb_episode(7));

        let negative = EpisodeGroupMapping::new(1, 2, i32::MIN, 1, 10, vec![]);
        assert_eq!(negative.anidb_episode_index(1), None);
        assert!(!negative.can_map_tvdb_episode(1));
    }

    #[test]
    fn malformed_override_text_yields_no_overrides() {
        for text in ["4444", ";;;;", ";1;4;"] {
            assert!(parse_episode_mappings(text).is_empty(), "{text}");
            assert!(parse_special_episode_positions(text).is_empty(), "{text}");
        }
    }
}
