//! Cross-source reconciliation: the `anime-list.xml` data model and the
//! AniDB <-> TvDB episode translation chain.

pub mod anime_list;
pub mod cache;
pub mod episode_group;
pub mod list;
pub mod mapper;
pub mod parser;
pub mod series_mapping;

pub use anime_list::{AniDbEpisodeGroupMappingData, AniDbSeriesMappingData, AnimeListData};
pub use cache::MappingListCache;
pub use episode_group::{EpisodeGroupMapping, EpisodeMapping, SpecialEpisodePosition};
pub use list::{MappingError, MappingList};
pub use mapper::{DefaultSeasonEpisodeMapper, EpisodeMapper, GroupMappingEpisodeMapper};
pub use series_mapping::{DefaultTvDbSeason, SeriesIds, SeriesMapping};
