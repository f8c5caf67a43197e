//! Capabilities the reconciliation core needs from the outside world.
//!
//! The HTTP clients in [`crate::clients`] implement these; tests substitute
//! in-memory fakes. `Ok(None)` means the source answered and has no such
//! record, `Err` means the source could not be asked.

use crate::domain::{AniDbSeriesId, TvDbSeriesId};
use crate::models::anidb::AniDbSeries;
use crate::models::tvdb::{TvDbEpisode, TvDbSeries};

/// Supplies the raw text of `anime-list.xml`.
#[async_trait::async_trait]
pub trait MappingSource: Send + Sync {
    /// Returns the document, refetching upstream when `force_refresh` is set.
    async fn mapping_xml(&self, force_refresh: bool) -> anyhow::Result<String>;
}

#[async_trait::async_trait]
pub trait TvDbSource: Send + Sync {
    async fn series(&self, id: TvDbSeriesId) -> anyhow::Result<Option<TvDbSeries>>;

    /// All episodes of a series across every aired season.
    async fn episodes(&self, id: TvDbSeriesId) -> anyhow::Result<Option<Vec<TvDbEpisode>>>;
}

#[async_trait::async_trait]
pub trait AniDbSource: Send + Sync {
    async fn series(&self, id: AniDbSeriesId) -> anyhow::Result<Option<AniDbSeries>>;
}
