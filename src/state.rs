use std::sync::Arc;

use crate::cache::FileCache;
use crate::clients::{AniDbClient, AniListClient, AnimeListsClient, TvDbClient};
use crate::config::Config;
use crate::mapping::MappingListCache;
use crate::services::{DataMapper, MetadataFactory};
use crate::sources::{AniDbSource, MappingSource, TvDbSource};

/// Everything a command needs, wired once from the configuration.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub mappings: Arc<MappingListCache>,

    pub anidb: Arc<dyn AniDbSource>,

    pub tvdb: Arc<dyn TvDbSource>,

    /// `None` when AniList enrichment is disabled.
    pub anilist: Option<Arc<AniListClient>>,

    pub data_mapper: Arc<DataMapper>,

    pub metadata: Arc<MetadataFactory>,
}

impl SharedState {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let cache = FileCache::new(config.data_dir().join("cache"));

        let mapping_source: Arc<dyn MappingSource> =
            Arc::new(AnimeListsClient::new(&config.mapping, cache.clone()));
        let anidb: Arc<dyn AniDbSource> = Arc::new(AniDbClient::new(&config.anidb, cache.clone()));
        let tvdb: Arc<dyn TvDbSource> = Arc::new(TvDbClient::new(&config.tvdb, cache));

        Self::from_sources(config, mapping_source, anidb, tvdb)
    }

    /// Wires the state around caller-supplied sources.
    #[must_use]
    pub fn from_sources(
        config: Config,
        mapping_source: Arc<dyn MappingSource>,
        anidb: Arc<dyn AniDbSource>,
        tvdb: Arc<dyn TvDbSource>,
    ) -> Self {
        let mappings = Arc::new(MappingListCache::new(mapping_source));
        let data_mapper = Arc::new(DataMapper::new(
            Arc::clone(&mappings),
            Arc::clone(&anidb),
            Arc::clone(&tvdb),
        ));
        let anilist = config
            .anilist
            .enabled
            .then(|| Arc::new(AniListClient::new(&config.anilist)));
        let metadata = Arc::new(MetadataFactory::from_config(&config.metadata));

        Self {
            config: Arc::new(config),
            mappings,
            anidb,
            tvdb,
            anilist,
            data_mapper,
            metadata,
        }
    }
}
