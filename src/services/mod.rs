pub mod data_mapper;
pub use data_mapper::DataMapper;

pub mod metadata;
pub use metadata::{
    EpisodeMetadata, MetadataFactory, PersonKind, PersonMetadata, SeasonMetadata, SeriesMetadata,
};

pub mod titles;
pub use titles::TitlePreference;
