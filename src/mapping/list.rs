use super::anime_list::AnimeListData;
use super::series_mapping::SeriesMapping;
use crate::domain::{AniDbSeriesId, Source, TvDbSeriesId};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Failures of the mapping layer.
///
/// A series that simply has no mapping is not an error; lookups return `None`.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Multiple series mappings match {provider} series id {id}")]
    Ambiguous { provider: Source, id: i32, count: usize },

    #[error("Failed to parse mapping list: {0}")]
    Parse(#[from] quick_xml::DeError),

    #[error("Failed to load mapping list: {0}")]
    Load(String),
}

impl From<anyhow::Error> for MappingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Load(format!("{err:#}"))
    }
}

/// Immutable snapshot of every usable row of the mapping file.
#[derive(Debug, Default)]
pub struct MappingList {
    mappings: Vec<SeriesMapping>,
    by_anidb: HashMap<AniDbSeriesId, Vec<usize>>,
    by_tvdb: HashMap<TvDbSeriesId, Vec<usize>>,
}

impl MappingList {
    #[must_use]
    pub fn new(mappings: Vec<SeriesMapping>) -> Self {
        let mut by_anidb: HashMap<AniDbSeriesId, Vec<usize>> = HashMap::new();
        let mut by_tvdb: HashMap<TvDbSeriesId, Vec<usize>> = HashMap::new();

        for (index, mapping) in mappings.iter().enumerate() {
            by_anidb.entry(mapping.ids.anidb_id).or_default().push(index);
            if let Some(tvdb_id) = mapping.ids.tvdb_id {
                by_tvdb.entry(tvdb_id).or_default().push(index);
            }
        }

        Self {
            mappings,
            by_anidb,
            by_tvdb,
        }
    }

    #[must_use]
    pub fn from_data(data: &AnimeListData) -> Self {
        let mappings: Vec<SeriesMapping> = data
            .anime
            .iter()
            .filter_map(SeriesMapping::from_data)
            .collect();

        let dropped = data.anime.len() - mappings.len();
        if dropped > 0 {
            debug!(dropped, "Ignored invalid mapping rows");
        }

        Self::new(mappings)
    }

    /// Parses a complete `anime-list.xml` document.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Parse`] when the document is not well-formed XML.
    pub fn parse(xml: &str) -> Result<Self, MappingError> {
        let data = AnimeListData::from_xml(xml)?;
        Ok(Self::from_data(&data))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesMapping> {
        self.mappings.iter()
    }

    /// Mapping for an AniDB series.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Ambiguous`] when the file lists the id more than once.
    pub fn series_mapping_from_anidb(
        &self,
        id: AniDbSeriesId,
    ) -> Result<Option<&SeriesMapping>, MappingError> {
        match self.by_anidb.get(&id).map(Vec::as_slice) {
            None | Some([]) => {
                debug!(anidb_id = %id, "No series mapping for AniDB id");
                Ok(None)
            }
            Some([index]) => Ok(self.mappings.get(*index)),
            Some(indices) => Err(MappingError::Ambiguous {
                provider: Source::AniDb,
                id: id.value(),
                count: indices.len(),
            }),
        }
    }

    /// Every mapping that points at a TvDB series, in file order.
    ///
    /// One TvDB series commonly spans several AniDB series (one per season),
    /// so several results are normal here.
    #[must_use]
    pub fn series_mappings_from_tvdb(&self, id: TvDbSeriesId) -> Vec<&SeriesMapping> {
        self.by_tvdb
            .get(&id)
            .map(|indices| indices.iter().filter_map(|i| self.mappings.get(*i)).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<anime-list>
  <anime anidbid="1" tvdbid="100" defaulttvdbseason="1"><name>One</name></anime>
  <anime anidbid="2" tvdbid="100" defaulttvdbseason="2" episodeoffset="0"><name>One S2</name></anime>
  <anime anidbid="3" tvdbid="unknown" defaulttvdbseason="1"><name>Three</name></anime>
  <anime anidbid="4" tvdbid="400" defaulttvdbseason="1"/>
  <anime anidbid="4" tvdbid="401" defaulttvdbseason="1"/>
  <anime anidbid="x" tvdbid="500" defaulttvdbseason="1"/>
  <anime anidbid="5" tvdbid="500" defaulttvdbseason="z"/>
</anime-list>"#;

    #[test]
    fn drops_invalid_rows() {
        let list = MappingList::parse(XML).unwrap();
        assert_eq!(list.len(), 5);
        assert!(list.series_mappings_from_tvdb(TvDbSeriesId::new(500)).is_empty());
    }

    #[test]
    fn finds_unique_anidb_mapping() {
        let list = MappingList::parse(XML).unwrap();
        let m = list
            .series_mapping_from_anidb(AniDbSeriesId::new(2))
            .unwrap()
            .unwrap();
        assert_eq!(m.name.as_deref(), Some("One S2"));
    }

    #[test]
    fn unknown_anidb_id_is_absent() {
        let list = MappingList::parse(XML).unwrap();
        assert!(
            list.series_mapping_from_anidb(AniDbSeriesId::new(999))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn duplicate_anidb_id_is_ambiguous() {
        let list = MappingList::parse(XML).unwrap();
        let err = list
            .series_mapping_from_anidb(AniDbSeriesId::new(4))
            .unwrap_err();
        assert!(matches!(
            err,
            MappingError::Ambiguous {
                provider: Source::AniDb,
                id: 4,
                count: 2
            }
        ));
        assert_eq!(
            err.to_string(),
            "Multiple series mappings match anidb series id 4"
        );
    }

    #[test]
    fn tvdb_lookup_returns_all_seasons_in_order() {
        let list = MappingList::parse(XML).unwrap();
        let ids: Vec<i32> = list
            .series_mappings_from_tvdb(TvDbSeriesId::new(100))
            .iter()
            .map(|m| m.ids.anidb_id.value())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
