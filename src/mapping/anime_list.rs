//! Raw rows of `anime-list.xml`, deserialized with `quick-xml`'s serde support.
//!
//! Every attribute is kept as text here; validation happens when a row is
//! turned into a [`SeriesMapping`](super::SeriesMapping).

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimeListData {
    #[serde(rename = "anime", default)]
    pub anime: Vec<AniDbSeriesMappingData>,
}

impl AnimeListData {
    /// Deserializes a whole `<anime-list>` document.
    ///
    /// # Errors
    ///
    /// Returns the `quick-xml` error if the document is not well-formed.
    pub fn from_xml(xml: &str) -> Result<Self, quick_xml::DeError> {
        quick_xml::de::from_str(xml)
    }
}

/// One `<anime>` element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AniDbSeriesMappingData {
    #[serde(rename = "@anidbid", default)]
    pub anidb_id: String,

    #[serde(rename = "@tvdbid", default)]
    pub tvdb_id: Option<String>,

    #[serde(rename = "@defaulttvdbseason", default)]
    pub default_tvdb_season: Option<String>,

    #[serde(rename = "@episodeoffset", default)]
    pub episode_offset: Option<String>,

    #[serde(rename = "@tmdbid", default)]
    pub tmdb_id: Option<String>,

    #[serde(rename = "@imdbid", default)]
    pub imdb_id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(rename = "mapping-list", default)]
    pub mapping_list: Option<MappingListData>,

    /// `<before>`: special episode positions.
    #[serde(rename = "before", default)]
    pub special_episode_positions: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MappingListData {
    #[serde(rename = "mapping", default)]
    pub mappings: Vec<AniDbEpisodeGroupMappingData>,
}

/// One `<mapping>` element inside `<mapping-list>`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AniDbEpisodeGroupMappingData {
    #[serde(rename = "@anidbseason", default)]
    pub anidb_season: String,

    #[serde(rename = "@tvdbseason", default)]
    pub tvdb_season: String,

    #[serde(rename = "@start", default)]
    pub start: Option<String>,

    #[serde(rename = "@end", default)]
    pub end: Option<String>,

    #[serde(rename = "@offset", default)]
    pub offset: Option<String>,

    #[serde(rename = "$text", default)]
    pub episode_mappings: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<anime-list>
  <!-- comment rows are ignored -->
  <anime anidbid="1" tvdbid="72025" defaulttvdbseason="1" episodeoffset="" tmdbid="" imdbid="">
    <name>Seikai no Monshou</name>
    <mapping-list>
      <mapping anidbseason="0" tvdbseason="0">;1-5;2-6;</mapping>
      <mapping anidbseason="1" tvdbseason="2" start="14" end="26" offset="-13"/>
    </mapping-list>
    <before>;1-9;</before>
    <supplemental-info>
      <studio>Sunrise</studio>
    </supplemental-info>
  </anime>
  <anime anidbid="23" tvdbid="movie" defaulttvdbseason="1">
    <name>Cowboy Bebop: Tengoku no Tobira</name>
  </anime>
</anime-list>"#;

    #[test]
    fn deserializes_rows_attributes_and_children() {
        let list = AnimeListData::from_xml(SAMPLE).unwrap();
        assert_eq!(list.anime.len(), 2);

        let first = &list.anime[0];
        assert_eq!(first.anidb_id, "1");
        assert_eq!(first.tvdb_id.as_deref(), Some("72025"));
        assert_eq!(first.default_tvdb_season.as_deref(), Some("1"));
        assert_eq!(first.name.as_deref(), Some("Seikai no Monshou"));
        assert_eq!(first.special_episode_positions.as_deref(), Some(";1-9;"));

        let groups = &first.mapping_list.as_ref().unwrap().mappings;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].episode_mappings.as_deref(), Some(";1-5;2-6;"));
        assert_eq!(groups[1].start.as_deref(), Some("14"));
        assert_eq!(groups[1].offset.as_deref(), Some("-13"));
        assert!(groups[1].episode_mappings.is_none());
    }

    #[test]
    fn rows_without_children_have_no_groups() {
        let list = AnimeListData::from_xml(SAMPLE).unwrap();
        let movie = &list.anime[1];
        assert_eq!(movie.tvdb_id.as_deref(), Some("movie"));
        assert!(movie.mapping_list.is_none());
        assert!(movie.special_episode_positions.is_none());
    }

    #[test]
    fn rejects_broken_documents() {
        assert!(AnimeListData::from_xml("<anime-list><anime anidbid=\"1\"><name>cut").is_err());
    }
}
