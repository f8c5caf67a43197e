//! End-to-end reconciliation over a realistic `anime-list.xml` excerpt with
//! in-memory sources.

use animeta::domain::{AniDbSeriesId, TvDbSeriesId};
use animeta::mapping::{DefaultTvDbSeason, EpisodeMapper, MappingError, MappingList, MappingListCache};
use animeta::models::anidb::{AniDbEpisode, AniDbEpisodeNumber, AniDbSeries, AniDbTitle};
use animeta::models::data::{EpisodeData, FollowingEpisode};
use animeta::models::tvdb::{TvDbEpisode, TvDbSeries};
use animeta::services::{DataMapper, MetadataFactory, TitlePreference};
use animeta::sources::{AniDbSource, MappingSource, TvDbSource};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const ANIME_LIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<anime-list>
  <anime anidbid="1" tvdbid="9000" defaulttvdbseason="35" episodeoffset="4" tmdbid="" imdbid="">
    <name>Long Runner</name>
  </anime>
  <anime anidbid="2" tvdbid="9100" defaulttvdbseason="1">
    <name>Grouped</name>
    <mapping-list>
      <mapping anidbseason="1" tvdbseason="3" offset="6" start="3" end="6">;5-33;</mapping>
      <mapping anidbseason="0" tvdbseason="0">;1-2;2-3;</mapping>
    </mapping-list>
    <before>;1-9;2-4;</before>
  </anime>
  <anime anidbid="3" tvdbid="9200" defaulttvdbseason="a">
    <name>Absolute</name>
  </anime>
  <anime anidbid="4" tvdbid="unknown" defaulttvdbseason="1">
    <name>Unmapped</name>
  </anime>
  <anime anidbid="x5" tvdbid="1" defaulttvdbseason="1">
    <name>Broken id</name>
  </anime>
  <anime anidbid="6" tvdbid="1" defaulttvdbseason="b">
    <name>Broken season</name>
  </anime>
  <anime anidbid="7" tvdbid="9300" defaulttvdbseason="1">
    <name>Overlap</name>
    <mapping-list>
      <mapping anidbseason="1" tvdbseason="2" start="1" end="10"></mapping>
      <mapping anidbseason="1" tvdbseason="5" start="5" end="12"></mapping>
    </mapping-list>
  </anime>
</anime-list>"#;

struct StaticList;

#[async_trait::async_trait]
impl MappingSource for StaticList {
    async fn mapping_xml(&self, _force_refresh: bool) -> anyhow::Result<String> {
        Ok(ANIME_LIST.to_string())
    }
}

/// Records every (series, season, episode) it is asked to resolve.
#[derive(Default)]
struct RecordingTvDb {
    episodes: HashMap<i32, Vec<TvDbEpisode>>,
    requests: Mutex<Vec<i32>>,
}

#[async_trait::async_trait]
impl TvDbSource for RecordingTvDb {
    async fn series(&self, id: TvDbSeriesId) -> anyhow::Result<Option<TvDbSeries>> {
        Ok(self.episodes.contains_key(&id.value()).then(|| TvDbSeries {
            id,
            name: format!("TvDB {id}"),
            overview: None,
            first_aired: None,
            genres: vec![],
            network: None,
            status: None,
        }))
    }

    async fn episodes(&self, id: TvDbSeriesId) -> anyhow::Result<Option<Vec<TvDbEpisode>>> {
        self.requests.lock().unwrap().push(id.value());
        Ok(self.episodes.get(&id.value()).cloned())
    }
}

struct MapAniDb(HashMap<i32, AniDbSeries>);

#[async_trait::async_trait]
impl AniDbSource for MapAniDb {
    async fn series(&self, id: AniDbSeriesId) -> anyhow::Result<Option<AniDbSeries>> {
        Ok(self.0.get(&id.value()).cloned())
    }
}

fn tvdb_episode(season: i32, number: i32, absolute: Option<i32>) -> TvDbEpisode {
    TvDbEpisode {
        id: season * 1000 + number,
        aired_season: season,
        aired_episode_number: number,
        absolute_number: absolute,
        name: Some(format!("S{season}E{number}")),
        overview: None,
        first_aired: None,
    }
}

fn tvdb_fixture() -> Arc<RecordingTvDb> {
    let mut episodes = HashMap::new();
    episodes.insert(9000, (1..=10).map(|n| tvdb_episode(35, n, None)).collect());
    episodes.insert(
        9100,
        (1..=40)
            .map(|n| tvdb_episode(3, n, None))
            .chain((1..=12).map(|n| tvdb_episode(1, n, None)))
            .chain((1..=4).map(|n| tvdb_episode(0, n, None)))
            .collect(),
    );
    episodes.insert(
        9200,
        (1..=12)
            .map(|n| tvdb_episode(1, n, Some(n)))
            .chain((1..=12).map(|n| tvdb_episode(2, n, Some(n + 12))))
            .collect(),
    );
    episodes.insert(
        9300,
        (1..=12)
            .map(|n| tvdb_episode(2, n, None))
            .chain((1..=12).map(|n| tvdb_episode(5, n, None)))
            .collect(),
    );
    Arc::new(RecordingTvDb {
        episodes,
        requests: Mutex::new(Vec::new()),
    })
}

fn anidb_series(id: i32, standard: i32, specials: i32) -> AniDbSeries {
    let episodes = (1..=standard)
        .map(AniDbEpisodeNumber::standard)
        .chain((1..=specials).map(AniDbEpisodeNumber::special))
        .map(|number| AniDbEpisode {
            id: id * 100 + number.number + if number.is_special() { 50 } else { 0 },
            titles: vec![AniDbTitle {
                language: "en".into(),
                kind: None,
                value: format!("Episode {number}"),
            }],
            number,
            air_date: None,
            length: Some(24),
            rating: None,
            summary: None,
        })
        .collect();

    AniDbSeries {
        id: AniDbSeriesId::new(id),
        series_type: Some("TV Series".into()),
        episode_count: Some(standard),
        start_date: None,
        end_date: None,
        titles: vec![AniDbTitle {
            language: "x-jat".into(),
            kind: Some("main".into()),
            value: format!("Series {id}"),
        }],
        description: None,
        picture: None,
        rating: None,
        tags: vec![],
        creators: vec![],
        characters: vec![],
        episodes,
    }
}

fn data_mapper(tvdb: Arc<RecordingTvDb>) -> DataMapper {
    let mut anidb = HashMap::new();
    anidb.insert(1, anidb_series(1, 6, 0));
    anidb.insert(2, anidb_series(2, 12, 2));
    anidb.insert(3, anidb_series(3, 24, 0));
    DataMapper::new(
        Arc::new(MappingListCache::new(Arc::new(StaticList))),
        Arc::new(MapAniDb(anidb)),
        tvdb,
    )
}

#[test]
fn invalid_rows_are_dropped_when_parsing() {
    let list = MappingList::parse(ANIME_LIST).unwrap();
    assert_eq!(list.len(), 5);
    assert!(list.series_mapping_from_anidb(AniDbSeriesId::new(6)).unwrap().is_none());

    let absolute = list
        .series_mapping_from_anidb(AniDbSeriesId::new(3))
        .unwrap()
        .unwrap();
    assert_eq!(absolute.default_tvdb_season, DefaultTvDbSeason::Absolute);

    let unmapped = list
        .series_mapping_from_anidb(AniDbSeriesId::new(4))
        .unwrap()
        .unwrap();
    assert!(unmapped.ids.tvdb_id.is_none());
}

#[tokio::test]
async fn default_season_scenario_requests_season_35_episode_7() {
    let tvdb = tvdb_fixture();
    let list = MappingList::parse(ANIME_LIST).unwrap();
    let mapping = list
        .series_mapping_from_anidb(AniDbSeriesId::new(1))
        .unwrap()
        .unwrap();

    let mapper = EpisodeMapper::new(tvdb.clone());
    let found = mapper.map_anidb_episode(3, mapping, None).await.unwrap();
    assert_eq!((found.aired_season, found.aired_episode_number), (35, 7));
    assert_eq!(*tvdb.requests.lock().unwrap(), vec![9000]);
}

#[tokio::test]
async fn group_scenarios_use_offset_and_override() {
    let series = anidb_series(2, 12, 2);
    let mapper = data_mapper(tvdb_fixture());

    let fourth = mapper.map_episode_data(&series, &series.episodes[3]).await;
    let tvdb = fourth.tvdb().unwrap();
    assert_eq!((tvdb.aired_season, tvdb.aired_episode_number), (3, 10));

    let fifth = mapper.map_episode_data(&series, &series.episodes[4]).await;
    let tvdb = fifth.tvdb().unwrap();
    assert_eq!((tvdb.aired_season, tvdb.aired_episode_number), (3, 33));

    // Outside the group range the default season applies.
    let first = mapper.map_episode_data(&series, &series.episodes[0]).await;
    let tvdb = first.tvdb().unwrap();
    assert_eq!((tvdb.aired_season, tvdb.aired_episode_number), (1, 1));
}

#[tokio::test]
async fn absolute_default_season_never_uses_season_offset() {
    let series = anidb_series(3, 24, 0);
    let mapper = data_mapper(tvdb_fixture());

    for index in [1, 12, 13, 24] {
        let data = mapper
            .map_episode_data(&series, &series.episodes[index as usize - 1])
            .await;
        let tvdb = data.tvdb().unwrap();
        assert_eq!(tvdb.absolute_number, Some(index));
    }
}

#[tokio::test]
async fn special_follows_standard_episode_nine() {
    let series = anidb_series(2, 12, 2);
    let mapper = data_mapper(tvdb_fixture());
    let special = series
        .find_by_number(&AniDbEpisodeNumber::special(1))
        .unwrap();

    let following = mapper.following_tvdb_episode(&series, special).await;
    let anchor = following.tvdb().unwrap();
    assert_eq!((anchor.aired_season, anchor.aired_episode_number), (1, 9));

    let data = mapper.map_episode_data(&series, special).await;
    let tvdb = data.tvdb().unwrap();
    assert_eq!((tvdb.aired_season, tvdb.aired_episode_number), (0, 2));

    let factory = MetadataFactory::new(TitlePreference::default(), 400, 10);
    let meta = factory.episode_metadata(&data).unwrap();
    assert_eq!(meta.airs_before_season, Some(1));
    assert_eq!(meta.airs_before_episode, Some(9));
    assert_eq!(meta.name.as_deref(), Some("Episode S1"));
}

#[tokio::test]
async fn special_anchor_recurses_through_groups() {
    let series = anidb_series(2, 12, 2);
    let mapper = data_mapper(tvdb_fixture());
    let special = series
        .find_by_number(&AniDbEpisodeNumber::special(2))
        .unwrap();

    // S2 precedes standard episode 4, which the range group sends to 3x10.
    let data = mapper.map_episode_data(&series, special).await;
    let anchor = data.following().tvdb().unwrap();
    assert_eq!((anchor.aired_season, anchor.aired_episode_number), (3, 10));
}

#[tokio::test]
async fn overlapping_groups_resolve_to_the_first_declared() {
    let tvdb = tvdb_fixture();
    let list = MappingList::parse(ANIME_LIST).unwrap();
    let mapping = list
        .series_mapping_from_anidb(AniDbSeriesId::new(7))
        .unwrap()
        .unwrap();

    let number = AniDbEpisodeNumber::standard(6);
    let group = mapping.episode_group_mapping(&number).unwrap();
    assert_eq!(group.tvdb_season_index, 2);

    let found = EpisodeMapper::new(tvdb)
        .map_anidb_episode(6, mapping, Some(group))
        .await
        .unwrap();
    assert_eq!((found.aired_season, found.aired_episode_number), (2, 6));

    let later = mapping
        .episode_group_mapping(&AniDbEpisodeNumber::standard(11))
        .unwrap();
    assert_eq!(later.tvdb_season_index, 5);
}

#[tokio::test]
async fn unmapped_episode_is_anidb_only_with_no_following_data() {
    let tvdb = tvdb_fixture();
    let mapper = data_mapper(tvdb.clone());
    let series = anidb_series(4, 3, 0);

    let data = mapper.map_episode_data(&series, &series.episodes[0]).await;
    assert!(matches!(
        data,
        EpisodeData::AniDbOnly {
            following: FollowingEpisode::NoData,
            ..
        }
    ));
    assert!(tvdb.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn tvdb_numbering_maps_back_to_anidb() {
    let mapper = data_mapper(tvdb_fixture());

    let episode = mapper
        .map_tvdb_episode(TvDbSeriesId::new(9100), 3, 10)
        .await
        .unwrap();
    assert_eq!(episode.number, AniDbEpisodeNumber::standard(4));

    let overridden = mapper
        .map_tvdb_episode(TvDbSeriesId::new(9100), 3, 33)
        .await
        .unwrap();
    assert_eq!(overridden.number, AniDbEpisodeNumber::standard(5));

    let absolute = mapper
        .map_tvdb_episode(TvDbSeriesId::new(9200), 2, 3)
        .await
        .unwrap();
    assert_eq!(absolute.number, AniDbEpisodeNumber::standard(15));

    let special = mapper
        .map_tvdb_episode(TvDbSeriesId::new(9100), 0, 3)
        .await
        .unwrap();
    assert_eq!(special.number, AniDbEpisodeNumber::special(2));
}

struct DuplicateList;

#[async_trait::async_trait]
impl MappingSource for DuplicateList {
    async fn mapping_xml(&self, _force_refresh: bool) -> anyhow::Result<String> {
        Ok(r#"<anime-list>
  <anime anidbid="8" tvdbid="1" defaulttvdbseason="1"><name>A</name></anime>
  <anime anidbid="8" tvdbid="2" defaulttvdbseason="1"><name>B</name></anime>
</anime-list>"#
            .to_string())
    }
}

#[tokio::test]
async fn duplicated_anidb_ids_are_reported() {
    let mapper = DataMapper::new(
        Arc::new(MappingListCache::new(Arc::new(DuplicateList))),
        Arc::new(MapAniDb(HashMap::new())),
        tvdb_fixture(),
    );

    let err = mapper
        .map_series_data(&anidb_series(8, 1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, MappingError::Ambiguous { id: 8, .. }));
    assert!(err.to_string().contains("Multiple series mappings"));
}
