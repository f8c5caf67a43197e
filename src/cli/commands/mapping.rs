use super::or_dash;
use crate::domain::AniDbSeriesId;
use crate::mapping::DefaultTvDbSeason;
use crate::state::SharedState;

pub async fn cmd_mapping(state: &SharedState, anidb_id: i32) -> anyhow::Result<()> {
    let id = AniDbSeriesId::new(anidb_id);
    let list = state.mappings.get().await?;

    let Some(mapping) = list.series_mapping_from_anidb(id)? else {
        println!("No mapping for AniDB anime {id}.");
        return Ok(());
    };

    let default_season = match mapping.default_tvdb_season {
        DefaultTvDbSeason::Season(season) => season.to_string(),
        DefaultTvDbSeason::Absolute => "absolute".to_string(),
    };

    println!("Mapping for AniDB {id}");
    println!("{:-<60}", "");
    println!("Name:           {}", or_dash(mapping.name.as_deref()));
    println!("TvDB:           {}", or_dash(mapping.ids.tvdb_id));
    println!("IMDB:           {}", or_dash(mapping.ids.imdb_id.as_deref()));
    println!("TMDB:           {}", or_dash(mapping.ids.tmdb_id));
    println!("Default season: {default_season}");
    println!("Episode offset: {}", mapping.default_tvdb_episode_index_offset);

    if !mapping.episode_group_mappings.is_empty() {
        println!("\nGroups");
        for group in &mapping.episode_group_mappings {
            println!(
                "  AniDB {} -> TvDB {}  episodes {}..={}  offset {:+}",
                group.anidb_season_index,
                group.tvdb_season_index,
                group.start_anidb_episode_index,
                group.end_anidb_episode_index,
                group.tvdb_episode_index_offset
            );
            for m in &group.episode_mappings {
                println!("    {} -> {}", m.anidb_episode_index, m.tvdb_episode_index);
            }
        }
    }

    if !mapping.special_episode_positions.is_empty() {
        println!("\nSpecials");
        for position in &mapping.special_episode_positions {
            println!(
                "  S{} airs before episode {}",
                position.special_episode_index, position.following_standard_episode_index
            );
        }
    }

    Ok(())
}
