use super::{or_dash, print_json};
use crate::domain::TvDbSeriesId;
use crate::services::titles::select_title;
use crate::state::SharedState;

pub async fn cmd_tvdb_episode(
    state: &SharedState,
    tvdb_id: i32,
    season: i32,
    episode: i32,
    json: bool,
) -> anyhow::Result<()> {
    let id = TvDbSeriesId::new(tvdb_id);
    let Some(found) = state.data_mapper.map_tvdb_episode(id, season, episode).await else {
        println!("No AniDB episode maps to TvDB {id} S{season:02}E{episode:02}.");
        return Ok(());
    };

    if json {
        return print_json(&found);
    }

    let preference = state.config.metadata.title_preference();
    println!("TvDB {id} S{season:02}E{episode:02}");
    println!("{:-<60}", "");
    println!("AniDB episode: {} (id {})", found.number, found.id);
    println!("Title:         {}", or_dash(select_title(&found.titles, &preference)));
    println!("Aired:         {}", or_dash(found.air_date));
    Ok(())
}
