use super::{or_dash, print_json};
use crate::domain::AniDbSeriesId;
use crate::models::anidb::AniDbEpisodeNumber;
use crate::state::SharedState;

pub async fn cmd_episode(
    state: &SharedState,
    anidb_id: i32,
    epno: &str,
    json: bool,
) -> anyhow::Result<()> {
    let Some(number) = AniDbEpisodeNumber::parse(epno, None) else {
        println!("Invalid episode number: {epno}");
        return Ok(());
    };

    let id = AniDbSeriesId::new(anidb_id);
    let Some(series) = state.anidb.series(id).await? else {
        println!("AniDB has no anime with ID {id}.");
        return Ok(());
    };

    let Some(episode) = series.find_by_number(&number) else {
        println!("Anime {id} has no episode {number}.");
        return Ok(());
    };

    let data = state.data_mapper.map_episode_data(&series, episode).await;
    let Some(meta) = state.metadata.episode_metadata(&data) else {
        println!("No metadata found.");
        return Ok(());
    };

    if json {
        return print_json(&meta);
    }

    println!("Episode Info");
    println!("{:-<60}", "");
    println!("Title:    {}", or_dash(meta.name.as_deref()));
    println!("AniDB:    {number}");
    match data.tvdb() {
        Some(tvdb) => println!(
            "TvDB:     S{:02}E{:02}",
            tvdb.aired_season, tvdb.aired_episode_number
        ),
        None => println!("TvDB:     not matched"),
    }
    if let (Some(season), Some(episode)) = (meta.airs_before_season, meta.airs_before_episode) {
        println!("Airs before: S{season:02}E{episode:02}");
    }
    println!("Aired:    {}", or_dash(meta.premiere_date));
    println!("Runtime:  {} min", or_dash(meta.runtime_minutes));

    if let Some(overview) = &meta.overview {
        println!("\n{overview}");
    }

    Ok(())
}
