use super::{or_dash, print_json};
use crate::domain::AniDbSeriesId;
use crate::models::anidb::AniDbSeries;
use crate::models::anilist::AniListSeries;
use crate::services::titles::main_title;
use crate::state::SharedState;
use serde::Serialize;
use tracing::warn;

async fn find_anilist(state: &SharedState, series: &AniDbSeries) -> Option<AniListSeries> {
    let client = state.anilist.as_ref()?;
    let title = main_title(&series.titles)?;
    match client.find_series(title).await {
        Ok(found) => found,
        Err(e) => {
            warn!(error = %e, "AniList lookup failed");
            None
        }
    }
}

pub async fn cmd_series(state: &SharedState, anidb_id: i32, json: bool) -> anyhow::Result<()> {
    let id = AniDbSeriesId::new(anidb_id);
    let Some(series) = state.anidb.series(id).await? else {
        println!("AniDB has no anime with ID {id}.");
        return Ok(());
    };

    let (data, anilist) = futures::future::join(
        state.data_mapper.map_series_data(&series),
        find_anilist(state, &series),
    )
    .await;
    let data = data?;

    let series_meta = state.metadata.series_metadata(&data, anilist.as_ref());
    let season_meta = state.metadata.season_metadata(&data);

    if json {
        #[derive(Serialize)]
        struct Output<'a> {
            series: &'a crate::services::SeriesMetadata,
            season: &'a crate::services::SeasonMetadata,
        }
        return print_json(&Output {
            series: &series_meta,
            season: &season_meta,
        });
    }

    println!("Series Info");
    println!("{:-<60}", "");
    println!("Title:    {}", or_dash(series_meta.name.as_deref()));
    println!("Original: {}", or_dash(series_meta.original_title.as_deref()));
    println!("Aired:    {} - {}", or_dash(series_meta.premiere_date), or_dash(series_meta.end_date));
    println!("Rating:   {}", or_dash(series_meta.community_rating));
    println!("Season:   {}", season_meta.index);
    println!("TvDB:     {}", if data.tvdb().is_some() { "matched" } else { "not matched" });
    if !series_meta.genres.is_empty() {
        println!("Genres:   {}", series_meta.genres.join(", "));
    }
    if !series_meta.studios.is_empty() {
        println!("Studios:  {}", series_meta.studios.join(", "));
    }

    println!("\nProvider IDs");
    for (provider, value) in &series_meta.provider_ids {
        println!("  {provider:<8} {value}");
    }

    if !series_meta.people.is_empty() {
        println!("\nPeople");
        for person in &series_meta.people {
            println!(
                "  {:<10} {:<30} {}",
                format!("{:?}", person.kind),
                person.name,
                person.role.as_deref().unwrap_or("")
            );
        }
    }

    if let Some(overview) = &series_meta.overview {
        println!("\n{overview}");
    }

    Ok(())
}
