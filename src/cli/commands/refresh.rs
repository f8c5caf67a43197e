use crate::state::SharedState;

pub async fn cmd_refresh_mappings(state: &SharedState) -> anyhow::Result<()> {
    println!("Refreshing anime-list.xml...");
    let list = state.mappings.reload().await?;
    println!("✓ Loaded {} series mappings", list.len());
    Ok(())
}
