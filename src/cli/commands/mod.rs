mod episode;
mod init;
mod mapping;
mod refresh;
mod series;
mod tvdb;

pub use episode::cmd_episode;
pub use init::cmd_init;
pub use mapping::cmd_mapping;
pub use refresh::cmd_refresh_mappings;
pub use series::cmd_series;
pub use tvdb::cmd_tvdb_episode;

use serde::Serialize;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
