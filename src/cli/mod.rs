//! CLI module - Command-line interface for animeta
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

pub use commands::{
    cmd_episode, cmd_init, cmd_mapping, cmd_refresh_mappings, cmd_series, cmd_tvdb_episode,
};

use clap::{Parser, Subcommand};

/// animeta - anime metadata reconciliation
/// Combines AniDB, TvDB and AniList data through the Anime-Lists mapping file
#[derive(Parser)]
#[command(name = "animeta")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show series and season metadata for an AniDB anime
    #[command(alias = "s")]
    Series {
        /// AniDB anime id
        anidb_id: i32,
    },

    /// Show metadata for one episode of an AniDB anime
    #[command(alias = "e")]
    Episode {
        /// AniDB anime id
        anidb_id: i32,
        /// AniDB episode number, e.g. `5` or `S1`
        epno: String,
    },

    /// Show the mapping-file entry for an AniDB anime
    #[command(alias = "m")]
    Mapping {
        /// AniDB anime id
        anidb_id: i32,
    },

    /// Find the AniDB episode at a TvDB season/episode position
    Tvdb {
        /// TvDB series id
        tvdb_id: i32,
        season: i32,
        episode: i32,
    },

    /// Download the mapping file again and swap it in
    RefreshMappings,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

impl Commands {
    /// Whether the command needs `config.toml` loaded before it runs.
    #[must_use]
    pub const fn requires_config(&self) -> bool {
        !matches!(self, Self::Init)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_episode_command() {
        let cli = Cli::try_parse_from(["animeta", "episode", "23", "S2", "--json"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Episode { anidb_id, epno } => {
                assert_eq!(anidb_id, 23);
                assert_eq!(epno, "S2");
            }
            _ => panic!("expected episode command"),
        }
    }

    #[test]
    fn parses_tvdb_command_and_aliases() {
        let cli = Cli::try_parse_from(["animeta", "tvdb", "81797", "0", "4"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Tvdb { tvdb_id: 81797, season: 0, episode: 4 }
        ));

        let cli = Cli::try_parse_from(["animeta", "s", "1"]).unwrap();
        assert!(matches!(cli.command, Commands::Series { anidb_id: 1 }));
        assert!(!cli.json);
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!(Cli::try_parse_from(["animeta", "series", "abc"]).is_err());
    }

    #[test]
    fn init_runs_without_loading_config() {
        let cli = Cli::try_parse_from(["animeta", "init"]).unwrap();
        assert!(matches!(cli.command, Commands::Init));
        assert!(!cli.command.requires_config());

        let cli = Cli::try_parse_from(["animeta", "refresh-mappings"]).unwrap();
        assert!(cli.command.requires_config());
        let cli = Cli::try_parse_from(["animeta", "mapping", "23"]).unwrap();
        assert!(cli.command.requires_config());
    }
}
