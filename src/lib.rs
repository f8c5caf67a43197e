pub mod cache;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod domain;
pub mod mapping;
pub mod models;
pub mod services;
pub mod sources;
pub mod state;

use cli::{Cli, Commands};
pub use config::Config;
use state::SharedState;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so command output stays pipeable.
    if config.general.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Runs a parsed command against a loaded configuration.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    init_tracing(&config);

    if !cli.command.requires_config() {
        return cli::cmd_init();
    }

    config.validate()?;
    let state = SharedState::new(config);

    match cli.command {
        Commands::Series { anidb_id } => cli::cmd_series(&state, anidb_id, cli.json).await,
        Commands::Episode { anidb_id, epno } => {
            cli::cmd_episode(&state, anidb_id, &epno, cli.json).await
        }
        Commands::Mapping { anidb_id } => cli::cmd_mapping(&state, anidb_id).await,
        Commands::Tvdb {
            tvdb_id,
            season,
            episode,
        } => cli::cmd_tvdb_episode(&state, tvdb_id, season, episode, cli.json).await,
        Commands::RefreshMappings => cli::cmd_refresh_mappings(&state).await,
        Commands::Init => cli::cmd_init(),
    }
}
