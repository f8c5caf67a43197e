use animeta::cli::{Cli, cmd_init};
use animeta::{Config, run};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `init` repairs a missing or broken config, so it must not load one.
    if !cli.command.requires_config() {
        return cmd_init();
    }

    let config = Config::load()?;
    let worker_threads = config.general.worker_threads;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    if worker_threads > 0 {
        builder.worker_threads(worker_threads);
    }

    let runtime = builder.build()?;
    runtime.block_on(run(cli, config))
}
