use clap::Parser;

use client_import::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    log::debug!("Parsed command: {:?}", cli.command);

    cli::run(cli)
}
