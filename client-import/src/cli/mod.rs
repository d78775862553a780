//! Command-line interface

pub mod commands;

use clap::Parser;

pub use commands::Commands;

/// Import accounting-office clients from spreadsheets
#[derive(Parser, Debug)]
#[command(name = "client-import", version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Dispatch a parsed command line
pub fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Template(args) => commands::template::handle_template_command(args),
        Commands::Inspect(args) => commands::import::handle_inspect_command(args),
        Commands::Run(args) => commands::import::handle_run_command(args),
    }
}
