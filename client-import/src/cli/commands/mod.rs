pub mod import;
pub mod template;

use clap::Subcommand;

pub use import::{InspectArgs, RunArgs};
pub use template::TemplateArgs;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the spreadsheet template users fill in
    Template(TemplateArgs),
    /// Show the columns of a spreadsheet and the proposed mapping
    Inspect(InspectArgs),
    /// Validate a spreadsheet and export the valid clients
    Run(RunArgs),
}
