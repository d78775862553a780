pub mod handler;

use std::path::PathBuf;

use clap::Args;

pub use handler::{handle_inspect_command, handle_run_command};

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Spreadsheet to inspect (.xlsx, .xls, .ods or .csv)
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Spreadsheet to import (.xlsx, .xls, .ods or .csv)
    pub file: PathBuf,

    /// Identifiers already registered (text, one per line, or JSON)
    #[arg(short, long)]
    pub existing: Option<PathBuf>,

    /// Override a column mapping as FIELD=Header (repeatable)
    #[arg(long, value_name = "FIELD=HEADER")]
    pub map: Vec<String>,

    /// Leave a field unmapped (repeatable)
    #[arg(long, value_name = "FIELD")]
    pub unmap: Vec<String>,

    /// Field key used for duplicate detection
    #[arg(long)]
    pub identifier: Option<String>,

    /// Number of rows to show in the preview
    #[arg(short, long)]
    pub preview: Option<usize>,

    /// Write a validation report workbook
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Write valid clients as JSON to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Validate only, do not export clients
    #[arg(long)]
    pub dry: bool,
}
