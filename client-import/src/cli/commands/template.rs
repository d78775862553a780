//! Template command

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::*;

use crate::sheet::write_template_excel;

#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Where to write the template workbook
    #[arg(default_value = "modelo_importacao_clientes.xlsx")]
    pub path: PathBuf,
}

pub fn handle_template_command(args: TemplateArgs) -> Result<()> {
    write_template_excel(&args.path.to_string_lossy())?;
    println!(
        "Template written to: {}",
        args.path.display().to_string().bright_green()
    );
    Ok(())
}
