//! Inspect and run command handlers

use std::fs;

use anyhow::{Context, Result, bail};
use colored::*;

use super::{InspectArgs, RunArgs};
use crate::client::{ClientRecord, TaxRegime};
use crate::config::Config;
use crate::import::{
    IDENTIFIER_FIELD, IdentifierSnapshot, ImportBatch, ImportSession, client_fields,
    export_report_to_excel, preview,
};
use crate::sheet::read_sheet;
use crate::snapshot::load_snapshot;

/// Show headers and the proposed mapping without validating
pub fn handle_inspect_command(args: InspectArgs) -> Result<()> {
    let sheet = read_sheet(&args.file)?;
    let mut session = ImportSession::open(
        sheet,
        client_fields(),
        IDENTIFIER_FIELD,
        IdentifierSnapshot::new(),
    )?;
    session.propose_mapping()?;

    println!(
        "{} columns detected, {} rows",
        session.headers().len().to_string().cyan(),
        session.row_count().to_string().cyan()
    );
    println!();
    print_mapping(&session);
    Ok(())
}

/// Validate a spreadsheet and export the valid clients
pub fn handle_run_command(args: RunArgs) -> Result<()> {
    let config = Config::load()?;
    let identifier_key = args
        .identifier
        .clone()
        .unwrap_or_else(|| config.import.identifier_field.clone());
    let preview_rows = args.preview.unwrap_or(config.import.preview_rows);

    // Snapshot is read once, before validation starts
    let existing = match args.existing.as_ref().or(config.import.existing_identifiers.as_ref()) {
        Some(path) => load_snapshot(path, &identifier_key)?,
        None => {
            log::warn!("No identifier snapshot given, only in-file duplicates are detected");
            IdentifierSnapshot::new()
        }
    };

    let sheet = read_sheet(&args.file)?;
    let mut session = ImportSession::open(sheet, client_fields(), identifier_key, existing)?;
    session.propose_mapping()?;

    for entry in &args.map {
        let (key, header) = parse_override(entry)?;
        session.revise_mapping(key, header)?;
    }
    for key in &args.unmap {
        session.clear_mapping(key)?;
    }

    print_mapping(&session);
    println!();

    let batch = session.validate()?.clone();
    print_summary(&batch);
    print_preview(&batch, preview_rows);

    if let Some(report_path) = &args.report {
        export_report_to_excel(&batch, session.fields(), &report_path.to_string_lossy())?;
        println!(
            "Report saved to: {}",
            report_path.display().to_string().bright_green()
        );
    }

    if args.dry {
        return Ok(());
    }

    if !batch.has_valid_rows() {
        println!("{}", "No valid clients to import".yellow());
        return Ok(());
    }

    let today = chrono::Local::now().date_naive();
    let records: Vec<ClientRecord> = session
        .execute::<ClientRecord>()?
        .into_iter()
        .map(|record| record.with_entry_date(today))
        .collect();

    let json = serde_json::to_string_pretty(&records).context("Failed to format JSON output")?;
    match &args.output {
        Some(output_path) => {
            fs::write(output_path, &json)
                .with_context(|| format!("Failed to write output to: {}", output_path.display()))?;
            println!(
                "{} clients saved to: {}",
                records.len(),
                output_path.display().to_string().bright_green()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Split a `FIELD=Header` override
fn parse_override(entry: &str) -> Result<(&str, &str)> {
    match entry.split_once('=') {
        Some((key, header)) if !key.trim().is_empty() => Ok((key.trim(), header.trim())),
        _ => bail!("Invalid mapping override '{}', expected FIELD=Header", entry),
    }
}

fn print_mapping(session: &ImportSession) {
    println!("{}", "Column mapping".bold());
    for field in session.fields() {
        let marker = if field.required { "*" } else { " " };
        let mapping = session.mapping();
        let target = match mapping.header_for(&field.key) {
            Some(header) => header.green().to_string(),
            None if field.required => "(unmapped)".red().to_string(),
            None => "(unmapped)".dimmed().to_string(),
        };
        let source = mapping
            .source_of(&field.key)
            .map(|s| s.label())
            .unwrap_or_default();
        println!(
            "  {:<20}{} -> {} {}",
            field.label,
            marker.cyan(),
            target,
            source.dimmed()
        );
    }
}

fn print_summary(batch: &ImportBatch) {
    if batch.valid_count > 0 {
        println!(
            "{} {} valid client(s) will be imported",
            "Ready:".green().bold(),
            batch.valid_count
        );
    }
    if batch.invalid_count > 0 {
        println!(
            "{} {} row(s) with errors will be skipped",
            "Attention:".yellow().bold(),
            batch.invalid_count
        );
    }
    println!();
}

fn print_preview(batch: &ImportBatch, rows: usize) {
    let shown = preview(batch, rows);
    if shown.is_empty() {
        return;
    }

    println!(
        "{:<6} {:<8} {:<30} {:<20} {:<30} {}",
        "Line".bold(),
        "Status".bold(),
        "Razão Social".bold(),
        "CNPJ".bold(),
        "Email".bold(),
        "Regime".bold()
    );
    for row in shown {
        let status = if row.is_valid {
            "ok".green()
        } else {
            "error".red()
        };
        println!(
            "{:<6} {:<8} {:<30} {:<20} {:<30} {}",
            row.line,
            status,
            or_dash(row.value("razaoSocial")),
            or_dash(row.value("cnpj")),
            or_dash(row.value("email")),
            TaxRegime::parse(row.value("regimeTributario")).label()
        );
        if !row.is_valid {
            println!("       {}", row.messages().join(", ").red());
        }
    }

    if batch.total() > shown.len() {
        println!(
            "{}",
            format!("... {} more rows", batch.total() - shown.len()).dimmed()
        );
    }
    println!();
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_override() {
        assert_eq!(parse_override("cnpj=Documento").unwrap(), ("cnpj", "Documento"));
        assert_eq!(
            parse_override(" email = E-mail Comercial ").unwrap(),
            ("email", "E-mail Comercial")
        );
        assert_eq!(parse_override("ie=").unwrap(), ("ie", ""));
    }

    #[test]
    fn test_parse_override_rejects_malformed() {
        assert!(parse_override("cnpj").is_err());
        assert!(parse_override("=CNPJ").is_err());
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(""), "-");
        assert_eq!(or_dash("x"), "x");
    }
}
