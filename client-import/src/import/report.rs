//! Import report: counts, preview and extraction of valid records
//!
//! The batch is a pure derivation of validated rows. Extraction projects the
//! valid rows into target records without checking anything again.

use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};
use serde::{Deserialize, Serialize};

use super::fields::FieldSpec;
use super::validator::ValidatedRow;

/// A target-shaped record built from a valid row's field values
pub trait ImportRecord: Sized {
    fn from_row(row: &ValidatedRow) -> Self;
}

/// All validated rows of one upload plus their counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBatch {
    pub rows: Vec<ValidatedRow>,
    pub valid_count: usize,
    pub invalid_count: usize,
}

impl ImportBatch {
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_valid_rows(&self) -> bool {
        self.valid_count > 0
    }
}

/// Aggregate validated rows into a batch
pub fn build_report(rows: Vec<ValidatedRow>) -> ImportBatch {
    let valid_count = rows.iter().filter(|r| r.is_valid).count();
    let invalid_count = rows.len() - valid_count;

    ImportBatch {
        rows,
        valid_count,
        invalid_count,
    }
}

/// First `n` rows in original order, valid or not
pub fn preview(batch: &ImportBatch, n: usize) -> &[ValidatedRow] {
    &batch.rows[..n.min(batch.rows.len())]
}

/// Rows that will be skipped, in original order
pub fn invalid_rows(batch: &ImportBatch) -> impl Iterator<Item = &ValidatedRow> {
    batch.rows.iter().filter(|r| !r.is_valid)
}

/// Project the valid rows into target records
pub fn extract_valid<R: ImportRecord>(batch: &ImportBatch) -> Vec<R> {
    batch
        .rows
        .iter()
        .filter(|r| r.is_valid)
        .map(R::from_row)
        .collect()
}

/// Export the batch to an Excel file with a summary and a per-row sheet
pub fn export_report_to_excel(batch: &ImportBatch, fields: &[FieldSpec], file_path: &str) -> Result<()> {
    let mut workbook = Workbook::new();

    create_summary_sheet(&mut workbook, batch)?;
    create_rows_sheet(&mut workbook, batch, fields)?;

    workbook
        .save(file_path)
        .with_context(|| format!("Failed to save Excel file: {}", file_path))?;

    log::info!("Import report exported to: {}", file_path);
    Ok(())
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin)
}

fn create_summary_sheet(workbook: &mut Workbook, batch: &ImportBatch) -> Result<()> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Summary")?;

    let header = header_format();
    sheet.write_string_with_format(0, 0, "Metric", &header)?;
    sheet.write_string_with_format(0, 1, "Count", &header)?;

    let metrics = [
        ("Valid rows", batch.valid_count),
        ("Invalid rows", batch.invalid_count),
        ("Total rows", batch.total()),
    ];
    for (i, (label, count)) in metrics.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, *label)?;
        sheet.write_number(row, 1, *count as f64)?;
    }

    sheet.set_column_width(0, 20)?;
    sheet.set_column_width(1, 12)?;
    Ok(())
}

fn create_rows_sheet(workbook: &mut Workbook, batch: &ImportBatch, fields: &[FieldSpec]) -> Result<()> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Rows")?;

    write_rows_header(sheet, fields)?;

    let invalid_format = Format::new().set_background_color(Color::RGB(0xFDE2E2));
    let errors_col = (fields.len() + 2) as u16;

    for (i, row) in batch.rows.iter().enumerate() {
        let excel_row = (i + 1) as u32;
        sheet.write_number(excel_row, 0, row.line as f64)?;

        if row.is_valid {
            sheet.write_string(excel_row, 1, "Valid")?;
        } else {
            sheet.write_string_with_format(excel_row, 1, "Invalid", &invalid_format)?;
        }

        for (col, field) in fields.iter().enumerate() {
            sheet.write_string(excel_row, (col + 2) as u16, row.value(&field.key))?;
        }

        sheet.write_string(excel_row, errors_col, row.messages().join("; "))?;
    }

    sheet.set_column_width(errors_col, 60)?;
    Ok(())
}

fn write_rows_header(sheet: &mut Worksheet, fields: &[FieldSpec]) -> Result<()> {
    let header = header_format();

    sheet.write_string_with_format(0, 0, "Line", &header)?;
    sheet.write_string_with_format(0, 1, "Status", &header)?;
    for (col, field) in fields.iter().enumerate() {
        let col = (col + 2) as u16;
        sheet.write_string_with_format(0, col, &field.label, &header)?;
        sheet.set_column_width(col, 20)?;
    }
    sheet.write_string_with_format(0, (fields.len() + 2) as u16, "Errors", &header)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::validator::RowIssue;
    use std::collections::BTreeMap;

    /// Minimal record keeping only the identifier
    #[derive(Debug, PartialEq)]
    struct IdOnly(String);

    impl ImportRecord for IdOnly {
        fn from_row(row: &ValidatedRow) -> Self {
            IdOnly(row.value("cnpj").to_string())
        }
    }

    fn row(index: usize, cnpj: &str, valid: bool) -> ValidatedRow {
        let mut fields = BTreeMap::new();
        fields.insert("cnpj".to_string(), cnpj.to_string());
        let errors = if valid {
            vec![]
        } else {
            vec![RowIssue::Required {
                key: "email".into(),
                label: "Email".into(),
            }]
        };
        ValidatedRow {
            index,
            line: index + 2,
            fields,
            is_valid: valid,
            errors,
        }
    }

    fn sample_rows() -> Vec<ValidatedRow> {
        vec![row(0, "11", true), row(1, "11", false), row(2, "22", true)]
    }

    #[test]
    fn test_build_report_counts() {
        let batch = build_report(sample_rows());

        assert_eq!(batch.valid_count, 2);
        assert_eq!(batch.invalid_count, 1);
        assert_eq!(batch.total(), 3);
        assert!(batch.has_valid_rows());
    }

    #[test]
    fn test_build_report_is_idempotent() {
        let rows = sample_rows();
        assert_eq!(build_report(rows.clone()), build_report(rows));
    }

    #[test]
    fn test_preview_is_bounded_and_unfiltered() {
        let batch = build_report(sample_rows());

        let first_two = preview(&batch, 2);
        assert_eq!(first_two.len(), 2);
        assert!(!first_two[1].is_valid);

        assert_eq!(preview(&batch, 50).len(), 3);
        assert!(preview(&batch, 0).is_empty());
    }

    #[test]
    fn test_extract_valid_matches_valid_count() {
        let batch = build_report(sample_rows());
        let records: Vec<IdOnly> = extract_valid(&batch);

        assert_eq!(records.len(), batch.valid_count);
        assert_eq!(records, vec![IdOnly("11".into()), IdOnly("22".into())]);
    }

    #[test]
    fn test_extract_valid_empty_batch() {
        let batch = build_report(vec![]);
        let records: Vec<IdOnly> = extract_valid(&batch);

        assert!(batch.is_empty());
        assert_eq!(batch.valid_count, 0);
        assert!(records.is_empty());
    }

    #[test]
    fn test_invalid_rows() {
        let batch = build_report(sample_rows());
        let indices: Vec<_> = invalid_rows(&batch).map(|r| r.index).collect();
        assert_eq!(indices, vec![1]);
    }

    #[test]
    fn test_export_report_to_excel() {
        let batch = build_report(sample_rows());
        let fields = vec![
            FieldSpec::required("cnpj", "CNPJ"),
            FieldSpec::required("email", "Email"),
        ];
        let path = std::env::temp_dir().join("client_import_report_test.xlsx");
        let path = path.to_string_lossy().to_string();

        export_report_to_excel(&batch, &fields, &path).unwrap();

        assert!(std::path::Path::new(&path).exists());
        let _ = std::fs::remove_file(&path);
    }
}
