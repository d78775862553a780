//! Read uploaded spreadsheets into headers and raw rows

use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};

use crate::import::{RawRow, SheetData};

/// Read the first worksheet of an Excel/ODS file or a CSV file
///
/// The first non-blank row is the header row. An empty file yields an empty
/// `SheetData`, which the import session rejects.
pub fn read_sheet(path: &Path) -> Result<SheetData> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    let sheet = match extension.as_str() {
        "csv" | "txt" => read_csv(path)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path)?,
        other => bail!("Unsupported file type '{}': {}", other, path.display()),
    };

    log::info!(
        "Read {} columns and {} rows from {}",
        sheet.headers.len(),
        sheet.rows.len(),
        path.display()
    );
    Ok(sheet)
}

fn read_workbook(path: &Path) -> Result<SheetData> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open spreadsheet: {}", path.display()))?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Ok(SheetData::default());
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    // Ranges start at the first used cell, not necessarily A1
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let rows = range.rows().enumerate().map(|(idx, row)| {
        let values = row.iter().map(cell_to_string).collect::<Vec<_>>();
        (first_row + idx + 1, values)
    });

    Ok(collect_sheet(rows))
}

fn read_csv(path: &Path) -> Result<SheetData> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    parse_csv(&decode_csv_bytes(bytes, path))
}

/// Decode CSV bytes as UTF-8, falling back to Windows-1252
///
/// Excel on Windows saves "CSV (separado por vírgulas)" in the ANSI code page,
/// so a file that is not valid UTF-8 is read as Windows-1252.
fn decode_csv_bytes(bytes: Vec<u8>, path: &Path) -> String {
    match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(err) => {
            log::warn!(
                "{} is not valid UTF-8, decoding as Windows-1252",
                path.display()
            );
            let (content, _, _) = encoding_rs::WINDOWS_1252.decode(err.as_bytes());
            content.into_owned()
        }
    }
}

/// Parse CSV text, detecting `;` or `,` from the header line
pub fn parse_csv(content: &str) -> Result<SheetData> {
    let content = content.trim_start_matches('\u{feff}');
    let delimiter = detect_delimiter(content);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse CSV record {}", idx + 1))?;
        let line = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(idx + 1);
        records.push((line, record.iter().map(str::to_string).collect::<Vec<_>>()));
    }

    Ok(collect_sheet(records.into_iter()))
}

fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or_default();
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Build `SheetData` from `(source line, cells)` pairs
fn collect_sheet(mut rows: impl Iterator<Item = (usize, Vec<String>)>) -> SheetData {
    let Some((_, header_row)) = rows.find(|(_, row)| row.iter().any(|c| !c.trim().is_empty()))
    else {
        return SheetData::default();
    };

    let headers: Vec<String> = header_row.iter().map(|h| h.trim().to_string()).collect();

    let rows = rows
        .map(|(line, values)| RawRow::from_values(&headers, &values).with_line(line))
        .filter(|row| !row.is_blank())
        .collect();

    SheetData::new(headers, rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // Whole numbers (CNPJ, CCM typed as numbers) lose the ".0"
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) => s.get(..10).unwrap_or(s).to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{IDENTIFIER_FIELD, IdentifierSnapshot, client_fields, run_import_session};

    #[test]
    fn test_parse_csv_semicolon() {
        let sheet = parse_csv("Razão Social;CNPJ;Email\nAlfa;11;a@x.com\nBeta;22\n").unwrap();

        assert_eq!(sheet.headers, vec!["Razão Social", "CNPJ", "Email"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].get("CNPJ"), Some("11"));
        assert_eq!(sheet.rows[1].get("Email"), Some(""));
    }

    #[test]
    fn test_parse_csv_comma_with_bom_and_blank_rows() {
        let sheet = parse_csv("\u{feff}CNPJ,Email\n\n11,a@x.com\n,\n22,b@x.com\n").unwrap();

        assert_eq!(sheet.headers, vec!["CNPJ", "Email"]);
        let cnpjs: Vec<_> = sheet.rows.iter().map(|r| r.get("CNPJ").unwrap()).collect();
        assert_eq!(cnpjs, vec!["11", "22"]);
    }

    #[test]
    fn test_parse_csv_keeps_source_lines() {
        let sheet = parse_csv(";;\nCNPJ;Email\n11;a@x.com\n;;\n22;b@x.com\n").unwrap();

        let lines: Vec<_> = sheet.rows.iter().map(|r| r.line()).collect();
        assert_eq!(lines, vec![Some(3), Some(5)]);
    }

    #[test]
    fn test_duplicate_lines_skip_blank_rows() {
        let sheet =
            parse_csv("Razão Social;CNPJ;Email\n;;\nA;11;a@x.com\n;;\nB;11;b@x.com\n").unwrap();
        let session =
            run_import_session(sheet, client_fields(), IDENTIFIER_FIELD, IdentifierSnapshot::new())
                .unwrap();
        let batch = session.batch().unwrap();

        assert_eq!(batch.valid_count, 1);
        let second = &batch.rows[1];
        assert_eq!(batch.rows[0].line, 3);
        assert_eq!(second.line, 5);
        assert!(second.messages()[0].contains("first seen on line 3"));
    }

    #[test]
    fn test_read_sheet_windows_1252_csv() {
        let path = std::env::temp_dir().join("client_import_cp1252_test.csv");
        std::fs::write(&path, b"Raz\xe3o Social;CNPJ;Email\nJo\xe3o Ltda;11;a@x.com\n").unwrap();

        let sheet = read_sheet(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(sheet.headers[0], "Razão Social");
        assert_eq!(sheet.rows[0].get("Razão Social"), Some("João Ltda"));

        let session =
            run_import_session(sheet, client_fields(), IDENTIFIER_FIELD, IdentifierSnapshot::new())
                .unwrap();
        let batch = session.batch().unwrap();
        assert_eq!(batch.valid_count, 1);
    }

    #[test]
    fn test_decode_csv_bytes_prefers_utf8() {
        let path = Path::new("clientes.csv");
        assert_eq!(decode_csv_bytes("Razão".as_bytes().to_vec(), path), "Razão");
        assert_eq!(decode_csv_bytes(b"Raz\xe3o".to_vec(), path), "Razão");
    }

    #[test]
    fn test_parse_csv_quoted_delimiter() {
        let sheet = parse_csv("Razão Social,CNPJ\n\"Alfa, Beta Ltda\",11\n").unwrap();
        assert_eq!(sheet.rows[0].get("Razão Social"), Some("Alfa, Beta Ltda"));
    }

    #[test]
    fn test_parse_csv_empty() {
        let sheet = parse_csv("").unwrap();
        assert!(sheet.headers.is_empty());
        assert!(sheet.rows.is_empty());
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(12345678000190.0)), "12345678000190");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(
            cell_to_string(&Data::DateTimeIso("2024-01-01T00:00:00".into())),
            "2024-01-01"
        );
    }

    #[test]
    fn test_read_sheet_rejects_unknown_extension() {
        assert!(read_sheet(Path::new("clientes.pdf")).is_err());
    }
}
