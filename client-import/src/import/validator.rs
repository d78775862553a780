//! Row validation for imported spreadsheets
//!
//! Every row is checked for required values and for duplicate identifiers,
//! both against a snapshot of already registered identifiers and against
//! earlier rows of the same upload. Problems are collected as data on the
//! row, never raised.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::fields::{FieldSpec, find_field};
use super::mapping::ColumnMapping;

/// One spreadsheet line after the header row, as header -> raw value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, String)>,
    /// 1-based line in the source file, when the reader knows it
    line: Option<usize>,
}

impl RawRow {
    /// Pair headers with values; missing trailing values become empty strings
    pub fn from_values<S: AsRef<str>>(headers: &[String], values: &[S]) -> Self {
        let cells = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let value = values.get(idx).map(|v| v.as_ref()).unwrap_or_default();
                (header.clone(), value.to_string())
            })
            .collect();
        RawRow { cells, line: None }
    }

    /// Attach the 1-based source line
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Value under a header. Repeated headers resolve to the first column.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Whether every cell is blank
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }
}

/// Identifiers already known to the persistence layer when validation starts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSnapshot {
    identifiers: HashSet<String>,
}

impl IdentifierSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

impl FromIterator<String> for IdentifierSnapshot {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        IdentifierSnapshot {
            identifiers: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for IdentifierSnapshot {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

/// Reason a row cannot be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowIssue {
    /// A required field resolved to an empty value
    Required { key: String, label: String },
    /// Identifier already registered in the system
    DuplicateInSystem { label: String, identifier: String },
    /// Identifier repeats one from an earlier row of the same file
    DuplicateInFile {
        label: String,
        identifier: String,
        first_line: usize,
    },
}

impl RowIssue {
    /// Field key the issue refers to, when it is a presence check
    pub fn field_key(&self) -> Option<&str> {
        match self {
            RowIssue::Required { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            RowIssue::DuplicateInSystem { .. } | RowIssue::DuplicateInFile { .. }
        )
    }
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIssue::Required { label, .. } => write!(f, "{} is required", label),
            RowIssue::DuplicateInSystem { label, identifier } => {
                write!(f, "{} {} is already registered in the system", label, identifier)
            }
            RowIssue::DuplicateInFile {
                label,
                identifier,
                first_line,
            } => write!(
                f,
                "{} {} is duplicated in the file (first seen on line {})",
                label, identifier, first_line
            ),
        }
    }
}

/// Result of validating one raw row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedRow {
    /// Zero-based position among the data rows, in batch order
    pub index: usize,
    /// 1-based line in the source spreadsheet
    pub line: usize,
    /// Trimmed value per field key, empty when unmapped
    pub fields: BTreeMap<String, String>,
    pub is_valid: bool,
    pub errors: Vec<RowIssue>,
}

impl ValidatedRow {
    /// Resolved value for a field key, empty if the key is unknown
    pub fn value(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or_default()
    }

    /// Human-readable error messages in order
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

/// Identifiers seen so far in one validation pass, with the line that claimed each
///
/// Carry the same accumulator across chunks to keep the first-occurrence rule
/// over a file validated piecewise.
#[derive(Debug, Clone, Default)]
pub struct SeenIdentifiers {
    first_lines: HashMap<String, usize>,
}

impl SeenIdentifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identifier, returning the line that claimed it first if it was already seen
    fn claim(&mut self, identifier: &str, line: usize) -> Option<usize> {
        match self.first_lines.get(identifier) {
            Some(first) => Some(*first),
            None => {
                self.first_lines.insert(identifier.to_string(), line);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.first_lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_lines.is_empty()
    }
}

/// Validates raw rows against a frozen mapping and identifier snapshot
pub struct RowValidator<'a> {
    fields: &'a [FieldSpec],
    mapping: &'a ColumnMapping,
    existing: &'a IdentifierSnapshot,
    identifier_key: &'a str,
    identifier_label: &'a str,
}

impl<'a> RowValidator<'a> {
    pub fn new(
        fields: &'a [FieldSpec],
        mapping: &'a ColumnMapping,
        existing: &'a IdentifierSnapshot,
        identifier_key: &'a str,
    ) -> Self {
        let identifier_label = find_field(fields, identifier_key)
            .map(|f| f.label.as_str())
            .unwrap_or(identifier_key);

        if mapping.header_for(identifier_key).is_none() {
            log::warn!(
                "Identifier field '{}' is unmapped, duplicate checks are skipped",
                identifier_key
            );
        }

        RowValidator {
            fields,
            mapping,
            existing,
            identifier_key,
            identifier_label,
        }
    }

    /// Validate a whole file with a fresh accumulator
    pub fn validate(&self, rows: &[RawRow]) -> Vec<ValidatedRow> {
        let mut seen = SeenIdentifiers::new();
        self.validate_chunk(rows, 0, &mut seen)
    }

    /// Validate a contiguous chunk of rows starting at `first_index`
    pub fn validate_chunk(
        &self,
        rows: &[RawRow],
        first_index: usize,
        seen: &mut SeenIdentifiers,
    ) -> Vec<ValidatedRow> {
        let validated: Vec<ValidatedRow> = rows
            .iter()
            .enumerate()
            .map(|(offset, row)| self.validate_row(row, first_index + offset, seen))
            .collect();

        log::debug!(
            "Validated rows {}..{} ({} identifiers seen)",
            first_index,
            first_index + rows.len(),
            seen.len()
        );

        validated
    }

    fn resolve(&self, row: &RawRow, key: &str) -> String {
        self.mapping
            .header_for(key)
            .and_then(|header| row.get(header))
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    }

    fn validate_row(&self, row: &RawRow, index: usize, seen: &mut SeenIdentifiers) -> ValidatedRow {
        // Header is line 1 when the reader did not record lines
        let line = row.line().unwrap_or(index + 2);
        let mut errors = Vec::new();
        let mut fields = BTreeMap::new();

        for spec in self.fields {
            let value = self.resolve(row, &spec.key);
            if spec.required && value.is_empty() {
                errors.push(RowIssue::Required {
                    key: spec.key.clone(),
                    label: spec.label.clone(),
                });
            }
            fields.insert(spec.key.clone(), value);
        }

        let identifier = match fields.get(self.identifier_key) {
            Some(value) => value.clone(),
            None => self.resolve(row, self.identifier_key),
        };

        if !identifier.is_empty() {
            if self.existing.contains(&identifier) {
                errors.push(RowIssue::DuplicateInSystem {
                    label: self.identifier_label.to_string(),
                    identifier: identifier.clone(),
                });
            }

            // Invalid rows still claim their identifier
            if let Some(first_line) = seen.claim(&identifier, line) {
                errors.push(RowIssue::DuplicateInFile {
                    label: self.identifier_label.to_string(),
                    identifier,
                    first_line,
                });
            }
        }

        ValidatedRow {
            index,
            line,
            fields,
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate every row in order against the mapping and snapshot
pub fn validate(
    rows: &[RawRow],
    mapping: &ColumnMapping,
    fields: &[FieldSpec],
    existing: &IdentifierSnapshot,
    identifier_key: &str,
) -> Vec<ValidatedRow> {
    RowValidator::new(fields, mapping, existing, identifier_key).validate(rows)
}
