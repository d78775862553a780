//! Import session: the upload-to-execute flow
//!
//! Uploaded -> Mapped -> MappingReviewed -> Validated -> Executed. Every step
//! is triggered by the caller; the session performs no I/O.

use serde::{Deserialize, Serialize};

use super::error::SessionError;
use super::fields::{FieldSpec, find_field};
use super::mapping::{ColumnMapping, propose_mapping};
use super::report::{ImportBatch, ImportRecord, build_report, extract_valid};
use super::validator::{IdentifierSnapshot, RawRow, RowValidator};

/// Headers and rows handed over by a spreadsheet reader
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetData {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl SheetData {
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        SheetData { headers, rows }
    }

    /// Build from a header row and value rows; the header is line 1
    pub fn from_records<S: AsRef<str>>(headers: Vec<String>, records: &[Vec<S>]) -> Self {
        let rows = records
            .iter()
            .enumerate()
            .map(|(idx, values)| RawRow::from_values(&headers, values).with_line(idx + 2))
            .collect();
        SheetData { headers, rows }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStage {
    Uploaded,
    Mapped,
    MappingReviewed,
    Validated,
    Executed,
}

impl std::fmt::Display for SessionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionStage::Uploaded => "uploaded",
            SessionStage::Mapped => "mapped",
            SessionStage::MappingReviewed => "reviewing the mapping",
            SessionStage::Validated => "validated",
            SessionStage::Executed => "executed",
        };
        write!(f, "{}", name)
    }
}

/// One upload-to-execute import cycle
#[derive(Debug, Clone)]
pub struct ImportSession {
    fields: Vec<FieldSpec>,
    identifier_key: String,
    sheet: SheetData,
    existing: IdentifierSnapshot,
    mapping: ColumnMapping,
    batch: Option<ImportBatch>,
    stage: SessionStage,
}

impl ImportSession {
    /// Start a session from reader output. Fails before any mapping when the
    /// upload is unusable.
    pub fn open(
        sheet: SheetData,
        fields: Vec<FieldSpec>,
        identifier_key: impl Into<String>,
        existing: IdentifierSnapshot,
    ) -> Result<Self, SessionError> {
        let identifier_key = identifier_key.into();

        if sheet.headers.is_empty() {
            return Err(SessionError::EmptyUpload);
        }
        if sheet.rows.is_empty() {
            return Err(SessionError::NoRows);
        }
        if find_field(&fields, &identifier_key).is_none() {
            return Err(SessionError::UnknownIdentifierField(identifier_key));
        }

        log::info!(
            "Import session opened: {} columns, {} rows, {} existing identifiers",
            sheet.headers.len(),
            sheet.rows.len(),
            existing.len()
        );

        Ok(ImportSession {
            fields,
            identifier_key,
            sheet,
            existing,
            mapping: ColumnMapping::new(),
            batch: None,
            stage: SessionStage::Uploaded,
        })
    }

    pub fn stage(&self) -> SessionStage {
        self.stage
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn headers(&self) -> &[String] {
        &self.sheet.headers
    }

    pub fn row_count(&self) -> usize {
        self.sheet.rows.len()
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    /// Latest batch, if validation has run at least once
    pub fn batch(&self) -> Option<&ImportBatch> {
        self.batch.as_ref()
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.stage == SessionStage::Executed {
            return Err(SessionError::AlreadyExecuted);
        }
        Ok(())
    }

    /// Apply the automatic header proposal
    pub fn propose_mapping(&mut self) -> Result<&ColumnMapping, SessionError> {
        self.ensure_open()?;
        if self.stage != SessionStage::Uploaded {
            return Err(SessionError::InvalidStage {
                action: "propose a mapping",
                stage: self.stage,
            });
        }

        self.mapping = propose_mapping(&self.sheet.headers, &self.fields);
        self.stage = SessionStage::Mapped;

        for field in self.mapping.unmapped_required(&self.fields) {
            log::warn!("Required field '{}' has no matching column", field.label);
        }
        log::info!(
            "Proposed mapping for {}/{} fields",
            self.mapping.mapped_count(),
            self.fields.len()
        );

        Ok(&self.mapping)
    }

    fn ensure_mapped(&self, action: &'static str) -> Result<(), SessionError> {
        self.ensure_open()?;
        if self.stage == SessionStage::Uploaded {
            return Err(SessionError::InvalidStage {
                action,
                stage: self.stage,
            });
        }
        Ok(())
    }

    fn ensure_known_field(&self, key: &str) -> Result<(), SessionError> {
        if find_field(&self.fields, key).is_none() {
            return Err(SessionError::UnknownField(key.to_string()));
        }
        Ok(())
    }

    /// Point one field at a different header and re-validate
    pub fn revise_mapping(&mut self, key: &str, header: &str) -> Result<&ImportBatch, SessionError> {
        self.ensure_mapped("revise the mapping")?;
        self.ensure_known_field(key)?;
        if !self.sheet.headers.iter().any(|h| h == header) {
            return Err(SessionError::UnknownColumn(header.to_string()));
        }

        log::info!("Mapping override: '{}' -> '{}'", key, header);
        self.mapping.set(key, header);
        self.stage = SessionStage::MappingReviewed;
        Ok(self.recompute())
    }

    /// Leave one field unmapped and re-validate
    pub fn clear_mapping(&mut self, key: &str) -> Result<&ImportBatch, SessionError> {
        self.ensure_mapped("clear a mapping")?;
        self.ensure_known_field(key)?;

        log::info!("Mapping cleared for '{}'", key);
        self.mapping.unset(key);
        self.stage = SessionStage::MappingReviewed;
        Ok(self.recompute())
    }

    /// Validate every row with the current mapping
    pub fn validate(&mut self) -> Result<&ImportBatch, SessionError> {
        self.ensure_mapped("validate")?;
        self.stage = SessionStage::Validated;
        Ok(self.recompute())
    }

    fn recompute(&mut self) -> &ImportBatch {
        let validator = RowValidator::new(
            &self.fields,
            &self.mapping,
            &self.existing,
            &self.identifier_key,
        );
        let batch = build_report(validator.validate(&self.sheet.rows));

        log::info!(
            "Batch validated: {} valid, {} invalid",
            batch.valid_count,
            batch.invalid_count
        );
        self.batch.insert(batch)
    }

    /// Hand the valid records over for persistence
    ///
    /// A batch without valid rows is a no-op: nothing is returned and the
    /// session stays validated.
    pub fn execute<R: ImportRecord>(&mut self) -> Result<Vec<R>, SessionError> {
        self.ensure_open()?;
        let batch = match (&self.batch, self.stage) {
            (Some(batch), SessionStage::Validated) => batch,
            _ => return Err(SessionError::NotValidated),
        };

        if !batch.has_valid_rows() {
            log::warn!("Nothing to import: all {} rows are invalid", batch.total());
            return Ok(Vec::new());
        }

        let records: Vec<R> = extract_valid(batch);
        log::info!(
            "Import executed: {} records, {} rows skipped",
            records.len(),
            batch.invalid_count
        );
        self.stage = SessionStage::Executed;
        Ok(records)
    }
}

/// Open a session, apply the proposed mapping and validate in one go
pub fn run_import_session(
    sheet: SheetData,
    fields: Vec<FieldSpec>,
    identifier_key: &str,
    existing: IdentifierSnapshot,
) -> Result<ImportSession, SessionError> {
    let mut session = ImportSession::open(sheet, fields, identifier_key, existing)?;
    session.propose_mapping()?;
    session.validate()?;
    Ok(session)
}
