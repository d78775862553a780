//! Bulk spreadsheet import engine
//!
//! Maps spreadsheet columns onto catalog fields, validates every row and
//! reports which rows can be imported. Reading files and persisting records
//! belong to the caller.

pub mod error;
pub mod fields;
pub mod mapping;
pub mod report;
pub mod session;
pub mod validator;

pub use error::SessionError;
pub use fields::{FieldSpec, IDENTIFIER_FIELD, client_fields, find_field};
pub use mapping::{ColumnMapping, MappedColumn, MappingSource, propose_mapping};
pub use report::{
    ImportBatch, ImportRecord, build_report, export_report_to_excel, extract_valid, invalid_rows,
    preview,
};
pub use session::{ImportSession, SessionStage, SheetData, run_import_session};
pub use validator::{
    IdentifierSnapshot, RawRow, RowIssue, RowValidator, SeenIdentifiers, ValidatedRow, validate,
};
