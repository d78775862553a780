//! Session-level import failures
//!
//! Bad rows are reported as data on the batch. These errors abort or reject a
//! whole session step.

use super::session::SessionStage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The reader produced no header row
    EmptyUpload,
    /// The sheet has a header row but no data rows
    NoRows,
    /// The identifier key is not part of the field catalog
    UnknownIdentifierField(String),
    /// A mapping override named a field outside the catalog
    UnknownField(String),
    /// A mapping override named a header the sheet does not have
    UnknownColumn(String),
    /// The step is not allowed in the current stage
    InvalidStage {
        action: &'static str,
        stage: SessionStage,
    },
    /// `execute` was called before any validation
    NotValidated,
    /// The session has already been executed
    AlreadyExecuted,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::EmptyUpload => write!(f, "The uploaded sheet has no header row"),
            SessionError::NoRows => write!(f, "The uploaded sheet has no data rows"),
            SessionError::UnknownIdentifierField(key) => {
                write!(f, "Identifier field '{}' is not in the field catalog", key)
            }
            SessionError::UnknownField(key) => write!(f, "Unknown field '{}'", key),
            SessionError::UnknownColumn(header) => {
                write!(f, "Column '{}' does not exist in the sheet", header)
            }
            SessionError::InvalidStage { action, stage } => {
                write!(f, "Cannot {} while the session is {}", action, stage)
            }
            SessionError::NotValidated => write!(f, "The batch has not been validated yet"),
            SessionError::AlreadyExecuted => write!(f, "The import has already been executed"),
        }
    }
}

impl std::error::Error for SessionError {}
