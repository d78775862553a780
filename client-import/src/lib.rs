//! Bulk spreadsheet import of accounting-office client records
//!
//! The [`import`] module holds the engine: column mapping, row validation,
//! batch reporting and the session flow tying them together. [`sheet`] and
//! [`snapshot`] adapt files to the engine's inputs; [`client`] is the record
//! handed to persistence.

pub mod cli;
pub mod client;
pub mod config;
pub mod import;
pub mod sheet;
pub mod snapshot;

pub use client::{ClientRecord, TaxRegime};
pub use import::{ImportBatch, ImportSession, SessionError, run_import_session};
