//! Column mapping between catalog fields and spreadsheet headers
//!
//! The proposal is a plain first-match lookup over ordered lists. Caller
//! overrides are stored alongside it and always win.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::fields::FieldSpec;

/// Where a mapping entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingSource {
    /// Automatic label/header match
    Proposed,
    /// Set (or cleared) explicitly by the caller
    Manual,
}

impl MappingSource {
    /// Get display label for mapping source
    pub fn label(&self) -> &'static str {
        match self {
            MappingSource::Proposed => "[Auto]",
            MappingSource::Manual => "[Manual]",
        }
    }
}

/// One field's mapping entry. `header == None` means explicitly unmapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedColumn {
    pub header: Option<String>,
    pub source: MappingSource,
}

/// Mapping from field key to spreadsheet header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    entries: HashMap<String, MappedColumn>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header mapped to a field, if any
    pub fn header_for(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|entry| entry.header.as_deref())
    }

    /// Mapping source for a field, `None` if the field was never touched
    pub fn source_of(&self, key: &str) -> Option<MappingSource> {
        self.entries.get(key).map(|entry| entry.source)
    }

    /// Whether the caller has overridden this field
    pub fn is_manual(&self, key: &str) -> bool {
        self.source_of(key) == Some(MappingSource::Manual)
    }

    /// Override the header for one field
    pub fn set(&mut self, key: impl Into<String>, header: impl Into<String>) {
        self.entries.insert(
            key.into(),
            MappedColumn {
                header: Some(header.into()),
                source: MappingSource::Manual,
            },
        );
    }

    /// Explicitly leave a field unmapped
    pub fn unset(&mut self, key: impl Into<String>) {
        self.entries.insert(
            key.into(),
            MappedColumn {
                header: None,
                source: MappingSource::Manual,
            },
        );
    }

    /// Number of fields with a header assigned
    pub fn mapped_count(&self) -> usize {
        self.entries.values().filter(|e| e.header.is_some()).count()
    }

    /// Required fields that currently have no header
    pub fn unmapped_required<'a>(&self, fields: &'a [FieldSpec]) -> Vec<&'a FieldSpec> {
        fields
            .iter()
            .filter(|f| f.required && self.header_for(&f.key).is_none())
            .collect()
    }

    fn propose(&mut self, key: &str, header: &str) {
        self.entries.insert(
            key.to_string(),
            MappedColumn {
                header: Some(header.to_string()),
                source: MappingSource::Proposed,
            },
        );
    }
}

/// Check whether a header and a label contain one another, ignoring case
fn header_matches_label(header: &str, label: &str) -> bool {
    let header = header.to_lowercase();
    let label = label.to_lowercase();
    header.contains(&label) || label.contains(&header)
}

/// Propose a mapping for every field in catalog order
///
/// Each field takes the first header (in sheet order) that contains its label
/// or is contained by it. Blank headers are never proposed: an empty string is
/// contained in every label and would otherwise capture every field. Fields
/// without a match stay unmapped.
pub fn propose_mapping(headers: &[String], fields: &[FieldSpec]) -> ColumnMapping {
    let mut mapping = ColumnMapping::new();

    for field in fields {
        let matched = headers
            .iter()
            .filter(|h| !h.trim().is_empty())
            .find(|h| header_matches_label(h, &field.label));

        match matched {
            Some(header) => {
                log::debug!("Proposed '{}' -> '{}'", field.key, header);
                mapping.propose(&field.key, header);
            }
            None => log::debug!("No header matches field '{}'", field.key),
        }
    }

    mapping
}
