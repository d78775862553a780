//! Target field catalog for client imports

use serde::{Deserialize, Serialize};

/// Field key used as the business identifier for duplicate detection
pub const IDENTIFIER_FIELD: &str = "cnpj";

/// Declaration of one target attribute an imported record must or may have
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Unique key of the target attribute
    pub key: String,
    /// Human label, also used to match spreadsheet headers
    pub label: String,
    /// Whether every row must carry a non-empty value
    pub required: bool,
}

impl FieldSpec {
    pub fn required(key: impl Into<String>, label: impl Into<String>) -> Self {
        FieldSpec {
            key: key.into(),
            label: label.into(),
            required: true,
        }
    }

    pub fn optional(key: impl Into<String>, label: impl Into<String>) -> Self {
        FieldSpec {
            key: key.into(),
            label: label.into(),
            required: false,
        }
    }
}

/// Catalog of client fields, in mapping order
///
/// `regimeTributario` is optional: an empty cell falls back to the
/// Simples Nacional regime when the record is built.
pub fn client_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::required("razaoSocial", "Razão Social"),
        FieldSpec::required("cnpj", "CNPJ"),
        FieldSpec::optional("nomeFantasia", "Nome Fantasia"),
        FieldSpec::required("email", "Email"),
        FieldSpec::optional("telefone", "Telefone"),
        FieldSpec::optional("regimeTributario", "Regime Tributário"),
        FieldSpec::optional("ccm", "CCM"),
        FieldSpec::optional("ie", "Inscrição Estadual"),
        FieldSpec::optional("dataEntrada", "Data de Entrada"),
        FieldSpec::optional("dataSaida", "Data de Saída"),
    ]
}

/// Find a field by key
pub fn find_field<'a>(fields: &'a [FieldSpec], key: &str) -> Option<&'a FieldSpec> {
    fields.iter().find(|f| f.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_client_catalog_keys_are_unique() {
        let fields = client_fields();
        let keys: HashSet<_> = fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys.len(), fields.len());
    }

    #[test]
    fn test_identifier_is_required() {
        let fields = client_fields();
        let identifier = find_field(&fields, IDENTIFIER_FIELD).unwrap();
        assert!(identifier.required);
        assert_eq!(identifier.label, "CNPJ");
    }

    #[test]
    fn test_find_field_missing() {
        assert!(find_field(&client_fields(), "senhaPrefeitura").is_none());
    }
}
