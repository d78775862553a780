//! Load the snapshot of identifiers already registered

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::import::IdentifierSnapshot;

/// Load registered identifiers from a file
///
/// `.json` files hold either an array of strings or an array of records that
/// carry the identifier under `identifier_key` (or its snake_case form). Any
/// other file is read as one identifier per line.
pub fn load_snapshot(path: &Path, identifier_key: &str) -> Result<IdentifierSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read identifier snapshot: {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let snapshot = if is_json {
        parse_json_snapshot(&content, identifier_key)
            .with_context(|| format!("Invalid identifier snapshot: {}", path.display()))?
    } else {
        parse_line_snapshot(&content)
    };

    log::info!(
        "Loaded {} existing identifiers from {}",
        snapshot.len(),
        path.display()
    );
    Ok(snapshot)
}

/// One identifier per line, blanks ignored
pub fn parse_line_snapshot(content: &str) -> IdentifierSnapshot {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// JSON array of strings or of records holding the identifier
pub fn parse_json_snapshot(content: &str, identifier_key: &str) -> Result<IdentifierSnapshot> {
    let json: serde_json::Value = serde_json::from_str(content).context("Failed to parse JSON")?;

    let Some(items) = json.as_array() else {
        bail!("Expected a JSON array of identifiers or records");
    };

    let snake_key = to_snake_case(identifier_key);
    let mut identifiers = Vec::with_capacity(items.len());

    for (idx, item) in items.iter().enumerate() {
        let value = match item {
            serde_json::Value::String(s) => Some(s.as_str()),
            serde_json::Value::Object(obj) => obj
                .get(identifier_key)
                .or_else(|| obj.get(&snake_key))
                .and_then(|v| v.as_str()),
            _ => bail!("Item {} is neither a string nor a record", idx),
        };

        match value.map(str::trim) {
            Some(id) if !id.is_empty() => identifiers.push(id.to_string()),
            _ => log::debug!("Item {} carries no '{}' value", idx, identifier_key),
        }
    }

    Ok(identifiers.into_iter().collect())
}

fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_snapshot() {
        let snapshot = parse_line_snapshot("11\n\n  22  \n11\n");
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains("22"));
    }

    #[test]
    fn test_parse_json_strings() {
        let snapshot = parse_json_snapshot(r#"["11", " 22 ", ""]"#, "cnpj").unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains("11"));
        assert!(snapshot.contains("22"));
    }

    #[test]
    fn test_parse_json_records() {
        let content = r#"[
            {"cnpj": "11", "razao_social": "Alfa"},
            {"razaoSocial": "Beta"},
            {"cnpj": null}
        ]"#;
        let snapshot = parse_json_snapshot(content, "cnpj").unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains("11"));
    }

    #[test]
    fn test_parse_json_records_snake_case_key() {
        let content = r#"[{"codigo_cliente": "A1"}]"#;
        let snapshot = parse_json_snapshot(content, "codigoCliente").unwrap();
        assert!(snapshot.contains("A1"));
    }

    #[test]
    fn test_parse_json_rejects_non_array() {
        assert!(parse_json_snapshot(r#"{"cnpj": "11"}"#, "cnpj").is_err());
        assert!(parse_json_snapshot("[1, 2]", "cnpj").is_err());
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("razaoSocial"), "razao_social");
        assert_eq!(to_snake_case("cnpj"), "cnpj");
    }
}
