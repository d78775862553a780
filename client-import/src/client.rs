//! Client record produced by an import

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::import::{ImportRecord, ValidatedRow};

/// Brazilian tax regime of a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxRegime {
    /// Simples Nacional (default)
    #[default]
    Simples,
    /// Lucro Presumido
    Presumido,
    /// Lucro Real
    Real,
}

impl TaxRegime {
    /// Lenient parse of a spreadsheet value; unknown or empty values fall back to Simples
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        if normalized.contains("presumido") {
            TaxRegime::Presumido
        } else if normalized.contains("real") {
            TaxRegime::Real
        } else {
            TaxRegime::Simples
        }
    }

    /// Get display label for UI
    pub fn label(&self) -> &'static str {
        match self {
            TaxRegime::Simples => "Simples Nacional",
            TaxRegime::Presumido => "Lucro Presumido",
            TaxRegime::Real => "Lucro Real",
        }
    }
}

/// Partner listed in a client's corporate structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub nome: String,
    pub cpf: String,
    pub participacao: f64,
}

/// Client ready to be inserted by the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub razao_social: String,
    pub nome_fantasia: String,
    pub cnpj: String,
    pub email: String,
    pub telefone: String,
    pub regime_tributario: TaxRegime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ccm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ie: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_entrada: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_saida: Option<String>,
    pub is_active: bool,
    pub quadro_societario: Vec<Partner>,
}

impl ClientRecord {
    /// Stamp the entry date when the sheet did not provide one
    pub fn with_entry_date(mut self, date: NaiveDate) -> Self {
        if self.data_entrada.is_none() {
            self.data_entrada = Some(date.format("%Y-%m-%d").to_string());
        }
        self
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl ImportRecord for ClientRecord {
    fn from_row(row: &ValidatedRow) -> Self {
        let razao_social = row.value("razaoSocial").to_string();
        let nome_fantasia = match row.value("nomeFantasia") {
            "" => razao_social.clone(),
            name => name.to_string(),
        };

        ClientRecord {
            razao_social,
            nome_fantasia,
            cnpj: row.value("cnpj").to_string(),
            email: row.value("email").to_string(),
            telefone: row.value("telefone").to_string(),
            regime_tributario: TaxRegime::parse(row.value("regimeTributario")),
            ccm: non_empty(row.value("ccm")),
            ie: non_empty(row.value("ie")),
            data_entrada: non_empty(row.value("dataEntrada")),
            data_saida: non_empty(row.value("dataSaida")),
            is_active: true,
            quadro_societario: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn valid_row(values: &[(&str, &str)]) -> ValidatedRow {
        let fields: BTreeMap<String, String> = values
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ValidatedRow {
            index: 0,
            line: 2,
            fields,
            is_valid: true,
            errors: vec![],
        }
    }

    #[test]
    fn test_tax_regime_parse() {
        assert_eq!(TaxRegime::parse("Lucro Presumido"), TaxRegime::Presumido);
        assert_eq!(TaxRegime::parse("  REAL "), TaxRegime::Real);
        assert_eq!(TaxRegime::parse("simples nacional"), TaxRegime::Simples);
        assert_eq!(TaxRegime::parse(""), TaxRegime::Simples);
        assert_eq!(TaxRegime::parse("MEI"), TaxRegime::Simples);
    }

    #[test]
    fn test_tax_regime_label() {
        assert_eq!(TaxRegime::parse("presumido").label(), "Lucro Presumido");
        assert_eq!(TaxRegime::default().label(), "Simples Nacional");
    }

    #[test]
    fn test_record_from_row_defaults() {
        let row = valid_row(&[
            ("razaoSocial", "Empresa Exemplo Ltda"),
            ("cnpj", "12.345.678/0001-90"),
            ("email", "contato@exemplo.com.br"),
            ("nomeFantasia", ""),
            ("ccm", ""),
        ]);

        let record = ClientRecord::from_row(&row);

        assert_eq!(record.nome_fantasia, "Empresa Exemplo Ltda");
        assert_eq!(record.regime_tributario, TaxRegime::Simples);
        assert_eq!(record.ccm, None);
        assert_eq!(record.data_entrada, None);
        assert!(record.is_active);
        assert!(record.quadro_societario.is_empty());
    }

    #[test]
    fn test_with_entry_date_keeps_sheet_value() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let stamped = ClientRecord::from_row(&valid_row(&[("razaoSocial", "A")])).with_entry_date(date);
        assert_eq!(stamped.data_entrada.as_deref(), Some("2024-03-01"));

        let kept = ClientRecord::from_row(&valid_row(&[("dataEntrada", "2020-01-01")])).with_entry_date(date);
        assert_eq!(kept.data_entrada.as_deref(), Some("2020-01-01"));
    }

    #[test]
    fn test_record_serializes_snake_case() {
        let record = ClientRecord::from_row(&valid_row(&[
            ("razaoSocial", "A"),
            ("regimeTributario", "presumido"),
        ]));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["razao_social"], "A");
        assert_eq!(json["regime_tributario"], "presumido");
        assert!(json.get("ccm").is_none());
    }
}
