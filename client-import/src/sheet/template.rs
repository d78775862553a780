//! Downloadable import template

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

/// Template header row, in the order users are asked to fill it
pub const TEMPLATE_HEADERS: [&str; 11] = [
    "Razão Social",
    "Nome Fantasia",
    "CNPJ",
    "Email",
    "Telefone",
    "Regime Tributário",
    "CCM",
    "Inscrição Estadual",
    "Senha Prefeitura",
    "Data de Entrada",
    "Data de Saída",
];

/// Example row shown under the headers
pub const TEMPLATE_EXAMPLE: [&str; 11] = [
    "Empresa Exemplo Ltda",
    "Exemplo",
    "12.345.678/0001-90",
    "contato@exemplo.com.br",
    "(11) 99999-9999",
    "simples",
    "1234567",
    "123456789",
    "senha123",
    "2024-01-01",
    "",
];

/// Write the import template workbook
pub fn write_template_excel(path: &str) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Modelo")?;

    let bold = Format::new().set_bold();

    for (col, (header, example)) in TEMPLATE_HEADERS.iter().zip(TEMPLATE_EXAMPLE.iter()).enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, *header, &bold)?;
        worksheet.write_string(1, col, *example)?;

        let width = (header.chars().count() + 5).max(20);
        worksheet.set_column_width(col, width as f64)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path))?;

    log::info!("Import template written to: {}", path);
    Ok(())
}
