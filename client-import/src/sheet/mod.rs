//! Spreadsheet I/O around the import engine

pub mod reader;
pub mod template;

pub use reader::{parse_csv, read_sheet};
pub use template::write_template_excel;
