// src/io/mod.rs
pub mod csv;
pub mod table;
pub mod xlsx;

pub use table::Table;

use crate::error::Result;
use std::path::Path;

/// Reads an element table, choosing the reader from the file extension.
/// `sheet` only applies to spreadsheet formats.
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let p = path.to_string_lossy().to_lowercase();

    if p.ends_with(".xlsx") || p.ends_with(".xlsm") || p.ends_with(".xls") || p.ends_with(".ods") {
        xlsx::parse(path, sheet)
    } else if p.ends_with(".tsv") || p.ends_with(".tab") {
        csv::parse(path, b'\t')
    } else {
        // Fallback to comma-separated for .csv and unknown extensions
        csv::parse(path, b',')
    }
}

/// Writes a table. Output is always delimited text; `.tsv` selects tabs.
pub fn save_table(path: &Path, table: &Table) -> Result<()> {
    let p = path.to_string_lossy().to_lowercase();

    if p.ends_with(".tsv") || p.ends_with(".tab") {
        csv::write_with_delimiter(path, table, b'\t')
    } else {
        csv::write(path, table)
    }
}
