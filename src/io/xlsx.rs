// src/io/xlsx.rs

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use super::table::Table;
use crate::error::{Result, SurrogateError};

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Integral floats come from numeric cells like AtomicNumber; keep them integral
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        other => {
            log::debug!("Unsupported spreadsheet cell {:?}, read as empty", other);
            String::new()
        }
    }
}

/// Reads `sheet` (or the first sheet) of a spreadsheet; the first row is the header.
pub fn parse(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| SurrogateError::Spreadsheet(format!("{}: {}", path.display(), e)))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| SurrogateError::Spreadsheet(format!("{}: no sheets", path.display())))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| SurrogateError::Spreadsheet(format!("{} [{}]: {}", path.display(), sheet_name, e)))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(r) => r.iter().map(|c| cell_to_string(c).trim().to_string()).collect(),
        None => {
            return Err(SurrogateError::Schema(format!(
                "{} [{}]: sheet is empty",
                path.display(),
                sheet_name
            )))
        }
    };

    let rows: Vec<Vec<String>> = rows_iter
        .map(|r| r.iter().take(headers.len()).map(cell_to_string).collect())
        // Trailing formatted-but-empty rows are common in exported sheets
        .filter(|r: &Vec<String>| r.iter().any(|c| !c.trim().is_empty()))
        .collect();

    Ok(Table::new(headers, rows))
}
