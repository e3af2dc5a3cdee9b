// src/io/csv.rs

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use ::csv::{ByteRecord, ReaderBuilder, WriterBuilder};

use super::table::Table;
use crate::error::{Result, SurrogateError};

/// Element tables exported from PubChem are Latin-1, newer ones UTF-8.
/// Valid UTF-8 is taken as is, anything else is decoded byte-per-char.
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn decode_record(record: &ByteRecord) -> Vec<String> {
    record.iter().map(decode_field).collect()
}

pub fn parse(path: &Path, delimiter: u8) -> Result<Table> {
    let file = File::open(path).map_err(|e| {
        SurrogateError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = decode_record(reader.byte_headers()?)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        let mut row = decode_record(&record);
        if row.len() > headers.len() {
            log::warn!(
                "{}: row {} has {} cells, header has {}; extra cells dropped",
                path.display(),
                rows.len() + 1,
                row.len(),
                headers.len()
            );
            row.truncate(headers.len());
        }
        rows.push(row);
    }

    Ok(Table::new(headers, rows))
}

pub fn write(path: &Path, table: &Table) -> Result<()> {
    write_with_delimiter(path, table, b',')
}

pub fn write_with_delimiter(path: &Path, table: &Table, delimiter: u8) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(file);
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
