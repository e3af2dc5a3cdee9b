// src/report/groups.rs

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::augment::{MATCH_QUALITY_COLUMN, SURROGATE_COLUMN};
use crate::error::{Result, SurrogateError};
use crate::io::Table;

/// One element represented by a surrogate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "AtomicNumber")]
    pub atomic_number: String,
    #[serde(rename = "Match_Quality")]
    pub match_quality: String,
}

/// Surrogate symbol -> the elements it stands in for (itself included).
pub type SurrogateGroups = BTreeMap<String, Vec<GroupMember>>;

/// Inverts an augmented table into surrogate groups. Members keep table
/// order; reference elements always get an entry, possibly empty.
pub fn surrogate_groups(table: &Table) -> Result<SurrogateGroups> {
    let col = |name: &str| {
        table
            .column(name)
            .ok_or_else(|| SurrogateError::Schema(format!("augmented table lacks column {}", name)))
    };
    let symbol_col = col("Symbol")?;
    let name_col = col("Name")?;
    let number_col = col("AtomicNumber")?;
    let surrogate_col = col(SURROGATE_COLUMN)?;
    let quality_col = col(MATCH_QUALITY_COLUMN)?;

    let mut groups = SurrogateGroups::new();
    let mut references = Vec::new();

    for row in 0..table.len() {
        let symbol = match table.cell(row, symbol_col) {
            Some(s) => s.to_string(),
            None => continue,
        };
        let quality = table.cell(row, quality_col).unwrap_or("Unknown").to_string();
        if quality.eq_ignore_ascii_case("self") {
            references.push(symbol.clone());
        }

        if let Some(surrogate) = table.cell(row, surrogate_col) {
            groups.entry(surrogate.to_string()).or_default().push(GroupMember {
                name: table.cell(row, name_col).unwrap_or_default().to_string(),
                atomic_number: table.cell(row, number_col).unwrap_or_default().to_string(),
                match_quality: quality,
                symbol,
            });
        }
    }

    for symbol in references {
        groups.entry(symbol).or_default();
    }
    Ok(groups)
}

pub fn write_groups(path: &Path, groups: &SurrogateGroups) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, groups)?;
    log::info!("Surrogate groups saved to {}", path.display());
    Ok(())
}

pub fn load_groups(path: &Path) -> Result<SurrogateGroups> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
