// src/report/augment.rs

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, SurrogateError};
use crate::io::{self, Table};
use crate::matching::{MappingReport, QualityTier, TargetMapping};

pub const SURROGATE_COLUMN: &str = "Surrogate";
pub const MATCH_QUALITY_COLUMN: &str = "Match_Quality";

/// Copies `table` and fills the Surrogate and Match_Quality columns
/// (appending them when absent). No other cell is touched.
///
/// * reference rows keep their Surrogate value and get `self`
/// * matched rows get the rank-0 candidate and its tier
/// * rows without candidates get an empty Surrogate and `Unmatched`
/// * rows that were skipped at load were never mapped: empty Surrogate and
///   `Unmatched`
///
/// Rows are paired with mappings by source row, never by symbol text.
pub fn augment(table: &Table, report: &MappingReport) -> Result<Table> {
    if let Some(t) = report.targets.iter().find(|t| t.row >= table.len()) {
        return Err(SurrogateError::InvalidInput(format!(
            "{} maps to row {}, table has {} rows",
            t.target,
            t.row + 1,
            table.len()
        )));
    }
    let by_row: HashMap<usize, &TargetMapping> = report.targets.iter().map(|t| (t.row, t)).collect();

    let mut out = table.clone();
    let surrogate_col = out.ensure_column(SURROGATE_COLUMN);
    let quality_col = out.ensure_column(MATCH_QUALITY_COLUMN);

    for row in 0..out.len() {
        let mapping = by_row.get(&row).copied();

        let (surrogate, quality) = match mapping {
            Some(m) if m.reference => {
                let existing = out.cell(row, surrogate_col).unwrap_or(m.target.as_str()).to_string();
                (existing, QualityTier::SelfRef.as_str())
            }
            Some(m) => match m.best() {
                Some(best) => (best.candidate.clone(), best.tier.as_str()),
                None => (String::new(), QualityTier::Unmatched.as_str()),
            },
            None => (String::new(), QualityTier::Unmatched.as_str()),
        };

        out.set(row, surrogate_col, surrogate);
        out.set(row, quality_col, quality);
    }

    Ok(out)
}

/// Writes the augmented table; failures are returned unchanged.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    io::save_table(path, table)?;
    log::info!("Updated table saved to {}", path.display());
    Ok(())
}

/// `elements.csv` -> `elements_updated.csv` next to the input. Spreadsheets
/// are written back as CSV.
pub fn default_output_path(input: &Path) -> std::path::PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = match input.extension().and_then(|e| e.to_str()) {
        Some(e) if e.eq_ignore_ascii_case("tsv") => "tsv",
        _ => "csv",
    };
    input.with_file_name(format!("{}_updated.{}", stem, ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MatchPolicy, SchemaConfig};
    use crate::matching::map_catalog;
    use crate::model::catalog::tests::sample_table;
    use crate::model::Catalog;

    fn augmented() -> (Table, Table) {
        let table = sample_table();
        let cat = Catalog::from_table(&table, &SchemaConfig::default()).unwrap();
        let report = map_catalog(&cat, &MatchPolicy::default());
        let out = augment(&table, &report).unwrap();
        (table, out)
    }

    fn value<'a>(t: &'a Table, symbol: &str, column: &str) -> &'a str {
        let sc = t.column("Symbol").unwrap();
        let row = (0..t.len()).find(|&r| t.cell(r, sc) == Some(symbol)).unwrap();
        t.cell(row, t.column(column).unwrap()).unwrap_or("")
    }

    #[test]
    fn test_assignments() {
        let (_, out) = augmented();
        assert_eq!(value(&out, "Ba", "Surrogate"), "Ca");
        assert_eq!(value(&out, "Ba", "Match_Quality"), "Good");
        assert_eq!(value(&out, "Cr", "Surrogate"), "Co");
        assert_eq!(value(&out, "Cr", "Match_Quality"), "Decent");
        assert_eq!(value(&out, "Xe", "Surrogate"), "C");
        assert_eq!(value(&out, "Xe", "Match_Quality"), "Poor");
        assert_eq!(value(&out, "He", "Surrogate"), "");
        assert_eq!(value(&out, "He", "Match_Quality"), "Unmatched");
        assert_eq!(value(&out, "Co", "Surrogate"), "Co");
        assert_eq!(value(&out, "Co", "Match_Quality"), "self");
    }

    #[test]
    fn test_preserves_rows_and_columns() {
        let (table, out) = augmented();
        assert_eq!(out.len(), table.len());
        // Surrogate already existed, only Match_Quality is appended
        assert_eq!(out.headers.len(), table.headers.len() + 1);
        assert_eq!(out.headers.last().unwrap(), MATCH_QUALITY_COLUMN);

        let surrogate = table.column("Surrogate").unwrap();
        for (r, row) in table.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if c != surrogate {
                    assert_eq!(&out.rows[r][c], cell, "row {} col {}", r, table.headers[c]);
                }
            }
        }
    }

    #[test]
    fn test_appends_both_columns_when_absent() {
        let mut table = sample_table();
        let surrogate = table.column("Surrogate").unwrap();
        table.headers.remove(surrogate);
        for row in &mut table.rows {
            row.remove(surrogate);
        }
        let cat = Catalog::from_table(&table, &SchemaConfig::default()).unwrap();
        assert_eq!(cat.references().count(), 0);

        let out = augment(&table, &map_catalog(&cat, &MatchPolicy::default())).unwrap();
        let n = table.headers.len();
        assert_eq!(&out.headers[n..], &["Surrogate".to_string(), "Match_Quality".to_string()]);
    }

    #[test]
    fn test_skipped_rows_are_unmatched() {
        let mut table = sample_table();
        let col = table.column("AtomicNumber").unwrap();
        table.set(8, col, "");
        let cat = Catalog::from_table(&table, &SchemaConfig { max_bad_row_fraction: 0.5 }).unwrap();
        let out = augment(&table, &map_catalog(&cat, &MatchPolicy::default())).unwrap();
        assert_eq!(out.len(), table.len());
        assert_eq!(value(&out, "He", "Surrogate"), "");
        assert_eq!(value(&out, "He", "Match_Quality"), "Unmatched");
    }

    #[test]
    fn test_rows_paired_by_source_row() {
        let table = sample_table();
        let cat = Catalog::from_table(&table, &SchemaConfig::default()).unwrap();
        let report = map_catalog(&cat, &MatchPolicy::default());

        // Relabelling the raw Symbol cell does not move the assignment
        let mut relabelled = table.clone();
        let col = relabelled.column("Symbol").unwrap();
        relabelled.set(2, col, "Xe");
        let out = augment(&relabelled, &report).unwrap();
        assert_eq!(out.rows[2][out.column("Surrogate").unwrap()], "Ca");
        assert_eq!(out.rows[2][out.column("Match_Quality").unwrap()], "Good");

        let mut short = table.clone();
        short.rows.truncate(4);
        assert!(matches!(augment(&short, &report), Err(SurrogateError::InvalidInput(_))));
    }

    #[test]
    fn test_rerun_gives_identical_table() {
        let (_, first) = augmented();
        let (_, second) = augmented();
        assert_eq!(first, second);
    }

    #[test]
    fn test_round_trip_through_disk() {
        let (table, out) = augmented();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("elements_updated.csv");
        write_table(&path, &out).unwrap();

        let (cat, reloaded) = Catalog::load(&path, None, &SchemaConfig::default()).unwrap();
        assert_eq!(cat.len(), 9);
        assert_eq!(reloaded, out);

        let surrogate = table.column("Surrogate").unwrap();
        for c in (0..table.headers.len()).filter(|&c| c != surrogate) {
            for r in 0..table.len() {
                assert_eq!(reloaded.rows[r][c], table.rows[r][c]);
            }
        }
        // Reference flags survive the rewrite
        let refs: Vec<&str> = cat.references().map(|e| e.symbol.as_str()).collect();
        assert_eq!(refs, vec!["Be", "Ra", "Co", "C"]);
    }

    #[test]
    fn test_default_output_path() {
        let p = default_output_path(Path::new("/data/PubChemElements_all.csv"));
        assert_eq!(p, Path::new("/data/PubChemElements_all_updated.csv"));
        let p = default_output_path(Path::new("elements.xlsx"));
        assert_eq!(p, Path::new("elements_updated.csv"));
        let p = default_output_path(Path::new("elements.tsv"));
        assert_eq!(p, Path::new("elements_updated.tsv"));
    }
}
