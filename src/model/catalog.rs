// src/model/catalog.rs

use std::collections::HashMap;
use std::path::Path;

use super::element::{parse_oxidation_states, Element, RedoxTable};
use crate::config::SchemaConfig;
use crate::error::{Result, SurrogateError};
use crate::io::{self, Table};

/// Columns every element table must carry (values may still be empty for
/// the optional ones).
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "Symbol",
    "Name",
    "AtomicNumber",
    "AtomicMass",
    "Electronegativity",
    "MeltingPoint",
    "OxidationStates",
    "Key",
    "Standard Potential",
];

struct Columns {
    symbol: usize,
    name: usize,
    atomic_number: usize,
    atomic_mass: usize,
    electronegativity: usize,
    melting_point: usize,
    oxidation_states: usize,
    key: usize,
    potential: usize,
    electron_affinity: Option<usize>,
    boiling_point: Option<usize>,
    density: Option<usize>,
    standard_state: Option<usize>,
    group_block: Option<usize>,
    half_reaction: Option<usize>,
    surrogate: Option<usize>,
    version_compatibility: Option<usize>,
}

impl Columns {
    fn resolve(table: &Table) -> Result<Self> {
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| table.column(c).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(SurrogateError::Schema(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }
        let req = |name: &str| table.column(name).unwrap_or_default();

        Ok(Self {
            symbol: req("Symbol"),
            name: req("Name"),
            atomic_number: req("AtomicNumber"),
            atomic_mass: req("AtomicMass"),
            electronegativity: req("Electronegativity"),
            melting_point: req("MeltingPoint"),
            oxidation_states: req("OxidationStates"),
            key: req("Key"),
            potential: req("Standard Potential"),
            electron_affinity: table.column("ElectronAffinity"),
            boiling_point: table.column("BoilingPoint"),
            density: table.column("Density"),
            standard_state: table.column("StandardState"),
            group_block: table.column("GroupBlock"),
            half_reaction: table.column("Half-Reaction"),
            surrogate: table.column("Surrogate"),
            // Older exports spell it "Compatability"
            version_compatibility: table
                .column("Version Compatibility")
                .or_else(|| table.column("Version Compatability")),
        })
    }
}

/// Optional numeric cell: empty or unparseable gives `None`.
fn optional_f64(table: &Table, row: usize, col: Option<usize>, field: &str, symbol: &str) -> Option<f64> {
    let raw = table.cell(row, col?)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        // "nan" is how dataframe exports spell an empty cell
        Ok(_) => None,
        Err(_) => {
            log::warn!("{}: unparseable {} '{}', treated as unknown", symbol, field, raw);
            None
        }
    }
}

fn optional_text(table: &Table, row: usize, col: Option<usize>) -> Option<String> {
    table.cell(row, col?).map(str::to_string)
}

fn parse_atomic_number(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0 && *v >= 1.0 && *v <= u32::MAX as f64)
            .map(|v| v as u32)
    })
}

/// Immutable set of elements keyed by symbol, in source-table order.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    elements: Vec<Element>,
    by_symbol: HashMap<String, usize>,
    skipped_rows: Vec<usize>,
}

impl Catalog {
    /// Reads `path` (CSV/TSV or spreadsheet) and builds the catalog. The raw
    /// table is returned as well so it can be augmented without loss.
    pub fn load(path: &Path, sheet: Option<&str>, schema: &SchemaConfig) -> Result<(Self, Table)> {
        let table = io::load_table(path, sheet)?;
        let catalog = Self::from_table(&table, schema)?;
        log::info!(
            "Loaded {} elements from {} ({} reference surrogates)",
            catalog.len(),
            path.display(),
            catalog.references().count()
        );
        Ok((catalog, table))
    }

    pub fn from_table(table: &Table, schema: &SchemaConfig) -> Result<Self> {
        let cols = Columns::resolve(table)?;

        // Skipped rows still count, so a bad row cannot shadow a good one
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for row in 0..table.len() {
            if let Some(symbol) = table.cell(row, cols.symbol) {
                if let Some(first) = seen.insert(symbol, row) {
                    return Err(SurrogateError::Schema(format!(
                        "row {}: duplicate symbol {} (first seen on row {})",
                        row + 1,
                        symbol,
                        first + 1
                    )));
                }
            }
        }

        let mut catalog = Self::default();
        let mut first_error: Option<String> = None;

        for row in 0..table.len() {
            match Self::parse_row(table, row, &cols) {
                Ok(element) => {
                    catalog.by_symbol.insert(element.symbol.clone(), catalog.elements.len());
                    catalog.elements.push(element);
                }
                Err(msg) => {
                    log::warn!("Skipping row {}: {}", row + 1, msg);
                    first_error.get_or_insert(format!("row {}: {}", row + 1, msg));
                    catalog.skipped_rows.push(row);
                }
            }
        }

        if !table.is_empty() {
            let bad_fraction = catalog.skipped_rows.len() as f64 / table.len() as f64;
            if bad_fraction > schema.max_bad_row_fraction {
                return Err(SurrogateError::Schema(format!(
                    "{} of {} rows have unparseable required fields (allowed fraction {:.2}); first: {}",
                    catalog.skipped_rows.len(),
                    table.len(),
                    schema.max_bad_row_fraction,
                    first_error.unwrap_or_default()
                )));
            }
        }

        Ok(catalog)
    }

    fn parse_row(table: &Table, row: usize, cols: &Columns) -> std::result::Result<Element, String> {
        let symbol = table
            .cell(row, cols.symbol)
            .ok_or_else(|| "empty Symbol".to_string())?
            .to_string();

        let atomic_number = table
            .cell(row, cols.atomic_number)
            .and_then(parse_atomic_number)
            .ok_or_else(|| format!("{}: AtomicNumber is missing or not an integer", symbol))?;

        let atomic_mass = table
            .cell(row, cols.atomic_mass)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("{}: AtomicMass is missing or not a number", symbol))?;

        let name = table
            .cell(row, cols.name)
            .unwrap_or(symbol.as_str())
            .to_string();

        let redox = RedoxTable::from_columns(
            &symbol,
            table.cell(row, cols.key),
            table.cell(row, cols.potential),
            cols.half_reaction.and_then(|c| table.cell(row, c)),
        );

        let reference = cols
            .surrogate
            .and_then(|c| table.cell(row, c))
            .map(|s| s.eq_ignore_ascii_case(&symbol))
            .unwrap_or(false);

        Ok(Element {
            electronegativity: optional_f64(table, row, Some(cols.electronegativity), "Electronegativity", &symbol),
            electron_affinity: optional_f64(table, row, cols.electron_affinity, "ElectronAffinity", &symbol),
            melting_point: optional_f64(table, row, Some(cols.melting_point), "MeltingPoint", &symbol),
            boiling_point: optional_f64(table, row, cols.boiling_point, "BoilingPoint", &symbol),
            density: optional_f64(table, row, cols.density, "Density", &symbol),
            standard_state: optional_text(table, row, cols.standard_state),
            group_block: optional_text(table, row, cols.group_block),
            oxidation_states: parse_oxidation_states(&symbol, table.cell(row, cols.oxidation_states)),
            name,
            atomic_number,
            atomic_mass,
            redox,
            reference,
            version_compatibility: optional_text(table, row, cols.version_compatibility),
            row,
            symbol,
        })
    }

    pub fn get(&self, symbol: &str) -> Result<&Element> {
        self.by_symbol
            .get(symbol)
            .map(|&i| &self.elements[i])
            .ok_or_else(|| SurrogateError::NotFound(symbol.to_string()))
    }

    /// Elements in source-table order.
    pub fn all(&self) -> &[Element] {
        &self.elements
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn get_by_atomic_number(&self, z: u32) -> Option<&Element> {
        self.elements.iter().find(|e| e.atomic_number == z)
    }

    /// Resolves a symbol, atomic number or element name, in that order.
    pub fn lookup(&self, query: &str) -> Result<&Element> {
        let q = query.trim();
        if let Ok(e) = self.get(q) {
            return Ok(e);
        }
        if let Ok(z) = q.parse::<u32>() {
            return self
                .get_by_atomic_number(z)
                .ok_or_else(|| SurrogateError::NotFound(format!("atomic number {}", z)));
        }
        self.get_by_name(q)
            .ok_or_else(|| SurrogateError::NotFound(q.to_string()))
    }

    /// Elements the input table marks as their own surrogate.
    pub fn references(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.reference)
    }

    pub fn group_block(&self, group: &str) -> Vec<&Element> {
        self.elements
            .iter()
            .filter(|e| e.group_block.as_deref().map(|g| g.eq_ignore_ascii_case(group)).unwrap_or(false))
            .collect()
    }

    /// Elements available in database `version` (e.g. "V3").
    pub fn compatible_with(&self, version: &str) -> Vec<&Element> {
        self.elements
            .iter()
            .filter(|e| e.is_compatible_with(version))
            .collect()
    }

    /// Zero-based table rows dropped for bad required fields.
    pub fn skipped_rows(&self) -> &[usize] {
        &self.skipped_rows
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
