// src/model/element.rs

use serde::Serialize;
use std::fmt;

/// Valence-transition label such as "2+" or "3/2+".
///
/// Labels are compared by exact string equality; no chemistry is inferred
/// from them, so "3/2+" and "2/3+" are unrelated keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TransitionKey(String);

impl TransitionKey {
    pub fn new(label: &str) -> Self {
        Self(label.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of an element's redox table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RedoxEntry {
    pub key: TransitionKey,
    /// Standard electrode potential in volts, `None` when not tabulated
    pub potential: Option<f64>,
    pub half_reaction: Option<String>,
}

/// Redox transitions of an element in source order, keys unique.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RedoxTable {
    entries: Vec<RedoxEntry>,
}

fn split_list(raw: Option<&str>) -> Vec<&str> {
    match raw {
        Some(s) => s.split(',').map(str::trim).collect(),
        None => Vec::new(),
    }
}

impl RedoxTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from the co-indexed, comma-separated `Key`,
    /// `Standard Potential` and `Half-Reaction` cells of one row.
    pub fn from_columns(
        symbol: &str,
        keys: Option<&str>,
        potentials: Option<&str>,
        half_reactions: Option<&str>,
    ) -> Self {
        let keys = split_list(keys);
        let potentials = split_list(potentials);
        let reactions = split_list(half_reactions);

        if potentials.len() > keys.len() {
            log::warn!(
                "{}: {} standard potentials but only {} transition keys; extra potentials ignored",
                symbol,
                potentials.len(),
                keys.len()
            );
        }

        let mut table = Self::new();
        for (i, key) in keys.iter().enumerate() {
            if key.is_empty() {
                continue;
            }
            let potential = match potentials.get(i).copied().filter(|p| !p.is_empty()) {
                Some(p) => match p.parse::<f64>() {
                    Ok(v) if v.is_finite() => Some(v),
                    _ => {
                        log::warn!("{}: unparseable potential '{}' for key {}, treated as unknown", symbol, p, key);
                        None
                    }
                },
                None => None,
            };
            let half_reaction = reactions
                .get(i)
                .filter(|r| !r.is_empty())
                .map(|r| r.to_string());

            table.insert(
                symbol,
                RedoxEntry {
                    key: TransitionKey::new(key),
                    potential,
                    half_reaction,
                },
            );
        }
        table
    }

    /// Adds an entry; a repeated key keeps the first occurrence.
    pub fn insert(&mut self, symbol: &str, entry: RedoxEntry) {
        if self.contains_key(&entry.key) {
            log::warn!("{}: duplicate transition key {} ignored", symbol, entry.key);
            return;
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[RedoxEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &TransitionKey) -> Option<&RedoxEntry> {
        self.entries.iter().find(|e| &e.key == key)
    }

    pub fn contains_key(&self, key: &TransitionKey) -> bool {
        self.get(key).is_some()
    }

    /// Keys present in both tables, sorted.
    pub fn shared_keys(&self, other: &RedoxTable) -> Vec<TransitionKey> {
        let mut shared: Vec<TransitionKey> = self
            .entries
            .iter()
            .filter(|e| other.contains_key(&e.key))
            .map(|e| e.key.clone())
            .collect();
        shared.sort();
        shared
    }
}

/// Parses an `OxidationStates` cell such as "+3, +2, -1".
pub fn parse_oxidation_states(symbol: &str, raw: Option<&str>) -> Vec<i32> {
    let mut states = Vec::new();
    for token in split_list(raw) {
        if token.is_empty() {
            continue;
        }
        match token.trim_start_matches('+').parse::<i32>() {
            Ok(v) => states.push(v),
            Err(_) => log::warn!("{}: unparseable oxidation state '{}' ignored", symbol, token),
        }
    }
    states
}

/// One element of the catalog. Optional properties are `None` when the
/// source cell was empty or unparseable, never zero.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Element {
    pub symbol: String,
    pub name: String,
    pub atomic_number: u32,
    pub atomic_mass: f64,
    pub electronegativity: Option<f64>,
    pub electron_affinity: Option<f64>,
    /// Kelvin
    pub melting_point: Option<f64>,
    /// Kelvin
    pub boiling_point: Option<f64>,
    pub density: Option<f64>,
    pub standard_state: Option<String>,
    pub group_block: Option<String>,
    pub oxidation_states: Vec<i32>,
    pub redox: RedoxTable,
    /// The input table marks this element as its own surrogate.
    pub reference: bool,
    /// Database versions the element is available in, as written in the table
    pub version_compatibility: Option<String>,
    /// Zero-based row of the source table
    pub row: usize,
}

fn fmt_opt(v: Option<f64>, precision: usize, unit: &str) -> String {
    match v {
        Some(x) => format!("{:.*}{}", precision, x, unit),
        None => "unknown".to_string(),
    }
}

impl Element {
    /// True when `version` is one of the comma, semicolon or space separated
    /// entries of the version compatibility cell (case-insensitive).
    pub fn is_compatible_with(&self, version: &str) -> bool {
        let version = version.trim();
        self.version_compatibility
            .as_deref()
            .map(|v| {
                v.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                    .any(|entry| !entry.is_empty() && entry.eq_ignore_ascii_case(version))
            })
            .unwrap_or(false)
    }

    /// Multi-line human-readable summary used by `show`.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{} ({}), Z = {}\n", self.symbol, self.name, self.atomic_number));
        out.push_str("--------------------------------------------------\n");
        out.push_str(&format!("{:<20} {:.4}\n", "Atomic mass", self.atomic_mass));
        out.push_str(&format!("{:<20} {}\n", "Electronegativity", fmt_opt(self.electronegativity, 3, "")));
        out.push_str(&format!("{:<20} {}\n", "Electron affinity", fmt_opt(self.electron_affinity, 3, " eV")));
        out.push_str(&format!("{:<20} {}\n", "Melting point", fmt_opt(self.melting_point, 1, " K")));
        out.push_str(&format!("{:<20} {}\n", "Boiling point", fmt_opt(self.boiling_point, 1, " K")));
        out.push_str(&format!("{:<20} {}\n", "Density", fmt_opt(self.density, 4, "")));
        out.push_str(&format!(
            "{:<20} {}\n",
            "Standard state",
            self.standard_state.as_deref().unwrap_or("unknown")
        ));
        out.push_str(&format!(
            "{:<20} {}\n",
            "Group block",
            self.group_block.as_deref().unwrap_or("unknown")
        ));
        let states: Vec<String> = self
            .oxidation_states
            .iter()
            .map(|s| format!("{:+}", s))
            .collect();
        out.push_str(&format!("{:<20} {}\n", "Oxidation states", states.join(", ")));
        out.push_str(&format!(
            "{:<20} {}\n",
            "Versions",
            self.version_compatibility.as_deref().unwrap_or("unknown")
        ));
        out.push_str(&format!("{:<20} {}\n", "Reference surrogate", if self.reference { "yes" } else { "no" }));

        if self.redox.is_empty() {
            out.push_str("Redox table: none\n");
        } else {
            out.push_str("Redox table:\n");
            for entry in self.redox.entries() {
                out.push_str(&format!(
                    "  {:<8} {}",
                    entry.key.as_str(),
                    fmt_opt(entry.potential, 3, " V")
                ));
                if let Some(r) = &entry.half_reaction {
                    out.push_str(&format!("   {}", r));
                }
                out.push('\n');
            }
        }
        out
    }
}
