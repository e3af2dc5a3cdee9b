// src/inventory/mod.rs

//! Condenses a depletion inventory (every element, per timestep) onto the
//! surrogate set, producing the element vector a thermochemistry run can use.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SurrogateError};
use crate::report::SurrogateGroups;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementAmount {
    pub atom_density: f64,
    #[serde(default)]
    pub mole_percent: f64,
}

/// timestep -> element -> amount
pub type Inventory = BTreeMap<String, BTreeMap<String, ElementAmount>>;

#[derive(Deserialize)]
#[serde(untagged)]
enum InventoryFile {
    Wrapped { surrogate_vector: Inventory },
    Plain(Inventory),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SurrogateTotals {
    pub atom_density: f64,
    pub mole_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contribution {
    pub atom_density: f64,
    /// Share of the surrogate's atom density, percent
    pub contribution_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CondensedInventory {
    pub surrogate_vector: BTreeMap<String, BTreeMap<String, SurrogateTotals>>,
    pub surrogate_percentages: BTreeMap<String, BTreeMap<String, BTreeMap<String, Contribution>>>,
    /// Elements present in a timestep but represented by no surrogate
    pub unmapped: BTreeMap<String, Vec<String>>,
}

pub fn load_inventory(path: &Path) -> Result<Inventory> {
    let reader = BufReader::new(File::open(path)?);
    let file: InventoryFile = serde_json::from_reader(reader)?;
    Ok(match file {
        InventoryFile::Wrapped { surrogate_vector } => surrogate_vector,
        InventoryFile::Plain(inv) => inv,
    })
}

/// Element (lowercase) -> surrogate (lowercase). An element listed under
/// two surrogates would be counted twice, so that is rejected.
fn element_index(groups: &SurrogateGroups) -> Result<HashMap<String, String>> {
    let mut index = HashMap::new();
    for (surrogate, members) in groups {
        let surrogate = surrogate.to_lowercase();
        for member in members {
            let element = member.symbol.to_lowercase();
            if let Some(previous) = index.insert(element.clone(), surrogate.clone()) {
                if previous != surrogate {
                    return Err(SurrogateError::InvalidInput(format!(
                        "element {} is mapped to both {} and {}",
                        element, previous, surrogate
                    )));
                }
            }
        }
    }
    Ok(index)
}

/// Sums every timestep's element amounts onto their surrogates and records
/// each element's share of its surrogate total.
pub fn condense(groups: &SurrogateGroups, inventory: &Inventory) -> Result<CondensedInventory> {
    let index = element_index(groups)?;
    let mut out = CondensedInventory::default();

    for (timestep, elements) in inventory {
        let totals = out.surrogate_vector.entry(timestep.clone()).or_default();
        let shares = out.surrogate_percentages.entry(timestep.clone()).or_default();

        for surrogate in groups.keys() {
            totals.entry(surrogate.to_lowercase()).or_default();
            shares.entry(surrogate.to_lowercase()).or_default();
        }

        let mut unmapped = Vec::new();
        for (element, amount) in elements {
            let element = element.to_lowercase();
            let surrogate = match index.get(&element) {
                Some(s) => s,
                None => {
                    unmapped.push(element);
                    continue;
                }
            };
            let total = totals.entry(surrogate.clone()).or_default();
            total.atom_density += amount.atom_density;
            total.mole_percent += amount.mole_percent;

            shares.entry(surrogate.clone()).or_default().insert(
                element,
                Contribution {
                    atom_density: amount.atom_density,
                    contribution_percentage: 0.0,
                },
            );
        }

        for (surrogate, members) in shares.iter_mut() {
            let denominator = totals.get(surrogate).map(|t| t.atom_density).unwrap_or(0.0);
            if denominator > 0.0 {
                for c in members.values_mut() {
                    c.contribution_percentage = c.atom_density / denominator * 100.0;
                }
            }
        }

        if !unmapped.is_empty() {
            log::warn!("timestep {}: {} element(s) have no surrogate: {}", timestep, unmapped.len(), unmapped.join(", "));
            out.unmapped.insert(timestep.clone(), unmapped);
        }
    }

    Ok(out)
}

pub fn write_condensed(path: &Path, condensed: &CondensedInventory) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, condensed)?;
    log::info!("Surrogate vector saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::GroupMember;

    fn member(symbol: &str, quality: &str) -> GroupMember {
        GroupMember {
            symbol: symbol.into(),
            name: symbol.into(),
            atomic_number: "0".into(),
            match_quality: quality.into(),
        }
    }

    fn groups() -> SurrogateGroups {
        let mut g = SurrogateGroups::new();
        g.insert("Ce".into(), vec![member("La", "Good"), member("Ce", "self")]);
        g.insert("Zr".into(), vec![member("Zr", "self")]);
        g
    }

    fn amount(atom_density: f64, mole_percent: f64) -> ElementAmount {
        ElementAmount { atom_density, mole_percent }
    }

    #[test]
    fn test_condense_sums_and_shares() {
        let mut step = BTreeMap::new();
        step.insert("La".to_string(), amount(1.0, 10.0));
        step.insert("Ce".to_string(), amount(3.0, 30.0));
        step.insert("Xe".to_string(), amount(0.5, 5.0));
        let mut inv = Inventory::new();
        inv.insert("0".into(), step);

        let out = condense(&groups(), &inv).unwrap();
        let ce = out.surrogate_vector["0"]["ce"];
        assert!((ce.atom_density - 4.0).abs() < 1e-12);
        assert!((ce.mole_percent - 40.0).abs() < 1e-12);

        let la = out.surrogate_percentages["0"]["ce"]["la"];
        assert!((la.contribution_percentage - 25.0).abs() < 1e-12);

        // Surrogates absent from the timestep still appear with zero totals
        assert_eq!(out.surrogate_vector["0"]["zr"], SurrogateTotals::default());
        assert_eq!(out.unmapped["0"], vec!["xe".to_string()]);
    }

    #[test]
    fn test_overlapping_groups_rejected() {
        let mut g = groups();
        g.get_mut("Zr").unwrap().push(member("La", "Poor"));
        assert!(matches!(condense(&g, &Inventory::new()), Err(SurrogateError::InvalidInput(_))));
    }

    #[test]
    fn test_load_wrapped_and_plain() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.json");
        std::fs::write(&plain, r#"{"1": {"Ce": {"atom_density": 2.0, "mole_percent": 1.0}}}"#).unwrap();
        let wrapped = dir.path().join("wrapped.json");
        std::fs::write(
            &wrapped,
            r#"{"surrogate_vector": {"1": {"Ce": {"atom_density": 2.0, "mole_percent": 1.0}}}}"#,
        )
        .unwrap();

        let a = load_inventory(&plain).unwrap();
        let b = load_inventory(&wrapped).unwrap();
        assert_eq!(a, b);
        assert_eq!(a["1"]["Ce"].atom_density, 2.0);
    }
}
