// src/report/text.rs

use crate::config::MatchPolicy;
use crate::matching::{MappingReport, MatchResult, TargetMapping};
use crate::model::{Catalog, Element};

const WIDE: &str = "================================================================================";
const RULE: &str = "========================================";
const THIN: &str = "----------------------------------------";

fn name_of<'a>(catalog: &'a Catalog, symbol: &str) -> &'a str {
    catalog.get(symbol).map(|e| e.name.as_str()).unwrap_or("?")
}

fn fmt_delta(v: Option<f64>, precision: usize, unit: &str) -> String {
    match v {
        Some(x) => format!("{:.*}{}", precision, x, unit),
        None => "n/a".to_string(),
    }
}

fn push_redox_table(out: &mut String, title: &str, element: &Element, policy: &MatchPolicy) {
    out.push_str(&format!("{} Keys and Standard Potentials ({}):\n", title, element.symbol));
    if element.redox.is_empty() {
        out.push_str("  (none)\n");
        return;
    }
    for entry in element.redox.entries() {
        match entry.potential {
            Some(p) if policy.is_suspect_potential(p) => {
                out.push_str(&format!("  {}: {:.3} (suspect, not scored)\n", entry.key, p));
            }
            Some(p) => out.push_str(&format!("  {}: {:.3}\n", entry.key, p)),
            None => out.push_str(&format!("  {}: unknown\n", entry.key)),
        }
    }
}

fn push_candidate(
    out: &mut String,
    rank: usize,
    m: &MatchResult,
    target: &Element,
    catalog: &Catalog,
    policy: &MatchPolicy,
) {
    out.push_str(&format!(
        "\n#{} Candidate: {} ({})\n",
        rank + 1,
        m.candidate,
        name_of(catalog, &m.candidate)
    ));
    out.push_str(&format!("Match Quality: {} {}\n", m.tier.symbol(), m.tier));
    out.push_str(&format!("Reason: {}\n", m.reason));

    let shared: Vec<&str> = m.shared_keys.iter().map(|k| k.as_str()).collect();
    out.push_str(&format!(
        "Shared Keys: {}\n",
        if shared.is_empty() { "none".to_string() } else { shared.join(", ") }
    ));

    out.push_str("Differences:\n");
    out.push_str(&format!("  Standard Potential: {}\n", fmt_delta(m.potential_delta, 3, " V")));
    out.push_str(&format!("  Electronegativity:  {}\n", fmt_delta(m.electronegativity_delta, 3, "")));
    out.push_str(&format!("  Electron Affinity:  {}\n", fmt_delta(m.electron_affinity_delta, 3, "")));
    out.push_str(&format!("  Melting Point:      {}\n", fmt_delta(m.melting_point_delta, 1, "K")));

    out.push('\n');
    if let Ok(candidate) = catalog.get(&m.candidate) {
        push_redox_table(out, "Candidate", candidate, policy);
    }
    push_redox_table(out, "Target", target, policy);
    out.push_str(THIN);
    out.push('\n');
}

fn push_target(out: &mut String, mapping: &TargetMapping, catalog: &Catalog, policy: &MatchPolicy) {
    out.push_str(&format!("\n{}\n", RULE));
    out.push_str(&format!(
        "Target: {} ({})\n",
        mapping.target,
        name_of(catalog, &mapping.target)
    ));
    out.push_str(&format!("{}\n", RULE));

    if mapping.reference {
        out.push_str("Reference surrogate: represents itself (self)\n");
    }
    match mapping.best() {
        Some(best) if !mapping.reference => {
            out.push_str(&format!("Assigned Surrogate: {} ({})\n", best.candidate, best.tier));
        }
        None if !mapping.reference => out.push_str("No surrogate candidates (Unmatched)\n"),
        None => out.push_str("No surrogate candidates\n"),
        _ => {}
    }

    let target = match catalog.get(&mapping.target) {
        Ok(t) => t,
        Err(_) => return,
    };
    for (rank, m) in mapping.candidates.iter().enumerate() {
        push_candidate(out, rank, m, target, catalog, policy);
    }
}

/// Renders the full mapping report. Output depends only on the report,
/// catalog and policy, so identical input renders identical text.
pub fn render(report: &MappingReport, catalog: &Catalog, policy: &MatchPolicy) -> String {
    let mut out = String::new();
    out.push_str("Surrogate Mapping Report\n");
    out.push_str(WIDE);
    out.push('\n');
    out.push_str(&format!(
        "Elements: {}   Reference surrogates: {}\n",
        catalog.len(),
        catalog.references().count()
    ));
    out.push_str(&format!(
        "Thresholds: Good <= {:.3} V, Decent <= {:.3} V, Poor: electronegativity < {:.3} or melting point < {:.1} K\n",
        policy.good_potential_max,
        policy.decent_potential_max,
        policy.poor_electronegativity_max,
        policy.poor_melting_point_max
    ));
    out.push_str(&format!(
        "Potentials beyond +/-{:.1} V are flagged as suspect and not scored\n",
        policy.suspect_potential_abs
    ));

    for mapping in &report.targets {
        push_target(&mut out, mapping, catalog, policy);
    }

    out.push_str(&format!("\n{}\nSummary\n{}\n", WIDE, THIN));
    for (tier, count) in report.tier_counts() {
        out.push_str(&format!("{:<10} {:>4}\n", tier.as_str(), count));
    }
    out
}
