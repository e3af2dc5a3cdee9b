// src/config.rs

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::error::{Result, SurrogateError};

// --- Policy constants ---

/// Max potential delta (V) on a shared transition key for a Good match.
pub const GOOD_POTENTIAL_MAX: f64 = 0.4;
/// Max potential delta (V) on a shared transition key for a Decent match.
pub const DECENT_POTENTIAL_MAX: f64 = 1.5;
/// Electronegativity delta (Pauling) below which a Poor match is accepted.
pub const POOR_ELECTRONEGATIVITY_MAX: f64 = 0.5;
/// Melting point delta (K) below which a Poor match is accepted.
pub const POOR_MELTING_POINT_MAX: f64 = 200.0;
/// Standard potentials beyond this magnitude (V) are data artifacts.
pub const SUSPECT_POTENTIAL_ABS: f64 = 20.0;
/// Slack applied to every threshold comparison.
pub const THRESHOLD_TOLERANCE: f64 = 1e-9;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidatePool {
  /// Every other element in the catalog
  All,
  /// Only elements flagged as reference surrogates in the input table
  References,
}

// --- MatchPolicy ---

/// Missing fields in a settings file fall back to the defaults one by one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPolicy {
  pub good_potential_max: f64,
  pub decent_potential_max: f64,
  pub poor_electronegativity_max: f64,
  pub poor_melting_point_max: f64,
  pub suspect_potential_abs: f64,
  pub candidate_pool: CandidatePool,
}

impl Default for MatchPolicy {
  fn default() -> Self {
    Self {
      good_potential_max: GOOD_POTENTIAL_MAX,
      decent_potential_max: DECENT_POTENTIAL_MAX,
      poor_electronegativity_max: POOR_ELECTRONEGATIVITY_MAX,
      poor_melting_point_max: POOR_MELTING_POINT_MAX,
      suspect_potential_abs: SUSPECT_POTENTIAL_ABS,
      candidate_pool: CandidatePool::All,
    }
  }
}

impl MatchPolicy {
  /// `value <= limit`, tolerant to decimal round-off.
  pub fn within_inclusive(value: f64, limit: f64) -> bool {
    value <= limit + THRESHOLD_TOLERANCE
  }

  /// `value < limit`, tolerant to decimal round-off.
  pub fn within_strict(value: f64, limit: f64) -> bool {
    value < limit - THRESHOLD_TOLERANCE
  }

  pub fn is_suspect_potential(&self, potential: f64) -> bool {
    !potential.is_finite() || potential.abs() > self.suspect_potential_abs
  }
}

// --- SchemaConfig ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
  /// Fraction of rows allowed to fail required-field parsing before the
  /// load is aborted. 0.0 aborts on the first bad row.
  pub max_bad_row_fraction: f64,
}

impl Default for SchemaConfig {
  fn default() -> Self {
    Self {
      max_bad_row_fraction: 0.0,
    }
  }
}

// --- Main Config Struct ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
  #[serde(default)]
  pub policy: MatchPolicy,

  #[serde(default)]
  pub schema: SchemaConfig,

  #[serde(default = "default_log_level")]
  pub log_level: String,
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Default for Config {
  fn default() -> Self {
    Self {
      policy: MatchPolicy::default(),
      schema: SchemaConfig::default(),
      log_level: default_log_level(),
    }
  }
}

impl Config {
  /// Loads config from `explicit`, or from the standard OS location
  /// (e.g. ~/.config/salt-surrogate/settings.json). A missing file gives
  /// the defaults; a file that exists but cannot be read is an error.
  /// The returned string describes where the settings came from.
  pub fn load(explicit: Option<&Path>) -> Result<(Self, String)> {
    let path = match explicit {
      Some(p) => p.to_path_buf(),
      None => Self::get_path(),
    };
    if path.exists() {
      let cfg = Self::from_path(&path).map_err(|e| {
        SurrogateError::InvalidInput(format!("config {}: {}", path.display(), e))
      })?;
      Ok((cfg, format!("Config loaded from {:?}", path)))
    } else {
      Ok((
        Self::default(),
        "No config found. Using defaults.".to_string(),
      ))
    }
  }

  pub fn from_path(path: &Path) -> Result<Self> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
  }

  /// Saves config to `explicit` or the standard OS location.
  pub fn save(&self, explicit: Option<&Path>) -> Result<PathBuf> {
    let path = match explicit {
      Some(p) => p.to_path_buf(),
      None => Self::get_path(),
    };
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)?;
      }
    }
    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(writer, self)?;
    Ok(path)
  }

  pub fn log_filter(&self) -> log::LevelFilter {
    self.log_level.parse().unwrap_or(log::LevelFilter::Info)
  }

  fn get_path() -> PathBuf {
    if let Some(proj) = ProjectDirs::from("org", "saltsurrogate", "salt-surrogate") {
      proj.config_dir().join("settings.json")
    } else {
      PathBuf::from("settings.json")
    }
  }
}
