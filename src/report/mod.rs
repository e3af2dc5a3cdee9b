// src/report/mod.rs
pub mod augment;
pub mod groups;
pub mod text;

pub use augment::{augment, default_output_path, write_table, MATCH_QUALITY_COLUMN, SURROGATE_COLUMN};
pub use groups::{load_groups, surrogate_groups, write_groups, GroupMember, SurrogateGroups};
pub use text::render;

use crate::error::Result;
use std::fs;
use std::path::Path;

/// Writes the rendered report text.
pub fn write_report(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text)?;
    log::info!("Mapping report saved to {}", path.display());
    Ok(())
}
