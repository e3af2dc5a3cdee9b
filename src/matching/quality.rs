// src/matching/quality.rs

use serde::Serialize;

/// Match quality tier, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum QualityTier {
    /// Reference element standing in for itself
    #[serde(rename = "self")]
    SelfRef,
    /// Shared transition key, potentials within 0.4 V
    Good,
    /// Shared transition key, potentials within 1.5 V or not comparable
    Decent,
    /// No shared key, similar electronegativity or melting point
    Poor,
    Unmatched,
}

impl QualityTier {
    /// Label written to the Match_Quality column.
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::SelfRef => "self",
            QualityTier::Good => "Good",
            QualityTier::Decent => "Decent",
            QualityTier::Poor => "Poor",
            QualityTier::Unmatched => "Unmatched",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            QualityTier::SelfRef => "=",
            QualityTier::Good => "✓",
            QualityTier::Decent => "~",
            QualityTier::Poor => "⚠",
            QualityTier::Unmatched => "✗",
        }
    }

    /// Sort key; lower is better.
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "self" => Some(QualityTier::SelfRef),
            "good" => Some(QualityTier::Good),
            "decent" => Some(QualityTier::Decent),
            "poor" => Some(QualityTier::Poor),
            "unmatched" => Some(QualityTier::Unmatched),
            _ => None,
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
