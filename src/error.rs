// src/error.rs

use thiserror::Error;

/// Errors raised while loading, matching and writing surrogate data.
///
/// A target with no surrogate candidates is not an error; it is reported as
/// `Unmatched`.
#[derive(Debug, Error)]
pub enum SurrogateError {
    /// Required column missing, required value unparseable, duplicate symbol.
    #[error("schema error: {0}")]
    Schema(String),

    /// Lookup of an element that is not in the catalog.
    #[error("element not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bad arguments or malformed auxiliary input (inventory, groups)
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, SurrogateError>;
