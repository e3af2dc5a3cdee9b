// src/lib.rs

//! Maps every element of a periodic table catalog onto a small set of
//! reference surrogates by comparing standard reduction potentials on
//! shared oxidation-state transitions, with electronegativity and melting
//! point as fallbacks.

pub mod config;
pub mod error;
pub mod inventory;
pub mod io;
pub mod matching;
pub mod model;
pub mod report;
pub mod utils;

pub use error::{Result, SurrogateError};
