//src/model/mod.rs
pub mod catalog;
pub mod element;

// Re-exports for cleaner imports
pub use catalog::Catalog;
pub use element::{Element, RedoxEntry, RedoxTable, TransitionKey};
