//! Plate Annotator Library
//!
//! Normalizes the hand-written observation logbooks of astronomical
//! photographic plate archives into standardized FITS header cards.
//!
//! This library provides tools for:
//! - Parsing exposure durations, clock times, coordinates and dates written in many notations
//! - Splitting multi-exposure logbook cells and expanding them into numbered cards
//! - Loading logbook CSV exports and telescope/observer translation tables
//! - Rendering FITS header sidecars for scanned plates, in parallel

pub mod cards;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod models;
pub mod normalize;
pub mod parsers;
pub mod processor;
pub mod tables;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use catalog::Catalog;
pub use config::AnnotatorConfig;
pub use error::{PlateError, Result};
pub use header::PlateHeader;
pub use models::{CardSet, CardValue, PlateRecord, ProcessingStats};
pub use normalize::{NormalizedPlate, PlateNormalizer};
pub use processor::BatchProcessor;
pub use tables::{TelescopeSpec, TranslationTables};
