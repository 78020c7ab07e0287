//! Error handling for plate normalization.
//!
//! `Format` and `Lookup` are the two domain failures raised by the parsers
//! and translation tables; the remaining variants belong to the catalogue,
//! header writing and batch layers.

use crate::models::FieldKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid {kind} '{text}': {reason}")]
    Format {
        kind: FieldKind,
        text: String,
        reason: String,
    },

    #[error("No entry for '{key}' in {table} table")]
    Lookup { table: String, key: String },

    #[error("Plate {plate_id} has no '{field}' field")]
    MissingField { plate_id: String, field: String },

    #[error("Plate {plate_id} not found in logbook catalogue")]
    PlateNotFound { plate_id: String },

    #[error("Cannot derive plate id from file name: {path}")]
    InvalidImageName { path: PathBuf },

    #[error("Logbook directory not found at path: {path}")]
    LogbookNotFound { path: PathBuf },

    #[error("Image directory not found at path: {path}")]
    ImageDirNotFound { path: PathBuf },

    #[error("Header rendering failed for card {keyword}: {reason}")]
    InvalidCard { keyword: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl PlateError {
    /// Build a format error for text rejected by a grammar
    pub fn format(kind: FieldKind, text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            kind,
            text: text.into(),
            reason: reason.into(),
        }
    }

    /// Build a lookup error for a translation table miss
    pub fn lookup(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Lookup {
            table: table.into(),
            key: key.into(),
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// True for failures caused by the logbook text itself rather than the environment
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::Format { .. } | Self::Lookup { .. } | Self::MissingField { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PlateError>;
