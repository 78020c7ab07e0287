//! Static translation tables for telescope and observer names.
//!
//! Logbooks name telescopes and observers the way the observers wrote them,
//! often transliterated or abbreviated. The tables translate those spellings
//! into canonical labels and attach the optical parameters of each
//! telescope. They are built once, wrapped in an `Arc` and only read
//! afterwards; every miss is a hard [`PlateError::Lookup`].

use crate::constants::{
    OBSERVER_NAMES_FILE, TELESCOPE_NAMES_FILE, TELESCOPE_SPECS_FILE, tables,
};
use crate::error::{PlateError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Optical parameters of a telescope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelescopeSpec {
    pub name: String,
    /// Focal length in metres
    pub focal_length: f64,
    /// Plate size in centimetres
    pub plate_width: f64,
    pub plate_height: f64,
    /// Field of view in degrees
    pub field_width: f64,
    pub field_height: f64,
    /// Corrector plate diameter in metres
    pub corrector_diameter: f64,
    /// Primary mirror diameter in metres
    pub mirror_diameter: f64,
}

/// One display-name → canonical-name row of a translation CSV
#[derive(Debug, Deserialize)]
struct NameRow {
    display_name: String,
    canonical_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct TranslationTables {
    telescope_names: HashMap<String, String>,
    telescope_specs: HashMap<String, TelescopeSpec>,
    observer_names: HashMap<String, String>,
}

impl TranslationTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_telescope_name(
        mut self,
        display_name: impl Into<String>,
        canonical_name: impl Into<String>,
    ) -> Self {
        self.telescope_names
            .insert(normalize_key(&display_name.into()), canonical_name.into());
        self
    }

    pub fn with_telescope(mut self, spec: TelescopeSpec) -> Self {
        self.telescope_specs.insert(spec.name.clone(), spec);
        self
    }

    pub fn with_observer(
        mut self,
        display_name: impl Into<String>,
        canonical_name: impl Into<String>,
    ) -> Self {
        self.observer_names
            .insert(normalize_key(&display_name.into()), canonical_name.into());
        self
    }

    /// Load the three tables from CSV files in `dir`
    ///
    /// ```text
    /// dir/
    ///   telescope_names.csv   display_name,canonical_name
    ///   telescopes.csv        name,focal_length,plate_width,...
    ///   observers.csv         display_name,canonical_name
    /// ```
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut tables = Self::new();

        for row in read_rows::<NameRow>(&dir.join(TELESCOPE_NAMES_FILE))? {
            tables = tables.with_telescope_name(row.display_name, row.canonical_name);
        }
        for spec in read_rows::<TelescopeSpec>(&dir.join(TELESCOPE_SPECS_FILE))? {
            tables = tables.with_telescope(spec);
        }
        for row in read_rows::<NameRow>(&dir.join(OBSERVER_NAMES_FILE))? {
            tables = tables.with_observer(row.display_name, row.canonical_name);
        }

        debug!(
            "Loaded translation tables from {}: {} telescope names, {} telescopes, {} observers",
            dir.display(),
            tables.telescope_names.len(),
            tables.telescope_specs.len(),
            tables.observer_names.len()
        );
        Ok(tables)
    }

    /// Canonical English name for a telescope as written in the logbook
    pub fn telescope_name(&self, display_name: &str) -> Result<&str> {
        self.telescope_names
            .get(&normalize_key(display_name))
            .map(String::as_str)
            .ok_or_else(|| PlateError::lookup(tables::TELESCOPE_NAMES, display_name))
    }

    /// Optical parameters for a canonical telescope name
    pub fn telescope_spec(&self, canonical_name: &str) -> Result<&TelescopeSpec> {
        self.telescope_specs
            .get(canonical_name)
            .ok_or_else(|| PlateError::lookup(tables::TELESCOPE_SPECS, canonical_name))
    }

    /// Canonical transliterated name for an observer as written in the logbook
    pub fn observer_name(&self, display_name: &str) -> Result<&str> {
        self.observer_names
            .get(&normalize_key(display_name))
            .map(String::as_str)
            .ok_or_else(|| PlateError::lookup(tables::OBSERVER_NAMES, display_name))
    }

    pub fn telescope_count(&self) -> usize {
        self.telescope_specs.len()
    }

    pub fn observer_count(&self) -> usize {
        self.observer_names.len()
    }
}

/// Collapse runs of whitespace so `"Иванов  И.И."` and `"Иванов И.И."` match
fn normalize_key(key: &str) -> String {
    key.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(PlateError::Configuration {
            message: format!("Translation table not found: {}", path.display()),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| PlateError::csv(path, e))?;

    reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| PlateError::csv(path, e))
}
