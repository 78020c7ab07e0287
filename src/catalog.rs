//! Logbook catalogue loading.
//!
//! Logbooks are CSV exports with one row per plate. Column headers are long
//! free-text descriptions ("RA (1950) from the journal"); only their first
//! word is used as the field name, so headers are matched by first token
//! and then mapped onto the canonical field names of [`PlateRecord`].

use crate::constants::fields;
use crate::error::{PlateError, Result};
use crate::models::PlateRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// All plates of every logbook in a directory, indexed by plate id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    plates: HashMap<String, PlateRecord>,
    files_loaded: usize,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.csv` logbook in `dir`
    pub fn load_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(PlateError::LogbookNotFound {
                path: dir.to_path_buf(),
            });
        }

        let escaped = PathBuf::from(glob::Pattern::escape(&dir.to_string_lossy()));
        let pattern = escaped.join("*.csv");
        let pattern = pattern.to_string_lossy();
        let mut paths: Vec<PathBuf> = glob::glob(&pattern)
            .map_err(|e| PlateError::Configuration {
                message: format!("Invalid logbook pattern {}: {}", pattern, e),
            })?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Skipping unreadable logbook entry: {}", e);
                    None
                }
            })
            .collect();
        paths.sort();
        if paths.is_empty() {
            warn!("No logbooks found in {}", dir.display());
        }

        let mut catalog = Self::new();
        for path in &paths {
            catalog.load_file(path)?;
        }

        debug!(
            "Loaded {} plates from {} logbooks in {}",
            catalog.plates.len(),
            catalog.files_loaded,
            dir.display()
        );
        Ok(catalog)
    }

    /// Load a single logbook; rows are tagged with the file stem
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let source_key = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.split('.').next())
            .unwrap_or("unknown")
            .to_string();

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| PlateError::csv(path, e))?;

        let field_names: Vec<String> = reader
            .headers()
            .map_err(|e| PlateError::csv(path, e))?
            .iter()
            .map(canonical_field_name)
            .collect();

        let mut loaded = 0;
        for (row_num, row) in reader.records().enumerate() {
            let row = row.map_err(|e| PlateError::csv(path, e))?;

            let mut record = PlateRecord::new(String::new(), source_key.clone());
            for (name, value) in field_names.iter().zip(row.iter()) {
                record.fields.insert(name.clone(), value.to_string());
            }

            let plate_id = record.field(fields::ID).map(str::trim).unwrap_or("");
            if plate_id.is_empty() {
                warn!(
                    "Row {} of {} has no plate id, skipping",
                    row_num + 2,
                    path.display()
                );
                continue;
            }
            record.plate_id = plate_id.to_string();

            if let Some(previous) = self.plates.insert(record.plate_id.clone(), record) {
                warn!(
                    "Plate {} from {} replaced by a later row in {}",
                    previous.plate_id,
                    previous.source_file,
                    path.display()
                );
            }
            loaded += 1;
        }

        self.files_loaded += 1;
        debug!("Read {} plates from {}", loaded, path.display());
        Ok(loaded)
    }

    pub fn get(&self, plate_id: &str) -> Result<&PlateRecord> {
        self.plates
            .get(plate_id)
            .ok_or_else(|| PlateError::PlateNotFound {
                plate_id: plate_id.to_string(),
            })
    }

    pub fn contains(&self, plate_id: &str) -> bool {
        self.plates.contains_key(plate_id)
    }

    pub fn len(&self) -> usize {
        self.plates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plates.is_empty()
    }

    pub fn files_loaded(&self) -> usize {
        self.files_loaded
    }

    /// Plates sorted by id
    pub fn plates(&self) -> Vec<&PlateRecord> {
        let mut plates: Vec<&PlateRecord> = self.plates.values().collect();
        plates.sort_by(|a, b| a.plate_id.cmp(&b.plate_id));
        plates
    }
}

/// Map a logbook column header onto a canonical field name
///
/// The first whitespace-separated token is kept; blank headers become
/// `EMPTY`, the Russian identifier column becomes `ID`, and known
/// alternative spellings are folded onto their canonical names.
pub fn canonical_field_name(header: &str) -> String {
    let token = header
        .trim_start_matches('\u{feff}')
        .split_whitespace()
        .next()
        .unwrap_or(fields::EMPTY_HEADER);

    if token == fields::RUSSIAN_ID_HEADER {
        return fields::ID.to_string();
    }

    let upper = token.to_uppercase();
    fields::ALIASES
        .iter()
        .find(|(alias, _)| *alias == upper)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_canonical_field_name_first_token() {
        assert_eq!(canonical_field_name("RA (1950) from journal"), "RA");
        assert_eq!(canonical_field_name("DEC"), "DEC");
        assert_eq!(canonical_field_name(""), "EMPTY");
        assert_eq!(canonical_field_name("   "), "EMPTY");
    }

    #[test]
    fn test_canonical_field_name_identifier_and_aliases() {
        assert_eq!(canonical_field_name("Идентификационный номер"), "ID");
        assert_eq!(canonical_field_name("\u{feff}Идентификационный номер"), "ID");
        assert_eq!(canonical_field_name("Exptime, total"), "Exptime,");
        assert_eq!(canonical_field_name("exptime of plate"), "EXP");
        assert_eq!(canonical_field_name("TELESCOP name"), "TELESCOPE");
    }

    #[test]
    fn test_load_dir_indexes_by_id() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("fai50mak.csv"),
            "Идентификационный номер,RA of centre,DEC of centre,DATE observed,EXP time\n\
             GAF001,05h33m,-01 28,31.12.65-01.01.66,1h;2h;3h\n\
             GAF002,06h00m,+10 00,01.02.66,30m\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = Catalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.files_loaded(), 1);

        let plate = catalog.get("GAF001").unwrap();
        assert_eq!(plate.source_file, "fai50mak");
        assert_eq!(plate.field("RA"), Some("05h33m"));
        assert_eq!(plate.field("EXP"), Some("1h;2h;3h"));
        assert_eq!(plate.field("DATE"), Some("31.12.65-01.01.66"));
    }

    #[test]
    fn test_rows_without_id_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("book.csv"),
            "ID,RA\n,05h33m\nP1,06h00m\n",
        )
        .unwrap();

        let catalog = Catalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains("P1"));
    }

    #[test]
    fn test_later_rows_replace_duplicates() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.csv"), "ID,RA\nP1,05h33m\n").unwrap();
        fs::write(dir.path().join("b.csv"), "ID,RA\nP1,06h00m\n").unwrap();

        let catalog = Catalog::load_dir(dir.path()).unwrap();
        let plate = catalog.get("P1").unwrap();
        assert_eq!(plate.field("RA"), Some("06h00m"));
        assert_eq!(plate.source_file, "b");
    }

    #[test]
    fn test_load_dir_with_glob_characters_in_name() {
        let temp_dir = TempDir::new().unwrap();
        let logs = temp_dir.path().join("logs[1965]");
        fs::create_dir_all(&logs).unwrap();
        fs::write(logs.join("book.csv"), "ID,RA\nP1,05h33m\n").unwrap();

        let catalog = Catalog::load_dir(&logs).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.files_loaded(), 1);
        assert!(catalog.contains("P1"));
    }

    #[test]
    fn test_directory_without_logbooks_is_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = Catalog::load_dir(dir.path()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.files_loaded(), 0);
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let result = Catalog::load_dir(&dir.path().join("absent"));
        assert!(matches!(result, Err(PlateError::LogbookNotFound { .. })));
    }

    #[test]
    fn test_unknown_plate() {
        let catalog = Catalog::new();
        assert!(matches!(
            catalog.get("X"),
            Err(PlateError::PlateNotFound { .. })
        ));
    }
}
