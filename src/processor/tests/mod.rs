//! Integration tests for the processor module
//!
//! Tests the complete annotation pipeline using temporary logbook, table
//! and scan directories.


use crate::tables::{TelescopeSpec, TranslationTables};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Helper to create a logbook directory with one logbook
pub fn create_logbooks(temp_dir: &TempDir, content: &str) -> PathBuf {
    let logs = temp_dir.path().join("logs");
    fs::create_dir_all(&logs).unwrap();
    fs::write(logs.join("fai50mak.csv"), content).unwrap();
    logs
}

/// Helper to create empty scan files
pub fn create_images(temp_dir: &TempDir, names: &[&str]) -> PathBuf {
    let scans = temp_dir.path().join("scans");
    fs::create_dir_all(&scans).unwrap();
    for name in names {
        fs::write(scans.join(name), b"SIMPLE").unwrap();
    }
    scans
}

pub fn sidecar(scans: &Path, image: &str) -> PathBuf {
    scans.join(format!("{}.hdr", image))
}

pub fn test_tables() -> Arc<TranslationTables> {
    Arc::new(
        TranslationTables::new()
            .with_telescope_name("Мениск 50", "50cm Maksutov")
            .with_telescope(TelescopeSpec {
                name: "50cm Maksutov".to_string(),
                focal_length: 1.2,
                plate_width: 16.0,
                plate_height: 16.0,
                field_width: 7.6,
                field_height: 7.6,
                corrector_diameter: 0.5,
                mirror_diameter: 0.7,
            })
            .with_observer("Харитонов", "Kharitonov, A.V."),
    )
}

pub const LOGBOOK: &str = "\
Идентификационный номер,OBJECT name,RA of centre,DEC of centre,DATE observed,EXP time,OBSERVER,TELESCOPE
GAF001,M 42,05h33m,-01 28,31.12.65-01.01.66,1h;2h;3h,Харитонов,Мениск 50
GAF002,NGC 2264,06h38m,+09 50,02.01.66,30m,Харитонов,Мениск 50
GAF003,Pleiades,03h45m,+24 07,3.1.66,oops,Харитонов,Мениск 50
";
