//! Image discovery for plate scan directories
//!
//! Finds scanned plate images below a directory and derives the plate id
//! each file name carries.

use crate::error::{PlateError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Image discovery component for plate scan directories
#[derive(Debug)]
pub struct ImageDiscovery {
    images_dir: PathBuf,
    extensions: Vec<String>,
}

impl ImageDiscovery {
    pub fn new(images_dir: PathBuf, extensions: Vec<String>) -> Self {
        Self {
            images_dir,
            extensions,
        }
    }

    /// Find every image below the directory, sorted by path
    ///
    /// Scans are named after the logbook and the plate they come from:
    /// ```text
    /// scans/
    ///   1965/
    ///     fai50mak_GAF001.fit
    ///     fai50mak_GAF001.fit.hdr
    ///     fai50mak_GAF002.fits
    /// ```
    pub fn discover_images(&self) -> Result<Vec<PathBuf>> {
        if !self.images_dir.is_dir() {
            return Err(PlateError::ImageDirNotFound {
                path: self.images_dir.clone(),
            });
        }

        debug!("Searching for images in: {}", self.images_dir.display());

        let mut images = Vec::new();
        for entry in WalkDir::new(&self.images_dir) {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && self.is_image(path) {
                        images.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    warn!(
                        "Error walking directory {}: {}",
                        self.images_dir.display(),
                        e
                    );
                }
            }
        }

        images.sort();
        debug!("Found {} images", images.len());
        Ok(images)
    }

    fn is_image(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// Plate id carried by an image file name
///
/// The id is the last `_`-separated part of the second-to-last
/// `.`-separated component: `fai50mak_GAF001.fit` gives `GAF001`.
pub fn plate_id_from_path(path: &Path) -> Result<String> {
    let invalid = || PlateError::InvalidImageName {
        path: path.to_path_buf(),
    };

    let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() < 2 {
        return Err(invalid());
    }

    let plate_id = parts[parts.len() - 2]
        .rsplit('_')
        .next()
        .unwrap_or_default()
        .trim();
    if plate_id.is_empty() {
        return Err(invalid());
    }
    Ok(plate_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_plate_id_from_path() {
        assert_eq!(
            plate_id_from_path(Path::new("/scans/fai50mak_GAF001.fit")).unwrap(),
            "GAF001"
        );
        assert_eq!(plate_id_from_path(Path::new("GAF002.fits")).unwrap(), "GAF002");
        assert_eq!(
            plate_id_from_path(Path::new("a_b.c_PLATE7.fit")).unwrap(),
            "PLATE7"
        );
    }

    #[test]
    fn test_plate_id_from_bad_names() {
        assert!(matches!(
            plate_id_from_path(Path::new("noextension")),
            Err(PlateError::InvalidImageName { .. })
        ));
        assert!(plate_id_from_path(Path::new("logbook_.fit")).is_err());
    }

    #[test]
    fn test_discover_images_filters_extensions() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("1965");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("fai50mak_GAF001.fit"), b"").unwrap();
        fs::write(nested.join("fai50mak_GAF001.fit.hdr"), b"").unwrap();
        fs::write(dir.path().join("fai50mak_GAF002.FITS"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let discovery = ImageDiscovery::new(
            dir.path().to_path_buf(),
            vec!["fit".to_string(), "fits".to_string()],
        );
        let images = discovery.discover_images().unwrap();

        assert_eq!(images.len(), 2);
        assert!(images.iter().all(|p| p.extension().unwrap() != "hdr"));
    }

    #[test]
    fn test_missing_image_directory() {
        let dir = TempDir::new().unwrap();
        let discovery = ImageDiscovery::new(dir.path().join("absent"), vec!["fit".to_string()]);
        assert!(matches!(
            discovery.discover_images(),
            Err(PlateError::ImageDirNotFound { .. })
        ));
    }
}
