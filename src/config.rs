//! Configuration for plate normalization and batch annotation.
//!
//! Holds the per-field policies the normalizer applies, the observatory
//! identity written into every header, and the batch processing knobs
//! exposed on the command line.

use crate::constants::{
    DEFAULT_IMAGE_EXTENSIONS, DEFAULT_OBSERVATORY, DEFAULT_ORIGIN, DEFAULT_SITE_ELEVATION,
    DEFAULT_SITE_LATITUDE, DEFAULT_SITE_LONGITUDE, UNKNOWN_EXPOSURE,
};
use crate::error::{PlateError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What to do with an optional logbook field whose cell is blank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmptyFieldPolicy {
    /// Emit no cards for the field
    Omit,
    /// Reject the plate
    Reject,
}

/// Observatory identity and site, written as static header cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservatoryConfig {
    pub origin: String,
    pub observatory: String,
    /// East longitude in degrees
    pub site_longitude: f64,
    /// Latitude in degrees
    pub site_latitude: f64,
    /// Elevation in metres
    pub site_elevation: f64,
}

impl Default for ObservatoryConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            observatory: DEFAULT_OBSERVATORY.to_string(),
            site_longitude: DEFAULT_SITE_LONGITUDE,
            site_latitude: DEFAULT_SITE_LATITUDE,
            site_elevation: DEFAULT_SITE_ELEVATION,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    /// Number of plates normalized concurrently
    pub workers: usize,

    /// Value recorded for a blank exposure cell or a polarisation series;
    /// None rejects such plates instead
    pub exposure_unknown: Option<f64>,

    /// Treatment of blank optional fields (clock times, object, observer, telescope)
    pub empty_optional: EmptyFieldPolicy,

    /// Accept `,` as an item separator in the exposure column
    pub exposure_comma_separator: bool,

    /// Rewrite headers for images that already have one
    pub force_reprocess: bool,

    /// Image file extensions to annotate, without the dot
    pub image_extensions: Vec<String>,

    pub observatory: ObservatoryConfig,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            exposure_unknown: Some(UNKNOWN_EXPOSURE),
            empty_optional: EmptyFieldPolicy::Omit,
            exposure_comma_separator: true,
            force_reprocess: false,
            image_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            observatory: ObservatoryConfig::default(),
        }
    }
}

impl AnnotatorConfig {
    /// Create configuration with custom worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Reject plates with blank or polarisation exposures instead of recording a sentinel
    pub fn with_strict_exposure(mut self) -> Self {
        self.exposure_unknown = None;
        self
    }

    /// Set the sentinel recorded for unknown exposures
    pub fn with_exposure_unknown(mut self, sentinel: f64) -> Self {
        self.exposure_unknown = Some(sentinel);
        self
    }

    pub fn with_empty_optional(mut self, policy: EmptyFieldPolicy) -> Self {
        self.empty_optional = policy;
        self
    }

    /// Enable force reprocessing
    pub fn with_force_reprocess(mut self) -> Self {
        self.force_reprocess = true;
        self
    }

    pub fn with_image_extensions(mut self, extensions: Vec<String>) -> Self {
        self.image_extensions = extensions;
        self
    }

    pub fn with_observatory(mut self, observatory: ObservatoryConfig) -> Self {
        self.observatory = observatory;
        self
    }

    /// Check the configuration for values the batch processor cannot use
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(PlateError::Configuration {
                message: "workers must be at least 1".to_string(),
            });
        }
        if self.image_extensions.is_empty() {
            return Err(PlateError::Configuration {
                message: "at least one image extension is required".to_string(),
            });
        }
        if !(-90.0..=90.0).contains(&self.observatory.site_latitude) {
            return Err(PlateError::Configuration {
                message: format!(
                    "site latitude {} is out of range",
                    self.observatory.site_latitude
                ),
            });
        }
        if !(-180.0..=360.0).contains(&self.observatory.site_longitude) {
            return Err(PlateError::Configuration {
                message: format!(
                    "site longitude {} is out of range",
                    self.observatory.site_longitude
                ),
            });
        }

        debug!(
            "Configuration valid: {} workers, extensions {:?}",
            self.workers, self.image_extensions
        );
        Ok(())
    }

    /// True if `extension` is one of the configured image extensions (case-insensitive)
    pub fn is_image_extension(&self, extension: &str) -> bool {
        self.image_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
