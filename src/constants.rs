//! Application constants for the plate annotator
//!
//! Canonical logbook field names, header keywords, sentinels and file
//! layout defaults used throughout the crate.

// =============================================================================
// Logbook Field Names
// =============================================================================

/// Canonical field names a `PlateRecord` is keyed by
pub mod fields {
    pub const ID: &str = "ID";
    pub const EXPOSURE: &str = "EXP";
    pub const RA: &str = "RA";
    pub const DEC: &str = "DEC";
    pub const DATE: &str = "DATE";
    pub const LT_START: &str = "LT-START";
    pub const LT_END: &str = "LT-END";
    pub const ST_START: &str = "ST-START";
    pub const ST_END: &str = "ST-END";
    pub const OBJECT: &str = "OBJECT";
    pub const OBSERVER: &str = "OBSERVER";
    pub const TELESCOPE: &str = "TELESCOPE";

    /// Fields every plate must carry
    pub const REQUIRED: &[&str] = &[EXPOSURE, RA, DEC, DATE];

    /// Logbook header identifying the plate id column
    pub const RUSSIAN_ID_HEADER: &str = "Идентификационный";

    /// Header used for columns whose name is blank
    pub const EMPTY_HEADER: &str = "EMPTY";

    /// Alternative first-token spellings seen in logbooks, mapped to canonical names
    pub const ALIASES: &[(&str, &str)] = &[
        ("EXPTIME", EXPOSURE),
        ("EXPOSURE", EXPOSURE),
        ("DATE-OBS", DATE),
        ("TMS", LT_START),
        ("TME", LT_END),
        ("STS", ST_START),
        ("STE", ST_END),
        ("TELESCOP", TELESCOPE),
    ];
}

// =============================================================================
// Header Keywords
// =============================================================================

/// Output header keywords; `*_PREFIX` values take a 1-based index suffix
pub mod keywords {
    pub const EXPTIME: &str = "EXPTIME";
    pub const EXPTIME_PREFIX: &str = "EXPTIM";
    pub const NUMEXP: &str = "NUMEXP";

    pub const DATEORIG: &str = "DATEORIG";
    pub const DATEORIG_PREFIX: &str = "DATEORI";

    pub const TMS_ORIG: &str = "TMS-ORIG";
    pub const TMS_ORIG_PREFIX: &str = "TMS-ORI";
    pub const TME_ORIG: &str = "TME-ORIG";
    pub const TME_ORIG_PREFIX: &str = "TME-ORI";
    pub const STS_ORIG: &str = "STS-ORIG";
    pub const STS_ORIG_PREFIX: &str = "STS-ORI";
    pub const STE_ORIG: &str = "STE-ORIG";
    pub const STE_ORIG_PREFIX: &str = "STE-ORI";
    pub const TIMEFORM: &str = "TIMEFORM";

    pub const RA_ORIG: &str = "RA-ORIG";
    pub const DEC_ORIG: &str = "DEC-ORIG";
    pub const RA_DEG: &str = "RA_DEG";
    pub const DEC_DEG: &str = "DEC_DEG";

    pub const OBJECT: &str = "OBJECT";
    pub const OBSERVER: &str = "OBSERVER";
    pub const TELESCOP: &str = "TELESCOP";
    pub const FOCLEN: &str = "FOCLEN";
    pub const PLATESZ1: &str = "PLATESZ1";
    pub const PLATESZ2: &str = "PLATESZ2";
    pub const FOV1: &str = "FOV1";
    pub const FOV2: &str = "FOV2";
    pub const APERTURE: &str = "APERTURE";
    pub const MIRRDIAM: &str = "MIRRDIAM";

    pub const ORIGIN: &str = "ORIGIN";
    pub const OBSERVAT: &str = "OBSERVAT";
    pub const SITELONG: &str = "SITELONG";
    pub const SITELAT: &str = "SITELAT";
    pub const SITEELEV: &str = "SITEELEV";
    pub const PLATENUM: &str = "PLATENUM";
}

// =============================================================================
// Sentinels and Defaults
// =============================================================================

/// Exposure value recorded when the logbook gives none, or a polarisation series
pub const UNKNOWN_EXPOSURE: f64 = 99999.0;

/// Marker for polarisation series in the exposure column
pub const POLARISATION_MARKER: char = '*';

/// Image extensions annotated by default
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["fit", "fits"];

/// Sidecar header extension appended to the image file name
pub const HEADER_EXTENSION: &str = "hdr";

/// Default observatory identity
pub const DEFAULT_OBSERVATORY: &str = "Fesenkov Astrophysical Institute";
pub const DEFAULT_ORIGIN: &str = "FAI plate archive";
pub const DEFAULT_SITE_LONGITUDE: f64 = 76.9573;
pub const DEFAULT_SITE_LATITUDE: f64 = 43.1775;
pub const DEFAULT_SITE_ELEVATION: f64 = 1450.0;

// =============================================================================
// Translation Table Files
// =============================================================================

pub const TELESCOPE_NAMES_FILE: &str = "telescope_names.csv";
pub const TELESCOPE_SPECS_FILE: &str = "telescopes.csv";
pub const OBSERVER_NAMES_FILE: &str = "observers.csv";

/// Table names reported by lookup errors
pub mod tables {
    pub const TELESCOPE_NAMES: &str = "telescope name";
    pub const TELESCOPE_SPECS: &str = "telescope specification";
    pub const OBSERVER_NAMES: &str = "observer name";
}

/// Application directory under the user config dir holding default tables
pub const APP_DIR_NAME: &str = "plate-annotator";

// =============================================================================
// FITS Layout
// =============================================================================

pub const FITS_CARD_LENGTH: usize = 80;
pub const FITS_BLOCK_LENGTH: usize = 2880;
pub const FITS_KEYWORD_LENGTH: usize = 8;
