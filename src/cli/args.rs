//! Command-line argument definitions for the plate annotator
//!
//! Defines the CLI interface using the clap derive API and maps flags onto
//! [`AnnotatorConfig`].

use crate::config::{AnnotatorConfig, EmptyFieldPolicy, ObservatoryConfig};
use crate::constants::APP_DIR_NAME;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the plate annotator
///
/// Normalizes hand-written observation logbooks of photographic plates and
/// writes standardized FITS header cards next to the plate scans.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "plate-annotator",
    version,
    about = "Normalize astronomical plate logbooks into FITS header cards",
    long_about = "Reads the CSV exports of hand-written plate logbooks, normalizes exposure \
                  times, coordinates, dates and clock readings into canonical values, and \
                  writes a FITS header sidecar (<image>.hdr) for every scanned plate."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Write header sidecars for every scanned plate in a directory
    Annotate(AnnotateArgs),
    /// Print the normalized cards of one plate
    Normalize(NormalizeArgs),
    /// Normalize every catalogue plate and report failures without writing anything
    Check(CheckArgs),
}

/// Output format for reports printed to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// FITS cards or a colored summary
    Text,
    /// JSON document
    Json,
}

/// Arguments shared by every command
#[derive(Debug, Clone, Parser)]
pub struct CommonArgs {
    /// Directory holding the logbook CSV exports
    #[arg(short = 'l', long = "logs", value_name = "PATH")]
    pub logs_dir: PathBuf,

    /// Directory holding the telescope and observer translation tables
    ///
    /// Defaults to the user configuration directory, e.g.
    /// ~/.config/plate-annotator/tables
    #[arg(short = 't', long = "tables", value_name = "PATH")]
    pub tables_dir: Option<PathBuf>,

    /// Reject plates with blank or polarisation exposures instead of recording 99999
    #[arg(long)]
    pub strict_exposure: bool,

    /// Value recorded for blank or polarisation exposures
    #[arg(
        long,
        value_name = "SECONDS",
        conflicts_with = "strict_exposure",
        allow_negative_numbers = true
    )]
    pub exposure_sentinel: Option<f64>,

    /// Reject plates with blank optional fields instead of omitting their cards
    #[arg(long)]
    pub reject_empty: bool,

    #[command(flatten)]
    pub observatory: ObservatoryArgs,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl CommonArgs {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Translation table directory, falling back to the user configuration directory
    pub fn resolve_tables_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.tables_dir {
            return Ok(dir.clone());
        }

        let config_dir =
            dirs::config_dir().context("Could not determine user configuration directory")?;
        let tables_dir = config_dir.join(APP_DIR_NAME).join("tables");
        if !tables_dir.exists() {
            anyhow::bail!(
                "Translation tables not found at {}. Pass --tables or create the directory.",
                tables_dir.display()
            );
        }
        Ok(tables_dir)
    }

    pub fn to_config(&self) -> AnnotatorConfig {
        let mut config = AnnotatorConfig::default();
        if self.strict_exposure {
            config = config.with_strict_exposure();
        }
        if let Some(sentinel) = self.exposure_sentinel {
            config = config.with_exposure_unknown(sentinel);
        }
        if self.reject_empty {
            config = config.with_empty_optional(EmptyFieldPolicy::Reject);
        }
        config.with_observatory(self.observatory.to_observatory())
    }
}

/// Observatory identity written into every header; unset flags keep the defaults
#[derive(Debug, Clone, Parser)]
#[command(next_help_heading = "Observatory")]
pub struct ObservatoryArgs {
    /// ORIGIN card value
    #[arg(long)]
    pub origin: Option<String>,

    /// OBSERVAT card value
    #[arg(long)]
    pub observatory: Option<String>,

    /// Site east longitude in degrees
    #[arg(long, value_name = "DEGREES", allow_negative_numbers = true)]
    pub site_longitude: Option<f64>,

    /// Site latitude in degrees
    #[arg(long, value_name = "DEGREES", allow_negative_numbers = true)]
    pub site_latitude: Option<f64>,

    /// Site elevation in metres
    #[arg(long, value_name = "METRES", allow_negative_numbers = true)]
    pub site_elevation: Option<f64>,
}

impl ObservatoryArgs {
    pub fn to_observatory(&self) -> ObservatoryConfig {
        let defaults = ObservatoryConfig::default();
        ObservatoryConfig {
            origin: self.origin.clone().unwrap_or(defaults.origin),
            observatory: self.observatory.clone().unwrap_or(defaults.observatory),
            site_longitude: self.site_longitude.unwrap_or(defaults.site_longitude),
            site_latitude: self.site_latitude.unwrap_or(defaults.site_latitude),
            site_elevation: self.site_elevation.unwrap_or(defaults.site_elevation),
        }
    }
}

/// Arguments for the annotate command
#[derive(Debug, Clone, Parser)]
pub struct AnnotateArgs {
    /// Directory holding the plate scans
    #[arg(value_name = "IMAGES_DIR")]
    pub images_dir: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of plates annotated concurrently (defaults to the CPU count)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Rewrite headers for images that already have one
    #[arg(short, long)]
    pub force: bool,

    /// Image extensions to annotate
    #[arg(long, value_delimiter = ',', default_value = "fit,fits")]
    pub extensions: Vec<String>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl AnnotateArgs {
    pub fn to_config(&self) -> AnnotatorConfig {
        let mut config = self
            .common
            .to_config()
            .with_image_extensions(self.extensions.clone());
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if self.force {
            config = config.with_force_reprocess();
        }
        config
    }
}

/// Arguments for the normalize command
#[derive(Debug, Clone, Parser)]
pub struct NormalizeArgs {
    /// Plate id as written in the logbook ID column
    #[arg(value_name = "PLATE_ID")]
    pub plate_id: String,

    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the check command
#[derive(Debug, Clone, Parser)]
pub struct CheckArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_args() {
        let args = Args::parse_from([
            "plate-annotator",
            "annotate",
            "/scans",
            "--logs",
            "/logs",
            "--tables",
            "/tables",
            "-w",
            "3",
            "--force",
            "--extensions",
            "fit,fts",
            "-vv",
        ]);

        match args.command {
            Some(Commands::Annotate(annotate)) => {
                assert_eq!(annotate.images_dir, PathBuf::from("/scans"));
                assert_eq!(annotate.common.get_log_level(), "debug");

                let config = annotate.to_config();
                assert_eq!(config.workers, 3);
                assert!(config.force_reprocess);
                assert!(config.is_image_extension("fts"));
                assert_eq!(config.exposure_unknown, Some(99999.0));
            }
            _ => panic!("Expected annotate command"),
        }
    }

    #[test]
    fn test_normalize_args() {
        let args = Args::parse_from([
            "plate-annotator",
            "normalize",
            "GAF001",
            "-l",
            "/logs",
            "--format",
            "json",
            "--strict-exposure",
            "--reject-empty",
        ]);

        match args.command {
            Some(Commands::Normalize(normalize)) => {
                assert_eq!(normalize.plate_id, "GAF001");
                assert_eq!(normalize.format, OutputFormat::Json);
                let config = normalize.common.to_config();
                assert_eq!(config.exposure_unknown, None);
                assert_eq!(config.empty_optional, EmptyFieldPolicy::Reject);
            }
            _ => panic!("Expected normalize command"),
        }
    }

    #[test]
    fn test_quiet_and_explicit_tables() {
        let args = Args::parse_from(["plate-annotator", "check", "-l", "/logs", "-q", "-t", "/t"]);
        match args.command {
            Some(Commands::Check(check)) => {
                assert_eq!(check.common.get_log_level(), "error");
                assert_eq!(
                    check.common.resolve_tables_dir().unwrap(),
                    PathBuf::from("/t")
                );
            }
            _ => panic!("Expected check command"),
        }
    }

    #[test]
    fn test_exposure_sentinel() {
        let args = Args::parse_from([
            "plate-annotator",
            "check",
            "-l",
            "/logs",
            "--exposure-sentinel",
            "-1",
        ]);
        match args.command {
            Some(Commands::Check(check)) => {
                assert_eq!(check.common.to_config().exposure_unknown, Some(-1.0));
            }
            _ => panic!("Expected check command"),
        }

        let conflicting = Args::try_parse_from([
            "plate-annotator",
            "check",
            "-l",
            "/logs",
            "--strict-exposure",
            "--exposure-sentinel",
            "0",
        ]);
        assert!(conflicting.is_err());
    }

    #[test]
    fn test_observatory_flags() {
        let args = Args::parse_from([
            "plate-annotator",
            "normalize",
            "GAF001",
            "-l",
            "/logs",
            "--observatory",
            "Tien Shan Observatory",
            "--site-longitude",
            "-76.5",
            "--site-elevation",
            "2750",
        ]);
        match args.command {
            Some(Commands::Normalize(normalize)) => {
                let observatory = normalize.common.to_config().observatory;
                let defaults = ObservatoryConfig::default();
                assert_eq!(observatory.observatory, "Tien Shan Observatory");
                assert_eq!(observatory.site_longitude, -76.5);
                assert_eq!(observatory.site_elevation, 2750.0);
                assert_eq!(observatory.origin, defaults.origin);
                assert_eq!(observatory.site_latitude, defaults.site_latitude);
            }
            _ => panic!("Expected normalize command"),
        }
    }

    #[test]
    fn test_default_observatory() {
        let args = Args::parse_from(["plate-annotator", "check", "-l", "/logs"]);
        match args.command {
            Some(Commands::Check(check)) => {
                assert_eq!(
                    check.common.to_config().observatory,
                    ObservatoryConfig::default()
                );
            }
            _ => panic!("Expected check command"),
        }
    }

    #[test]
    fn test_logs_dir_is_required() {
        assert!(Args::try_parse_from(["plate-annotator", "check"]).is_err());
    }
}
