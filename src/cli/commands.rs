//! Command implementations for the plate annotator CLI
//!
//! Sets up logging, loads the catalogue and translation tables, and runs
//! the selected command.

use crate::catalog::Catalog;
use crate::cli::args::{AnnotateArgs, CheckArgs, Commands, CommonArgs, NormalizeArgs, OutputFormat};
use crate::config::ObservatoryConfig;
use crate::constants::FITS_CARD_LENGTH;
use crate::header::PlateHeader;
use crate::models::{CheckReport, ProcessingStats};
use crate::normalize::{NormalizedPlate, PlateNormalizer};
use crate::processor::{BatchProcessor, check_catalog};
use crate::tables::TranslationTables;
use anyhow::{Context, Result};
use colored::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Main command runner
pub async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Annotate(args) => {
            setup_logging(&args.common)?;
            annotate(args).await.map(|_| ())
        }
        Commands::Normalize(args) => {
            setup_logging(&args.common)?;
            let output = normalize(&args)?;
            println!("{}", output);
            Ok(())
        }
        Commands::Check(args) => {
            setup_logging(&args.common)?;
            check(&args)
        }
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &CommonArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("plate_annotator={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load the logbook catalogue and translation tables named by the common arguments
pub fn load_inputs(args: &CommonArgs) -> Result<(Catalog, Arc<TranslationTables>)> {
    let tables_dir = args.resolve_tables_dir()?;
    let tables = TranslationTables::load_dir(&tables_dir).with_context(|| {
        format!(
            "Failed to load translation tables from {}",
            tables_dir.display()
        )
    })?;
    let catalog = Catalog::load_dir(&args.logs_dir)
        .with_context(|| format!("Failed to load logbooks from {}", args.logs_dir.display()))?;

    info!(
        "Loaded {} plates from {} logbooks, {} telescopes, {} observers",
        catalog.len(),
        catalog.files_loaded(),
        tables.telescope_count(),
        tables.observer_count()
    );
    Ok((catalog, Arc::new(tables)))
}

/// Annotate every scan in the image directory
pub async fn annotate(args: AnnotateArgs) -> Result<ProcessingStats> {
    let (catalog, tables) = load_inputs(&args.common)?;
    let processor = BatchProcessor::new(args.images_dir.clone(), catalog, tables, args.to_config())
        .context("Failed to set up batch annotation")?
        .with_progress(!args.no_progress && !args.common.quiet);

    let stats = processor.process().await?;
    Ok(stats)
}

/// Normalize one plate and format its cards
pub fn normalize(args: &NormalizeArgs) -> Result<String> {
    let (catalog, tables) = load_inputs(&args.common)?;
    let config = args.common.to_config();
    config.validate()?;
    let normalizer = PlateNormalizer::new(tables, config.clone());

    let record = catalog.get(&args.plate_id)?;
    let plate = normalizer
        .normalize(record)
        .with_context(|| format!("Failed to normalize plate {}", args.plate_id))?;

    format_plate(&plate, &config.observatory, args.format)
}

/// Format normalized cards as FITS card lines or JSON
pub fn format_plate(
    plate: &NormalizedPlate,
    observatory: &ObservatoryConfig,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(plate).context("Failed to serialize plate cards")
        }
        OutputFormat::Text => {
            let rendered = PlateHeader::assemble(observatory, plate).render()?;
            let lines: Vec<&str> = rendered
                .as_bytes()
                .chunks(FITS_CARD_LENGTH)
                .filter_map(|card| std::str::from_utf8(card).ok())
                .map(str::trim_end)
                .take_while(|card| !card.is_empty())
                .collect();
            Ok(lines.join("\n"))
        }
    }
}

/// Check every catalogue plate; fails when any plate does not normalize
pub fn check(args: &CheckArgs) -> Result<()> {
    let (catalog, tables) = load_inputs(&args.common)?;
    let config = args.common.to_config();
    config.validate()?;
    let normalizer = PlateNormalizer::new(tables, config.clone());

    let report = check_catalog(&catalog, &normalizer, &config.observatory);
    match args.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize check report")?
        ),
        OutputFormat::Text => print_check_report(&report),
    }

    if !report.failures.is_empty() {
        anyhow::bail!(
            "{} of {} plates failed normalization",
            report.failures.len(),
            report.plates_checked
        );
    }
    Ok(())
}

fn print_check_report(report: &CheckReport) {
    println!("{}", "Logbook Check".bright_green().bold());
    println!(
        "  {} {}",
        "Plates checked:".bright_cyan(),
        report.plates_checked.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Plates valid:".bright_cyan(),
        report.plates_valid().to_string().bright_white().bold()
    );
    if !report.failures.is_empty() {
        println!(
            "  {} {}",
            "Plates failed:".bright_red(),
            report.failures.len().to_string().bright_red().bold()
        );
        for failure in &report.failures {
            println!(
                "    {} ({}): {}",
                failure.plate_id.bright_white(),
                failure.source_file,
                failure.reason
            );
        }
    }
}
