//! Batch annotation engine.
//!
//! Discovers plate scans, looks every plate up in the logbook catalogue,
//! normalizes it and writes its header sidecar. Plates are processed in
//! isolation: a failing plate is recorded and the batch continues.

pub mod discovery;

#[cfg(test)]
pub mod tests;

use self::discovery::{ImageDiscovery, plate_id_from_path};

use crate::catalog::Catalog;
use crate::config::{AnnotatorConfig, ObservatoryConfig};
use crate::error::{PlateError, Result};
use crate::header::{PlateHeader, is_processed};
use crate::models::{CheckFailure, CheckReport, PlateFailure, ProcessingStats};
use crate::normalize::PlateNormalizer;
use crate::tables::TranslationTables;

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task;
use tracing::{debug, info, warn};

/// Result of annotating a single image
#[derive(Debug)]
enum PlateOutcome {
    Annotated,
    Skipped,
    Failed(PlateFailure),
}

/// Main processor for annotating a directory of plate scans
#[derive(Debug)]
pub struct BatchProcessor {
    images_dir: PathBuf,
    catalog: Arc<Catalog>,
    normalizer: Arc<PlateNormalizer>,
    config: AnnotatorConfig,
    show_progress: bool,
}

impl BatchProcessor {
    /// Create a new batch processor
    pub fn new(
        images_dir: PathBuf,
        catalog: Catalog,
        tables: Arc<TranslationTables>,
        config: AnnotatorConfig,
    ) -> Result<Self> {
        if !images_dir.is_dir() {
            return Err(PlateError::ImageDirNotFound { path: images_dir });
        }
        config.validate()?;

        Ok(Self {
            images_dir,
            catalog: Arc::new(catalog),
            normalizer: Arc::new(PlateNormalizer::new(tables, config.clone())),
            config,
            show_progress: false,
        })
    }

    /// Show a progress bar while annotating
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Main processing entry point
    pub async fn process(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        println!("{}", "Starting plate annotation".bright_green().bold());
        println!(
            "  {} {}",
            "Images:".bright_cyan(),
            self.images_dir.display()
        );
        println!(
            "  {} {} plates",
            "Catalogue:".bright_cyan(),
            self.catalog.len().to_string().bright_white()
        );

        println!("\n{}", "Discovering images...".bright_yellow());
        let discovery =
            ImageDiscovery::new(self.images_dir.clone(), self.config.image_extensions.clone());
        let images = task::spawn_blocking(move || discovery.discover_images())
            .await
            .map_err(|e| PlateError::Configuration {
                message: format!("image discovery task failed: {}", e),
            })??;
        println!(
            "  {} {} images",
            "Found".bright_green(),
            images.len().to_string().bright_white().bold()
        );

        let mut stats = ProcessingStats {
            images_found: images.len(),
            ..ProcessingStats::default()
        };
        if images.is_empty() {
            stats.processing_time_ms = start_time.elapsed().as_millis();
            return Ok(stats);
        }

        println!("\n{}", "Annotating plates...".bright_yellow());
        let progress = self.progress_bar(images.len() as u64);
        let semaphore = Arc::new(Semaphore::new(self.config.workers));

        let outcomes = stream::iter(images)
            .map(|image| {
                let sem = semaphore.clone();
                let catalog = self.catalog.clone();
                let normalizer = self.normalizer.clone();
                let observatory = self.config.observatory.clone();
                let force = self.config.force_reprocess;
                let progress = progress.clone();
                async move {
                    let _permit = sem.acquire().await.ok();
                    let image_for_task = image.clone();
                    let outcome = task::spawn_blocking(move || {
                        annotate_image(&catalog, &normalizer, &observatory, &image_for_task, force)
                    })
                    .await
                    .unwrap_or_else(|e| {
                        PlateOutcome::Failed(PlateFailure {
                            plate_id: display_id(&image),
                            image_path: image.clone(),
                            reason: format!("annotation task failed: {}", e),
                            data_error: false,
                        })
                    });
                    if let Some(pb) = &progress {
                        pb.inc(1);
                    }
                    outcome
                }
            })
            .buffer_unordered(self.config.workers)
            .collect::<Vec<_>>()
            .await;

        if let Some(pb) = &progress {
            pb.finish_with_message("done");
        }

        for outcome in outcomes {
            match outcome {
                PlateOutcome::Annotated => stats.plates_annotated += 1,
                PlateOutcome::Skipped => stats.plates_skipped += 1,
                PlateOutcome::Failed(failure) => {
                    stats.plates_failed += 1;
                    stats.failures.push(failure);
                }
            }
        }
        stats
            .failures
            .sort_by(|a, b| a.image_path.cmp(&b.image_path));
        stats.processing_time_ms = start_time.elapsed().as_millis();

        self.print_summary(&stats);
        info!(
            "Annotated {} plates, skipped {}, failed {}",
            stats.plates_annotated, stats.plates_skipped, stats.plates_failed
        );
        Ok(stats)
    }

    fn progress_bar(&self, total: u64) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("annotating");
        Some(pb)
    }

    fn print_summary(&self, stats: &ProcessingStats) {
        println!("\n{}", "Annotation Summary".bright_green().bold());
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            stats.processing_time_ms.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Plates annotated:".bright_cyan(),
            stats.plates_annotated.to_string().bright_white().bold()
        );
        if stats.plates_skipped > 0 {
            println!(
                "  {} {}",
                "Already annotated:".bright_cyan(),
                stats.plates_skipped.to_string().bright_white()
            );
        }
        if stats.plates_failed > 0 {
            println!(
                "  {} {}",
                "Plates failed:".bright_red(),
                stats.plates_failed.to_string().bright_red().bold()
            );
            println!(
                "  {} {}",
                "Logbook data errors:".bright_red(),
                stats.data_failures().to_string().bright_white()
            );
            for failure in &stats.failures {
                println!(
                    "    {} {}: {}",
                    failure.plate_id.bright_white(),
                    failure.image_path.display(),
                    failure.reason
                );
            }
        }
    }
}

/// Normalize every catalogue plate and render its header without writing anything
pub fn check_catalog(
    catalog: &Catalog,
    normalizer: &PlateNormalizer,
    observatory: &ObservatoryConfig,
) -> CheckReport {
    let mut report = CheckReport::default();
    for record in catalog.plates() {
        report.plates_checked += 1;
        let checked = normalizer
            .normalize(record)
            .and_then(|plate| PlateHeader::assemble(observatory, &plate).render());
        if let Err(e) = checked {
            debug!("Plate {} failed check: {}", record.plate_id, e);
            report.failures.push(CheckFailure {
                plate_id: record.plate_id.clone(),
                source_file: record.source_file.clone(),
                reason: e.to_string(),
            });
        }
    }
    report
}

/// Annotate one image; every error becomes a failure for this plate only
fn annotate_image(
    catalog: &Catalog,
    normalizer: &PlateNormalizer,
    observatory: &ObservatoryConfig,
    image: &Path,
    force: bool,
) -> PlateOutcome {
    if !force && is_processed(image) {
        debug!("Skipping already annotated image {}", image.display());
        return PlateOutcome::Skipped;
    }

    let result = plate_id_from_path(image).and_then(|plate_id| {
        let record = catalog.get(&plate_id)?;
        let plate = normalizer.normalize(record)?;
        PlateHeader::assemble(observatory, &plate).write_sidecar(image)
    });

    match result {
        Ok(_) => PlateOutcome::Annotated,
        Err(e) => {
            warn!("Failed to annotate {}: {}", image.display(), e);
            PlateOutcome::Failed(PlateFailure {
                plate_id: display_id(image),
                image_path: image.to_path_buf(),
                reason: e.to_string(),
                data_error: e.is_data_error(),
            })
        }
    }
}

/// Plate id for reports, falling back to the file name
fn display_id(image: &Path) -> String {
    plate_id_from_path(image).unwrap_or_else(|_| {
        image
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    })
}
