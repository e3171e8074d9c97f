use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_config::Config;
use crate::file_utils::{FileManager, FileType};
use crate::markup::MarkupRewriter;
use crate::package::{MediaCopyReport, Package};
use crate::record_io::{self, ConversionStats};

// @module: Application controller for package conversion

/// Suffix appended to the input stem for converted tables
pub const OUTPUT_SUFFIX: &str = "_out";

/// Extension of converted tables
pub const OUTPUT_EXTENSION: &str = "tsv";

/// Result of processing one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The input was converted
    Converted {
        output: PathBuf,
        stats: ConversionStats,
        /// Present for packages only
        media: Option<MediaCopyReport>,
    },
    /// The output already existed and overwriting was not requested
    Skipped { output: PathBuf },
}

/// Totals for a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.converted + self.skipped + self.failed
    }

    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Converted { .. } => self.converted += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Main application controller for package conversion
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Rewriter built from the configured color
    rewriter: MarkupRewriter,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        let rewriter = MarkupRewriter::new(config.color.trim());
        Ok(Self { config, rewriter })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Where the converted table for `input_file` is written
    pub fn output_path_for(&self, input_file: &Path) -> PathBuf {
        FileManager::generate_output_path(
            input_file,
            &self.config.processed_dir,
            OUTPUT_SUFFIX,
            OUTPUT_EXTENSION,
        )
    }

    /// Convert a single package or data table
    pub fn run(&self, input_file: &Path, force_overwrite: bool) -> Result<Outcome> {
        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        FileManager::ensure_dir(&self.config.processed_dir)?;

        let output_path = self.output_path_for(input_file);
        if output_path.exists() && !force_overwrite {
            warn!(
                "Skipping {:?}, output already exists (use -f to force overwrite)",
                input_file
            );
            return Ok(Outcome::Skipped { output: output_path });
        }

        let outcome = match FileManager::detect_file_type(input_file)? {
            FileType::Package => {
                let (stats, media) = self.convert_package(input_file, &output_path)?;
                info!("OK(zip): {} -> {}", input_file.display(), output_path.display());
                if media.copied + media.skipped + media.ignored > 0 {
                    info!(
                        "Media: {} copied, {} already present, {} ignored",
                        media.copied, media.skipped, media.ignored
                    );
                }
                Outcome::Converted { output: output_path, stats, media: Some(media) }
            }
            FileType::Table => {
                let stats = self.convert_table(input_file, &output_path)?;
                info!("OK(tsv): {} -> {}", input_file.display(), output_path.display());
                Outcome::Converted { output: output_path, stats, media: None }
            }
            FileType::Unknown => {
                return Err(anyhow!("Unsupported input file: {:?}", input_file));
            }
        };

        if let Outcome::Converted { stats, .. } = &outcome {
            debug!(
                "{} rows written, {} with translation, {} empty rows skipped",
                stats.rows_written, stats.translations, stats.rows_skipped
            );
        }

        Ok(outcome)
    }

    /// Convert every package directly inside `input_dir`.
    ///
    /// The first failure stops the run unless `keep_going` is configured, in
    /// which case failures are logged and counted in the summary.
    pub fn run_folder(&self, input_dir: &Path, force_overwrite: bool) -> Result<RunSummary> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let packages = FileManager::list_files(input_dir, "zip")?;
        let mut summary = RunSummary::default();

        if packages.is_empty() {
            warn!("No zip files found in {}", input_dir.display());
            return Ok(summary);
        }

        let progress_bar = if packages.len() > 1 {
            let pb = ProgressBar::new(packages.len() as u64);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} packages ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style.progress_chars("=>-"));
            Some(pb)
        } else {
            None
        };

        for package in &packages {
            let file_name = package
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            if let Some(pb) = &progress_bar {
                pb.set_message(file_name.clone());
            }

            match self.run(package, force_overwrite) {
                Ok(outcome) => summary.record(&outcome),
                Err(e) if self.config.keep_going => {
                    error!("Error processing {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
                Err(e) => {
                    if let Some(pb) = &progress_bar {
                        pb.abandon();
                    }
                    return Err(e.context(format!("Failed to process {:?}", package)));
                }
            }

            if let Some(pb) = &progress_bar {
                pb.inc(1);
            }
        }

        if let Some(pb) = &progress_bar {
            pb.finish_and_clear();
        }

        info!(
            "Folder processing completed: {} converted, {} skipped, {} errors in {}",
            summary.converted,
            summary.skipped,
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    fn convert_package(&self, input_file: &Path, output_path: &Path) -> Result<(ConversionStats, MediaCopyReport)> {
        let mut package = Package::open(input_file)?;

        let temp = FileManager::temp_file_for(output_path)?;
        let (stats, temp) = package.convert_data_file(temp, &self.rewriter, self.config.strip_bom)?;
        temp.persist(output_path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write output file: {:?}", output_path))?;

        let media = package
            .copy_media(&self.config.media_dir, self.config.media_policy)
            .with_context(|| format!("Failed to copy media from {:?}", input_file))?;

        Ok((stats, media))
    }

    fn convert_table(&self, input_file: &Path, output_path: &Path) -> Result<ConversionStats> {
        let input = File::open(input_file)
            .with_context(|| format!("Failed to open input file: {:?}", input_file))?;

        let temp = FileManager::temp_file_for(output_path)?;
        let (stats, temp) = record_io::convert_records(input, temp, &self.rewriter, self.config.strip_bom)
            .with_context(|| format!("Failed to convert {:?}", input_file))?;
        temp.persist(output_path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write output file: {:?}", output_path))?;

        Ok(stats)
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
