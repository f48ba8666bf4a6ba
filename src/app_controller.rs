use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::providers::{self, TranslationBackend};
use crate::translation::document::{DocumentCodec, JsonCodec, load_document, save_document};
use crate::translation::pipeline::{TranslationPipeline, TranslationReport};
use crate::translation::progress::ProgressReporter;

// @module: Application controller for document translation

/// What happened to one input file
#[derive(Debug)]
pub enum RunOutcome {
    /// The document was translated and written
    Translated {
        output_path: PathBuf,
        report: TranslationReport,
    },
    /// An output already existed and overwriting was not forced
    Skipped { output_path: PathBuf },
}

/// Totals for a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
    /// Units that kept their source text, across all files
    pub degraded_units: usize,
}

/// Progress reporter backed by an indicatif bar
pub struct ProgressBarReporter {
    bar: ProgressBar,
}

impl ProgressBarReporter {
    pub fn new(bar: ProgressBar) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} units ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));
        bar.set_message("Translating");
        Self { bar }
    }
}

impl ProgressReporter for ProgressBarReporter {
    fn start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, completed: usize) {
        self.bar.set_position(completed as u64);
    }

    fn finish(&self) {
        // Clear so only the folder bar remains visible in folder mode
        self.bar.finish_and_clear();
    }
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    backend: Arc<dyn TranslationBackend>,
    codec: Arc<dyn DocumentCodec>,
    /// Built once; its cache is shared by every document of the controller
    pipeline: TranslationPipeline,
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the backend selected by the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let backend = providers::create_backend(&config.translation)
            .context("Failed to create translation backend")?;
        Self::with_backend(config, backend)
    }

    /// Create a controller around an existing backend
    pub fn with_backend(config: Config, backend: Arc<dyn TranslationBackend>) -> Result<Self> {
        let pipeline = TranslationPipeline::from_config(&config, backend.clone())?;
        Ok(Self {
            config,
            backend,
            codec: Arc::new(JsonCodec::pretty()),
            pipeline,
            show_progress: true,
        })
    }

    /// Use another document codec
    pub fn with_codec(mut self, codec: Arc<dyn DocumentCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Hide progress bars
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check that the backend answers before starting a long run
    pub async fn test_connection(&self) -> Result<()> {
        self.backend
            .test_connection()
            .await
            .with_context(|| format!("Backend '{}' is not reachable", self.backend.name()))
    }

    /// Output path for `input_file` in `output_dir`
    pub fn output_path_for(&self, input_file: &Path, output_dir: &Path) -> PathBuf {
        FileManager::generate_output_path(
            input_file,
            output_dir,
            &self.config.target_language,
            self.codec.extension(),
        )
    }

    /// Translate one document file into `output_dir`
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<RunOutcome> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(&input_file, &output_dir, &multi_progress, force_overwrite)
            .await
    }

    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_dir: &Path,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<RunOutcome> {
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        FileManager::ensure_dir(output_dir)?;

        let output_path = self.output_path_for(input_file, output_dir);
        if output_path.exists() && !force_overwrite {
            warn!(
                "Skipping {:?}, translation already exists (use -f to force overwrite)",
                input_file
            );
            return Ok(RunOutcome::Skipped { output_path });
        }

        // Load failures abort before any backend call
        let document = load_document(self.codec.as_ref(), input_file)?;

        info!(
            "{} - {} ({} -> {})",
            self.config.translation.backend.display_name(),
            self.config.translation.get_model(),
            self.config.source_language,
            self.config.target_language
        );

        let bar = if self.show_progress {
            multi_progress.add(ProgressBar::new(0))
        } else {
            ProgressBar::hidden()
        };
        let progress = ProgressBarReporter::new(bar);

        let report = self.pipeline.translate_document(&document, &progress).await?;

        save_document(self.codec.as_ref(), &report.document, &output_path)?;

        if report.is_degraded() {
            warn!(
                "{} of {} units kept their source text",
                report.fell_back, report.total_units
            );
        }
        info!(
            "Success: {} ({})",
            output_path.display(),
            Self::format_duration(report.duration)
        );

        Ok(RunOutcome::Translated { output_path, report })
    }

    // Format duration in a human-readable format
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

    /// Translate every document in a directory, next to its source.
    /// Files that already have a translation are skipped.
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let documents = FileManager::find_documents(
            &input_dir,
            self.codec.extension(),
            &self.config.target_language,
        )?;
        if documents.is_empty() {
            return Err(anyhow!(
                "No .{} documents found in directory: {:?}",
                self.codec.extension(),
                input_dir
            ));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = if self.show_progress {
            multi_progress.add(ProgressBar::new(documents.len() as u64))
        } else {
            ProgressBar::hidden()
        };
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        let mut summary = FolderSummary::default();

        for document in &documents {
            let file_name = document
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_dir = document
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| input_dir.clone());

            match self
                .run_with_progress(document, &output_dir, &multi_progress, force_overwrite)
                .await
            {
                Ok(RunOutcome::Translated { report, .. }) => {
                    summary.processed += 1;
                    summary.degraded_units += report.fell_back;
                }
                Ok(RunOutcome::Skipped { .. }) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.errors += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        let summary_message = format!(
            "Folder processing completed: {} processed, {} skipped, {} errors, {} units kept source text",
            summary.processed, summary.skipped, summary.errors, summary.degraded_units
        );
        info!("{}", summary_message);

        let cache_stats = self.pipeline.cache().stats();
        if cache_stats.hits > 0 {
            info!(
                "Cache: {} hits, {} misses ({:.0}% hit rate)",
                cache_stats.hits,
                cache_stats.misses,
                cache_stats.hit_rate() * 100.0
            );
        }

        let log_file_path = input_dir.join("doctranslate.log");
        let log_line = format!(
            "{} ({} -> {}) - Duration: {}",
            summary_message,
            self.config.source_language,
            self.config.target_language,
            Self::format_duration(start_time.elapsed())
        );
        if let Err(e) = FileManager::append_to_log_file(&log_file_path, &log_line) {
            warn!("Failed to write folder log: {}", e);
        }

        Ok(summary)
    }
}
