use anyhow::{Result, Context};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use std::time::Duration;
use indicatif::{ProgressBar, ProgressStyle, MultiProgress};

use crate::app_config::Config;
use crate::correction::core::LogEntry;
use crate::correction::{CorrectionService, DocumentPipeline};
use crate::document_processor::DocumentProcessor;
use crate::file_utils::FileManager;

// @module: Application controller for document correction

/// Main application controller for document correction
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.language.is_empty()
    }

    /// Public method to write logs to a file for testing purposes
    pub fn write_correction_logs(&self, logs: &[LogEntry], file_path: &str, context: &str) -> Result<()> {
        self.write_logs_to_file(logs, file_path, context)
    }

    /// Run the main workflow with an input document and output directory
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(input_file, output_dir, &multi_progress, force_overwrite).await
    }

    /// Run the controller with progress reporting
    async fn run_with_progress(&self, input_file: PathBuf, output_dir: PathBuf, multi_progress: &MultiProgress, force_overwrite: bool) -> Result<()> {
        // Start timing the process
        let start_time = std::time::Instant::now();

        // Check if the input file exists
        if !input_file.exists() {
            return Err(anyhow::anyhow!("Input file does not exist: {:?}", input_file));
        }

        // Ensure the output directory exists
        FileManager::ensure_dir(&output_dir)?;

        // Check if a corrected version already exists
        let output_path = FileManager::generate_output_path(&input_file, &output_dir);
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, corrected version already exists (use -f to force overwrite)");
            return Ok(());
        }

        // Parse the document
        info!("Reading document: {:?}", input_file);
        let input_bytes = FileManager::read_bytes(&input_file)?;
        let document = DocumentProcessor::read(&input_bytes)
            .with_context(|| format!("Failed to parse document: {:?}", input_file))?;

        debug!(
            "Document has {} paragraphs and {} characters",
            document.paragraphs.len(),
            document.total_characters()
        );

        // Build the correction pipeline from configuration
        let service = CorrectionService::from_config(&self.config.correction, &self.config.language)?;

        // Verify the backend is reachable and accepts the credential
        // before touching any paragraph
        service.test_connection().await.map_err(|e| {
            anyhow::anyhow!(
                "Cannot use {} backend: {}",
                self.config.correction.provider.display_name(),
                e
            )
        })?;

        let pipeline = DocumentPipeline::new(service, &self.config.correction.common);

        // Create a progress bar for paragraph processing
        let progress_bar = multi_progress.add(ProgressBar::new(document.paragraphs.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} paragraphs ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Correcting");

        // Correct the document, one paragraph at a time
        let report = |done: usize, _total: usize| {
            progress_bar.set_position(done as u64);
        };
        let corrected = pipeline.correct_document(&document, Some(&report)).await?;

        // Finish and clear the progress bar instead of just finishing it
        // This ensures only the folder progress bar remains visible when processing multiple files
        progress_bar.finish_and_clear();

        // Now that the progress bar is finished, report any captured issues
        let logs = pipeline.take_captured_logs();
        let error_logs = logs.iter().filter(|l| l.level == log::Level::Error).count();
        let warning_logs = logs.iter().filter(|l| l.level == log::Level::Warn).count();

        if error_logs > 0 || warning_logs > 0 {
            info!("Correction completed with {} errors and {} warnings.", error_logs, warning_logs);

            // In debug mode, show all captured logs
            if log::max_level() >= log::LevelFilter::Debug {
                for entry in &logs {
                    match entry.level {
                        log::Level::Error => error!("{}", entry.message),
                        log::Level::Warn => warn!("{}", entry.message),
                        _ => info!("{}", entry.message),
                    }
                }
            }

            // Write logs to docorrect.issues.log file
            let log_file_path = output_dir.join("docorrect.issues.log").to_string_lossy().to_string();
            let context = format!("{} - {} ({})",
                self.config.correction.provider.display_name(),
                self.config.correction.get_model(),
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

            if let Err(e) = self.write_logs_to_file(&logs, &log_file_path, &context) {
                warn!("Failed to write logs to file: {}", e);
            } else {
                info!("Logs written to {}", log_file_path);
            }
        }

        // Assemble and write the output document
        let output_bytes = DocumentProcessor::write(&corrected)?;
        FileManager::write_bytes(&output_path, &output_bytes)?;

        let (hits, misses, hit_rate) = pipeline.cache_stats();
        debug!("Cache: {} hits, {} misses ({:.0}% hit rate)", hits, misses, hit_rate * 100.0);

        let duration = start_time.elapsed();
        info!("Corrected document written to {:?} in {}", output_path, Self::format_duration(duration));

        Ok(())
    }

    /// Run the workflow for every Word document in a folder
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        let start_time = std::time::Instant::now();

        if !input_dir.is_dir() {
            return Err(anyhow::anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        // Find all Word documents in the directory (recursive), skipping
        // previous outputs and Word lock files
        let document_files: Vec<PathBuf> = FileManager::find_files(&input_dir, "docx")?
            .into_iter()
            .filter(|path| {
                let name = path.file_name().map(|f| f.to_string_lossy().to_string()).unwrap_or_default();
                !name.starts_with("corrected_") && !name.starts_with("~$")
            })
            .collect();

        if document_files.is_empty() {
            return Err(anyhow::anyhow!("No .docx files found in directory: {:?}", input_dir));
        }

        // Create multi-progress instance for multiple file processing
        let multi_progress = MultiProgress::new();

        // Create a progress bar for folder processing
        let folder_pb = multi_progress.add(ProgressBar::new(document_files.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        // Track success and failure counts
        let mut success_count = 0;
        let mut error_count = 0;
        let mut skip_count = 0;

        for document_file in document_files.iter() {
            let file_name = document_file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            folder_pb.set_message(format!("Processing: {}", file_name));

            // Corrected files land next to their source
            let output_dir = match document_file.parent() {
                Some(parent) => parent.to_path_buf(),
                None => input_dir.clone(),
            };

            let output_path = FileManager::generate_output_path(document_file, &output_dir);
            if output_path.exists() && !force_overwrite {
                warn!("Skipping file, corrected version already exists (use -f to force overwrite)");
                skip_count += 1;
                folder_pb.inc(1);
                continue;
            }

            match self.run_with_progress(document_file.clone(), output_dir, &multi_progress, force_overwrite).await {
                Ok(_) => {
                    success_count += 1;
                },
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    error_count += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        let duration = start_time.elapsed();
        let summary_message = format!("Folder processing completed: {} processed, {} skipped, {} errors",
             success_count, skip_count, error_count);
        info!("{}", summary_message);

        // Write summary to log file
        let log_file_path = input_dir.join("docorrect.issues.log").to_string_lossy().to_string();
        let context = format!("Folder Processing: {} ({})",
            input_dir.display(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

        let folder_logs = vec![LogEntry {
            level: log::Level::Info,
            message: format!("{} - Duration: {}", summary_message, Self::format_duration(duration)),
        }];

        if let Err(e) = self.write_logs_to_file(&folder_logs, &log_file_path, &context) {
            warn!("Failed to write folder logs to file: {}", e);
        }

        Ok(())
    }

    /// Write correction logs to a log file
    fn write_logs_to_file(&self, logs: &[LogEntry], file_path: &str, context: &str) -> Result<()> {
        let mut log_content = String::new();

        // Add header
        log_content.push_str(&format!("Correction Log - {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
        log_content.push_str(&format!("Context: {}\n\n", context));

        // Add each log entry
        for entry in logs {
            log_content.push_str(&format!("[{}] {}\n", entry.level, entry.message));
        }

        FileManager::write_to_file(file_path, &log_content)?;

        Ok(())
    }

    /// Format a duration as a short human-readable string
    fn format_duration(duration: Duration) -> String {
        let total_secs = duration.as_secs();
        if total_secs >= 60 {
            format!("{}m {}s", total_secs / 60, total_secs % 60)
        } else {
            format!("{}.{}s", total_secs, duration.subsec_millis() / 100)
        }
    }

    /// Expected output path for an input document, for tests and callers
    pub fn output_path_for(&self, input_file: &Path, output_dir: &Path) -> PathBuf {
        FileManager::generate_output_path(input_file, output_dir)
    }
}
