// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]

use anyhow::{Result, anyhow, Context};
use log::{warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::Path;
use std::path::PathBuf;
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::app_config::{Config, CorrectionProvider};
use app_controller::Controller;

mod app_config;
mod correction;
mod document_processor;
mod file_utils;
mod app_controller;
mod providers;
mod errors;

/// CLI Wrapper for CorrectionProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliCorrectionProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LanguageTool,
}

impl From<CliCorrectionProvider> for CorrectionProvider {
    fn from(cli_provider: CliCorrectionProvider) -> Self {
        match cli_provider {
            CliCorrectionProvider::Ollama => CorrectionProvider::Ollama,
            CliCorrectionProvider::OpenAI => CorrectionProvider::OpenAI,
            CliCorrectionProvider::Anthropic => CorrectionProvider::Anthropic,
            CliCorrectionProvider::LanguageTool => CorrectionProvider::LanguageTool,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Correct Word documents using a correction backend (default command)
    #[command(alias = "correct")]
    Correct(CorrectArgs),

    /// Generate shell completions for docorrect
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct CorrectArgs {
    /// Input .docx file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Correction provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliCorrectionProvider>,

    /// Model name to use for correction
    #[arg(short, long)]
    model: Option<String>,

    /// Document language code (e.g., 'es', 'en', 'fr')
    #[arg(short = 'L', long)]
    language: Option<String>,

    /// API key for providers that require one
    #[arg(short = 'k', long, env = "DOCORRECT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// docorrect - Word document grammar and spelling correction
///
/// Corrects the grammar and spelling of .docx documents while keeping
/// quotes and bibliographic citations untouched, using local or remote
/// correction backends (Ollama, OpenAI, Anthropic, LanguageTool).
#[derive(Parser, Debug)]
#[command(name = "docorrect")]
#[command(author = "docorrect contributors")]
#[command(version = "1.0.0")]
#[command(about = "AI-powered Word document correction tool")]
#[command(long_about = "docorrect reads Word documents, corrects their grammar and spelling \
paragraph by paragraph and writes a corrected copy, leaving quotes and citations untouched.

EXAMPLES:
    docorrect thesis.docx                       # Correct using default config
    docorrect -f thesis.docx                    # Force overwrite existing output
    docorrect -p openai -m gpt-4o thesis.docx   # Use specific provider and model
    docorrect -L en thesis.docx                 # Correct an English document
    docorrect --log-level debug /papers/        # Process entire directory with debug logging
    docorrect completions bash > docorrect.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically. An API key can also be supplied through the
    DOCORRECT_API_KEY environment variable.

SUPPORTED PROVIDERS:
    ollama       - Local Ollama server (default: llama3.2:3b)
    openai       - OpenAI API (requires API key)
    anthropic    - Anthropic Claude API (requires API key)
    languagetool - Local LanguageTool server (http://localhost:8010)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input .docx file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Correction provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliCorrectionProvider>,

    /// Model name to use for correction
    #[arg(short, long)]
    model: Option<String>,

    /// Document language code (e.g., 'es', 'en', 'fr')
    #[arg(short = 'L', long)]
    language: Option<String>,

    /// API key for providers that require one
    #[arg(short = 'k', long, env = "DOCORRECT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let emoji = Self::get_emoji_for_level(record.level());

            let mut stderr = std::io::stderr();
            let color = match record.level() {
                Level::Error => "\x1B[1;31m",
                Level::Warn => "\x1B[1;33m",
                Level::Info => "\x1B[1;32m",
                Level::Debug => "\x1B[1;36m",
                Level::Trace => "\x1B[1;35m",
            };
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "docorrect", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Correct(args)) => run_correct(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;

            let correct_args = CorrectArgs {
                input_path,
                force_overwrite: cli.force_overwrite,
                provider: cli.provider,
                model: cli.model,
                language: cli.language,
                api_key: cli.api_key,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_correct(correct_args).await
        }
    }
}

async fn run_correct(options: CorrectArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter_from(cmd_log_level.clone().into()));
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader::<_, Config>(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.correction.provider = provider.clone().into();
    }

    let provider_str = config.correction.provider.to_lowercase_string();
    if let Some(model) = &options.model {
        if let Some(provider_config) = config.correction.available_providers.iter_mut()
            .find(|p| p.provider_type == provider_str) {
            provider_config.model = model.clone();
        }
    }

    if let Some(api_key) = &options.api_key {
        if let Some(provider_config) = config.correction.available_providers.iter_mut()
            .find(|p| p.provider_type == provider_str) {
            provider_config.api_key = api_key.clone();
        }
    }

    if let Some(language) = &options.language {
        config.language = language.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    // Validate the configuration after loading and overriding
    config.validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        // Just update the max level without reinitializing the logger
        log::set_max_level(level_filter_from(config.log_level.clone()));
    }

    // Create controller
    let controller = Controller::with_config(config)?;

    // Run the controller with the input file(s)
    if options.input_path.is_file() {
        // Process a single file; output lands next to the input
        controller.run(
            options.input_path.clone(),
            options.input_path.parent().unwrap_or(Path::new(".")).to_path_buf(),
            options.force_overwrite
        ).await?;
    } else if options.input_path.is_dir() {
        // Process a directory
        controller.run_folder(
            options.input_path.clone(),
            options.force_overwrite
        ).await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}

fn level_filter_from(level: app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}
