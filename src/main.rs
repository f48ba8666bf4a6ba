// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use doctranslate::app_config::{self, BackendKind, Config};
use doctranslate::app_controller::Controller;
use doctranslate::errors::AppError;

/// CLI Wrapper for BackendKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliBackend {
    Remote,
    Local,
    Dictionary,
}

impl From<CliBackend> for BackendKind {
    fn from(cli_backend: CliBackend) -> Self {
        match cli_backend {
            CliBackend::Remote => BackendKind::Remote,
            CliBackend::Local => BackendKind::Local,
            CliBackend::Dictionary => BackendKind::Dictionary,
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
    /// Translate a document or a folder of documents (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for doctranslate
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input document or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Directory for translated documents (defaults to next to the input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation backend to use
    #[arg(short, long, value_enum)]
    backend: Option<CliBackend>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// API key for the remote backend
    #[arg(long, env = "DOCTRANSLATE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Backend endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'hi', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Maximum backend calls in flight
    #[arg(long)]
    concurrency: Option<usize>,

    /// Maximum spans per backend call
    #[arg(long)]
    batch_size: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// doctranslate - structural document translation
///
/// Translates paragraphs, runs and table cells of a document while keeping
/// its structure, formatting and protected glossary terms intact.
#[derive(Parser, Debug)]
#[command(name = "doctranslate")]
#[command(version)]
#[command(about = "Structure-preserving document translation")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "doctranslate translates a structured document (paragraphs, formatted runs, tables) into another language and writes a new document with the same structure.

EXAMPLES:
    doctranslate report.json                      # Translate using default config
    doctranslate -f report.json                   # Force overwrite existing output
    doctranslate -b remote -m gpt-4o report.json  # Use a specific backend and model
    doctranslate -s en -t fr report.json          # Translate from English to French
    doctranslate --concurrency 4 ./reports/       # Process an entire directory
    doctranslate completions bash > doctranslate.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

BACKENDS:
    local      - Local Ollama server (default: llama3.2:3b)
    remote     - OpenAI-compatible chat-completions API (requires API key)
    dictionary - Static lookup table loaded from a JSON file")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

// @struct: Custom logger implementation
// The level is read from `log::max_level()` so it can change after init.
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
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

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    // Info until the configuration says otherwise
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "doctranslate", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => run_translate(cli.translate).await,
    };

    if let Err(e) = result {
        error!("{}", e);
        log::logger().flush();
        std::process::exit(e.exit_code());
    }
}

async fn run_translate(options: TranslateArgs) -> Result<(), AppError> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&options).map_err(|e| AppError::Config(format!("{:#}", e)))?;

    // If log level was not set via command line, use the configured one
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let input_path = options
        .input_path
        .clone()
        .ok_or_else(|| AppError::Config("INPUT_PATH is required".to_string()))?;

    let controller =
        Controller::with_config(config).map_err(|e| AppError::Config(format!("{:#}", e)))?;

    if input_path.is_file() {
        let output_dir = match &options.output_dir {
            Some(dir) => dir.clone(),
            None => input_path.parent().unwrap_or(Path::new(".")).to_path_buf(),
        };
        controller
            .run(input_path, output_dir, options.force_overwrite)
            .await?;
    } else if input_path.is_dir() {
        if options.output_dir.is_some() {
            warn!("--output-dir is ignored in folder mode, outputs are written next to their sources");
        }
        controller
            .run_folder(input_path, options.force_overwrite)
            .await?;
    } else {
        return Err(AppError::File(format!(
            "Input path does not exist: {:?}",
            input_path
        )));
    }

    Ok(())
}

/// Load or create the configuration, then apply command-line overrides
fn load_config(options: &TranslateArgs) -> Result<Config> {
    let config_path = Path::new(&options.config_path);
    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        warn!(
            "Config file not found at '{}', creating default config.",
            options.config_path
        );
        let config = Config::default();
        config
            .save_to_file(config_path)
            .context("Failed to write default config")?;
        config
    };

    if let Some(backend) = &options.backend {
        config.translation.backend = backend.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.active_backend_config_mut().model = model.clone();
    }
    if let Some(api_key) = &options.api_key {
        config.translation.active_backend_config_mut().api_key = api_key.clone();
    }
    if let Some(endpoint) = &options.endpoint {
        config.translation.active_backend_config_mut().endpoint = endpoint.clone();
    }
    if let Some(source_language) = &options.source_language {
        config.source_language = source_language.clone();
    }
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(concurrency) = options.concurrency {
        config.translation.common.concurrency = concurrency;
    }
    if let Some(batch_size) = options.batch_size {
        config.translation.common.batch_size = batch_size;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config
        .validate()
        .map_err(|e| anyhow!("Configuration validation failed: {:#}", e))?;

    Ok(config)
}
