// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use clozeport::app_config::{self, Config, MediaPolicy};
use clozeport::app_controller::Controller;
use clozeport::file_utils::FileManager;

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

/// CLI Wrapper for MediaPolicy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliMediaPolicy {
    Overwrite,
    Skip,
}

impl From<CliMediaPolicy> for MediaPolicy {
    fn from(cli_policy: CliMediaPolicy) -> Self {
        match cli_policy {
            CliMediaPolicy::Overwrite => MediaPolicy::Overwrite,
            CliMediaPolicy::Skip => MediaPolicy::Skip,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert flashcard packages or data tables (default command)
    Convert(ConvertArgs),
    
    /// Generate shell completions for clozeport
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct ConvertArgs {
    /// Package (.zip), data table (.csv/.tsv) or directory of packages.
    /// When omitted, every package in the raw directory is converted.
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Color for cloze answers (e.g. '#e91e63' or 'red')
    #[arg(long)]
    color: Option<String>,

    /// Directory containing packages to convert
    #[arg(long)]
    raw_dir: Option<PathBuf>,

    /// Directory receiving converted tables
    #[arg(long)]
    processed_dir: Option<PathBuf>,

    /// Directory receiving package media
    #[arg(long)]
    media_dir: Option<PathBuf>,

    /// What to do with media files that already exist
    #[arg(long, value_enum)]
    media_policy: Option<CliMediaPolicy>,

    /// Keep converting remaining packages after one fails
    #[arg(short, long)]
    keep_going: bool,

    /// Keep a leading byte-order mark in data files
    #[arg(long)]
    no_strip_bom: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// clozeport - flashcard package converter
/// 
/// Converts exported flashcard packages into a two-column table, rewriting
/// card markup and copying media along the way.
#[derive(Parser, Debug)]
#[command(name = "clozeport")]
#[command(version)]
#[command(about = "Flashcard package converter")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "clozeport converts exported flashcard packages (zip archives holding a
tab-separated data file and a media folder) into a two-column table:
rewritten card markup and the extracted translation.

EXAMPLES:
    clozeport                                   # Convert every package in data/raw
    clozeport data/raw/deck.zip                 # Convert one package
    clozeport items.csv                         # Convert a bare data table
    clozeport -f --color '#e91e63' deck.zip     # Overwrite output, custom cloze color
    clozeport --keep-going --raw-dir exports/   # Continue past broken packages
    clozeport completions bash > clozeport.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    convert: ConvertArgs,
}

// @struct: Custom logger implementation
// The level lives in `log::max_level()` so it can be raised after config load
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }
    
    // @returns: ANSI color and label for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
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
            let (color, label) = Self::style_for_level(record.level());
            
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, label, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;
    
    let cli = CommandLineOptions::parse();
    
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "clozeport", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Convert(args)) => run_convert(args),
        None => run_convert(cli.convert),
    }
}

/// Load the configuration file, creating a default one when it is missing
fn load_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let content = FileManager::read_to_string(config_path)?;
        serde_json::from_str(&content)
            .context(format!("Failed to parse config file: {}", config_path))
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        FileManager::write_to_file(config_path, &config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        
        Ok(config)
    }
}

/// Override config values with the ones given on the command line
fn apply_overrides(config: &mut Config, options: &ConvertArgs) {
    if let Some(color) = &options.color {
        config.color = color.clone();
    }
    if let Some(raw_dir) = &options.raw_dir {
        config.raw_dir = raw_dir.clone();
    }
    if let Some(processed_dir) = &options.processed_dir {
        config.processed_dir = processed_dir.clone();
    }
    if let Some(media_dir) = &options.media_dir {
        config.media_dir = media_dir.clone();
    }
    if let Some(policy) = &options.media_policy {
        config.media_policy = policy.clone().into();
    }
    if options.keep_going {
        config.keep_going = true;
    }
    if options.no_strip_bom {
        config.strip_bom = false;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

fn run_convert(options: ConvertArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }
    
    let mut config = load_config(&options.config_path)?;
    apply_overrides(&mut config, &options);
    
    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }
    
    let raw_dir = config.raw_dir.clone();
    let controller = Controller::with_config(config)?;
    
    let summary = match &options.input_path {
        Some(path) if path.is_dir() => controller.run_folder(path, options.force_overwrite)?,
        Some(path) if path.exists() => {
            controller.run(path, options.force_overwrite)?;
            return Ok(());
        }
        Some(path) => return Err(anyhow!("Input path does not exist: {:?}", path)),
        None => controller.run_folder(&raw_dir, options.force_overwrite)?,
    };
    
    if summary.failed > 0 {
        return Err(anyhow!(
            "{} of {} packages failed",
            summary.failed,
            summary.total()
        ));
    }
    
    Ok(())
}
