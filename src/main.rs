// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use eduart_aligner::aligner::AlignmentStats;
use eduart_aligner::api::{self, AlignRequest, AlignResponse};
use eduart_aligner::app_config::{self, Config};
use eduart_aligner::file_utils::FileManager;
use eduart_aligner::server::AlignServer;

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
    /// Serve the alignment endpoint over HTTP
    Serve(ServeArgs),

    /// Align two script files, or a JSON request file, and print the result
    Align(AlignArgs),

    /// Generate shell completions for eduart-aligner
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Interface to bind (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct AlignArgs {
    /// Source language script ('-' for stdin)
    #[arg(short, long, value_name = "FILE", required_unless_present = "request", requires = "target")]
    source: Option<PathBuf>,

    /// Target language script ('-' for stdin)
    #[arg(short, long, value_name = "FILE", requires = "source")]
    target: Option<PathBuf>,

    /// JSON request file with kor_text and eng_text ('-' for stdin)
    #[arg(short, long, value_name = "FILE", conflicts_with_all = ["source", "target"])]
    request: Option<PathBuf>,

    /// Write the result to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print compact JSON instead of pretty JSON
    #[arg(long)]
    compact: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// EduArt Aligner - bilingual script alignment
///
/// Pairs a source language script with its translation line by line for a
/// synchronized bilingual player.
#[derive(Parser, Debug)]
#[command(name = "eduart-aligner")]
#[command(version)]
#[command(about = "Line-by-line alignment of bilingual scripts")]
#[command(long_about = "EduArt Aligner pairs two parallel scripts line by line. Blank lines are ignored,
surrounding whitespace is trimmed and the shorter script is padded with empty lines.

EXAMPLES:
    eduart-aligner serve                                  # Serve POST /api/align using conf.json
    eduart-aligner serve --host 0.0.0.0 -p 8080           # Override the bind address
    eduart-aligner align -s ko.txt -t en.txt              # Print the aligned rows as JSON
    eduart-aligner align -s ko.txt -t en.txt -o rows.json # Write the result to a file
    eduart-aligner align -r request.json                  # Align a JSON request payload
    eduart-aligner completions bash > eduart-aligner.bash # Generate bash completions

CONFIGURATION:
    Server settings are stored in conf.json by default. If the config file doesn't
    exist, a default one will be created automatically when serving.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation, filtered by the facade's max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
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
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated once the config and flags are known
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Align(args) => run_align(args),
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "eduart-aligner", &mut std::io::stdout());
            Ok(())
        }
    }
}

async fn run_serve(options: ServeArgs) -> Result<()> {
    if let Some(level) = &options.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = load_or_create_config(&options.config_path)?;

    if let Some(host) = &options.host {
        config.server.host = host.clone();
    }
    if let Some(port) = options.port {
        config.server.port = port;
    }
    if let Some(level) = &options.log_level {
        config.log_level = level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let server = AlignServer::bind(&config).await?;
    server.run().await
}

// Load the config file, writing a default one when it doesn't exist
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if FileManager::file_exists(config_path) {
        return Config::from_file(config_path);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    config.save(config_path)?;
    Ok(config)
}

fn run_align(options: AlignArgs) -> Result<()> {
    if let Some(level) = &options.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let response = match (&options.request, &options.source, &options.target) {
        (Some(request_path), _, _) => {
            let body = FileManager::read_input(request_path)?;
            api::handle_align_body(body.as_bytes())
                .with_context(|| format!("Rejected request file: {:?}", request_path))?
        }
        (None, Some(source_path), Some(target_path)) => {
            if FileManager::is_stdio(source_path) && FileManager::is_stdio(target_path) {
                return Err(anyhow!("Only one of --source and --target can read from stdin"));
            }
            let request = AlignRequest::new(
                FileManager::read_input(source_path)?,
                FileManager::read_input(target_path)?,
            );
            api::handle_align(&request)
        }
        _ => return Err(anyhow!("Either --request or both --source and --target are required")),
    };

    report_stats(&response);

    let json = if options.compact {
        serde_json::to_string(&response)
    } else {
        serde_json::to_string_pretty(&response)
    }
    .context("Failed to serialize alignment")?;

    match &options.output {
        Some(path) if !FileManager::is_stdio(path) => {
            FileManager::write_to_file(path, &json)?;
            info!("Success: {:?}", path);
        }
        _ => println!("{}", json),
    }

    Ok(())
}

fn report_stats(response: &AlignResponse) {
    let stats = AlignmentStats::of(&response.data);
    info!("Aligned {} rows", stats.total);
    if !stats.is_balanced() {
        warn!(
            "Scripts differ in length: {} rows without source, {} rows without target",
            stats.missing_source, stats.missing_target
        );
    }
}
