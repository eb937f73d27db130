//! Setup shared by the commands that read a Renovate log

use crate::Result;
use crate::aggregator::{Aggregation, Aggregator};
use crate::config::Config;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, ValueEnum};
use ohno::IntoAppError;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

const LOG_TARGET: &str = "  commands";

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments shared between the push and print commands
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Renovate JSON log to read, or `-` for standard input
    #[arg(long, short = 'f', value_name = "PATH", default_value = "-")]
    pub file: Utf8PathBuf,

    /// Path to configuration file (default is `renovate-metrics.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Longest accepted log line in bytes (overrides the configuration)
    #[arg(long, value_name = "BYTES")]
    pub buffer_size: Option<usize>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    pub log_level: LogLevel,
}

/// Initialize logger based on log level
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // a second command in the same process keeps the first logger
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

/// Load the configuration and apply the command-line overrides shared by all log-reading commands
///
/// Callers applying further overrides must validate again.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid
pub fn load_config(args: &CommonArgs) -> Result<Config> {
    let (mut config, source) = Config::load(Utf8Path::new("."), args.config.as_ref())?;
    match &source {
        Some(path) => log::debug!(target: LOG_TARGET, "Loaded configuration from {path}"),
        None => log::debug!(target: LOG_TARGET, "Using default configuration"),
    }

    if let Some(buffer_size) = args.buffer_size {
        config.buffer_size = buffer_size;
    }

    config.validate()?;
    Ok(config)
}

/// Open the log to read, with `-` meaning standard input
fn open_input(path: &Utf8Path) -> Result<Box<dyn BufRead>> {
    if path.as_str() == "-" {
        log::debug!(target: LOG_TARGET, "Reading log from standard input");
        return Ok(Box::new(io::stdin().lock()));
    }

    let file = File::open(path).into_app_err_with(|| format!("opening Renovate log {path}"))?;
    log::debug!(target: LOG_TARGET, "Reading log from {path}");
    Ok(Box::new(BufReader::new(file)))
}

/// Aggregate the whole input log
///
/// # Errors
///
/// Returns an error if the input cannot be opened. Failures while reading are
/// reported inside the returned [`Aggregation`] along with the partial results.
pub fn aggregate(config: &Config, input: &Utf8Path) -> Result<Aggregation> {
    let reader = open_input(input)?;
    let aggregator = Aggregator::from_config(config)?;
    Ok(aggregator.aggregate(reader))
}
