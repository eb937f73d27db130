use super::Host;
use crate::Result;
use crate::config::{CONFIG_FILE_STEM, Config};
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output configuration file path (default is `renovate-metrics.toml`)
    #[arg(value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,
}

/// Write the default configuration, in the format given by the file extension
///
/// # Errors
///
/// Returns an error if the file cannot be written
pub fn init_config<H: Host>(host: &mut H, args: &InitArgs) -> Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| Utf8PathBuf::from(format!("{CONFIG_FILE_STEM}.toml")));

    Config::save_default(&output)?;
    let _ = writeln!(host.output(), "Generated default configuration file: {output}");
    Ok(())
}
