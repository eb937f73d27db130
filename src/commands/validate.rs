use super::Host;
use crate::Result;
use crate::config::Config;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `renovate-metrics.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    match Config::load(Utf8Path::new("."), args.config.as_ref()) {
        Ok((_, Some(path))) => {
            let _ = writeln!(host.output(), "Configuration file is valid\nConfig file: {path}");
            Ok(())
        }
        Ok((_, None)) => {
            let _ = writeln!(host.output(), "Using default configuration (no config file found)");
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Configuration validation failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}
