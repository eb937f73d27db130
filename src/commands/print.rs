use super::Host;
use super::common::{CommonArgs, aggregate, init_logging, load_config};
use crate::Result;
use crate::metrics::encode_repositories;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct PrintArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Aggregate the log and write every repository's metrics to the output
///
/// If reading stops early, whatever was aggregated is still written before the
/// error is returned.
///
/// # Errors
///
/// Returns an error if the log cannot be opened or read completely
pub fn print_metrics<H: Host>(host: &mut H, args: &PrintArgs) -> Result<()> {
    init_logging(args.common.log_level);

    let config = load_config(&args.common)?;
    let aggregation = aggregate(&config, &args.common.file)?;

    let text = encode_repositories(
        &config.namespace,
        aggregation.repositories.iter().map(|(name, metrics)| (name.as_str(), metrics)),
    )?;
    let _ = write!(host.output(), "{text}");

    match aggregation.error {
        Some(e) => {
            let _ = writeln!(host.error(), "Metrics are incomplete: {e}");
            host.exit(1);
            Err(e)
        }
        None => Ok(()),
    }
}
