use super::Host;
use super::common::{CommonArgs, aggregate, init_logging, load_config};
use crate::Result;
use crate::push::PushGateway;
use clap::Parser;
use ohno::bail;
use std::io::Write;

const LOG_TARGET: &str = "  commands";

#[derive(Parser, Debug)]
pub struct PushArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Push gateway URL (overrides the configuration)
    #[arg(long, value_name = "URL")]
    pub prometheus: Option<String>,

    /// Job name grouping the pushed metrics (overrides the configuration)
    #[arg(long, value_name = "NAME")]
    pub job: Option<String>,
}

/// Aggregate the log, then replace each repository's group on the push gateway
///
/// Nothing is pushed when reading the log fails part way, since the gateway would
/// otherwise lose series that were simply not read yet.
///
/// # Errors
///
/// Returns an error if the log cannot be read completely or any repository fails to push
pub async fn push_metrics<H: Host>(host: &mut H, args: &PushArgs) -> Result<()> {
    init_logging(args.common.log_level);

    let mut config = load_config(&args.common)?;
    if let Some(url) = &args.prometheus {
        config.push_gateway_url.clone_from(url);
    }
    if let Some(job) = &args.job {
        config.push_job.clone_from(job);
    }
    config.validate()?;

    let gateway = PushGateway::from_config(&config)?;
    let aggregation = aggregate(&config, &args.common.file)?;
    let repositories = match aggregation.into_result() {
        Ok(repositories) => repositories,
        Err(e) => bail!("refusing to push metrics from an incompletely read log: {e}"),
    };

    let mut names: Vec<_> = repositories.keys().collect();
    names.sort();

    let mut failed = 0;
    for name in &names {
        if let Err(e) = gateway.replace(name, &repositories[*name], &config.namespace).await {
            log::error!(target: LOG_TARGET, "Unable to push metrics of '{name}': {e}");
            let _ = writeln!(host.error(), "Unable to push metrics of '{name}': {e}");
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("unable to push metrics for {failed} of {} repositories", names.len());
    }

    let _ = writeln!(
        host.output(),
        "Pushed metrics for {} repositories to {}",
        names.len(),
        config.push_gateway_url
    );
    Ok(())
}
