//! Turn Renovate JSON logs into Prometheus dependency metrics.
//!
//! # Overview
//!
//! `renovate-metrics` reads the newline-delimited JSON log that Renovate writes with
//! `LOG_FORMAT=json` and, for every repository in it, tracks:
//!
//! - each installed dependency (`renovate_dependency`)
//! - each update available for it (`renovate_dependency_update`), flagging
//!   vulnerability fixes
//! - when Renovate last finished the repository (`renovate_last_successful_timestamp`)
//!
//! Seeing the same dependency or update again increases the value of its series
//! instead of creating a new one.
//!
//! # Basic Usage
//!
//! **Push to a Prometheus push gateway:**
//! ```bash
//! LOG_FORMAT=json renovate | renovate-metrics push --prometheus http://pushgateway:9091
//! renovate-metrics push --file renovate.log --job nightly
//! ```
//!
//! Each repository is pushed to its own group, keyed by job and repository name.
//! The group is deleted first, so dependencies that were removed do not linger.
//!
//! **Print the metrics instead:**
//! ```bash
//! renovate-metrics print --file renovate.log
//! ```
//!
//! Printed series carry a `repository` label.
//!
//! # Configuration
//!
//! Settings are read from `renovate-metrics.toml` (or `.yml`, `.yaml`, `.json`) in the
//! current directory, or from the file given with `--config`:
//!
//! ```bash
//! renovate-metrics init                  # write the default configuration
//! renovate-metrics validate --config renovate-metrics.toml
//! ```
//!
//! Command-line flags override the file.
//!
//! # Diagnostics
//!
//! Use `--log-level` (`none`, `error`, `warn`, `info`, `debug`, `trace`) to see what
//! happens to each line. `RUST_LOG` takes precedence when set.

use renovate_metrics::{Host, run};
use std::io::Write;
use std::io::{stderr, stdout};

/// Default host that runs real OS commands.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }

    fn exit(&mut self, code: i32) {
        std::process::exit(code);
    }
}

#[tokio::main]
async fn main() -> Result<(), ohno::AppError> {
    run(&mut RealHost, std::env::args()).await
}
