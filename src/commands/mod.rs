//! Command-line interface for renovate-metrics
//!
//! The `run` function parses command-line arguments using clap and routes to the
//! appropriate command handler:
//!
//! - **push**: aggregate a log, then clear and re-push each repository's group on
//!   a Prometheus push gateway
//! - **print**: aggregate a log and write all repositories' metrics, labeled by
//!   repository, in the text exposition format
//! - **init**: generate a default configuration file
//! - **validate**: check a configuration file
//!
//! All output goes through a [`Host`], so the commands can be driven from tests.

mod common;
mod host;
mod init;
mod print;
mod push;
mod run;
mod validate;

pub use common::{CommonArgs, LogLevel};
pub use host::Host;
#[cfg(test)]
pub use host::TestHost;
pub use init::{InitArgs, init_config};
pub use print::{PrintArgs, print_metrics};
pub use push::{PushArgs, push_metrics};
pub use run::run;
pub use validate::{ValidateArgs, validate_config};
