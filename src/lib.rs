//! renovate-metrics crate
//!
//! Turns the JSON log of Renovate runs into per-repository Prometheus metrics: the
//! dependencies each repository has installed, the updates available for them, and
//! when Renovate last finished with the repository.
//!
//! # Module Organization
//!
//! - [`records`]: typed model of one decoded log line
//! - [`facts`]: dependency, update and completion facts derived from a record
//! - [`metrics`]: deduplicated per-repository metric storage and its exposition
//! - [`aggregator`]: routing of a whole log stream into per-repository metrics
//! - [`push`]: delivery to a Prometheus push gateway
//! - [`config`]: configuration file handling
//!
//! This crate is an implementation detail of the `renovate-metrics` tool. Its API is fluid and
//! may change without warning and in a semver-incompatible way.

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod aggregator;

#[doc(hidden)]
pub mod commands;

pub mod config;
pub mod facts;
pub mod metrics;
pub mod push;
pub mod records;

pub use commands::{Host, run};
