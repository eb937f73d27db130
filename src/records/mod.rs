//! Typed model of Renovate's JSON log output
//!
//! Renovate writes one bunyan-style JSON object per line. Only a handful of those
//! records matter here: the `packageFiles with updates` debug record, which carries
//! the full dependency configuration of a repository under `config`, and the
//! `Repository finished` record that marks a completed run.
//!
//! Every field is optional. Unknown fields are ignored and an explicit `null` is
//! treated the same as an absent field, so the model never rejects a record for
//! its shape, only for not being JSON at all.

mod alert_rule;
mod log_record;
mod package_file;

pub use alert_rule::AlertPackageRule;
pub use log_record::LogRecord;
pub use package_file::{DependencyEntry, PackageFileEntry, UpdateEntry, Warning};

use serde::{Deserialize, Deserializer};

/// Deserialize a field that may be `null`, falling back to the type's default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
