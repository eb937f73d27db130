//! Fact extraction from decoded log records
//!
//! A *fact* is one deduplicatable observation: a dependency as it is currently
//! installed, or an update available for it. Facts are identified by value-typed
//! keys ([`DependencyFactKey`], [`UpdateFactKey`]) whose fields are exactly the
//! labels of the exported series, so equal keys always mean the same series.
//!
//! The [`Extractor`] also recognizes the run-completion record, which carries no
//! facts but stamps the repository's last successful run.

mod extractor;
mod fact_key;

pub use extractor::{
    DEFAULT_COMPLETION_MESSAGE, DEFAULT_VULNERABILITY_BRANCH_PATTERN, DependencyFacts, Extraction, Extractor, release_timestamp,
};
pub use fact_key::{DependencyFactKey, LabelSet, UpdateFactKey};
