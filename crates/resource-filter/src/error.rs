//! Selection errors
//!
//! All of these are fatal to the command that built the filter: when the
//! set of resources to act on cannot be determined, nothing is acted on.

use cluster_config::ConfigError;
use stack_client::ListerError;
use thiserror::Error;

/// Errors that can occur while configuring or reconciling a filter
#[derive(Debug, Error)]
pub enum FilterError {
    /// A glob expression is malformed
    #[error("parsing glob filter {pattern:?}: {source}")]
    PatternCompile {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// Include globs were given but none of them matches any candidate
    #[error("no {resource}s match include glob filter specification: {patterns:?}")]
    NoMatch { resource: String, patterns: String },

    /// A resource that must be excluded because it exists was explicitly included
    #[error("existing {resource} {name:?} should be excluded, but matches include filter: {rules}")]
    Conflict {
        resource: String,
        name: String,
        rules: String,
    },

    /// Two reconciliation modes that cannot be combined were requested
    #[error("{resource} filter is already in {current} mode, cannot switch to {requested}")]
    IncompatibleModes {
        resource: String,
        current: String,
        requested: String,
    },

    /// Observing the current state failed
    #[error("listing {resource}s: {source}")]
    Lister {
        resource: String,
        #[source]
        source: ListerError,
    },

    /// A name reported by a lister cannot be turned back into a descriptor
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FilterError {
    pub(crate) fn lister(resource: &'static str) -> impl FnOnce(ListerError) -> Self {
        move |source| Self::Lister {
            resource: resource.to_string(),
            source,
        }
    }
}
