//! Cluster configuration errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or interpreting a cluster configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("reading cluster config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration document is not valid YAML for a `ClusterConfig`
    #[error("parsing cluster config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A required field was left empty
    #[error("invalid cluster config: {0}")]
    Invalid(String),

    /// A service account name string is not of the form `namespace/name`
    #[error("unexpected serviceaccount name format {0:?}")]
    InvalidServiceAccountName(String),
}
