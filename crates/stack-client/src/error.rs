//! Lister errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while observing cluster state
#[derive(Debug, Error)]
pub enum ListerError {
    /// The stack API returned an error
    #[error("stack API error: {0}")]
    Api(String),

    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// A snapshot file could not be read
    #[error("reading snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot file is not valid YAML
    #[error("parsing snapshot: {0}")]
    Parse(#[from] serde_yaml::Error),
}
