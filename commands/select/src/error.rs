//! Command error types.

use cluster_config::ConfigError;
use resource_filter::FilterError;
use stack_client::ListerError;
use thiserror::Error;

/// Errors that abort a selection run.
#[derive(Debug, Error)]
pub enum SelectError {
    /// Invalid environment configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The cluster config could not be loaded
    #[error("Cluster config error: {0}")]
    ClusterConfig(#[from] ConfigError),

    /// Observed state could not be read
    #[error("Observed state error: {0}")]
    Lister(#[from] ListerError),

    /// The selection could not be determined
    #[error("Selection failed: {0}")]
    Filter(#[from] FilterError),

    /// The plan could not be serialized
    #[error("Serializing plan: {0}")]
    Json(#[from] serde_json::Error),
}
