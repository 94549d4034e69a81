//! Cluster Select
//!
//! Decides which nodegroups, IAM service accounts or access entries of a
//! cluster config an operation would act on, reconciling the config with
//! the observed state of the cluster, and prints the plan as JSON:
//!
//! ```json
//! {"cluster": "prod", "kind": "nodegroup", "operation": "create",
//!  "included": ["ng-2"], "excluded": ["ng-1"]}
//! ```
//!
//! Logs go to stderr so that stdout carries only the plan.

mod config;
#[cfg(test)]
mod config_test;
mod error;
mod plan;

use crate::config::SelectConfig;
use crate::error::SelectError;
use cluster_config::ClusterConfig;
use stack_client::{KubeServiceAccountChecker, ServiceAccountExistenceChecker, StackSnapshot};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), SelectError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = SelectConfig::from_env()?;
    info!("Configuration:");
    info!("  Cluster config: {}", config.cluster_config.display());
    info!("  Observed state: {}", config.observed_state.display());
    info!("  Selecting: {} {}", config.operation, config.kind);

    let cfg = ClusterConfig::from_file(&config.cluster_config)?;
    let snapshot = StackSnapshot::load(&config.observed_state).await?;

    let kube_checker = if config.kube_existence_check {
        Some(KubeServiceAccountChecker::try_default().await?)
    } else {
        None
    };
    let checker: &dyn ServiceAccountExistenceChecker = match &kube_checker {
        Some(kube_checker) => kube_checker,
        None => &snapshot,
    };

    let plan = plan::build_plan(&config, &cfg, &snapshot, checker).await?;
    println!("{}", serde_json::to_string_pretty(&plan)?);

    Ok(())
}
