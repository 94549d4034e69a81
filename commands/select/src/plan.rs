//! Builds the selection plan for one run
//!
//! Exactly one filter is built for the configured kind and operation, it is
//! reconciled once against the observed state, and the resulting partition
//! is returned. Nothing is created or deleted.

use crate::config::{Operation, ResourceKind, SelectConfig};
use crate::error::SelectError;
use cluster_config::ClusterConfig;
use resource_filter::{AccessEntryFilter, IamServiceAccountFilter, MatchResult, NodeGroupFilter};
use serde::Serialize;
use stack_client::{ServiceAccountExistenceChecker, StackSnapshot};
use std::collections::HashSet;
use tracing::info;

/// Names an operation acts on and names it skips
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Plan {
    pub cluster: String,
    pub kind: String,
    pub operation: String,
    pub included: Vec<String>,
    pub excluded: Vec<String>,
}

impl Plan {
    fn new(config: &SelectConfig, cfg: &ClusterConfig, result: &MatchResult) -> Self {
        Self {
            cluster: cfg.metadata.name.clone(),
            kind: config.kind.to_string(),
            operation: config.operation.to_string(),
            included: result.included_sorted().into_iter().map(str::to_string).collect(),
            excluded: result.excluded_sorted().into_iter().map(str::to_string).collect(),
        }
    }
}

/// Selects the resources of `cfg` that the configured operation acts on.
pub async fn build_plan(
    config: &SelectConfig,
    cfg: &ClusterConfig,
    snapshot: &StackSnapshot,
    checker: &dyn ServiceAccountExistenceChecker,
) -> Result<Plan, SelectError> {
    let result = match config.kind {
        ResourceKind::NodeGroup => select_node_groups(config, cfg, snapshot).await?,
        ResourceKind::IamServiceAccount => select_service_accounts(config, cfg, snapshot, checker).await?,
        ResourceKind::AccessEntry => select_access_entries(cfg, snapshot).await?,
    };
    info!(
        "{} {}: {} included, {} excluded",
        config.operation,
        config.kind,
        result.included.len(),
        result.excluded.len()
    );
    Ok(Plan::new(config, cfg, &result))
}

async fn select_node_groups(
    config: &SelectConfig,
    cfg: &ClusterConfig,
    snapshot: &StackSnapshot,
) -> Result<MatchResult, SelectError> {
    let mut filter = NodeGroupFilter::new();
    filter.set_exclude_all(config.without_node_group);
    filter.append_globs(&config.include, &config.exclude, &cfg.all_node_group_names())?;

    let cfg = match (config.operation, config.only_missing) {
        (Operation::Create, _) => filter.set_only_local(snapshot, snapshot, cfg).await?,
        (Operation::Delete, true) => filter.set_only_remote(snapshot, snapshot, cfg).await?,
        (Operation::Delete, false) => cfg.clone(),
    };

    filter.log_info(&cfg);
    Ok(filter.match_all(cfg.all_node_group_names()))
}

async fn select_service_accounts(
    config: &SelectConfig,
    cfg: &ClusterConfig,
    snapshot: &StackSnapshot,
    checker: &dyn ServiceAccountExistenceChecker,
) -> Result<MatchResult, SelectError> {
    let mut filter = IamServiceAccountFilter::new();
    filter.append_globs(&config.include, &config.exclude, &cfg.iam.service_accounts)?;

    let service_accounts = match config.operation {
        Operation::Create => {
            filter
                .set_exclude_existing_filter(snapshot, checker, &cfg.iam.service_accounts, config.override_existing)
                .await?;
            cfg.iam.service_accounts.clone()
        }
        Operation::Delete => filter.set_delete_filter(snapshot, config.only_missing, cfg).await?,
    };

    filter.log_info(&service_accounts);
    Ok(filter.match_all(&service_accounts))
}

async fn select_access_entries(cfg: &ClusterConfig, snapshot: &StackSnapshot) -> Result<MatchResult, SelectError> {
    let entries = &cfg.access_config.access_entries;
    let filter = AccessEntryFilter::new(cfg.metadata.name.clone(), snapshot);
    let remaining = filter.filter_out_existing_stacks(entries).await?;

    let remaining: HashSet<&str> = remaining.iter().map(|entry| entry.principal_arn.as_str()).collect();
    let mut result = MatchResult::default();
    for entry in entries {
        if remaining.contains(entry.principal_arn.as_str()) {
            result.included.insert(entry.principal_arn.clone());
        } else {
            result.excluded.insert(entry.principal_arn.clone());
        }
    }
    Ok(result)
}
