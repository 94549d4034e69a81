//! Observed state captured in a YAML snapshot
//!
//! A snapshot records, for one cluster, the stacks that exist, the
//! nodegroups the cluster API reports and the Kubernetes service accounts
//! that exist. It answers every lister from that single capture, so all
//! reconciliation phases of one invocation see the same consistent view.
//!
//! ```yaml
//! clusterName: prod
//! stacks:
//!   - stackName: eksctl-prod-nodegroup-ng-1
//!     tags:
//!       alpha.eksctl.io/nodegroup-name: ng-1
//!       alpha.eksctl.io/nodegroup-type: managed
//! nodeGroups: [ng-1, console-created]
//! serviceAccounts: [kube-system/aws-node]
//! ```

use crate::error::ListerError;
use crate::lister_trait::{
    AccessEntryStackLister, ClusterNodeGroupLister, NodeGroupStackLister, ServiceAccountExistenceChecker,
    ServiceAccountStackLister,
};
use crate::models::{access_entry_stack_prefix, NodeGroupStack, StackSummary};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Observed state of one cluster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StackSnapshot {
    pub cluster_name: String,

    #[serde(default)]
    pub stacks: Vec<StackSummary>,

    /// Nodegroups reported by the cluster API
    #[serde(default)]
    pub node_groups: Vec<String>,

    /// Existing Kubernetes service accounts as `namespace/name`
    #[serde(default)]
    pub service_accounts: Vec<String>,
}

impl StackSnapshot {
    pub fn from_yaml_str(document: &str) -> Result<Self, ListerError> {
        Ok(serde_yaml::from_str(document)?)
    }

    /// Reads a snapshot file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ListerError> {
        let path = path.as_ref();
        let document = tokio::fs::read_to_string(path).await.map_err(|source| ListerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot = Self::from_yaml_str(&document)?;
        debug!(
            cluster = %snapshot.cluster_name,
            stacks = snapshot.stacks.len(),
            "loaded stack snapshot"
        );
        Ok(snapshot)
    }

    fn cluster_stacks(&self) -> impl Iterator<Item = &StackSummary> {
        self.stacks.iter().filter(|stack| stack.belongs_to(&self.cluster_name))
    }

    fn ensure_cluster(&self, cluster_name: &str) -> Result<(), ListerError> {
        if cluster_name == self.cluster_name {
            Ok(())
        } else {
            Err(ListerError::Api(format!(
                "snapshot describes cluster {:?}, not {:?}",
                self.cluster_name, cluster_name
            )))
        }
    }
}

#[async_trait::async_trait]
impl NodeGroupStackLister for StackSnapshot {
    async fn list_node_group_stacks(&self) -> Result<Vec<NodeGroupStack>, ListerError> {
        Ok(self.cluster_stacks().filter_map(StackSummary::as_node_group_stack).collect())
    }
}

#[async_trait::async_trait]
impl ClusterNodeGroupLister for StackSnapshot {
    async fn list_node_groups(&self, cluster_name: &str) -> Result<Vec<String>, ListerError> {
        self.ensure_cluster(cluster_name)?;
        Ok(self.node_groups.clone())
    }
}

#[async_trait::async_trait]
impl ServiceAccountStackLister for StackSnapshot {
    async fn list_iam_service_account_stacks(&self) -> Result<Vec<String>, ListerError> {
        Ok(self
            .cluster_stacks()
            .filter_map(StackSummary::service_account_name)
            .map(str::to_string)
            .collect())
    }
}

#[async_trait::async_trait]
impl AccessEntryStackLister for StackSnapshot {
    async fn list_access_entry_stack_names(&self, cluster_name: &str) -> Result<Vec<String>, ListerError> {
        self.ensure_cluster(cluster_name)?;
        let prefix = access_entry_stack_prefix(cluster_name);
        Ok(self
            .stacks
            .iter()
            .filter(|stack| stack.stack_name.starts_with(&prefix))
            .map(|stack| stack.stack_name.clone())
            .collect())
    }
}

#[async_trait::async_trait]
impl ServiceAccountExistenceChecker for StackSnapshot {
    async fn service_account_exists(&self, namespace: &str, name: &str) -> Result<bool, ListerError> {
        let wanted = format!("{namespace}/{name}");
        Ok(self.service_accounts.iter().any(|sa| *sa == wanted))
    }
}
