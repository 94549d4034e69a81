//! Lister traits
//!
//! These traits are the observed-state contracts the selection engine
//! depends on. An empty result is a valid empty collection; any error
//! aborts the reconciliation phase that made the call. Implementations own
//! their timeout and retry policy.

use crate::error::ListerError;
use crate::models::NodeGroupStack;

/// Lists nodegroup stacks of one cluster
#[async_trait::async_trait]
pub trait NodeGroupStackLister: Send + Sync {
    async fn list_node_group_stacks(&self) -> Result<Vec<NodeGroupStack>, ListerError>;
}

/// Lists nodegroups as reported by the cluster API, stack-backed or not
#[async_trait::async_trait]
pub trait ClusterNodeGroupLister: Send + Sync {
    async fn list_node_groups(&self, cluster_name: &str) -> Result<Vec<String>, ListerError>;
}

/// Lists the `namespace/name` of every service account backed by a stack
#[async_trait::async_trait]
pub trait ServiceAccountStackLister: Send + Sync {
    async fn list_iam_service_account_stacks(&self) -> Result<Vec<String>, ListerError>;
}

/// Lists access entry stack names of a cluster
#[async_trait::async_trait]
pub trait AccessEntryStackLister: Send + Sync {
    async fn list_access_entry_stack_names(&self, cluster_name: &str) -> Result<Vec<String>, ListerError>;
}

/// Checks whether a Kubernetes service account object exists
#[async_trait::async_trait]
pub trait ServiceAccountExistenceChecker: Send + Sync {
    async fn service_account_exists(&self, namespace: &str, name: &str) -> Result<bool, ListerError>;
}
