//! Mock stack client for unit testing
//!
//! Implements every lister trait from in-memory state so that selection
//! logic can be tested without a cloud account or a cluster. Each lister
//! call is counted, and the mock can be switched into a failing mode to
//! exercise error propagation.

use crate::error::ListerError;
use crate::lister_trait::{
    AccessEntryStackLister, ClusterNodeGroupLister, NodeGroupStackLister, ServiceAccountExistenceChecker,
    ServiceAccountStackLister,
};
use crate::models::{NodeGroupStack, NodeGroupType};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MockState {
    node_group_stacks: Vec<NodeGroupStack>,
    cluster_node_groups: Vec<String>,
    service_account_stacks: Vec<String>,
    access_entry_stacks: Vec<String>,
    existing_service_accounts: HashSet<String>,
    failure: Option<String>,
    calls: HashMap<&'static str, usize>,
}

/// Mock observed state for testing
#[derive(Debug, Clone)]
pub struct MockStackClient {
    cluster_name: String,
    state: Arc<Mutex<MockState>>,
}

impl MockStackClient {
    /// Create an empty mock for `cluster_name`
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add unmanaged nodegroup stacks (for test setup)
    pub fn with_node_group_stacks<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_typed_node_group_stacks(names, NodeGroupType::Unmanaged)
    }

    /// Add nodegroup stacks of the given type (for test setup)
    pub fn with_typed_node_group_stacks<I, S>(self, names: I, node_group_type: NodeGroupType) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut state = self.state();
            for name in names {
                state
                    .node_group_stacks
                    .push(NodeGroupStack::new(&self.cluster_name, name, node_group_type));
            }
        }
        self
    }

    /// Add nodegroups the cluster API reports (for test setup)
    pub fn with_cluster_node_groups<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().cluster_node_groups.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add `namespace/name` service account stacks (for test setup)
    pub fn with_service_account_stacks<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().service_account_stacks.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add access entry stack names (for test setup)
    pub fn with_access_entry_stacks<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().access_entry_stacks.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add existing Kubernetes service accounts as `namespace/name` (for test setup)
    pub fn with_existing_service_accounts<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().existing_service_accounts.extend(names.into_iter().map(Into::into));
        self
    }

    /// Make every subsequent call fail with `message`
    pub fn fail_with(&self, message: impl Into<String>) {
        self.state().failure = Some(message.into());
    }

    /// Replace the access entry stacks (simulates stacks created between runs)
    pub fn set_access_entry_stacks(&self, names: Vec<String>) {
        self.state().access_entry_stacks = names;
    }

    /// How many times the named operation was called
    pub fn call_count(&self, operation: &str) -> usize {
        self.state().calls.get(operation).copied().unwrap_or(0)
    }

    fn record(&self, operation: &'static str) -> Result<MutexGuard<'_, MockState>, ListerError> {
        let mut state = self.state();
        *state.calls.entry(operation).or_insert(0) += 1;
        if let Some(message) = state.failure.clone() {
            return Err(ListerError::Api(message));
        }
        Ok(state)
    }
}

#[async_trait::async_trait]
impl NodeGroupStackLister for MockStackClient {
    async fn list_node_group_stacks(&self) -> Result<Vec<NodeGroupStack>, ListerError> {
        Ok(self.record("list_node_group_stacks")?.node_group_stacks.clone())
    }
}

#[async_trait::async_trait]
impl ClusterNodeGroupLister for MockStackClient {
    async fn list_node_groups(&self, cluster_name: &str) -> Result<Vec<String>, ListerError> {
        let state = self.record("list_node_groups")?;
        if cluster_name != self.cluster_name {
            return Err(ListerError::Api(format!("cluster {cluster_name:?} not found")));
        }
        Ok(state.cluster_node_groups.clone())
    }
}

#[async_trait::async_trait]
impl ServiceAccountStackLister for MockStackClient {
    async fn list_iam_service_account_stacks(&self) -> Result<Vec<String>, ListerError> {
        Ok(self.record("list_iam_service_account_stacks")?.service_account_stacks.clone())
    }
}

#[async_trait::async_trait]
impl AccessEntryStackLister for MockStackClient {
    async fn list_access_entry_stack_names(&self, cluster_name: &str) -> Result<Vec<String>, ListerError> {
        let state = self.record("list_access_entry_stack_names")?;
        if cluster_name != self.cluster_name {
            return Ok(Vec::new());
        }
        Ok(state.access_entry_stacks.clone())
    }
}

#[async_trait::async_trait]
impl ServiceAccountExistenceChecker for MockStackClient {
    async fn service_account_exists(&self, namespace: &str, name: &str) -> Result<bool, ListerError> {
        let state = self.record("service_account_exists")?;
        Ok(state.existing_service_accounts.contains(&format!("{namespace}/{name}")))
    }
}
