//! Stack models and naming conventions
//!
//! Stack names are derived purely from the owning cluster and the resource
//! name, so a declared resource always maps to the same stack without any
//! stored lookup table. Tags carry the same information for listers that
//! classify stacks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tag naming the cluster a stack belongs to
pub const CLUSTER_NAME_TAG: &str = "alpha.eksctl.io/cluster-name";

/// Tag naming the nodegroup a stack backs
pub const NODEGROUP_NAME_TAG: &str = "alpha.eksctl.io/nodegroup-name";

/// Tag holding `managed` or `unmanaged`
pub const NODEGROUP_TYPE_TAG: &str = "alpha.eksctl.io/nodegroup-type";

/// Tag naming the `namespace/name` service account a stack backs
pub const IAM_SERVICE_ACCOUNT_NAME_TAG: &str = "alpha.eksctl.io/iamserviceaccount-name";

/// Prefix shared by every stack of `cluster_name`
pub fn cluster_stack_prefix(cluster_name: &str) -> String {
    format!("eksctl-{cluster_name}-")
}

pub fn node_group_stack_name(cluster_name: &str, node_group_name: &str) -> String {
    format!("{}nodegroup-{node_group_name}", cluster_stack_prefix(cluster_name))
}

pub fn iam_service_account_stack_name(cluster_name: &str, namespace: &str, name: &str) -> String {
    format!(
        "{}addon-iamserviceaccount-{namespace}-{name}",
        cluster_stack_prefix(cluster_name)
    )
}

/// Prefix of every access entry stack of `cluster_name`
pub fn access_entry_stack_prefix(cluster_name: &str) -> String {
    format!("{}accessentry-", cluster_stack_prefix(cluster_name))
}

/// How a nodegroup is operated
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeGroupType {
    /// Provider-managed nodegroup
    Managed,

    /// Self-managed nodegroup
    #[default]
    Unmanaged,
}

impl NodeGroupType {
    /// Interprets a nodegroup-type tag value; anything but `managed` is unmanaged.
    pub fn from_tag(value: &str) -> Self {
        if value.eq_ignore_ascii_case("managed") {
            Self::Managed
        } else {
            Self::Unmanaged
        }
    }
}

impl fmt::Display for NodeGroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Managed => f.write_str("managed"),
            Self::Unmanaged => f.write_str("unmanaged"),
        }
    }
}

/// A stack backing one nodegroup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupStack {
    pub stack_name: String,
    pub node_group_name: String,
    pub node_group_type: NodeGroupType,
}

impl NodeGroupStack {
    /// A stack named after the usual convention for `cluster_name`
    pub fn new(cluster_name: &str, node_group_name: impl Into<String>, node_group_type: NodeGroupType) -> Self {
        let node_group_name = node_group_name.into();
        Self {
            stack_name: node_group_stack_name(cluster_name, &node_group_name),
            node_group_name,
            node_group_type,
        }
    }
}

/// A raw stack summary: its name and tags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StackSummary {
    pub stack_name: String,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl StackSummary {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Whether this stack belongs to `cluster_name`, by tag or else by name prefix.
    pub fn belongs_to(&self, cluster_name: &str) -> bool {
        match self.tag(CLUSTER_NAME_TAG) {
            Some(owner) => owner == cluster_name,
            None => self.stack_name.starts_with(&cluster_stack_prefix(cluster_name)),
        }
    }

    /// The nodegroup stack this summary describes, if any
    pub fn as_node_group_stack(&self) -> Option<NodeGroupStack> {
        let node_group_name = self.tag(NODEGROUP_NAME_TAG)?;
        Some(NodeGroupStack {
            stack_name: self.stack_name.clone(),
            node_group_name: node_group_name.to_string(),
            node_group_type: self.tag(NODEGROUP_TYPE_TAG).map(NodeGroupType::from_tag).unwrap_or_default(),
        })
    }

    /// The `namespace/name` of the service account this stack backs, if any
    pub fn service_account_name(&self) -> Option<&str> {
        self.tag(IAM_SERVICE_ACCOUNT_NAME_TAG)
    }
}
