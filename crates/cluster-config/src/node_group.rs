//! Nodegroup descriptors
//!
//! A cluster declares two flavours of nodegroup: self-managed (`nodeGroups`)
//! and provider-managed (`managedNodeGroups`). Both share the same base
//! fields; the selection engine only ever looks at the name.

use crate::resource::NamedResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields common to self-managed and managed nodegroups
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupBase {
    /// Nodegroup name, unique within the cluster
    pub name: String,

    /// EC2 instance type for the nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_capacity: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u32>,

    /// Kubernetes labels applied to the nodes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// A self-managed nodegroup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroup {
    #[serde(flatten)]
    pub base: NodeGroupBase,

    /// Extra security groups to attach to the nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<String>,
}

impl NodeGroup {
    /// A minimal descriptor carrying only a name.
    ///
    /// Used for nodegroups that exist in the cluster but not in the config.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            base: NodeGroupBase {
                name: name.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// A provider-managed nodegroup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ManagedNodeGroup {
    #[serde(flatten)]
    pub base: NodeGroupBase,

    /// Use spot capacity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot: Option<bool>,
}

impl ManagedNodeGroup {
    /// A minimal descriptor carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            base: NodeGroupBase {
                name: name.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

impl NamedResource for NodeGroup {
    fn name_string(&self) -> String {
        self.base.name.clone()
    }
}

impl NamedResource for ManagedNodeGroup {
    fn name_string(&self) -> String {
        self.base.name.clone()
    }
}
