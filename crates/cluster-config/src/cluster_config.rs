//! The `ClusterConfig` document
//!
//! Loaded from YAML. Declared order of nodegroups and service accounts is
//! preserved; it is the iteration order every downstream operation uses.

use crate::access_entry::AccessConfig;
use crate::error::ConfigError;
use crate::iam_service_account::{
    aws_node_service_account, ClusterIam, ClusterIamServiceAccount, AWS_NODE_NAME, AWS_NODE_NAMESPACE,
};
use crate::node_group::{ManagedNodeGroup, NodeGroup};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Addon name of the VPC CNI plugin
pub const VPC_CNI_ADDON: &str = "vpc-cni";

/// Cluster identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterMeta {
    pub name: String,

    #[serde(default)]
    pub region: String,

    /// Kubernetes version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A cluster addon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Declared desired state of a cluster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    pub metadata: ClusterMeta,

    /// Self-managed nodegroups
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_groups: Vec<NodeGroup>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_node_groups: Vec<ManagedNodeGroup>,

    #[serde(default)]
    pub iam: ClusterIam,

    #[serde(default)]
    pub access_config: AccessConfig,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addons: Vec<Addon>,
}

impl ClusterConfig {
    /// An empty config for the named cluster
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            metadata: ClusterMeta {
                name: name.into(),
                region: region.into(),
                version: None,
            },
            ..Default::default()
        }
    }

    /// Parses and validates a config document.
    pub fn from_yaml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&document)?;
        debug!(
            cluster = %config.metadata.name,
            path = %path.display(),
            "loaded cluster config"
        );
        Ok(config)
    }

    /// Checks the invariants the selection engine relies on: a cluster name,
    /// unique non-empty nodegroup names, and service accounts and access
    /// entries with a usable identity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metadata.name.is_empty() {
            return Err(ConfigError::Invalid("metadata.name must be set".to_string()));
        }

        let mut seen = HashSet::new();
        for name in self.all_node_group_names() {
            if name.is_empty() {
                return Err(ConfigError::Invalid("nodegroup name must be set".to_string()));
            }
            if !seen.insert(name.clone()) {
                return Err(ConfigError::Invalid(format!("nodegroup {name:?} is defined more than once")));
            }
        }

        for sa in &self.iam.service_accounts {
            if sa.metadata.name.is_empty() || sa.metadata.namespace.is_empty() {
                return Err(ConfigError::Invalid(
                    "iam.serviceAccounts entries need a name and a namespace".to_string(),
                ));
            }
        }

        for entry in &self.access_config.access_entries {
            if !entry.principal_arn.starts_with("arn:") {
                return Err(ConfigError::Invalid(format!(
                    "accessEntries: invalid principalARN {:?}",
                    entry.principal_arn
                )));
            }
        }
        Ok(())
    }

    /// Names of all declared nodegroups: self-managed first, then managed,
    /// each in declared order.
    pub fn all_node_group_names(&self) -> Vec<String> {
        self.node_groups
            .iter()
            .map(|ng| ng.base.name.clone())
            .chain(self.managed_node_groups.iter().map(|ng| ng.base.name.clone()))
            .collect()
    }

    pub fn has_node_group(&self, name: &str) -> bool {
        self.node_groups.iter().any(|ng| ng.base.name == name)
            || self.managed_node_groups.iter().any(|ng| ng.base.name == name)
    }

    pub fn vpc_cni_addon_specified(&self) -> bool {
        self.addons.iter().any(|addon| addon.name == VPC_CNI_ADDON)
    }

    /// The declared service accounts plus the ones the cluster implies.
    ///
    /// With OIDC enabled and no `vpc-cni` addon declared, the node CNI
    /// account `kube-system/aws-node` is managed as an IAM service account;
    /// it is prepended unless the config already declares it.
    pub fn iam_service_accounts_with_implicit(&self) -> Vec<ClusterIamServiceAccount> {
        let mut service_accounts = self.iam.service_accounts.clone();
        if self.iam.with_oidc && !self.vpc_cni_addon_specified() {
            let declared = service_accounts
                .iter()
                .any(|sa| sa.metadata.name == AWS_NODE_NAME && sa.metadata.namespace == AWS_NODE_NAMESPACE);
            if !declared {
                service_accounts.insert(0, aws_node_service_account(&self.metadata.region));
            }
        }
        service_accounts
    }
}
