//! IAM-bound Kubernetes service accounts
//!
//! Each declared service account is backed by an IAM role stack and,
//! unless it is role-only, by a Kubernetes `ServiceAccount` object.
//! Service accounts are addressed as `namespace/name`.

use crate::error::ConfigError;
use crate::resource::NamedResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Namespace used when a service account does not declare one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Namespace of the node CNI service account
pub const AWS_NODE_NAMESPACE: &str = "kube-system";

/// Name of the node CNI service account
pub const AWS_NODE_NAME: &str = "aws-node";

/// Managed policy required by the node CNI service account
const CNI_POLICY_NAME: &str = "AmazonEKS_CNI_Policy";

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

/// Cluster-wide IAM settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterIam {
    /// Whether an OIDC provider is associated with the cluster
    #[serde(default, rename = "withOIDC")]
    pub with_oidc: bool,

    /// Declared IAM service accounts, in config order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_accounts: Vec<ClusterIamServiceAccount>,
}

/// Identity of a service account inside the cluster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ClusterIamMeta {
    pub name: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl ClusterIamMeta {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Parses a `namespace/name` string back into its parts.
    ///
    /// Exactly one `/` separating two non-empty parts is accepted.
    pub fn from_name_string(name: &str) -> Result<Self, ConfigError> {
        match name.split_once('/') {
            Some((namespace, sa_name))
                if !namespace.is_empty() && !sa_name.is_empty() && !sa_name.contains('/') =>
            {
                Ok(Self::new(namespace, sa_name))
            }
            _ => Err(ConfigError::InvalidServiceAccountName(name.to_string())),
        }
    }
}

impl fmt::Display for ClusterIamMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A declared IAM service account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterIamServiceAccount {
    pub metadata: ClusterIamMeta,

    /// Managed or customer policies attached to the role
    #[serde(default, rename = "attachPolicyARNs", skip_serializing_if = "Vec::is_empty")]
    pub attach_policy_arns: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,

    /// Only create the IAM role, never the Kubernetes object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_only: Option<bool>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl ClusterIamServiceAccount {
    /// A minimal descriptor carrying only its identity
    pub fn from_meta(metadata: ClusterIamMeta) -> Self {
        Self {
            metadata,
            attach_policy_arns: Vec::new(),
            role_name: None,
            role_only: None,
            tags: BTreeMap::new(),
        }
    }

    pub fn is_role_only(&self) -> bool {
        self.role_only.unwrap_or(false)
    }
}

impl NamedResource for ClusterIamServiceAccount {
    fn name_string(&self) -> String {
        self.metadata.to_string()
    }
}

/// Returns the AWS partition that owns `region`.
pub fn partition_for_region(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        "aws-cn"
    } else if region.starts_with("us-gov-") {
        "aws-us-gov"
    } else if region.starts_with("us-iso-") {
        "aws-iso"
    } else if region.starts_with("us-isob-") {
        "aws-iso-b"
    } else {
        "aws"
    }
}

/// The node CNI service account that is implied by an OIDC-enabled cluster.
pub fn aws_node_service_account(region: &str) -> ClusterIamServiceAccount {
    let mut sa = ClusterIamServiceAccount::from_meta(ClusterIamMeta::new(AWS_NODE_NAMESPACE, AWS_NODE_NAME));
    sa.attach_policy_arns.push(format!(
        "arn:{}:iam::aws:policy/{}",
        partition_for_region(region),
        CNI_POLICY_NAME
    ));
    sa
}
