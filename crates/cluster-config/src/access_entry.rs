//! Access entries granting IAM principals access to the cluster

use serde::{Deserialize, Serialize};

/// Cluster access settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfig {
    /// `API`, `API_AND_CONFIG_MAP` or `CONFIG_MAP`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access_entries: Vec<AccessEntry>,
}

/// Associates an existing IAM principal with Kubernetes permissions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessEntry {
    /// IAM principal ARN; the identity of the entry
    #[serde(rename = "principalARN")]
    pub principal_arn: String,

    /// `EC2_LINUX`, `EC2_WINDOWS`, `FARGATE_LINUX` or `STANDARD`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kubernetes_groups: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_username: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access_policies: Vec<AccessPolicy>,
}

impl AccessEntry {
    pub fn for_principal(principal_arn: impl Into<String>) -> Self {
        Self {
            principal_arn: principal_arn.into(),
            entry_type: None,
            kubernetes_groups: Vec::new(),
            kubernetes_username: None,
            access_policies: Vec::new(),
        }
    }
}

/// A policy associated with an access entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessPolicy {
    #[serde(rename = "policyARN")]
    pub policy_arn: String,

    pub access_scope: AccessScope,
}

/// Scope of an access policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessScope {
    /// `namespace` or `cluster`
    #[serde(rename = "type")]
    pub scope_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
}
