//! Runtime configuration from environment variables

use crate::error::SelectError;
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Resource kind a run selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    NodeGroup,
    IamServiceAccount,
    AccessEntry,
}

impl ResourceKind {
    fn parse(value: &str) -> Result<Self, SelectError> {
        match value {
            resource_filter::NODEGROUP => Ok(Self::NodeGroup),
            resource_filter::IAM_SERVICE_ACCOUNT => Ok(Self::IamServiceAccount),
            resource_filter::ACCESS_ENTRY => Ok(Self::AccessEntry),
            other => Err(SelectError::InvalidConfig(format!(
                "RESOURCE_KIND must be one of nodegroup, iamserviceaccount, accessentry; got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeGroup => f.write_str(resource_filter::NODEGROUP),
            Self::IamServiceAccount => f.write_str(resource_filter::IAM_SERVICE_ACCOUNT),
            Self::AccessEntry => f.write_str(resource_filter::ACCESS_ENTRY),
        }
    }
}

/// Operation the selection is planned for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Delete,
}

impl Operation {
    fn parse(value: &str) -> Result<Self, SelectError> {
        match value {
            "create" => Ok(Self::Create),
            "delete" => Ok(Self::Delete),
            other => Err(SelectError::InvalidConfig(format!(
                "OPERATION must be create or delete; got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

/// Settings of one selection run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectConfig {
    /// Path of the ClusterConfig YAML
    pub cluster_config: PathBuf,

    /// Path of the observed-state snapshot YAML
    pub observed_state: PathBuf,

    pub kind: ResourceKind,
    pub operation: Operation,

    /// Include globs
    pub include: Vec<String>,

    /// Exclude globs
    pub exclude: Vec<String>,

    /// Nodegroup delete: only orphans. Service account delete: only stacks
    /// missing from the config.
    pub only_missing: bool,

    /// Service account create: don't protect existing Kubernetes objects
    pub override_existing: bool,

    /// Nodegroup create: select nothing
    pub without_node_group: bool,

    /// Check service account existence against the live cluster instead of
    /// the snapshot
    pub kube_existence_check: bool,
}

impl SelectConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, SelectError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SelectError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| SelectError::InvalidConfig(format!("{key} environment variable is required")))
        };
        let flag = |key: &str| parse_flag(key, lookup(key).as_deref());

        let config = Self {
            cluster_config: PathBuf::from(required("CLUSTER_CONFIG")?),
            observed_state: PathBuf::from(required("OBSERVED_STATE")?),
            kind: ResourceKind::parse(required("RESOURCE_KIND")?.trim())?,
            operation: Operation::parse(lookup("OPERATION").as_deref().map_or("create", str::trim))?,
            include: split_list(lookup("INCLUDE").as_deref()),
            exclude: split_list(lookup("EXCLUDE").as_deref()),
            only_missing: flag("ONLY_MISSING")?,
            override_existing: flag("OVERRIDE_EXISTING")?,
            without_node_group: flag("WITHOUT_NODEGROUP")?,
            kube_existence_check: flag("KUBE_EXISTENCE_CHECK")?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SelectError> {
        if self.kind != ResourceKind::AccessEntry {
            return Ok(());
        }
        if self.operation != Operation::Create {
            return Err(SelectError::InvalidConfig(
                "accessentry selection is only supported for create".to_string(),
            ));
        }
        if !self.include.is_empty() || !self.exclude.is_empty() {
            return Err(SelectError::InvalidConfig(
                "accessentry selection does not take INCLUDE or EXCLUDE rules".to_string(),
            ));
        }
        Ok(())
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(key: &str, value: Option<&str>) -> Result<bool, SelectError> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("" | "0" | "false" | "no") => Ok(false),
        Some("1" | "true" | "yes") => Ok(true),
        Some(other) => Err(SelectError::InvalidConfig(format!(
            "{key} must be a boolean; got {other:?}"
        ))),
    }
}
