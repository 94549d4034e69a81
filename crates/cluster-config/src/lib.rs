//! Cluster configuration
//!
//! The declared desired state of a cluster: its nodegroups, IAM-bound
//! service accounts and access entries. Every resource descriptor exposes a
//! stable name through [`NamedResource`], which is what the selection engine
//! matches and reconciles against.

pub mod access_entry;
pub mod cluster_config;
pub mod error;
pub mod iam_service_account;
pub mod node_group;
pub mod resource;

pub use access_entry::*;
pub use cluster_config::*;
pub use error::ConfigError;
pub use iam_service_account::*;
pub use node_group::*;
pub use resource::{collect_names, NamedResource};
