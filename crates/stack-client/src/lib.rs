//! Stack Client
//!
//! Observed-state collaborators for resource selection: listers that report
//! which nodegroups, IAM service accounts and access entries are already
//! backed by infrastructure stacks, and an existence check for Kubernetes
//! service accounts.
//!
//! # Example
//!
//! ```no_run
//! use stack_client::{NodeGroupStackLister, StackSnapshot};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let snapshot = StackSnapshot::load("observed.yaml").await?;
//! for stack in snapshot.list_node_group_stacks().await? {
//!     println!("{} ({})", stack.node_group_name, stack.node_group_type);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Implementations
//!
//! - **StackSnapshot**: observed state captured in a YAML file
//! - **KubeServiceAccountChecker**: service account lookups against a live cluster
//! - **MockStackClient** (`test-util` feature): in-memory state for unit tests

pub mod error;
pub mod kube_checker;
pub mod models;
#[path = "trait.rs"]
pub mod lister_trait;
pub mod snapshot;
#[cfg(feature = "test-util")]
pub mod mock;

pub use error::ListerError;
pub use kube_checker::KubeServiceAccountChecker;
pub use lister_trait::{
    AccessEntryStackLister, ClusterNodeGroupLister, NodeGroupStackLister, ServiceAccountExistenceChecker,
    ServiceAccountStackLister,
};
pub use models::*;
pub use snapshot::StackSnapshot;
#[cfg(feature = "test-util")]
pub use mock::MockStackClient;
