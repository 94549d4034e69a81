//! Resource Selection & Reconciliation
//!
//! Decides which named cluster sub-resources an operation acts on. Every
//! filter combines user include/exclude rules (exact names and `*`/`?`
//! globs) with a one-shot reconciliation against observed infrastructure,
//! and yields a disjoint, exhaustive partition into included and excluded
//! names before anything is created or deleted.
//!
//! - [`Filter`]: the name/glob precedence rules shared by all kinds
//! - [`NodeGroupFilter`]: only-local (create) and only-remote (orphans) modes
//! - [`IamServiceAccountFilter`]: existing-object protection and delete planning
//! - [`AccessEntryFilter`]: set subtraction over derived stack names
//!
//! Setup failures (bad globs, includes matching nothing, contradictions,
//! lister errors) abort before any result is produced.

pub mod access_entry;
pub mod base;
pub mod error;
pub mod iam_service_account;
#[cfg(test)]
mod iam_service_account_test;
pub mod nodegroup;

pub use access_entry::{make_stack_name, AccessEntryFilter};
pub use base::{Filter, GlobPattern, MatchResult};
pub use error::FilterError;
pub use iam_service_account::{IamServiceAccountFilter, ServiceAccountDiff};
pub use nodegroup::{NodeGroupFilter, NodeGroupMode};

/// Resource label for nodegroups in messages
pub const NODEGROUP: &str = "nodegroup";

/// Resource label for IAM service accounts in messages
pub const IAM_SERVICE_ACCOUNT: &str = "iamserviceaccount";

/// Resource label for access entries in messages
pub const ACCESS_ENTRY: &str = "accessentry";
