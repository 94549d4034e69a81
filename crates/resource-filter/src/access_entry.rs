//! Access entry selection
//!
//! Access entries carry no name rules. Each entry is backed by a stack whose
//! name is derived from the cluster name and the entry's principal, so the
//! entries still to create are simply those whose stack name isn't listed.

use crate::error::FilterError;
use crate::ACCESS_ENTRY;
use cluster_config::AccessEntry;
use sha2::{Digest, Sha256};
use stack_client::{access_entry_stack_prefix, AccessEntryStackLister};
use std::collections::HashSet;
use std::fmt;
use std::fmt::Write as _;
use tracing::debug;

const PRINCIPAL_HASH_LEN: usize = 16;

/// Stack name backing `entry` in `cluster_name`.
///
/// `eksctl-<cluster>-accessentry-<hash>`, where the hash is the first 16
/// hex digits of the SHA-256 of the principal ARN.
pub fn make_stack_name(cluster_name: &str, entry: &AccessEntry) -> String {
    let digest = Sha256::digest(entry.principal_arn.as_bytes());
    let mut name = access_entry_stack_prefix(cluster_name);
    for byte in digest.iter().take(PRINCIPAL_HASH_LEN / 2) {
        let _ = write!(name, "{byte:02x}");
    }
    name
}

/// Drops access entries whose stack already exists
pub struct AccessEntryFilter<'a> {
    cluster_name: String,
    lister: &'a dyn AccessEntryStackLister,
}

impl fmt::Debug for AccessEntryFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessEntryFilter")
            .field("cluster_name", &self.cluster_name)
            .finish_non_exhaustive()
    }
}

impl<'a> AccessEntryFilter<'a> {
    pub fn new(cluster_name: impl Into<String>, lister: &'a dyn AccessEntryStackLister) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            lister,
        }
    }

    /// The entries of `entries` without a stack, in the given order.
    pub async fn filter_out_existing_stacks(&self, entries: &[AccessEntry]) -> Result<Vec<AccessEntry>, FilterError> {
        let existing: HashSet<String> = self
            .lister
            .list_access_entry_stack_names(&self.cluster_name)
            .await
            .map_err(FilterError::lister(ACCESS_ENTRY))?
            .into_iter()
            .collect();

        let remaining = entries
            .iter()
            .filter(|entry| {
                let stack_name = make_stack_name(&self.cluster_name, entry);
                if existing.contains(&stack_name) {
                    debug!("{} for {} already exists ({})", ACCESS_ENTRY, entry.principal_arn, stack_name);
                    return false;
                }
                true
            })
            .cloned()
            .collect();
        Ok(remaining)
    }
}
