//! Nodegroup selection
//!
//! Wraps the name rules of [`Filter`] with a reconciliation between the
//! nodegroups declared in the config (`local`) and the ones that already
//! exist (`remote`). Remote nodegroups are those backed by a stack plus
//! those the cluster API reports without one.

use crate::base::{Filter, MatchResult};
use crate::error::FilterError;
use crate::NODEGROUP;
use cluster_config::{ClusterConfig, ManagedNodeGroup, NamedResource, NodeGroup};
use stack_client::{ClusterNodeGroupLister, NodeGroupStackLister, NodeGroupType};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

/// Reconciliation mode of a [`NodeGroupFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeGroupMode {
    /// Name rules only
    #[default]
    All,

    /// Only nodegroups declared in the config that don't exist yet
    OnlyLocal,

    /// Only nodegroups that exist but are no longer declared
    OnlyRemote,
}

impl fmt::Display for NodeGroupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::OnlyLocal => f.write_str("only-local"),
            Self::OnlyRemote => f.write_str("only-remote"),
        }
    }
}

/// Selects nodegroups by name rules and by declared/existing state
#[derive(Debug, Clone, Default)]
pub struct NodeGroupFilter {
    delegate: Filter,
    mode: NodeGroupMode,
    local: HashSet<String>,
    remote: HashSet<String>,
}

impl NodeGroupFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> NodeGroupMode {
        self.mode
    }

    /// Registers include and exclude globs in one go.
    ///
    /// Include globs are validated against `names`.
    pub fn append_globs<S: AsRef<str>>(
        &mut self,
        include_exprs: &[S],
        exclude_exprs: &[S],
        names: &[String],
    ) -> Result<(), FilterError> {
        self.append_include_globs(names, include_exprs)?;
        self.append_exclude_globs(exclude_exprs)
    }

    pub fn append_include_globs<S: AsRef<str>>(&mut self, names: &[String], exprs: &[S]) -> Result<(), FilterError> {
        self.delegate.append_include_globs(names, NODEGROUP, exprs)
    }

    pub fn append_exclude_globs<S: AsRef<str>>(&mut self, exprs: &[S]) -> Result<(), FilterError> {
        self.delegate.append_exclude_globs(exprs)
    }

    pub fn append_include_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.delegate.append_include_names(names);
    }

    pub fn append_exclude_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.delegate.append_exclude_names(names);
    }

    pub fn set_exclude_all(&mut self, exclude_all: bool) {
        self.delegate.set_exclude_all(exclude_all);
    }

    pub fn exclude_all(&self) -> bool {
        self.delegate.exclude_all()
    }

    /// Restricts the selection to nodegroups that don't exist yet.
    ///
    /// Returns `cfg` augmented with descriptors for nodegroups that exist
    /// but aren't declared, so that callers iterating the returned config
    /// see every known nodegroup.
    pub async fn set_only_local(
        &mut self,
        stack_lister: &dyn NodeGroupStackLister,
        cluster_lister: &dyn ClusterNodeGroupLister,
        cfg: &ClusterConfig,
    ) -> Result<ClusterConfig, FilterError> {
        self.enter_mode(NodeGroupMode::OnlyLocal)?;
        let augmented = self.load_local_and_remote(stack_lister, cluster_lister, cfg).await?;

        if !self.remote.is_empty() {
            info!(
                "{} existing {}(s) ({}) will be excluded",
                self.remote.len(),
                NODEGROUP,
                sorted_join(&self.remote)
            );
        }
        Ok(augmented)
    }

    /// Restricts the selection to nodegroups that exist but are no longer
    /// declared.
    ///
    /// Returns `cfg` augmented with descriptors for those nodegroups.
    pub async fn set_only_remote(
        &mut self,
        stack_lister: &dyn NodeGroupStackLister,
        cluster_lister: &dyn ClusterNodeGroupLister,
        cfg: &ClusterConfig,
    ) -> Result<ClusterConfig, FilterError> {
        self.enter_mode(NodeGroupMode::OnlyRemote)?;
        let augmented = self.load_local_and_remote(stack_lister, cluster_lister, cfg).await?;

        if !self.local.is_empty() {
            info!(
                "{} {}(s) present in the config file ({}) will be excluded",
                self.local.len(),
                NODEGROUP,
                sorted_join(&self.local)
            );
        }
        Ok(augmented)
    }

    fn enter_mode(&mut self, requested: NodeGroupMode) -> Result<(), FilterError> {
        if self.mode != NodeGroupMode::All && self.mode != requested {
            return Err(FilterError::IncompatibleModes {
                resource: NODEGROUP.to_string(),
                current: self.mode.to_string(),
                requested: requested.to_string(),
            });
        }
        self.mode = requested;
        Ok(())
    }

    async fn load_local_and_remote(
        &mut self,
        stack_lister: &dyn NodeGroupStackLister,
        cluster_lister: &dyn ClusterNodeGroupLister,
        cfg: &ClusterConfig,
    ) -> Result<ClusterConfig, FilterError> {
        let stacks = stack_lister
            .list_node_group_stacks()
            .await
            .map_err(FilterError::lister(NODEGROUP))?;
        let cluster_node_groups = cluster_lister
            .list_node_groups(&cfg.metadata.name)
            .await
            .map_err(FilterError::lister(NODEGROUP))?;

        // Nodegroups created outside of stacks are reported by the cluster only
        let mut remote: Vec<(String, NodeGroupType)> = Vec::new();
        let mut remote_names = HashSet::new();
        for stack in stacks {
            if remote_names.insert(stack.node_group_name.clone()) {
                remote.push((stack.node_group_name, stack.node_group_type));
            }
        }
        for name in cluster_node_groups {
            if remote_names.insert(name.clone()) {
                debug!("{} {:?} has no stack", NODEGROUP, name);
                remote.push((name, NodeGroupType::Managed));
            }
        }

        let local: HashSet<String> = cfg.all_node_group_names().into_iter().collect();
        for name in cfg.all_node_group_names() {
            if !remote_names.contains(&name) {
                debug!("{} {:?} present in the given config, but missing in the cluster", NODEGROUP, name);
            }
        }

        let mut augmented = cfg.clone();
        for (name, node_group_type) in remote {
            if local.contains(&name) {
                continue;
            }
            debug!("{} {:?} present in the cluster, but missing from the given config", NODEGROUP, name);
            if augmented.has_node_group(&name) {
                continue;
            }
            match node_group_type {
                NodeGroupType::Managed => augmented.managed_node_groups.push(ManagedNodeGroup::named(name)),
                NodeGroupType::Unmanaged => augmented.node_groups.push(NodeGroup::named(name)),
            }
        }

        self.local = local;
        self.remote = remote_names;
        Ok(augmented)
    }

    /// Decides whether the nodegroup `name` is included.
    pub fn matches(&self, name: &str) -> bool {
        let in_mode_set = match self.mode {
            NodeGroupMode::All => true,
            NodeGroupMode::OnlyLocal => self.local.contains(name) && !self.remote.contains(name),
            NodeGroupMode::OnlyRemote => self.remote.contains(name) && !self.local.contains(name),
        };
        in_mode_set && self.delegate.matches(name)
    }

    /// Partitions `names` according to the name rules and the current mode.
    pub fn match_all<I, S>(&self, names: I) -> MatchResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut result = MatchResult::default();
        for name in names {
            let name = name.as_ref();
            if self.matches(name) {
                result.included.insert(name.to_string());
            } else {
                result.excluded.insert(name.to_string());
            }
        }
        result
    }

    /// The included subset of `names`, in the given order
    pub fn filter_matching(&self, names: &[String]) -> Vec<String> {
        names.iter().filter(|name| self.matches(name)).cloned().collect()
    }

    /// Calls `f` for every included nodegroup of `node_groups`, in order.
    ///
    /// Stops at the first error and returns it.
    pub fn for_each<T, E, F>(&self, node_groups: &[T], mut f: F) -> Result<(), E>
    where
        T: NamedResource,
        F: FnMut(usize, &T) -> Result<(), E>,
    {
        for (i, node_group) in node_groups.iter().enumerate() {
            if self.matches(&node_group.name_string()) {
                f(i, node_group)?;
            }
        }
        Ok(())
    }

    /// Logs the rules and how they apply to every nodegroup of `cfg`.
    pub fn log_info(&self, cfg: &ClusterConfig) {
        let result = self.match_all(cfg.all_node_group_names());
        self.delegate.log_info(NODEGROUP, &result);
    }
}

fn sorted_join(names: &HashSet<String>) -> String {
    let mut list: Vec<&str> = names.iter().map(String::as_str).collect();
    list.sort_unstable();
    list.join(",")
}
