//! IAM service account selection
//!
//! Service accounts are named `namespace/name`. Besides the name rules,
//! two reconciliations are available:
//!
//! - on create, accounts that already have a stack (or, unless overridden,
//!   an existing Kubernetes object) are excluded;
//! - on delete, declared accounts are diffed against the stacks that exist.

use crate::base::{Filter, MatchResult};
use crate::error::FilterError;
use crate::IAM_SERVICE_ACCOUNT;
use cluster_config::{collect_names, ClusterConfig, ClusterIamMeta, ClusterIamServiceAccount, NamedResource};
use stack_client::{ServiceAccountExistenceChecker, ServiceAccountStackLister};
use std::collections::HashSet;
use tracing::{info, warn};

/// Declared service accounts compared against existing stacks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceAccountDiff {
    /// Declared but without a stack, in declared order
    pub local_only: Vec<String>,

    /// Declared and backed by a stack, in declared order
    pub in_both: Vec<String>,

    /// Backed by a stack but not declared, sorted
    pub remote_only: Vec<String>,
}

impl ServiceAccountDiff {
    pub fn between(local: &[String], remote: &[String]) -> Self {
        let remote_set: HashSet<&str> = remote.iter().map(String::as_str).collect();
        let local_set: HashSet<&str> = local.iter().map(String::as_str).collect();

        let mut diff = Self::default();
        let mut seen = HashSet::new();
        for name in local {
            if !seen.insert(name.as_str()) {
                continue;
            }
            if remote_set.contains(name.as_str()) {
                diff.in_both.push(name.clone());
            } else {
                diff.local_only.push(name.clone());
            }
        }

        let mut remote_only: Vec<String> = remote_set
            .into_iter()
            .filter(|name| !local_set.contains(name))
            .map(str::to_string)
            .collect();
        remote_only.sort_unstable();
        diff.remote_only = remote_only;
        diff
    }
}

/// Selects IAM service accounts by name rules and existing state
#[derive(Debug, Clone, Default)]
pub struct IamServiceAccountFilter {
    delegate: Filter,
}

impl IamServiceAccountFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers include globs (validated against `service_accounts`) and
    /// exclude globs.
    pub fn append_globs<S: AsRef<str>>(
        &mut self,
        include_exprs: &[S],
        exclude_exprs: &[S],
        service_accounts: &[ClusterIamServiceAccount],
    ) -> Result<(), FilterError> {
        self.append_include_globs(service_accounts, include_exprs)?;
        self.append_exclude_globs(exclude_exprs)
    }

    pub fn append_include_globs<S: AsRef<str>>(
        &mut self,
        service_accounts: &[ClusterIamServiceAccount],
        exprs: &[S],
    ) -> Result<(), FilterError> {
        self.delegate
            .append_include_globs(&collect_names(service_accounts), IAM_SERVICE_ACCOUNT, exprs)
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

    /// Excludes service accounts that already exist.
    ///
    /// Accounts backed by a stack are always excluded. Unless
    /// `override_existing` is set, currently matching accounts whose
    /// Kubernetes object exists are excluded too; role-only accounts have
    /// no object and are not checked. Fails if an account to exclude was
    /// explicitly included.
    pub async fn set_exclude_existing_filter(
        &mut self,
        stack_lister: &dyn ServiceAccountStackLister,
        checker: &dyn ServiceAccountExistenceChecker,
        service_accounts: &[ClusterIamServiceAccount],
        override_existing: bool,
    ) -> Result<(), FilterError> {
        if self.delegate.exclude_all() {
            return Ok(());
        }

        let mut existing = stack_lister
            .list_iam_service_account_stacks()
            .await
            .map_err(FilterError::lister(IAM_SERVICE_ACCOUNT))?;

        if !override_existing {
            for sa in service_accounts {
                let name = sa.name_string();
                if sa.is_role_only() || !self.matches(&name) {
                    continue;
                }
                let exists = checker
                    .service_account_exists(&sa.metadata.namespace, &sa.metadata.name)
                    .await
                    .map_err(FilterError::lister(IAM_SERVICE_ACCOUNT))?;
                if exists {
                    existing.push(name);
                }
            }
        }

        self.delegate.set_exclude_existing(existing, IAM_SERVICE_ACCOUNT)
    }

    /// Plans a delete against the service account stacks that exist.
    ///
    /// Declared accounts without a stack are excluded. With
    /// `include_only_missing`, declared accounts (implicit ones included)
    /// that have a stack are excluded as well, and stacks of undeclared
    /// accounts are selected if the name rules allow it.
    ///
    /// Returns the service accounts to iterate: the declared ones, plus the
    /// implicit and undeclared ones in only-missing mode.
    pub async fn set_delete_filter(
        &mut self,
        lister: &dyn ServiceAccountStackLister,
        include_only_missing: bool,
        cfg: &ClusterConfig,
    ) -> Result<Vec<ClusterIamServiceAccount>, FilterError> {
        let remote = lister
            .list_iam_service_account_stacks()
            .await
            .map_err(FilterError::lister(IAM_SERVICE_ACCOUNT))?;

        let mut service_accounts = if include_only_missing {
            cfg.iam_service_accounts_with_implicit()
        } else {
            cfg.iam.service_accounts.clone()
        };
        let diff = ServiceAccountDiff::between(&collect_names(&service_accounts), &remote);

        for name in &diff.local_only {
            warn!(
                "{} {:?} present in the given config, but missing in the cluster",
                IAM_SERVICE_ACCOUNT, name
            );
        }
        self.delegate.append_exclude_names(diff.local_only.iter().cloned());

        if include_only_missing {
            for name in &diff.in_both {
                info!("{} {:?} already exists in the cluster, it will be excluded", IAM_SERVICE_ACCOUNT, name);
            }
            self.delegate.append_exclude_names(diff.in_both.iter().cloned());
        }

        let mut deferred = Vec::new();
        for name in &diff.remote_only {
            info!(
                "{} {:?} present in the cluster, but missing from the given config",
                IAM_SERVICE_ACCOUNT, name
            );
            if !include_only_missing {
                continue;
            }
            let meta = ClusterIamMeta::from_name_string(name)?;
            service_accounts.push(ClusterIamServiceAccount::from_meta(meta));
            if self.delegate.matches(name) {
                deferred.push(name.clone());
            }
        }

        // Applied after the diff so these win over the exclusions above
        self.delegate.append_include_names(deferred);

        Ok(service_accounts)
    }

    /// Decides whether the service account `name` (`namespace/name`) is included.
    pub fn matches(&self, name: &str) -> bool {
        self.delegate.matches(name)
    }

    pub fn match_all(&self, service_accounts: &[ClusterIamServiceAccount]) -> MatchResult {
        self.delegate.match_all(collect_names(service_accounts))
    }

    /// The included service accounts, in the given order
    pub fn filter_matching(&self, service_accounts: &[ClusterIamServiceAccount]) -> Vec<ClusterIamServiceAccount> {
        service_accounts
            .iter()
            .filter(|sa| self.matches(&sa.name_string()))
            .cloned()
            .collect()
    }

    /// Calls `f` for every included service account, in order; stops at the
    /// first error.
    pub fn for_each<E, F>(&self, service_accounts: &[ClusterIamServiceAccount], mut f: F) -> Result<(), E>
    where
        F: FnMut(usize, &ClusterIamServiceAccount) -> Result<(), E>,
    {
        for (i, sa) in service_accounts.iter().enumerate() {
            if self.matches(&sa.name_string()) {
                f(i, sa)?;
            }
        }
        Ok(())
    }

    pub fn log_info(&self, service_accounts: &[ClusterIamServiceAccount]) {
        let result = self.match_all(service_accounts);
        self.delegate.log_info(IAM_SERVICE_ACCOUNT, &result);
    }
}
