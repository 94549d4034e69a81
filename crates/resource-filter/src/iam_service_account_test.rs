//! Unit tests for IAM service account selection

#[cfg(test)]
mod tests {
    use crate::error::FilterError;
    use crate::iam_service_account::{IamServiceAccountFilter, ServiceAccountDiff};
    use cluster_config::{collect_names, ClusterConfig, ClusterIamMeta, ClusterIamServiceAccount, ConfigError};
    use stack_client::MockStackClient;

    const CLUSTER: &str = "test-cluster";

    fn sa(namespace: &str, name: &str) -> ClusterIamServiceAccount {
        ClusterIamServiceAccount::from_meta(ClusterIamMeta::new(namespace, name))
    }

    fn config(service_accounts: &[(&str, &str)]) -> ClusterConfig {
        let mut cfg = ClusterConfig::new(CLUSTER, "us-west-2");
        cfg.iam.service_accounts = service_accounts.iter().map(|(ns, name)| sa(ns, name)).collect();
        cfg
    }

    fn dev_and_test() -> ClusterConfig {
        config(&[
            ("default", "dev1"),
            ("default", "dev2"),
            ("default", "dev3"),
            ("default", "test1"),
            ("default", "test2"),
            ("default", "test3"),
        ])
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_diff_classifies_names() {
        let local = names(&["a/x", "a/y", "a/x", "b/z"]);
        let remote = names(&["b/z", "c/w", "a/y", "a/v"]);

        let diff = ServiceAccountDiff::between(&local, &remote);
        assert_eq!(diff.local_only, vec!["a/x"]);
        assert_eq!(diff.in_both, vec!["a/y", "b/z"]);
        assert_eq!(diff.remote_only, vec!["a/v", "c/w"]);
    }

    #[test]
    fn test_diff_of_empty_sets() {
        assert_eq!(ServiceAccountDiff::between(&[], &[]), ServiceAccountDiff::default());
    }

    #[tokio::test]
    async fn test_delete_only_missing_selects_undeclared_stacks() {
        let mut cfg = dev_and_test();
        cfg.iam.with_oidc = true;
        let mut remote = collect_names(&cfg.iam.service_accounts);
        remote.extend(names(&["default/only-remote-1", "default/only-remote-2", "kube-system/aws-node"]));
        let mock = MockStackClient::new(CLUSTER).with_service_account_stacks(remote);

        let mut filter = IamServiceAccountFilter::new();
        let service_accounts = filter.set_delete_filter(&mock, true, &cfg).await.unwrap();

        let result = filter.match_all(&service_accounts);
        assert_eq!(
            result.included_sorted(),
            vec!["default/only-remote-1", "default/only-remote-2"]
        );
        assert_eq!(result.excluded.len(), 7, "declared and implicit accounts are excluded");
        assert!(result.excluded.contains("kube-system/aws-node"));

        // Implicit account first, undeclared ones appended
        let listed = collect_names(&service_accounts);
        assert_eq!(listed.first().map(String::as_str), Some("kube-system/aws-node"));
        assert_eq!(
            &listed[listed.len() - 2..],
            &["default/only-remote-1".to_string(), "default/only-remote-2".to_string()]
        );
        assert_eq!(cfg.iam.service_accounts.len(), 6, "the caller's config is untouched");
    }

    #[tokio::test]
    async fn test_delete_excludes_declared_accounts_without_stack() {
        let cfg = dev_and_test();
        let mock = MockStackClient::new(CLUSTER).with_service_account_stacks(["default/dev1", "default/test1"]);

        let mut filter = IamServiceAccountFilter::new();
        let service_accounts = filter.set_delete_filter(&mock, false, &cfg).await.unwrap();

        assert_eq!(service_accounts, cfg.iam.service_accounts);
        let result = filter.match_all(&service_accounts);
        assert_eq!(result.included_sorted(), vec!["default/dev1", "default/test1"]);
    }

    #[tokio::test]
    async fn test_delete_without_only_missing_ignores_undeclared_stacks() {
        let cfg = dev_and_test();
        let mut remote = collect_names(&cfg.iam.service_accounts);
        remote.push("default/only-remote-1".to_string());
        let mock = MockStackClient::new(CLUSTER).with_service_account_stacks(remote);

        let mut filter = IamServiceAccountFilter::new();
        let service_accounts = filter.set_delete_filter(&mock, false, &cfg).await.unwrap();

        assert_eq!(service_accounts.len(), 6, "undeclared accounts are not added");
        let result = filter.match_all(&service_accounts);
        assert_eq!(result.included.len(), 6);
    }

    #[tokio::test]
    async fn test_delete_only_missing_honours_name_rules() {
        let cfg = dev_and_test();
        let mock = MockStackClient::new(CLUSTER)
            .with_service_account_stacks(["default/dev1", "default/only-remote-1", "default/only-remote-2"]);

        let mut filter = IamServiceAccountFilter::new();
        filter.append_exclude_globs(&["*-2"]).unwrap();
        let service_accounts = filter.set_delete_filter(&mock, true, &cfg).await.unwrap();

        let result = filter.match_all(&service_accounts);
        assert_eq!(result.included_sorted(), vec!["default/only-remote-1"]);
        assert!(!filter.matches("default/dev1"), "present in both is excluded");
        assert!(!filter.matches("default/dev2"), "missing in the cluster is excluded");
    }

    #[tokio::test]
    async fn test_delete_only_missing_rejects_malformed_stack_names() {
        let cfg = dev_and_test();
        let mock = MockStackClient::new(CLUSTER).with_service_account_stacks(["no-namespace"]);

        let mut filter = IamServiceAccountFilter::new();
        let err = filter.set_delete_filter(&mock, true, &cfg).await.unwrap_err();
        assert!(
            matches!(err, FilterError::Config(ConfigError::InvalidServiceAccountName(ref name)) if name == "no-namespace"),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_delete_filter_propagates_lister_error() {
        let cfg = dev_and_test();
        let mock = MockStackClient::new(CLUSTER);
        mock.fail_with("access denied");

        let mut filter = IamServiceAccountFilter::new();
        let err = filter.set_delete_filter(&mock, true, &cfg).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "listing iamserviceaccounts: stack API error: access denied"
        );
    }

    #[tokio::test]
    async fn test_exclude_existing_stacks_and_objects() {
        let cfg = dev_and_test();
        let mock = MockStackClient::new(CLUSTER)
            .with_service_account_stacks(["default/dev1"])
            .with_existing_service_accounts(["default/dev2", "default/test3"]);

        let mut filter = IamServiceAccountFilter::new();
        filter
            .set_exclude_existing_filter(&mock, &mock, &cfg.iam.service_accounts, false)
            .await
            .unwrap();

        let result = filter.match_all(&cfg.iam.service_accounts);
        assert_eq!(
            result.excluded_sorted(),
            vec!["default/dev1", "default/dev2", "default/test3"]
        );
        assert_eq!(mock.call_count("service_account_exists"), 6);
    }

    #[tokio::test]
    async fn test_exclude_existing_with_override_keeps_objects() {
        let cfg = dev_and_test();
        let mock = MockStackClient::new(CLUSTER)
            .with_service_account_stacks(["default/dev1"])
            .with_existing_service_accounts(["default/dev2"]);

        let mut filter = IamServiceAccountFilter::new();
        filter
            .set_exclude_existing_filter(&mock, &mock, &cfg.iam.service_accounts, true)
            .await
            .unwrap();

        let result = filter.match_all(&cfg.iam.service_accounts);
        assert_eq!(result.excluded_sorted(), vec!["default/dev1"], "stacks are always excluded");
        assert_eq!(mock.call_count("service_account_exists"), 0);
    }

    #[tokio::test]
    async fn test_exclude_existing_skips_role_only_and_unmatched() {
        let mut cfg = dev_and_test();
        cfg.iam.service_accounts[0].role_only = Some(true);
        let mock = MockStackClient::new(CLUSTER).with_existing_service_accounts(["default/dev1", "default/test1"]);

        let mut filter = IamServiceAccountFilter::new();
        filter.append_exclude_globs(&["*/test*"]).unwrap();
        filter
            .set_exclude_existing_filter(&mock, &mock, &cfg.iam.service_accounts, false)
            .await
            .unwrap();

        assert!(filter.matches("default/dev1"), "role-only accounts have no object to protect");
        assert_eq!(mock.call_count("service_account_exists"), 2, "only dev2 and dev3 are checked");
    }

    #[tokio::test]
    async fn test_exclude_existing_conflicts_with_include() {
        let cfg = dev_and_test();
        let mock = MockStackClient::new(CLUSTER).with_service_account_stacks(["default/dev1"]);

        let mut filter = IamServiceAccountFilter::new();
        filter.append_include_names(["default/dev1"]);
        let err = filter
            .set_exclude_existing_filter(&mock, &mock, &cfg.iam.service_accounts, true)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"existing iamserviceaccount "default/dev1" should be excluded, but matches include filter: default/dev1"#
        );
    }

    #[tokio::test]
    async fn test_exclude_existing_is_noop_when_excluding_all() {
        let cfg = dev_and_test();
        let mock = MockStackClient::new(CLUSTER).with_service_account_stacks(["default/dev1"]);

        let mut filter = IamServiceAccountFilter::new();
        filter.set_exclude_all(true);
        filter
            .set_exclude_existing_filter(&mock, &mock, &cfg.iam.service_accounts, false)
            .await
            .unwrap();

        assert_eq!(mock.call_count("list_iam_service_account_stacks"), 0);
        assert!(filter.match_all(&cfg.iam.service_accounts).included.is_empty());
    }

    #[tokio::test]
    async fn test_exclude_existing_propagates_lister_error() {
        let cfg = dev_and_test();
        let mock = MockStackClient::new(CLUSTER);

        let mut filter = IamServiceAccountFilter::new();
        mock.fail_with("connection refused");
        let err = filter
            .set_exclude_existing_filter(&mock, &mock, &cfg.iam.service_accounts, false)
            .await
            .unwrap_err();
        assert!(matches!(err, FilterError::Lister { .. }), "got {err:?}");
    }

    #[test]
    fn test_include_globs_validated_against_declared_names() {
        let cfg = dev_and_test();
        let mut filter = IamServiceAccountFilter::new();

        let err = filter
            .append_include_globs(&cfg.iam.service_accounts, &["kube-system/*"])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"no iamserviceaccounts match include glob filter specification: "kube-system/*""#
        );

        filter
            .append_globs(&["*/dev*"], &["*/dev2"], &cfg.iam.service_accounts)
            .unwrap();
        let included = collect_names(&filter.filter_matching(&cfg.iam.service_accounts));
        assert_eq!(included, vec!["default/dev1", "default/dev3"]);
    }

    #[test]
    fn test_for_each_visits_included_in_order_and_stops_on_error() {
        let cfg = dev_and_test();
        let mut filter = IamServiceAccountFilter::new();
        filter.append_exclude_names(["default/dev2"]);

        let mut visited = Vec::new();
        let err = filter
            .for_each(&cfg.iam.service_accounts, |i, sa| {
                visited.push(i);
                if sa.metadata.name == "test1" {
                    return Err("stop");
                }
                Ok(())
            })
            .unwrap_err();
        assert_eq!(err, "stop");
        assert_eq!(visited, vec![0, 2, 3]);
    }
}
