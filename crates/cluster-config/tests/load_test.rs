//! Loading `ClusterConfig` documents from disk

use cluster_config::{ClusterConfig, ConfigError, NamedResource};
use std::io::Write;

const CONFIG: &str = r#"
apiVersion: eksctl.io/v1alpha5
kind: ClusterConfig
metadata:
  name: test-3x3-ngs
  region: eu-central-1
nodeGroups:
  - name: test-ng1a
    instanceType: m5.large
    labels: {group: a, seq: "1"}
  - name: test-ng2a
managedNodeGroups:
  - name: test-mng1
    spot: true
iam:
  withOIDC: true
  serviceAccounts:
    - metadata: {name: s3-reader, namespace: dev}
      attachPolicyARNs: ["arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess"]
    - metadata: {name: builder}
      roleOnly: true
accessConfig:
  accessEntries:
    - principalARN: arn:aws:iam::111122223333:role/admin
      kubernetesGroups: [system:masters]
"#;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file_preserves_declared_order() {
    let file = write_config(CONFIG);
    let cfg = ClusterConfig::from_file(file.path()).unwrap();

    assert_eq!(cfg.metadata.name, "test-3x3-ngs");
    assert_eq!(cfg.all_node_group_names(), vec!["test-ng1a", "test-ng2a", "test-mng1"]);
    assert_eq!(cfg.node_groups[0].base.labels.get("group").map(String::as_str), Some("a"));
    assert_eq!(cfg.managed_node_groups[0].spot, Some(true));
    assert!(cfg.iam.with_oidc);

    let sa_names: Vec<String> = cfg.iam.service_accounts.iter().map(NamedResource::name_string).collect();
    assert_eq!(sa_names, vec!["dev/s3-reader", "default/builder"]);
    assert!(cfg.iam.service_accounts[1].is_role_only());
    assert_eq!(cfg.access_config.access_entries.len(), 1);
}

#[test]
fn test_missing_file_reports_path() {
    let err = ClusterConfig::from_file("/nonexistent/cluster.yaml").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/cluster.yaml"));
}

#[test]
fn test_duplicate_nodegroup_names_rejected() {
    let doc = r#"
metadata: {name: dup}
nodeGroups: [{name: ng-1}]
managedNodeGroups: [{name: ng-1}]
"#;
    let err = ClusterConfig::from_yaml_str(doc).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)), "got {err}");
}

#[test]
fn test_cluster_name_required() {
    let err = ClusterConfig::from_yaml_str("metadata: {name: \"\"}").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_invalid_principal_arn_rejected() {
    let doc = r#"
metadata: {name: c}
accessConfig:
  accessEntries: [{principalARN: "not-an-arn"}]
"#;
    let err = ClusterConfig::from_yaml_str(doc).unwrap_err();
    assert!(err.to_string().contains("not-an-arn"));
}

#[test]
fn test_malformed_yaml_is_parse_error() {
    let err = ClusterConfig::from_yaml_str("metadata: [unclosed").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
