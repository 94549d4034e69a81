//! Tests for the YAML snapshot lister

use stack_client::*;
use std::io::Write;

const SNAPSHOT: &str = r#"
clusterName: prod
stacks:
  - stackName: eksctl-prod-nodegroup-ng-1
    tags:
      alpha.eksctl.io/cluster-name: prod
      alpha.eksctl.io/nodegroup-name: ng-1
      alpha.eksctl.io/nodegroup-type: managed
  - stackName: eksctl-prod-nodegroup-ng-2
    tags:
      alpha.eksctl.io/nodegroup-name: ng-2
  - stackName: eksctl-staging-nodegroup-ng-9
    tags:
      alpha.eksctl.io/cluster-name: staging
      alpha.eksctl.io/nodegroup-name: ng-9
  - stackName: eksctl-prod-addon-iamserviceaccount-dev-s3
    tags:
      alpha.eksctl.io/iamserviceaccount-name: dev/s3
  - stackName: eksctl-prod-accessentry-0123456789abcdef
  - stackName: eksctl-prod-cluster
nodeGroups: [ng-1, console-ng]
serviceAccounts: [kube-system/aws-node]
"#;

#[tokio::test]
async fn test_node_group_stacks_are_classified_by_tags() {
    let snapshot = StackSnapshot::from_yaml_str(SNAPSHOT).unwrap();
    let stacks = snapshot.list_node_group_stacks().await.unwrap();

    assert_eq!(
        stacks,
        vec![
            NodeGroupStack {
                stack_name: "eksctl-prod-nodegroup-ng-1".to_string(),
                node_group_name: "ng-1".to_string(),
                node_group_type: NodeGroupType::Managed,
            },
            NodeGroupStack {
                stack_name: "eksctl-prod-nodegroup-ng-2".to_string(),
                node_group_name: "ng-2".to_string(),
                node_group_type: NodeGroupType::Unmanaged,
            },
        ],
        "stacks of other clusters and non-nodegroup stacks must be skipped"
    );
}

#[tokio::test]
async fn test_service_account_and_access_entry_stacks() {
    let snapshot = StackSnapshot::from_yaml_str(SNAPSHOT).unwrap();

    assert_eq!(snapshot.list_iam_service_account_stacks().await.unwrap(), vec!["dev/s3"]);
    assert_eq!(
        snapshot.list_access_entry_stack_names("prod").await.unwrap(),
        vec!["eksctl-prod-accessentry-0123456789abcdef"]
    );
    assert!(snapshot.list_access_entry_stack_names("staging").await.is_err());
}

#[tokio::test]
async fn test_cluster_node_groups_and_service_account_existence() {
    let snapshot = StackSnapshot::from_yaml_str(SNAPSHOT).unwrap();

    assert_eq!(snapshot.list_node_groups("prod").await.unwrap(), vec!["ng-1", "console-ng"]);
    assert!(snapshot.service_account_exists("kube-system", "aws-node").await.unwrap());
    assert!(!snapshot.service_account_exists("dev", "s3").await.unwrap());
}

#[tokio::test]
async fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SNAPSHOT.as_bytes()).unwrap();

    let snapshot = StackSnapshot::load(file.path()).await.unwrap();
    assert_eq!(snapshot.cluster_name, "prod");
    assert_eq!(snapshot.stacks.len(), 6);
}

#[tokio::test]
async fn test_load_missing_file_is_io_error() {
    let err = StackSnapshot::load("/nonexistent/observed.yaml").await.unwrap_err();
    assert!(matches!(err, ListerError::Io { .. }), "got {err}");
}

#[test]
fn test_stack_naming_is_derived_from_names() {
    assert_eq!(node_group_stack_name("prod", "ng-1"), "eksctl-prod-nodegroup-ng-1");
    assert_eq!(
        iam_service_account_stack_name("prod", "dev", "s3"),
        "eksctl-prod-addon-iamserviceaccount-dev-s3"
    );
    assert_eq!(access_entry_stack_prefix("prod"), "eksctl-prod-accessentry-");
}
