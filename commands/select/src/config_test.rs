//! Unit tests for environment configuration

#[cfg(test)]
mod tests {
    use crate::config::{Operation, ResourceKind, SelectConfig};
    use crate::error::SelectError;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn load(vars: &[(&str, &str)]) -> Result<SelectConfig, SelectError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        SelectConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const BASE: [(&str, &str); 3] = [
        ("CLUSTER_CONFIG", "cluster.yaml"),
        ("OBSERVED_STATE", "observed.yaml"),
        ("RESOURCE_KIND", "nodegroup"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(&BASE).unwrap();
        assert_eq!(config.cluster_config, PathBuf::from("cluster.yaml"));
        assert_eq!(config.observed_state, PathBuf::from("observed.yaml"));
        assert_eq!(config.kind, ResourceKind::NodeGroup);
        assert_eq!(config.operation, Operation::Create);
        assert!(config.include.is_empty());
        assert!(config.exclude.is_empty());
        assert!(!config.only_missing);
        assert!(!config.override_existing);
        assert!(!config.without_node_group);
        assert!(!config.kube_existence_check);
    }

    #[test]
    fn test_lists_and_flags() {
        let mut vars = BASE.to_vec();
        vars.extend([
            ("OPERATION", "delete"),
            ("INCLUDE", "ng-1?, prod-*,,"),
            ("EXCLUDE", "*-canary"),
            ("ONLY_MISSING", "true"),
            ("KUBE_EXISTENCE_CHECK", "YES"),
            ("OVERRIDE_EXISTING", "0"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(config.operation, Operation::Delete);
        assert_eq!(config.include, vec!["ng-1?", "prod-*"]);
        assert_eq!(config.exclude, vec!["*-canary"]);
        assert!(config.only_missing);
        assert!(config.kube_existence_check);
        assert!(!config.override_existing);
    }

    #[test]
    fn test_required_variables() {
        let err = load(&BASE[1..]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: CLUSTER_CONFIG environment variable is required"
        );

        let err = load(&[("CLUSTER_CONFIG", "c.yaml"), ("OBSERVED_STATE", "o.yaml")]).unwrap_err();
        assert!(err.to_string().contains("RESOURCE_KIND"), "got {err}");
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("RESOURCE_KIND", "fargateprofile"),
            ("OPERATION", "upgrade"),
            ("ONLY_MISSING", "maybe"),
        ] {
            let mut vars = BASE.to_vec();
            vars.push((key, value));
            let err = load(&vars).unwrap_err();
            assert!(
                matches!(err, SelectError::InvalidConfig(ref message) if message.contains(key)),
                "{key}={value}: got {err}"
            );
        }
    }

    #[test]
    fn test_access_entries_only_support_create_without_rules() {
        let kind = ("RESOURCE_KIND", "accessentry");
        let config = load(&[BASE[0], BASE[1], kind]).unwrap();
        assert_eq!(config.kind, ResourceKind::AccessEntry);

        assert!(load(&[BASE[0], BASE[1], kind, ("OPERATION", "delete")]).is_err());
        assert!(load(&[BASE[0], BASE[1], kind, ("INCLUDE", "arn:*")]).is_err());
    }
}
