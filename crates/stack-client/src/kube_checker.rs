//! Service account existence checks against a live cluster

use crate::error::ListerError;
use crate::lister_trait::ServiceAccountExistenceChecker;
use k8s_openapi::api::core::v1::ServiceAccount;
use kube::{Api, Client};
use tracing::debug;

/// Looks up `ServiceAccount` objects through the Kubernetes API
#[derive(Clone)]
pub struct KubeServiceAccountChecker {
    client: Client,
}

impl KubeServiceAccountChecker {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a checker from the ambient kubeconfig or in-cluster config.
    pub async fn try_default() -> Result<Self, ListerError> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }
}

impl std::fmt::Debug for KubeServiceAccountChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeServiceAccountChecker").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ServiceAccountExistenceChecker for KubeServiceAccountChecker {
    async fn service_account_exists(&self, namespace: &str, name: &str) -> Result<bool, ListerError> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), namespace);
        let exists = api.get_opt(name).await?.is_some();
        debug!(namespace, name, exists, "checked service account");
        Ok(exists)
    }
}
