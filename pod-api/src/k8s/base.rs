use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use thiserror::Error;

/// Errors emitted by the Kubernetes integration.
#[derive(Debug, Error)]
pub enum K8sError {
    /// An error returned by the [`kube`] client when talking to the API
    /// server.
    #[error("An error occurred with kube when dealing with K8s: {0}")]
    Kube(#[from] kube::Error),
}

/// Client interface describing the deployment operations used by the API.
///
/// Each method maps to exactly one call against the API server. Callers that
/// need an existence check before acting issue two separate calls, so the
/// result of [`K8sClient::get_deployment`] may be stale by the time the
/// follow-up call lands.
#[async_trait]
pub trait K8sClient: Send + Sync {
    /// Returns the deployment `name` in `namespace`, or `None` if it does not exist.
    async fn get_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Deployment>, K8sError>;

    /// Creates `deployment` in `namespace`.
    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<(), K8sError>;

    /// Replaces the full specification of the existing deployment `name`.
    async fn replace_deployment(
        &self,
        namespace: &str,
        name: &str,
        deployment: &Deployment,
    ) -> Result<(), K8sError>;

    /// Deletes the deployment `name` in `namespace`.
    async fn delete_deployment(&self, namespace: &str, name: &str) -> Result<(), K8sError>;
}
