use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use kube::Client;
use kube::api::{Api, DeleteParams, PostParams};
use tracing::info;

use crate::k8s::{K8sClient, K8sError};

/// [`K8sClient`] implementation talking to the API server through [`kube`].
#[derive(Clone)]
pub struct HttpK8sClient {
    client: Client,
}

impl HttpK8sClient {
    /// Creates a client from the ambient kubeconfig or in-cluster environment.
    pub async fn new() -> Result<HttpK8sClient, K8sError> {
        let client = Client::try_default().await?;

        Ok(HttpK8sClient { client })
    }

    fn deployments_api(&self, namespace: &str) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl K8sClient for HttpK8sClient {
    async fn get_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Deployment>, K8sError> {
        let deployment = self.deployments_api(namespace).get_opt(name).await?;

        Ok(deployment)
    }

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<(), K8sError> {
        info!(namespace, name = ?deployment.metadata.name, "creating deployment");

        self.deployments_api(namespace)
            .create(&PostParams::default(), deployment)
            .await?;

        Ok(())
    }

    async fn replace_deployment(
        &self,
        namespace: &str,
        name: &str,
        deployment: &Deployment,
    ) -> Result<(), K8sError> {
        info!(namespace, name, "replacing deployment");

        self.deployments_api(namespace)
            .replace(name, &PostParams::default(), deployment)
            .await?;

        Ok(())
    }

    async fn delete_deployment(&self, namespace: &str, name: &str) -> Result<(), K8sError> {
        info!(namespace, name, "deleting deployment");

        self.deployments_api(namespace)
            .delete(name, &DeleteParams::default())
            .await?;

        Ok(())
    }
}
