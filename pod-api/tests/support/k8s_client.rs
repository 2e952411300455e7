#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::ErrorResponse;
use pod_api::k8s::{K8sClient, K8sError};

/// In-process stand-in for the API server.
///
/// Deployments are kept in a map keyed by namespace and name and every
/// mutating call is counted, so tests can assert that a rejected request
/// never reached the cluster.
#[derive(Default)]
pub struct MockK8sClient {
    deployments: Mutex<BTreeMap<(String, String), Deployment>>,
    create_calls: AtomicUsize,
    replace_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    fail_mutations: AtomicBool,
}

fn api_error(code: u16, reason: &str, message: String) -> K8sError {
    K8sError::Kube(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message,
        reason: reason.to_string(),
        code,
    }))
}

impl MockK8sClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following create, replace and delete call fail.
    pub fn fail_mutations(&self) {
        self.fail_mutations.store(true, Ordering::SeqCst);
    }

    /// Puts a deployment in place without going through the client API.
    pub fn insert_deployment(&self, namespace: &str, name: &str) {
        let deployment = Deployment {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        self.deployments
            .lock()
            .unwrap()
            .insert((namespace.to_string(), name.to_string()), deployment);
    }

    /// Removes a deployment without going through the client API.
    pub fn remove_deployment(&self, namespace: &str, name: &str) {
        self.deployments
            .lock()
            .unwrap()
            .remove(&(namespace.to_string(), name.to_string()));
    }

    pub fn deployment(&self, namespace: &str, name: &str) -> Option<Deployment> {
        self.deployments
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn deployment_count(&self) -> usize {
        self.deployments.lock().unwrap().len()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn replace_calls(&self) -> usize {
        self.replace_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), K8sError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(api_error(
                500,
                "InternalError",
                "the api server is unavailable".to_string(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl K8sClient for MockK8sClient {
    async fn get_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Deployment>, K8sError> {
        Ok(self.deployment(namespace, name))
    }

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<(), K8sError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let name = deployment.metadata.name.clone().unwrap_or_default();
        let mut deployments = self.deployments.lock().unwrap();
        let key = (namespace.to_string(), name.clone());
        if deployments.contains_key(&key) {
            return Err(api_error(
                409,
                "AlreadyExists",
                format!("deployments.apps \"{name}\" already exists"),
            ));
        }
        deployments.insert(key, deployment.clone());

        Ok(())
    }

    async fn replace_deployment(
        &self,
        namespace: &str,
        name: &str,
        deployment: &Deployment,
    ) -> Result<(), K8sError> {
        self.replace_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let mut deployments = self.deployments.lock().unwrap();
        let Some(existing) = deployments.get_mut(&(namespace.to_string(), name.to_string()))
        else {
            return Err(api_error(
                404,
                "NotFound",
                format!("deployments.apps \"{name}\" not found"),
            ));
        };
        *existing = deployment.clone();

        Ok(())
    }

    async fn delete_deployment(&self, namespace: &str, name: &str) -> Result<(), K8sError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let removed = self
            .deployments
            .lock()
            .unwrap()
            .remove(&(namespace.to_string(), name.to_string()));
        if removed.is_none() {
            return Err(api_error(
                404,
                "NotFound",
                format!("deployments.apps \"{name}\" not found"),
            ));
        }

        Ok(())
    }
}
