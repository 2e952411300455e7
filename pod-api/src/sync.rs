//! Keeps cluster deployments and persisted pod records in step.
//!
//! Every operation talks to the cluster first and only touches the store
//! once the cluster call succeeded. The two systems do not share a
//! transaction: if the store write fails after the cluster accepted the
//! change, the cluster side is left as is and the error is returned.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::k8s::{K8sClient, K8sError};
use crate::model::Pod;
use crate::store::{PodStore, PodStoreError};
use crate::workload::build_deployment;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("The workload for pod {0} already exists")]
    WorkloadAlreadyExists(String),

    #[error("The workload for pod {0} does not exist")]
    WorkloadDoesNotExist(String),

    #[error(transparent)]
    K8s(#[from] K8sError),

    #[error(transparent)]
    Store(#[from] PodStoreError),
}

/// Projects pod records onto cluster deployments.
///
/// The existence checks in [`PodSynchronizer::create_to_cluster`] and
/// [`PodSynchronizer::update_to_cluster`] are separate calls from the
/// mutation that follows them. A concurrent actor can change the cluster in
/// between, in which case the API server's own error is returned.
#[derive(Clone)]
pub struct PodSynchronizer {
    k8s_client: Arc<dyn K8sClient>,
    store: Arc<dyn PodStore>,
}

impl PodSynchronizer {
    pub fn new(k8s_client: Arc<dyn K8sClient>, store: Arc<dyn PodStore>) -> Self {
        Self { k8s_client, store }
    }

    /// Creates the deployment for `pod`, failing if one with the same name exists.
    pub async fn create_to_cluster(&self, pod: &Pod) -> Result<(), SyncError> {
        let deployment = build_deployment(pod);

        if self
            .k8s_client
            .get_deployment(&pod.namespace, &pod.name)
            .await?
            .is_some()
        {
            warn!(pod_name = pod.name, "deployment already exists, not creating it");
            return Err(SyncError::WorkloadAlreadyExists(pod.name.clone()));
        }

        self.k8s_client
            .create_deployment(&pod.namespace, &deployment)
            .await?;
        info!(pod_name = pod.name, namespace = pod.namespace, "deployment created");

        Ok(())
    }

    /// Replaces the deployment for `pod`, failing if it does not exist yet.
    pub async fn update_to_cluster(&self, pod: &Pod) -> Result<(), SyncError> {
        let deployment = build_deployment(pod);

        if self
            .k8s_client
            .get_deployment(&pod.namespace, &pod.name)
            .await?
            .is_none()
        {
            warn!(pod_name = pod.name, "deployment does not exist, not updating it");
            return Err(SyncError::WorkloadDoesNotExist(pod.name.clone()));
        }

        self.k8s_client
            .replace_deployment(&pod.namespace, &pod.name, &deployment)
            .await?;
        info!(pod_name = pod.name, namespace = pod.namespace, "deployment updated");

        Ok(())
    }

    /// Deletes the deployment for `pod` and then its record.
    ///
    /// The record is left in place when the cluster delete fails. A record
    /// that vanished concurrently is not treated as an error.
    pub async fn delete_from_cluster(&self, pod: &Pod) -> Result<(), SyncError> {
        self.k8s_client
            .delete_deployment(&pod.namespace, &pod.name)
            .await?;
        info!(pod_name = pod.name, namespace = pod.namespace, "deployment deleted");

        if self.store.delete(pod.id).await?.is_none() {
            warn!(pod_id = pod.id, "pod record was already gone after deleting its deployment");
        }

        Ok(())
    }
}
