use actix_web::{
    HttpResponse, Responder, ResponseError, delete, get,
    http::{StatusCode, header::ContentType},
    post,
    web::{Data, Json, Path},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::model::{Pod, PodEnv, PodPort};
use crate::routes::ErrorMessage;
use crate::store::{PodStore, PodStoreError};
use crate::sync::{PodSynchronizer, SyncError};

#[derive(Debug, Error)]
pub enum PodError {
    #[error("The pod with id {0} was not found")]
    PodNotFound(i64),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Store(#[from] PodStoreError),
}

fn store_error_is_internal(err: &PodStoreError) -> bool {
    matches!(
        err,
        PodStoreError::PodsDb(_) | PodStoreError::LockPoisoned
    )
}

impl PodError {
    pub fn to_message(&self) -> String {
        match self {
            // Do not expose internal database details in error messages
            PodError::Store(e) | PodError::Sync(SyncError::Store(e))
                if store_error_is_internal(e) =>
            {
                "internal server error".to_string()
            }
            // Cluster errors and preconditions only name the pod and the API server's reason
            e => e.to_string(),
        }
    }
}

impl ResponseError for PodError {
    fn status_code(&self) -> StatusCode {
        match self {
            PodError::PodNotFound(_) => StatusCode::NOT_FOUND,
            PodError::Sync(SyncError::WorkloadAlreadyExists(_)) => StatusCode::CONFLICT,
            PodError::Sync(SyncError::WorkloadDoesNotExist(_)) => StatusCode::NOT_FOUND,
            PodError::Sync(SyncError::K8s(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            PodError::Store(PodStoreError::DuplicatePodName(_))
            | PodError::Sync(SyncError::Store(PodStoreError::DuplicatePodName(_))) => {
                StatusCode::CONFLICT
            }
            PodError::Store(_) | PodError::Sync(SyncError::Store(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = ErrorMessage {
            error: self.to_message(),
        };
        let body =
            serde_json::to_string(&error_message).expect("failed to serialize error message");
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(body)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PodPortInfo {
    #[schema(example = 80, required = true)]
    pub container_port: i32,
    #[schema(example = "TCP")]
    #[serde(default)]
    pub protocol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PodEnvInfo {
    #[schema(example = "MODE", required = true)]
    pub env_key: String,
    #[schema(example = "prod")]
    #[serde(default)]
    pub env_value: String,
}

/// Wire representation of a pod.
///
/// Enumerated fields are plain strings; unknown values are accepted and
/// replaced by their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PodInfo {
    #[schema(example = 1)]
    #[serde(default)]
    pub id: i64,
    #[schema(example = "web-1", required = true)]
    pub pod_name: String,
    #[schema(example = "default", required = true)]
    pub pod_namespace: String,
    #[schema(example = 1)]
    #[serde(default)]
    pub pod_team_id: i64,
    #[schema(example = 0.1)]
    #[serde(default)]
    pub pod_cpu_min: f32,
    #[schema(example = 0.5)]
    #[serde(default)]
    pub pod_cpu_max: f32,
    #[schema(example = 3)]
    #[serde(default)]
    pub pod_replicas: i32,
    #[schema(example = 64.0)]
    #[serde(default)]
    pub pod_memory_min: f32,
    #[schema(example = 256.0)]
    #[serde(default)]
    pub pod_memory_max: f32,
    #[serde(default)]
    pub pod_port: Vec<PodPortInfo>,
    #[serde(default)]
    pub pod_env: Vec<PodEnvInfo>,
    #[schema(example = "IfNotPresent")]
    #[serde(default)]
    pub pod_pull_policy: String,
    #[schema(example = "Always")]
    #[serde(default)]
    pub pod_restart: String,
    #[schema(example = "Rolling")]
    #[serde(default)]
    pub pod_type: String,
    #[schema(example = "nginx:1.25", required = true)]
    pub pod_image: String,
}

impl From<PodInfo> for Pod {
    fn from(info: PodInfo) -> Self {
        Pod {
            id: info.id,
            name: info.pod_name,
            namespace: info.pod_namespace,
            team_id: info.pod_team_id,
            cpu_min: info.pod_cpu_min,
            cpu_max: info.pod_cpu_max,
            memory_min: info.pod_memory_min,
            memory_max: info.pod_memory_max,
            replicas: info.pod_replicas,
            image: info.pod_image,
            pull_policy: info.pod_pull_policy.as_str().into(),
            restart_policy: info.pod_restart.as_str().into(),
            release_strategy: info.pod_type.as_str().into(),
            ports: info
                .pod_port
                .into_iter()
                .map(|p| PodPort {
                    container_port: p.container_port,
                    protocol: p.protocol.as_str().into(),
                })
                .collect(),
            envs: info
                .pod_env
                .into_iter()
                .map(|e| PodEnv {
                    key: e.env_key,
                    value: e.env_value,
                })
                .collect(),
        }
    }
}

impl From<Pod> for PodInfo {
    fn from(pod: Pod) -> Self {
        PodInfo {
            id: pod.id,
            pod_name: pod.name,
            pod_namespace: pod.namespace,
            pod_team_id: pod.team_id,
            pod_cpu_min: pod.cpu_min,
            pod_cpu_max: pod.cpu_max,
            pod_replicas: pod.replicas,
            pod_memory_min: pod.memory_min,
            pod_memory_max: pod.memory_max,
            pod_port: pod
                .ports
                .into_iter()
                .map(|p| PodPortInfo {
                    container_port: p.container_port,
                    protocol: p.protocol.to_string(),
                })
                .collect(),
            pod_env: pod
                .envs
                .into_iter()
                .map(|e| PodEnvInfo {
                    env_key: e.key,
                    env_value: e.value,
                })
                .collect(),
            pod_pull_policy: pod.pull_policy.to_string(),
            pod_restart: pod.restart_policy.to_string(),
            pod_type: pod.release_strategy.to_string(),
            pod_image: pod.image,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PodResponse {
    #[schema(example = "1")]
    pub msg: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AllPod {
    pub pod_info: Vec<PodInfo>,
}

#[utoipa::path(
    request_body = PodInfo,
    responses(
        (status = 200, description = "Create the pod's deployment and store the pod; msg holds the new id", body = PodResponse),
        (status = 409, description = "Deployment or pod name already exists", body = ErrorMessage),
        (status = 500, description = "Internal server error", body = ErrorMessage),
    ),
    tag = "Pods"
)]
#[post("/pods")]
pub async fn add_pod(
    synchronizer: Data<PodSynchronizer>,
    store: Data<dyn PodStore>,
    pod: Json<PodInfo>,
) -> Result<impl Responder, PodError> {
    let pod: Pod = pod.into_inner().into();

    synchronizer.create_to_cluster(&pod).await?;

    let id = store.create(&pod).await.inspect_err(|e| {
        error!(pod_name = pod.name, error = %e, "deployment created but the pod was not stored");
    })?;
    info!(pod_id = id, pod_name = pod.name, "pod added");

    Ok(Json(PodResponse { msg: id.to_string() }))
}

#[utoipa::path(
    params(
        ("pod_id" = i64, Path, description = "Id of the pod"),
    ),
    responses(
        (status = 200, description = "Delete the pod's deployment and the pod", body = PodResponse),
        (status = 404, description = "Pod not found", body = ErrorMessage),
        (status = 500, description = "Internal server error", body = ErrorMessage),
    ),
    tag = "Pods"
)]
#[delete("/pods/{pod_id}")]
pub async fn delete_pod(
    synchronizer: Data<PodSynchronizer>,
    store: Data<dyn PodStore>,
    pod_id: Path<i64>,
) -> Result<impl Responder, PodError> {
    let pod_id = pod_id.into_inner();

    let pod = store
        .find_by_id(pod_id)
        .await?
        .ok_or(PodError::PodNotFound(pod_id))?;

    synchronizer.delete_from_cluster(&pod).await?;
    info!(pod_id, pod_name = pod.name, "pod deleted");

    Ok(Json(PodResponse {
        msg: format!("pod {pod_id} deleted"),
    }))
}

#[utoipa::path(
    params(
        ("pod_id" = i64, Path, description = "Id of the pod"),
    ),
    responses(
        (status = 200, description = "Return pod with id = pod_id", body = PodInfo),
        (status = 404, description = "Pod not found", body = ErrorMessage),
        (status = 500, description = "Internal server error", body = ErrorMessage),
    ),
    tag = "Pods"
)]
#[get("/pods/{pod_id}")]
pub async fn find_pod_by_id(
    store: Data<dyn PodStore>,
    pod_id: Path<i64>,
) -> Result<impl Responder, PodError> {
    let pod_id = pod_id.into_inner();

    let response: PodInfo = store
        .find_by_id(pod_id)
        .await?
        .map(Into::into)
        .ok_or(PodError::PodNotFound(pod_id))?;

    Ok(Json(response))
}

#[utoipa::path(
    request_body = PodInfo,
    params(
        ("pod_id" = i64, Path, description = "Id of the pod"),
    ),
    responses(
        (status = 200, description = "Replace the pod's deployment and update the pod", body = PodResponse),
        (status = 404, description = "Pod or deployment not found", body = ErrorMessage),
        (status = 409, description = "Pod name already taken", body = ErrorMessage),
        (status = 500, description = "Internal server error", body = ErrorMessage),
    ),
    tag = "Pods"
)]
#[post("/pods/{pod_id}")]
pub async fn update_pod(
    synchronizer: Data<PodSynchronizer>,
    store: Data<dyn PodStore>,
    pod_id: Path<i64>,
    pod: Json<PodInfo>,
) -> Result<impl Responder, PodError> {
    let pod_id = pod_id.into_inner();
    let mut pod: Pod = pod.into_inner().into();
    pod.id = pod_id;

    synchronizer.update_to_cluster(&pod).await?;

    // Ports and envs of the stored record are left as they were.
    store
        .update(&pod)
        .await?
        .ok_or(PodError::PodNotFound(pod_id))?;
    info!(pod_id, pod_name = pod.name, "pod updated");

    Ok(Json(PodResponse {
        msg: format!("pod {pod_id} updated"),
    }))
}

#[utoipa::path(
    responses(
        (status = 200, description = "Return all pods", body = AllPod),
        (status = 500, description = "Internal server error", body = ErrorMessage),
    ),
    tag = "Pods"
)]
#[get("/pods")]
pub async fn find_all_pods(store: Data<dyn PodStore>) -> Result<impl Responder, PodError> {
    let pod_info = store
        .find_all()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(AllPod { pod_info }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pods::PodsDbError;
    use crate::model::{PortProtocol, PullPolicy};

    #[test]
    fn pod_info_accepts_unknown_enum_strings() {
        let json = r#"{
            "pod_name": "web-1",
            "pod_namespace": "default",
            "pod_image": "nginx:1.25",
            "pod_pull_policy": "Sometimes",
            "pod_port": [{ "container_port": 80, "protocol": "QUIC" }]
        }"#;
        let info: PodInfo = serde_json::from_str(json).unwrap();
        let pod = Pod::from(info);

        assert_eq!(pod.pull_policy, PullPolicy::IfNotPresent);
        assert_eq!(pod.ports[0].protocol, PortProtocol::Tcp);
        assert!(pod.envs.is_empty());
        assert_eq!(pod.id, 0);
    }

    #[test]
    fn errors_map_to_status_codes() {
        let cases = [
            (PodError::PodNotFound(1), StatusCode::NOT_FOUND),
            (
                SyncError::WorkloadAlreadyExists("web-1".to_string()).into(),
                StatusCode::CONFLICT,
            ),
            (
                SyncError::WorkloadDoesNotExist("web-1".to_string()).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                PodStoreError::DuplicatePodName("web-1".to_string()).into(),
                StatusCode::CONFLICT,
            ),
            (
                PodStoreError::DeleteAborted(1).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err}");
        }
    }

    #[test]
    fn database_details_are_not_exposed() {
        let err = PodError::Store(PodStoreError::PodsDb(PodsDbError::Database(
            sqlx::Error::PoolTimedOut,
        )));
        assert_eq!(err.to_message(), "internal server error");

        let err = PodError::Sync(SyncError::WorkloadAlreadyExists("web-1".to_string()));
        assert!(err.to_message().contains("web-1"));
    }
}
