#![allow(dead_code)]

use pod_api::routes::pods::{PodEnvInfo, PodInfo, PodPortInfo, PodResponse};

use crate::support::test_app::TestApp;

/// Returns the `web-1` pod used across the tests.
pub fn new_pod_info(name: &str) -> PodInfo {
    PodInfo {
        id: 0,
        pod_name: name.to_string(),
        pod_namespace: "default".to_string(),
        pod_team_id: 1,
        pod_cpu_min: 0.1,
        pod_cpu_max: 0.5,
        pod_replicas: 3,
        pod_memory_min: 64.0,
        pod_memory_max: 256.0,
        pod_port: vec![PodPortInfo {
            container_port: 80,
            protocol: "TCP".to_string(),
        }],
        pod_env: vec![PodEnvInfo {
            env_key: "MODE".to_string(),
            env_value: "prod".to_string(),
        }],
        pod_pull_policy: "Always".to_string(),
        pod_restart: "Always".to_string(),
        pod_type: "Rolling".to_string(),
        pod_image: "nginx:1.25".to_string(),
    }
}

/// Adds a pod through the API and returns its id.
pub async fn add_pod(app: &TestApp, name: &str) -> i64 {
    let response = app.add_pod(&new_pod_info(name)).await;
    assert!(response.status().is_success());
    let response: PodResponse = response
        .json()
        .await
        .expect("failed to deserialize response");

    response.msg.parse().expect("pod id is not a number")
}
