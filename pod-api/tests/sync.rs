use std::sync::Arc;

use pod_api::k8s::K8sClient;
use pod_api::model::{Pod, PodEnv, PodPort, PortProtocol, PullPolicy, ReleaseStrategy, RestartPolicy};
use pod_api::store::{MemoryPodStore, PodStore};
use pod_api::sync::{PodSynchronizer, SyncError};
use pod_telemetry::tracing::init_test_tracing;

use crate::support::k8s_client::MockK8sClient;

mod support;

fn web_pod() -> Pod {
    Pod {
        id: 0,
        name: "web-1".to_string(),
        namespace: "default".to_string(),
        team_id: 1,
        cpu_min: 0.1,
        cpu_max: 0.5,
        memory_min: 64.0,
        memory_max: 256.0,
        replicas: 3,
        image: "nginx:1.25".to_string(),
        pull_policy: PullPolicy::Always,
        restart_policy: RestartPolicy::Always,
        release_strategy: ReleaseStrategy::Rolling,
        ports: vec![PodPort {
            container_port: 80,
            protocol: PortProtocol::Tcp,
        }],
        envs: vec![PodEnv {
            key: "MODE".to_string(),
            value: "prod".to_string(),
        }],
    }
}

fn synchronizer() -> (PodSynchronizer, Arc<MockK8sClient>, Arc<MemoryPodStore>) {
    let k8s_client = Arc::new(MockK8sClient::new());
    let store = Arc::new(MemoryPodStore::new());
    let synchronizer = PodSynchronizer::new(
        k8s_client.clone() as Arc<dyn K8sClient>,
        store.clone() as Arc<dyn PodStore>,
    );

    (synchronizer, k8s_client, store)
}

#[tokio::test]
async fn creating_twice_reports_already_exists_without_mutation() {
    init_test_tracing();
    let (synchronizer, k8s_client, _) = synchronizer();

    synchronizer.create_to_cluster(&web_pod()).await.unwrap();
    let err = synchronizer.create_to_cluster(&web_pod()).await.unwrap_err();

    assert!(matches!(err, SyncError::WorkloadAlreadyExists(name) if name == "web-1"));
    assert_eq!(k8s_client.create_calls(), 1);
    assert_eq!(k8s_client.deployment_count(), 1);
}

#[tokio::test]
async fn updating_an_absent_workload_reports_does_not_exist() {
    init_test_tracing();
    let (synchronizer, k8s_client, _) = synchronizer();

    let err = synchronizer.update_to_cluster(&web_pod()).await.unwrap_err();

    assert!(matches!(err, SyncError::WorkloadDoesNotExist(name) if name == "web-1"));
    assert_eq!(k8s_client.replace_calls(), 0);
    assert_eq!(k8s_client.deployment_count(), 0);
}

#[tokio::test]
async fn update_replaces_the_whole_deployment() {
    init_test_tracing();
    let (synchronizer, k8s_client, _) = synchronizer();
    synchronizer.create_to_cluster(&web_pod()).await.unwrap();

    let mut pod = web_pod();
    pod.envs.clear();
    pod.cpu_max = 2.0;
    synchronizer.update_to_cluster(&pod).await.unwrap();

    let deployment = k8s_client.deployment("default", "web-1").unwrap();
    let pod_spec = deployment.spec.unwrap().template.spec.unwrap();
    let container = &pod_spec.containers[0];
    assert_eq!(container.env.as_deref(), Some(&[][..]));
    let requests = container.resources.as_ref().unwrap().requests.as_ref().unwrap();
    assert_eq!(requests["cpu"].0, "2.000000");
}

#[tokio::test]
async fn delete_removes_the_deployment_then_the_record() {
    init_test_tracing();
    let (synchronizer, k8s_client, store) = synchronizer();
    synchronizer.create_to_cluster(&web_pod()).await.unwrap();
    let id = store.create(&web_pod()).await.unwrap();
    let pod = store.find_by_id(id).await.unwrap().unwrap();

    synchronizer.delete_from_cluster(&pod).await.unwrap();

    assert_eq!(k8s_client.deployment_count(), 0);
    assert!(store.find_by_id(id).await.unwrap().is_none());
    assert_eq!(store.child_row_count(id).unwrap(), 0);
}

#[tokio::test]
async fn failed_cluster_delete_leaves_the_record() {
    init_test_tracing();
    let (synchronizer, k8s_client, store) = synchronizer();
    synchronizer.create_to_cluster(&web_pod()).await.unwrap();
    let id = store.create(&web_pod()).await.unwrap();
    let pod = store.find_by_id(id).await.unwrap().unwrap();
    k8s_client.fail_mutations();

    let err = synchronizer.delete_from_cluster(&pod).await.unwrap_err();

    assert!(matches!(err, SyncError::K8s(_)));
    assert!(store.find_by_id(id).await.unwrap().is_some());
    assert_eq!(store.child_row_count(id).unwrap(), 2);
}

#[tokio::test]
async fn cluster_errors_are_surfaced_unchanged() {
    init_test_tracing();
    let (synchronizer, k8s_client, _) = synchronizer();
    k8s_client.fail_mutations();

    let err = synchronizer.create_to_cluster(&web_pod()).await.unwrap_err();

    assert!(matches!(err, SyncError::K8s(_)));
    assert!(err.to_string().contains("the api server is unavailable"));
    assert_eq!(k8s_client.create_calls(), 1);
}
