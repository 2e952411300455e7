#![allow(dead_code)]

use std::io;
use std::net::TcpListener;
use std::sync::Arc;

use pod_api::k8s::K8sClient;
use pod_api::routes::pods::PodInfo;
use pod_api::startup::run;
use pod_api::store::{MemoryPodStore, PodStore};
use pod_config::Environment;

use crate::support::k8s_client::MockK8sClient;

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub k8s_client: Arc<MockK8sClient>,
    pub store: Arc<MemoryPodStore>,
    server_handle: tokio::task::JoinHandle<io::Result<()>>,
}

impl TestApp {
    async fn send(&self, request: reqwest::RequestBuilder) -> reqwest::Response {
        request.send().await.expect("Failed to execute request.")
    }

    fn url(&self, path: impl std::fmt::Display) -> String {
        format!("{}{path}", self.address)
    }

    pub async fn add_pod(&self, pod: &PodInfo) -> reqwest::Response {
        self.send(self.api_client.post(self.url("/v1/pods")).json(pod))
            .await
    }

    pub async fn find_pod_by_id(&self, pod_id: i64) -> reqwest::Response {
        self.send(self.api_client.get(self.url(format!("/v1/pods/{pod_id}"))))
            .await
    }

    pub async fn update_pod(&self, pod_id: i64, pod: &PodInfo) -> reqwest::Response {
        self.send(
            self.api_client
                .post(self.url(format!("/v1/pods/{pod_id}")))
                .json(pod),
        )
        .await
    }

    pub async fn delete_pod(&self, pod_id: i64) -> reqwest::Response {
        self.send(self.api_client.delete(self.url(format!("/v1/pods/{pod_id}"))))
            .await
    }

    pub async fn find_all_pods(&self) -> reqwest::Response {
        self.send(self.api_client.get(self.url("/v1/pods"))).await
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.send(self.api_client.get(self.url(path))).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        // Stop the server so ports are not kept busy across tests.
        self.server_handle.abort();
    }
}

pub async fn spawn_test_app() -> TestApp {
    // We set the environment to dev.
    Environment::Dev.set();

    let base_address = "127.0.0.1";
    let listener =
        TcpListener::bind(format!("{base_address}:0")).expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let k8s_client = Arc::new(MockK8sClient::new());
    let store = Arc::new(MemoryPodStore::new());

    let server = run(
        listener,
        store.clone() as Arc<dyn PodStore>,
        k8s_client.clone() as Arc<dyn K8sClient>,
    )
    .await
    .expect("failed to bind address");

    let server_handle = tokio::spawn(server);

    TestApp {
        address: format!("http://{base_address}:{port}"),
        api_client: reqwest::Client::new(),
        k8s_client,
        store,
        server_handle,
    }
}
