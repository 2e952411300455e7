use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, PodSpec, PodTemplateSpec, ResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};

use crate::model::{Pod, PodEnv, PodPort};

/// Label carrying the pod name, used as the deployment selector.
pub const APP_NAME_LABEL: &str = "app-name";
/// Label identifying the service that created the deployment.
pub const AUTHOR_LABEL: &str = "author";
pub const AUTHOR_LABEL_VALUE: &str = "pod-api";

const CPU_RESOURCE: &str = "cpu";
const MEMORY_RESOURCE: &str = "memory";

/// Builds the [`Deployment`] that represents `pod` on the cluster.
///
/// The translation is pure: the same pod always yields the same deployment.
/// Both the resource requests and limits are taken from the pod's maximum
/// cpu and memory values; the minimums are only recorded in the store.
pub fn build_deployment(pod: &Pod) -> Deployment {
    let selector_labels = BTreeMap::from([(APP_NAME_LABEL.to_string(), pod.name.clone())]);

    let mut labels = selector_labels.clone();
    labels.insert(AUTHOR_LABEL.to_string(), AUTHOR_LABEL_VALUE.to_string());

    let container = Container {
        name: pod.name.clone(),
        image: Some(pod.image.clone()),
        ports: Some(container_ports(&pod.ports)),
        env: Some(env_vars(&pod.envs)),
        resources: Some(resource_requirements(pod)),
        image_pull_policy: Some(pod.pull_policy.as_str().to_string()),
        ..Default::default()
    };

    Deployment {
        metadata: ObjectMeta {
            name: Some(pod.name.clone()),
            namespace: Some(pod.namespace.clone()),
            labels: Some(labels),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(pod.replicas),
            selector: LabelSelector {
                match_labels: Some(selector_labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(selector_labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Name given to the container port exposing `port`.
pub fn port_name(port: i32) -> String {
    format!("port-{port}")
}

/// Formats a resource amount with six fractional digits, e.g. `0.5` as `0.500000`.
pub fn format_quantity(amount: f32) -> Quantity {
    Quantity(format!("{:.6}", f64::from(amount)))
}

fn container_ports(ports: &[PodPort]) -> Vec<ContainerPort> {
    ports
        .iter()
        .map(|port| ContainerPort {
            name: Some(port_name(port.container_port)),
            container_port: port.container_port,
            protocol: Some(port.protocol.as_str().to_string()),
            ..Default::default()
        })
        .collect()
}

fn env_vars(envs: &[PodEnv]) -> Vec<EnvVar> {
    envs.iter()
        .map(|env| EnvVar {
            name: env.key.clone(),
            value: Some(env.value.clone()),
            ..Default::default()
        })
        .collect()
}

fn resource_requirements(pod: &Pod) -> ResourceRequirements {
    let amounts = BTreeMap::from([
        (CPU_RESOURCE.to_string(), format_quantity(pod.cpu_max)),
        (MEMORY_RESOURCE.to_string(), format_quantity(pod.memory_max)),
    ]);

    ResourceRequirements {
        limits: Some(amounts.clone()),
        requests: Some(amounts),
        ..Default::default()
    }
}
