//! Domain records for pods and their owned ports and environment variables.
//!
//! Enumerated attributes travel as strings on the wire and in the database.
//! Parsing is lenient: an unrecognized value falls back to the documented
//! default of each enum instead of failing the request.

use std::fmt;

/// Protocol of a container port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortProtocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
}

impl PortProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortProtocol::Tcp => "TCP",
            PortProtocol::Udp => "UDP",
            PortProtocol::Sctp => "SCTP",
        }
    }
}

impl From<&str> for PortProtocol {
    fn from(value: &str) -> Self {
        match value {
            "TCP" => PortProtocol::Tcp,
            "UDP" => PortProtocol::Udp,
            "SCTP" => PortProtocol::Sctp,
            _ => PortProtocol::default(),
        }
    }
}

/// Image pull policy of the pod's container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PullPolicy {
    Always,
    #[default]
    IfNotPresent,
    Never,
}

impl PullPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullPolicy::Always => "Always",
            PullPolicy::IfNotPresent => "IfNotPresent",
            PullPolicy::Never => "Never",
        }
    }
}

impl From<&str> for PullPolicy {
    fn from(value: &str) -> Self {
        match value {
            "Always" => PullPolicy::Always,
            "IfNotPresent" => PullPolicy::IfNotPresent,
            "Never" => PullPolicy::Never,
            _ => PullPolicy::default(),
        }
    }
}

/// Restart policy recorded for the pod.
///
/// Persisted and returned to clients; the generated workload always uses the
/// cluster default for deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    #[default]
    Always,
    OnFailure,
    Never,
}

impl RestartPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestartPolicy::Always => "Always",
            RestartPolicy::OnFailure => "OnFailure",
            RestartPolicy::Never => "Never",
        }
    }
}

impl From<&str> for RestartPolicy {
    fn from(value: &str) -> Self {
        match value {
            "Always" => RestartPolicy::Always,
            "OnFailure" => RestartPolicy::OnFailure,
            "Never" => RestartPolicy::Never,
            _ => RestartPolicy::default(),
        }
    }
}

/// Release strategy recorded for the pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseStrategy {
    Recreate,
    Custom,
    #[default]
    Rolling,
}

impl ReleaseStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseStrategy::Recreate => "Recreate",
            ReleaseStrategy::Custom => "Custom",
            ReleaseStrategy::Rolling => "Rolling",
        }
    }
}

impl From<&str> for ReleaseStrategy {
    fn from(value: &str) -> Self {
        match value {
            "Recreate" => ReleaseStrategy::Recreate,
            "Custom" => ReleaseStrategy::Custom,
            "Rolling" => ReleaseStrategy::Rolling,
            _ => ReleaseStrategy::default(),
        }
    }
}

macro_rules! impl_display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

impl_display_as_str!(PortProtocol, PullPolicy, RestartPolicy, ReleaseStrategy);

/// A port exposed by the pod's container.
#[derive(Debug, Clone, PartialEq)]
pub struct PodPort {
    pub container_port: i32,
    pub protocol: PortProtocol,
}

/// An environment variable of the pod's container.
#[derive(Debug, Clone, PartialEq)]
pub struct PodEnv {
    pub key: String,
    pub value: String,
}

/// A persisted pod definition.
///
/// `name` is unique across all pods and doubles as the name of the workload
/// created on the cluster. `id` is assigned by the store on creation and is
/// ignored when a pod is inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct Pod {
    pub id: i64,
    pub name: String,
    pub namespace: String,
    pub team_id: i64,
    pub cpu_min: f32,
    pub cpu_max: f32,
    pub memory_min: f32,
    pub memory_max: f32,
    pub replicas: i32,
    pub image: String,
    pub pull_policy: PullPolicy,
    pub restart_policy: RestartPolicy,
    pub release_strategy: ReleaseStrategy,
    pub ports: Vec<PodPort>,
    pub envs: Vec<PodEnv>,
}
