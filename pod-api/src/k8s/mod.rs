//! Kubernetes integration for the pod API.
//!
//! Consumers depend on the [`K8sClient`] trait. The default implementation,
//! [`http::HttpK8sClient`], is backed by the [`kube`] crate and uses the
//! ambient configuration (in-cluster or local `~/.kube/config`), while tests
//! substitute an in-process fake.

mod base;
pub mod http;

pub use base::*;
