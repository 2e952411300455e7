//! Pod workload service.
//!
//! Stores pod definitions in Postgres and mirrors each of them as a
//! Kubernetes deployment, exposing create, read, update and delete over a
//! REST API documented with OpenAPI.

pub mod config;
pub mod db;
pub mod k8s;
pub mod model;
pub mod routes;
pub mod startup;
pub mod store;
pub mod sync;
pub mod workload;
