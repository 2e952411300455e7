//! Logging setup shared by the pod workload service binaries and tests.

pub mod tracing;
