//! Configuration for the pod workload service.
//!
//! Provides environment detection, layered YAML plus environment variable
//! loading, secret handling and the shared database connection settings.

mod environment;
mod load;
mod secret;
pub mod shared;

pub use environment::*;
pub use load::*;
pub use secret::*;
