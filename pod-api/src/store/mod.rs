//! Pod record storage backends.
//!
//! The [`PodStore`] trait is what the synchronizer and the routes depend on.
//! [`PostgresPodStore`] is used in production, [`MemoryPodStore`] keeps
//! everything in process for tests and local runs.

mod memory;
mod postgres;

pub use memory::MemoryPodStore;
pub use postgres::PostgresPodStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::db::pods::PodsDbError;
use crate::model::Pod;

#[derive(Debug, Error)]
pub enum PodStoreError {
    #[error(transparent)]
    PodsDb(#[from] PodsDbError),

    #[error("A pod named {0} already exists")]
    DuplicatePodName(String),

    #[error("The delete of pod {0} was aborted and rolled back")]
    DeleteAborted(i64),

    #[error("The pod store lock was poisoned")]
    LockPoisoned,
}

impl From<sqlx::Error> for PodStoreError {
    fn from(err: sqlx::Error) -> Self {
        PodStoreError::PodsDb(PodsDbError::Database(err))
    }
}

/// Persistence of pod records and their owned ports and environment variables.
#[async_trait]
pub trait PodStore: Send + Sync {
    /// Inserts `pod` with all of its children and returns the generated id.
    async fn create(&self, pod: &Pod) -> Result<i64, PodStoreError>;

    /// Returns the pod `id` with ports and environment variables loaded.
    async fn find_by_id(&self, id: i64) -> Result<Option<Pod>, PodStoreError>;

    /// Returns every pod without its children.
    async fn find_all(&self) -> Result<Vec<Pod>, PodStoreError>;

    /// Updates the scalar fields of the pod `pod.id`, leaving children as they are.
    ///
    /// Returns `None` if there is no such pod.
    async fn update(&self, pod: &Pod) -> Result<Option<i64>, PodStoreError>;

    /// Removes the pod `id` and all of its children as one unit.
    ///
    /// Returns `None` if there is no such pod.
    async fn delete(&self, id: i64) -> Result<Option<i64>, PodStoreError>;
}
