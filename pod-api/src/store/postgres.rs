use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use sqlx::PgPool;
use tracing::{error, info};

use crate::db;
use crate::db::pods::PodsDbError;
use crate::db::utils::is_unique_constraint_violation_error;
use crate::model::Pod;
use crate::store::{PodStore, PodStoreError};

/// [`PodStore`] backed by the `app` schema in Postgres.
#[derive(Debug, Clone)]
pub struct PostgresPodStore {
    pool: PgPool,
}

impl PostgresPodStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn delete_in_transaction(&self, id: i64) -> Result<Option<i64>, PodStoreError> {
        let mut txn = self.pool.begin().await?;

        let deleted = db::pods::delete_pod(&mut txn, id).await?;
        txn.commit().await?;

        Ok(deleted)
    }
}

#[async_trait]
impl PodStore for PostgresPodStore {
    async fn create(&self, pod: &Pod) -> Result<i64, PodStoreError> {
        let mut txn = self.pool.begin().await?;

        let id = match db::pods::create_pod(&mut txn, pod).await {
            Ok(id) => id,
            Err(PodsDbError::Database(err)) if is_unique_constraint_violation_error(&err) => {
                return Err(PodStoreError::DuplicatePodName(pod.name.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        txn.commit().await?;

        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Pod>, PodStoreError> {
        // Pod, ports and envs are read in three statements, so they share one snapshot.
        let mut txn = self.pool.begin().await?;
        sqlx::query("set transaction isolation level repeatable read, read only")
            .execute(&mut *txn)
            .await?;

        let pod = db::pods::read_pod(&mut txn, id).await?;
        txn.commit().await?;

        Ok(pod)
    }

    async fn find_all(&self) -> Result<Vec<Pod>, PodStoreError> {
        let pods = db::pods::read_all_pods(&self.pool).await?;

        Ok(pods)
    }

    async fn update(&self, pod: &Pod) -> Result<Option<i64>, PodStoreError> {
        match db::pods::update_pod(&self.pool, pod).await {
            Ok(id) => Ok(id),
            Err(PodsDbError::Database(err)) if is_unique_constraint_violation_error(&err) => {
                Err(PodStoreError::DuplicatePodName(pod.name.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, id: i64) -> Result<Option<i64>, PodStoreError> {
        let result = abort_on_panic(id, self.delete_in_transaction(id)).await;
        if let Ok(Some(id)) = &result {
            info!(pod_id = id, "deleted pod with its ports and envs");
        }

        result
    }
}

/// Runs the delete of pod `id`, turning a panic into [`PodStoreError::DeleteAborted`].
///
/// An unwinding future drops its transaction, which rolls it back.
async fn abort_on_panic<F>(id: i64, delete: F) -> Result<Option<i64>, PodStoreError>
where
    F: Future<Output = Result<Option<i64>, PodStoreError>>,
{
    match AssertUnwindSafe(delete).catch_unwind().await {
        Ok(result) => result,
        Err(_) => {
            error!(pod_id = id, "panic while deleting pod, transaction rolled back");
            Err(PodStoreError::DeleteAborted(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn panicking_delete_is_aborted() {
        let result = abort_on_panic(7, async { panic!("connection dropped mid delete") }).await;

        assert!(matches!(result, Err(PodStoreError::DeleteAborted(7))));
    }

    #[tokio::test]
    async fn completed_delete_passes_through() {
        assert_eq!(abort_on_panic(7, async { Ok(Some(7)) }).await.unwrap(), Some(7));
        assert_eq!(abort_on_panic(8, async { Ok(None) }).await.unwrap(), None);
    }

    #[tokio::test]
    async fn failed_delete_keeps_its_error() {
        let result = abort_on_panic(7, async { Err(PodStoreError::LockPoisoned) }).await;

        assert!(matches!(result, Err(PodStoreError::LockPoisoned)));
    }
}
