//! In-memory pod store for tests and local runs.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::model::{Pod, PodEnv, PodPort};
use crate::store::{PodStore, PodStoreError};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    pods: BTreeMap<i64, Pod>,
    ports: BTreeMap<i64, Vec<PodPort>>,
    envs: BTreeMap<i64, Vec<PodEnv>>,
}

/// In-memory [`PodStore`].
///
/// Pods and their children live in separate tables behind one lock, so a
/// reader observes either all rows of a pod or none of them. Data is lost
/// when the process exits.
#[derive(Debug, Default)]
pub struct MemoryPodStore {
    tables: RwLock<Tables>,
}

impl MemoryPodStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of port and environment rows still owned by `id`.
    pub fn child_row_count(&self, id: i64) -> Result<usize, PodStoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| PodStoreError::LockPoisoned)?;

        Ok(tables.ports.get(&id).map_or(0, Vec::len) + tables.envs.get(&id).map_or(0, Vec::len))
    }
}

#[async_trait]
impl PodStore for MemoryPodStore {
    async fn create(&self, pod: &Pod) -> Result<i64, PodStoreError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| PodStoreError::LockPoisoned)?;

        if tables.pods.values().any(|p| p.name == pod.name) {
            return Err(PodStoreError::DuplicatePodName(pod.name.clone()));
        }

        tables.next_id += 1;
        let id = tables.next_id;

        let record = Pod {
            id,
            ports: vec![],
            envs: vec![],
            ..pod.clone()
        };
        tables.pods.insert(id, record);
        tables.ports.insert(id, pod.ports.clone());
        tables.envs.insert(id, pod.envs.clone());

        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Pod>, PodStoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| PodStoreError::LockPoisoned)?;

        Ok(tables.pods.get(&id).map(|pod| Pod {
            ports: tables.ports.get(&id).cloned().unwrap_or_default(),
            envs: tables.envs.get(&id).cloned().unwrap_or_default(),
            ..pod.clone()
        }))
    }

    async fn find_all(&self) -> Result<Vec<Pod>, PodStoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| PodStoreError::LockPoisoned)?;

        Ok(tables.pods.values().cloned().collect())
    }

    async fn update(&self, pod: &Pod) -> Result<Option<i64>, PodStoreError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| PodStoreError::LockPoisoned)?;

        if tables
            .pods
            .values()
            .any(|p| p.id != pod.id && p.name == pod.name)
        {
            return Err(PodStoreError::DuplicatePodName(pod.name.clone()));
        }

        let Some(existing) = tables.pods.get_mut(&pod.id) else {
            return Ok(None);
        };

        *existing = Pod {
            ports: vec![],
            envs: vec![],
            ..pod.clone()
        };

        Ok(Some(pod.id))
    }

    async fn delete(&self, id: i64) -> Result<Option<i64>, PodStoreError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| PodStoreError::LockPoisoned)?;

        tables.envs.remove(&id);
        tables.ports.remove(&id);

        Ok(tables.pods.remove(&id).map(|pod| pod.id))
    }
}
