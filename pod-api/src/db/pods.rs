use std::ops::DerefMut;

use sqlx::{FromRow, PgExecutor, PgTransaction};
use thiserror::Error;

use crate::model::{Pod, PodEnv, PodPort, PortProtocol};

#[derive(Debug, Error)]
pub enum PodsDbError {
    #[error("Error while interacting with Postgres for pods: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(FromRow)]
struct PodRow {
    id: i64,
    name: String,
    namespace: String,
    team_id: i64,
    cpu_min: f32,
    cpu_max: f32,
    memory_min: f32,
    memory_max: f32,
    replicas: i32,
    image: String,
    pull_policy: String,
    restart_policy: String,
    release_strategy: String,
}

impl PodRow {
    fn into_pod(self, ports: Vec<PodPort>, envs: Vec<PodEnv>) -> Pod {
        Pod {
            id: self.id,
            name: self.name,
            namespace: self.namespace,
            team_id: self.team_id,
            cpu_min: self.cpu_min,
            cpu_max: self.cpu_max,
            memory_min: self.memory_min,
            memory_max: self.memory_max,
            replicas: self.replicas,
            image: self.image,
            pull_policy: self.pull_policy.as_str().into(),
            restart_policy: self.restart_policy.as_str().into(),
            release_strategy: self.release_strategy.as_str().into(),
            ports,
            envs,
        }
    }
}

#[derive(FromRow)]
struct PodPortRow {
    container_port: i32,
    protocol: String,
}

#[derive(FromRow)]
struct PodEnvRow {
    key: String,
    value: String,
}

/// Inserts `pod` together with its ports and environment variables.
///
/// The child rows are written through the same transaction as the pod row, so
/// nothing is visible until the caller commits.
pub async fn create_pod(txn: &mut PgTransaction<'_>, pod: &Pod) -> Result<i64, PodsDbError> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        insert into app.pods (name, namespace, team_id, cpu_min, cpu_max, memory_min, memory_max,
            replicas, image, pull_policy, restart_policy, release_strategy)
        values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        returning id
        "#,
    )
    .bind(&pod.name)
    .bind(&pod.namespace)
    .bind(pod.team_id)
    .bind(pod.cpu_min)
    .bind(pod.cpu_max)
    .bind(pod.memory_min)
    .bind(pod.memory_max)
    .bind(pod.replicas)
    .bind(&pod.image)
    .bind(pod.pull_policy.as_str())
    .bind(pod.restart_policy.as_str())
    .bind(pod.release_strategy.as_str())
    .fetch_one(txn.deref_mut())
    .await?;

    for port in &pod.ports {
        sqlx::query(
            r#"
            insert into app.pod_ports (pod_id, container_port, protocol)
            values ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(port.container_port)
        .bind(port.protocol.as_str())
        .execute(txn.deref_mut())
        .await?;
    }

    for env in &pod.envs {
        sqlx::query(
            r#"
            insert into app.pod_envs (pod_id, key, value)
            values ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(&env.key)
        .bind(&env.value)
        .execute(txn.deref_mut())
        .await?;
    }

    Ok(id)
}

/// Reads the pod `pod_id` with its ports and environment variables.
///
/// Children are returned in insertion order.
pub async fn read_pod(
    txn: &mut PgTransaction<'_>,
    pod_id: i64,
) -> Result<Option<Pod>, PodsDbError> {
    let row: Option<PodRow> = sqlx::query_as(
        r#"
        select id, name, namespace, team_id, cpu_min, cpu_max, memory_min, memory_max,
            replicas, image, pull_policy, restart_policy, release_strategy
        from app.pods
        where id = $1
        "#,
    )
    .bind(pod_id)
    .fetch_optional(txn.deref_mut())
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let ports: Vec<PodPortRow> = sqlx::query_as(
        r#"
        select container_port, protocol
        from app.pod_ports
        where pod_id = $1
        order by id
        "#,
    )
    .bind(pod_id)
    .fetch_all(txn.deref_mut())
    .await?;

    let envs: Vec<PodEnvRow> = sqlx::query_as(
        r#"
        select key, value
        from app.pod_envs
        where pod_id = $1
        order by id
        "#,
    )
    .bind(pod_id)
    .fetch_all(txn.deref_mut())
    .await?;

    let ports = ports
        .into_iter()
        .map(|p| PodPort {
            container_port: p.container_port,
            protocol: PortProtocol::from(p.protocol.as_str()),
        })
        .collect();
    let envs = envs
        .into_iter()
        .map(|e| PodEnv {
            key: e.key,
            value: e.value,
        })
        .collect();

    Ok(Some(row.into_pod(ports, envs)))
}

/// Reads every pod row. Ports and environment variables are not loaded.
pub async fn read_all_pods<'c, E>(executor: E) -> Result<Vec<Pod>, PodsDbError>
where
    E: PgExecutor<'c>,
{
    let rows: Vec<PodRow> = sqlx::query_as(
        r#"
        select id, name, namespace, team_id, cpu_min, cpu_max, memory_min, memory_max,
            replicas, image, pull_policy, restart_policy, release_strategy
        from app.pods
        order by id
        "#,
    )
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| r.into_pod(vec![], vec![]))
        .collect())
}

/// Updates the scalar fields of the pod with `pod.id`.
///
/// Port and environment rows are left untouched.
pub async fn update_pod<'c, E>(executor: E, pod: &Pod) -> Result<Option<i64>, PodsDbError>
where
    E: PgExecutor<'c>,
{
    let record: Option<(i64,)> = sqlx::query_as(
        r#"
        update app.pods
        set name = $1, namespace = $2, team_id = $3, cpu_min = $4, cpu_max = $5,
            memory_min = $6, memory_max = $7, replicas = $8, image = $9, pull_policy = $10,
            restart_policy = $11, release_strategy = $12, updated_at = now()
        where id = $13
        returning id
        "#,
    )
    .bind(&pod.name)
    .bind(&pod.namespace)
    .bind(pod.team_id)
    .bind(pod.cpu_min)
    .bind(pod.cpu_max)
    .bind(pod.memory_min)
    .bind(pod.memory_max)
    .bind(pod.replicas)
    .bind(&pod.image)
    .bind(pod.pull_policy.as_str())
    .bind(pod.restart_policy.as_str())
    .bind(pod.release_strategy.as_str())
    .bind(pod.id)
    .fetch_optional(executor)
    .await?;

    Ok(record.map(|(id,)| id))
}

/// Deletes the pod `pod_id` along with its environment and port rows.
///
/// Children go first because the foreign keys do not cascade. Returns `None`
/// if no pod row matched; the caller decides whether to commit.
pub async fn delete_pod(
    txn: &mut PgTransaction<'_>,
    pod_id: i64,
) -> Result<Option<i64>, PodsDbError> {
    sqlx::query(
        r#"
        delete from app.pod_envs
        where pod_id = $1
        "#,
    )
    .bind(pod_id)
    .execute(txn.deref_mut())
    .await?;

    sqlx::query(
        r#"
        delete from app.pod_ports
        where pod_id = $1
        "#,
    )
    .bind(pod_id)
    .execute(txn.deref_mut())
    .await?;

    let record: Option<(i64,)> = sqlx::query_as(
        r#"
        delete from app.pods
        where id = $1
        returning id
        "#,
    )
    .bind(pod_id)
    .fetch_optional(txn.deref_mut())
    .await?;

    Ok(record.map(|(id,)| id))
}
