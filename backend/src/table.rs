//! The `tasks` table. Rows are stored in Redis as `task:<uuid>` JSON strings.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use shared::TaskRow;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;

pub const KEY_PREFIX: &str = "task:";

fn row_key(id: Uuid) -> String {
    format!("{}{}", KEY_PREFIX, id)
}

fn newest_first(rows: &mut [TaskRow]) {
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
pub trait TaskTable: Send + Sync {
    /// All rows ordered by `created_at` descending.
    async fn list(&self) -> Result<Vec<TaskRow>>;
    async fn get(&self, id: Uuid) -> Result<Option<TaskRow>>;
    /// Inserts or overwrites the row with the same id.
    async fn put(&self, row: &TaskRow) -> Result<()>;
    /// Returns false when no row had that id.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct RedisTable {
    client: Arc<Client>,
}

impl RedisTable {
    pub fn open(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl TaskTable for RedisTable {
    async fn list(&self) -> Result<Vec<TaskRow>> {
        let mut conn = self.client.get_async_connection().await?;
        let keys: Vec<String> = conn.keys(format!("{}*", KEY_PREFIX)).await?;

        let mut rows = Vec::with_capacity(keys.len());
        for key in keys {
            let raw: Option<String> = conn.get(&key).await?;
            let Some(raw) = raw else { continue };
            match serde_json::from_str::<TaskRow>(&raw) {
                Ok(row) => rows.push(row),
                Err(e) => tracing::warn!(%key, error = %e, "skipping unreadable row"),
            }
        }
        newest_first(&mut rows);
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<TaskRow>> {
        let mut conn = self.client.get_async_connection().await?;
        let raw: Option<String> = conn.get(row_key(id)).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, row: &TaskRow) -> Result<()> {
        let raw = serde_json::to_string(row)?;
        let mut conn = self.client.get_async_connection().await?;
        let _: () = conn.set(row_key(row.id), raw).await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut conn = self.client.get_async_connection().await?;
        let deleted: usize = conn.del(row_key(id)).await?;
        Ok(deleted > 0)
    }
}

/// Table kept in process memory; used by the router tests.
#[derive(Default)]
pub struct MemoryTable {
    rows: RwLock<HashMap<Uuid, TaskRow>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskTable for MemoryTable {
    async fn list(&self) -> Result<Vec<TaskRow>> {
        let mut rows: Vec<TaskRow> = self.rows.read().await.values().cloned().collect();
        newest_first(&mut rows);
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<TaskRow>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn put(&self, row: &TaskRow) -> Result<()> {
        self.rows.write().await.insert(row.id, row.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}
