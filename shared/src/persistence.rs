//! Persistence port for the task store and the adapters that ship with it.
//!
//! The store never talks to a backend directly: it hands new records and
//! field-level patches to a [`TaskPersistence`] and only applies them in memory
//! once the adapter confirms. Adapters:
//!
//! - [`LocalPersistence`]: one JSON blob under a single key of a
//!   [`KeyValueStorage`] (browser `localStorage`, or [`MemoryStorage`]).
//! - [`MemoryPersistence`]: in-process table with failure injection, used by
//!   tests and as a scratch backend.
//!
//! The HTTP adapter for the hosted table lives in the frontend crate since it
//! needs `fetch`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Result, TaskError};
use crate::task::{Task, TaskPatch};

/// Key under which the browser blob is stored.
pub const STORAGE_KEY: &str = "taskManager-tasks";

#[async_trait(?Send)]
pub trait TaskPersistence {
    /// Full collection, newest first.
    async fn load_all(&self) -> Result<Vec<Task>>;

    /// Stores a new task and returns the record as persisted.
    async fn insert(&self, task: Task) -> Result<Task>;

    /// Applies `patch` to the stored record with `current.id` and returns the
    /// merged record. Only fields set in the patch are written; `current` is
    /// the caller's last known copy, not a replacement.
    async fn update(&self, current: &Task, patch: &TaskPatch) -> Result<Task>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Minimal string key/value store, the shape of the Web Storage API.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Keeps the whole collection as one serialized array under `key`.
///
/// Reads never fail: a missing blob is an empty list and a corrupt one is
/// logged and treated as empty. Writes are best effort and only logged.
#[derive(Debug, Clone)]
pub struct LocalPersistence<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> LocalPersistence<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn read(&self) -> Vec<Task> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read saved tasks");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Task>>(&raw) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(key = %self.key, error = %e, "error parsing saved tasks, starting empty");
                Vec::new()
            }
        }
    }

    fn write(&self, tasks: &[Task]) {
        let result = serde_json::to_string(tasks)
            .map_err(TaskError::from)
            .and_then(|blob| self.storage.set_item(&self.key, &blob));
        match result {
            Ok(()) => debug!(key = %self.key, count = tasks.len(), "saved tasks"),
            Err(e) => warn!(key = %self.key, error = %e, "failed to save tasks"),
        }
    }
}

#[async_trait(?Send)]
impl<S: KeyValueStorage> TaskPersistence for LocalPersistence<S> {
    async fn load_all(&self) -> Result<Vec<Task>> {
        Ok(self.read())
    }

    async fn insert(&self, task: Task) -> Result<Task> {
        let mut tasks = self.read();
        tasks.retain(|t| t.id != task.id);
        tasks.insert(0, task.clone());
        self.write(&tasks);
        Ok(task)
    }

    async fn update(&self, current: &Task, patch: &TaskPatch) -> Result<Task> {
        let mut tasks = self.read();
        let Some(slot) = tasks.iter_mut().find(|t| t.id == current.id) else {
            warn!(id = %current.id, "updated task missing from saved blob, not writing");
            return Ok(current.patched(patch));
        };
        *slot = slot.patched(patch);
        let merged = slot.clone();
        self.write(&tasks);
        Ok(merged)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tasks = self.read();
        tasks.retain(|t| t.id != id);
        self.write(&tasks);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryTable {
    rows: Vec<Task>,
    failing: bool,
    calls: usize,
}

/// In-process table. Clones share the same rows.
///
/// `set_failing(true)` makes every call return a network error, which is how
/// tests exercise the remote failure paths of the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    table: Rc<RefCell<MemoryTable>>,
    stamp_on_insert: Rc<Cell<bool>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let persistence = Self::default();
        persistence.table.borrow_mut().rows = tasks;
        persistence
    }

    pub fn set_failing(&self, failing: bool) {
        self.table.borrow_mut().failing = failing;
    }

    /// When set, inserted rows get fresh server-side timestamps, as the hosted
    /// table does.
    pub fn stamp_on_insert(&self, enabled: bool) {
        self.stamp_on_insert.set(enabled);
    }

    /// Number of calls made through the port, failed ones included.
    pub fn call_count(&self) -> usize {
        self.table.borrow().calls
    }

    pub fn rows(&self) -> Vec<Task> {
        self.table.borrow().rows.clone()
    }

    fn begin(&self) -> Result<std::cell::RefMut<'_, MemoryTable>> {
        let mut table = self.table.borrow_mut();
        table.calls += 1;
        if table.failing {
            return Err(TaskError::Network("connection refused".to_string()));
        }
        Ok(table)
    }
}

#[async_trait(?Send)]
impl TaskPersistence for MemoryPersistence {
    async fn load_all(&self) -> Result<Vec<Task>> {
        let table = self.begin()?;
        let mut rows = table.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert(&self, mut task: Task) -> Result<Task> {
        let stamp = self.stamp_on_insert.get();
        let mut table = self.begin()?;
        if stamp {
            let now = chrono::Utc::now();
            task.created_at = now;
            task.updated_at = now;
        }
        table.rows.insert(0, task.clone());
        Ok(task)
    }

    async fn update(&self, current: &Task, patch: &TaskPatch) -> Result<Task> {
        let mut table = self.begin()?;
        let slot = table
            .rows
            .iter_mut()
            .find(|t| t.id == current.id)
            .ok_or(TaskError::NotFound(current.id))?;
        *slot = slot.patched(patch);
        Ok(slot.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut table = self.begin()?;
        let before = table.rows.len();
        table.rows.retain(|t| t.id != id);
        if table.rows.len() == before {
            return Err(TaskError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_blob_loads_empty() {
        let local = LocalPersistence::new(MemoryStorage::new());
        assert!(local.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_blob_loads_empty() {
        let storage = MemoryStorage::new();
        storage.set_item(STORAGE_KEY, "{not json").unwrap();
        let local = LocalPersistence::new(storage);
        assert!(local.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn local_writes_newest_first_blob() {
        let storage = MemoryStorage::new();
        let local = LocalPersistence::new(storage.clone());
        let a = local.insert(Task::new("A".into(), None)).await.unwrap();
        let b = local.insert(Task::new("B".into(), None)).await.unwrap();

        let reopened = LocalPersistence::new(storage.clone());
        let loaded = reopened.load_all().await.unwrap();
        assert_eq!(loaded, vec![b.clone(), a.clone()]);

        let raw = storage.get_item(STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["title"], "B");
        assert!(value[0]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn local_update_and_delete_rewrite_blob() {
        let local = LocalPersistence::new(MemoryStorage::new());
        let task = local.insert(Task::new("A".into(), None)).await.unwrap();
        let done = local.update(&task, &TaskPatch::completed(true)).await.unwrap();
        assert!(done.completed);
        assert_eq!(local.load_all().await.unwrap(), vec![done]);

        local.delete(task.id).await.unwrap();
        assert!(local.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn local_update_merges_only_patched_fields() {
        let local = LocalPersistence::new(MemoryStorage::new());
        let task = local.insert(Task::new("Old".into(), None)).await.unwrap();
        let stale = task.clone();

        local.update(&task, &TaskPatch::title("New")).await.unwrap();
        let merged = local.update(&stale, &TaskPatch::completed(true)).await.unwrap();
        assert_eq!(merged.title, "New");
        assert!(merged.completed);
        assert_eq!(local.load_all().await.unwrap(), vec![merged]);
    }

    #[tokio::test]
    async fn local_update_of_missing_task_does_not_resurrect_it() {
        let storage = MemoryStorage::new();
        let local = LocalPersistence::new(storage.clone());
        let task = local.insert(Task::new("Gone".into(), None)).await.unwrap();
        local.delete(task.id).await.unwrap();

        let returned = local.update(&task, &TaskPatch::completed(true)).await.unwrap();
        assert!(returned.completed);
        assert!(local.load_all().await.unwrap().is_empty());
        assert_eq!(storage.get_item(STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn failing_memory_table_counts_calls() {
        let memory = MemoryPersistence::new();
        memory.set_failing(true);
        let err = memory.insert(Task::new("A".into(), None)).await.unwrap_err();
        assert!(matches!(err, TaskError::Network(_)));
        assert_eq!(memory.call_count(), 1);
        assert!(memory.rows().is_empty());
    }
}
