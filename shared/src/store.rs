//! The task store: authoritative collection, active filter, derived views.
//!
//! Every mutation runs in three steps so that hosts which cannot keep a
//! `&mut TaskStore` alive across an await (the sauron update loop) can drive
//! them piecewise:
//!
//! 1. `prepare_*` validates against current state and builds the new record
//!    (or, for updates, the patch), or returns `None` for a no-op.
//! 2. That goes through the [`TaskPersistence`] adapter.
//! 3. `commit_*` applies the record the adapter confirmed, or
//!    [`TaskStore::fail`] records a notice and leaves the collection untouched.
//!
//! Updates only ever carry the fields they change. Two updates in flight for
//! the same task therefore merge at the backend, and whichever settles last
//! wins per field.
//!
//! [`TaskStore::add`], [`TaskStore::update`] and friends chain the three steps
//! for callers that can simply await.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::persistence::TaskPersistence;
use crate::task::{Task, TaskFilter, TaskFormData, TaskPatch, TaskStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// User-facing copy for a failed attempt.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Load => "Could not load your tasks. Please try again.",
            Operation::Create => "Could not create the task. Please try again.",
            Operation::Update => "Could not update the task. Please try again.",
            Operation::Delete => "Could not delete the task. Please try again.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed persistence call, waiting to be shown as a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub operation: Operation,
    pub message: String,
    pub detail: String,
}

/// A validated update on its way to the adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    /// The task as the store saw it when the update was prepared.
    pub current: Task,
    pub patch: TaskPatch,
}

#[derive(Debug, Clone)]
pub struct TaskStore<P> {
    tasks: HashMap<Uuid, Task>,
    // Newest first.
    order: Vec<Uuid>,
    filter: TaskFilter,
    persistence: P,
    notices: Vec<Notice>,
    next_notice_id: u64,
}

impl<P> TaskStore<P> {
    pub fn new(persistence: P) -> Self {
        Self {
            tasks: HashMap::new(),
            order: Vec::new(),
            filter: TaskFilter::All,
            persistence,
            notices: Vec::new(),
            next_notice_id: 0,
        }
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        debug!(filter = filter.as_str(), "filter changed");
        self.filter = filter;
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.tasks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whole collection, newest first, regardless of the active filter.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.order.iter().filter_map(|id| self.tasks.get(id))
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        let filter = self.filter;
        self.tasks().filter(|t| t.matches(filter)).collect()
    }

    /// Counts over the entire collection; the filter does not apply.
    pub fn stats(&self) -> TaskStats {
        self.tasks().collect()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Removes the notice with `id`. Unknown ids are ignored, so a late
    /// dismissal never touches another notice.
    pub fn dismiss_notice(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Replaces the collection wholesale with a loaded snapshot.
    ///
    /// Order is kept as given; repeated ids keep their first occurrence.
    pub fn apply_loaded(&mut self, loaded: Vec<Task>) {
        let mut tasks = HashMap::with_capacity(loaded.len());
        let mut order = Vec::with_capacity(loaded.len());
        for task in loaded {
            if tasks.contains_key(&task.id) {
                debug!(id = %task.id, "skipping duplicate task in loaded data");
                continue;
            }
            order.push(task.id);
            tasks.insert(task.id, task);
        }
        info!(count = order.len(), "tasks loaded");
        self.tasks = tasks;
        self.order = order;
    }

    pub fn prepare_add(&self, input: &TaskFormData) -> Option<Task> {
        if !input.is_valid() {
            debug!("ignoring task with blank title");
            return None;
        }
        let mut task = Task::new(
            input.title.trim().to_string(),
            Some(input.description.clone()),
        );
        while self.tasks.contains_key(&task.id) {
            task.id = Uuid::new_v4();
        }
        Some(task)
    }

    /// Puts a confirmed new task at the front of the list.
    pub fn commit_insert(&mut self, task: Task) {
        let id = task.id;
        if self.tasks.insert(id, task).is_none() {
            self.order.insert(0, id);
        }
        info!(%id, "task created");
    }

    pub fn prepare_update(&self, id: Uuid, patch: &TaskPatch) -> Option<PendingUpdate> {
        if !patch.is_valid() {
            debug!(%id, "ignoring update with blank title");
            return None;
        }
        let current = self.tasks.get(&id)?;
        Some(PendingUpdate {
            current: current.clone(),
            patch: patch.clone(),
        })
    }

    pub fn prepare_toggle(&self, id: Uuid) -> Option<PendingUpdate> {
        let current = self.tasks.get(&id)?;
        Some(PendingUpdate {
            current: current.clone(),
            patch: TaskPatch::completed(!current.completed),
        })
    }

    pub fn prepare_delete(&self, id: Uuid) -> Option<Uuid> {
        self.contains(id).then_some(id)
    }

    /// Swaps in the record the adapter returned, which already has the patch
    /// merged into the latest stored fields. Returns false if the task has
    /// gone away in the meantime, in which case nothing changes.
    pub fn commit_update(&mut self, task: Task) -> bool {
        match self.tasks.get_mut(&task.id) {
            Some(slot) => {
                debug!(id = %task.id, completed = task.completed, "task updated");
                *slot = task;
                true
            }
            None => {
                debug!(id = %task.id, "dropping update for removed task");
                false
            }
        }
    }

    pub fn commit_delete(&mut self, id: Uuid) -> bool {
        if self.tasks.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|other| *other != id);
        info!(%id, "task deleted");
        true
    }

    /// Records a failed persistence call and returns the id of its notice.
    /// State is left as it was.
    pub fn fail(&mut self, operation: Operation, err: impl fmt::Display) -> u64 {
        error!(%operation, error = %err, "task persistence failed");
        let id = self.next_notice_id;
        self.next_notice_id += 1;
        self.notices.push(Notice {
            id,
            operation,
            message: operation.failure_message().to_string(),
            detail: err.to_string(),
        });
        id
    }
}

impl<P: TaskPersistence> TaskStore<P> {
    pub async fn load(&mut self) {
        match self.persistence.load_all().await {
            Ok(tasks) => self.apply_loaded(tasks),
            Err(e) => {
                self.fail(Operation::Load, e);
            }
        }
    }

    /// Creates a task. Returns the stored record, or `None` if the input was
    /// rejected or the backend failed.
    pub async fn add(&mut self, input: TaskFormData) -> Option<Task> {
        let draft = self.prepare_add(&input)?;
        match self.persistence.insert(draft).await {
            Ok(saved) => {
                self.commit_insert(saved.clone());
                Some(saved)
            }
            Err(e) => {
                self.fail(Operation::Create, e);
                None
            }
        }
    }

    pub async fn update(&mut self, id: Uuid, patch: TaskPatch) -> Option<Task> {
        let pending = self.prepare_update(id, &patch)?;
        self.persist_update(pending).await
    }

    pub async fn toggle_completion(&mut self, id: Uuid) -> Option<Task> {
        let pending = self.prepare_toggle(id)?;
        self.persist_update(pending).await
    }

    pub async fn delete(&mut self, id: Uuid) -> bool {
        let Some(id) = self.prepare_delete(id) else {
            return false;
        };
        match self.persistence.delete(id).await {
            Ok(()) => self.commit_delete(id),
            Err(e) => {
                self.fail(Operation::Delete, e);
                false
            }
        }
    }

    async fn persist_update(&mut self, pending: PendingUpdate) -> Option<Task> {
        match self
            .persistence
            .update(&pending.current, &pending.patch)
            .await
        {
            Ok(saved) => {
                self.commit_update(saved.clone());
                Some(saved)
            }
            Err(e) => {
                self.fail(Operation::Update, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::persistence::MemoryPersistence;

    fn form(title: &str) -> TaskFormData {
        TaskFormData::new(title, "")
    }

    #[tokio::test]
    async fn add_prepends_and_counts() {
        let mut store = TaskStore::new(MemoryPersistence::new());
        store.add(form("A")).await.unwrap();
        store.add(form("B")).await.unwrap();
        let titles: Vec<_> = store.visible_tasks().into_iter().map(|t| t.title.clone()).collect();
        assert_eq!(titles, ["B", "A"]);
        assert_eq!(store.stats(), TaskStats { total: 2, completed: 0, pending: 2 });
    }

    #[tokio::test]
    async fn blank_title_is_ignored_without_persistence_call() {
        let persistence = MemoryPersistence::new();
        let mut store = TaskStore::new(persistence.clone());
        assert!(store.add(TaskFormData::new("   ", "ignored")).await.is_none());
        assert_eq!(store.stats().total, 0);
        assert_eq!(persistence.call_count(), 0);
        assert!(store.notices().is_empty());
    }

    #[tokio::test]
    async fn failed_create_leaves_collection_and_raises_notice() {
        let persistence = MemoryPersistence::new();
        let mut store = TaskStore::new(persistence.clone());
        persistence.set_failing(true);
        assert!(store.add(form("A")).await.is_none());
        assert!(store.is_empty());
        let notices = store.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].operation, Operation::Create);
        assert!(store.notices().is_empty());
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_state() {
        let persistence = MemoryPersistence::new();
        let mut store = TaskStore::new(persistence.clone());
        store.add(form("kept")).await.unwrap();
        persistence.set_failing(true);
        store.load().await;
        assert_eq!(store.len(), 1);
        assert_eq!(store.notices()[0].operation, Operation::Load);
    }

    #[test]
    fn apply_loaded_drops_duplicate_ids() {
        let task = Task::new("dup".into(), None);
        let mut store = TaskStore::new(MemoryPersistence::new());
        store.apply_loaded(vec![task.clone(), task.clone()]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn commit_update_for_removed_task_is_dropped() {
        let task = Task::new("gone".into(), None);
        let mut store = TaskStore::new(MemoryPersistence::new());
        store.apply_loaded(vec![task.clone()]);
        let pending = store.prepare_toggle(task.id).unwrap();
        assert!(store.commit_delete(task.id));
        assert!(!store.commit_update(pending.current.patched(&pending.patch)));
        assert!(store.is_empty());
    }

    #[test]
    fn prepare_update_rejects_unknown_id_and_blank_title() {
        let task = Task::new("A".into(), None);
        let mut store = TaskStore::new(MemoryPersistence::new());
        store.apply_loaded(vec![task.clone()]);
        assert!(store.prepare_update(Uuid::new_v4(), &TaskPatch::title("x")).is_none());
        assert!(store.prepare_update(task.id, &TaskPatch::title(" ")).is_none());
        assert!(store.prepare_update(task.id, &TaskPatch::title("x")).is_some());
    }

    #[test]
    fn prepare_toggle_carries_only_the_flag() {
        let task = Task::new("A".into(), Some("notes".into()));
        let mut store = TaskStore::new(MemoryPersistence::new());
        store.apply_loaded(vec![task.clone()]);
        let pending = store.prepare_toggle(task.id).unwrap();
        assert_eq!(pending.patch, TaskPatch::completed(true));
        assert_eq!(pending.current, task);
    }

    #[test]
    fn dismiss_notice_by_id() {
        let mut store = TaskStore::new(MemoryPersistence::new());
        let first = store.fail(Operation::Delete, TaskError::Network("down".into()));
        let second = store.fail(Operation::Update, TaskError::Network("down".into()));
        assert_ne!(first, second);

        assert!(store.dismiss_notice(first));
        // A second dismissal of the same id must not remove the other notice.
        assert!(!store.dismiss_notice(first));
        assert_eq!(store.notices().len(), 1);
        assert_eq!(store.notices()[0].id, second);
    }
}
