use std::collections::HashSet;

use shared::{
    LocalPersistence, MemoryPersistence, MemoryStorage, Operation, TaskFilter, TaskFormData,
    TaskPatch, TaskPersistence, TaskStats, TaskStore,
};
use uuid::Uuid;

fn form(title: &str) -> TaskFormData {
    TaskFormData::new(title, "")
}

fn assert_stats_consistent<P>(store: &TaskStore<P>) {
    let stats = store.stats();
    assert_eq!(stats.total, stats.completed + stats.pending);
}

#[tokio::test]
async fn ids_are_unique_across_load_and_add() {
    let seed = MemoryPersistence::new();
    let mut seeded = TaskStore::new(seed.clone());
    for title in ["one", "two", "three"] {
        seeded.add(form(title)).await.unwrap();
    }

    let mut store = TaskStore::new(seed.clone());
    store.load().await;
    for title in ["four", "five"] {
        store.add(form(title)).await.unwrap();
    }

    let ids: HashSet<Uuid> = store.tasks().map(|t| t.id).collect();
    assert_eq!(ids.len(), 5);
}

#[tokio::test]
async fn empty_title_changes_nothing() {
    let persistence = MemoryPersistence::new();
    let mut store = TaskStore::new(persistence.clone());
    store.add(TaskFormData::new("", "anything")).await;
    assert_eq!(store.stats().total, 0);
    assert_eq!(persistence.call_count(), 0);
}

#[tokio::test]
async fn double_toggle_restores_flag_and_advances_timestamp() {
    let mut store = TaskStore::new(LocalPersistence::new(MemoryStorage::new()));
    let task = store.add(form("Toggle me")).await.unwrap();

    let first = store.toggle_completion(task.id).await.unwrap();
    assert!(first.completed);
    assert!(first.updated_at > task.updated_at);

    let second = store.toggle_completion(task.id).await.unwrap();
    assert_eq!(second.completed, task.completed);
    assert!(second.updated_at > first.updated_at);
    assert_eq!(second.created_at, task.created_at);
}

#[tokio::test]
async fn update_keeps_identity() {
    let mut store = TaskStore::new(MemoryPersistence::new());
    let task = store.add(form("Old")).await.unwrap();
    let updated = store.update(task.id, TaskPatch::title("New")).await.unwrap();
    assert_eq!(updated.id, task.id);
    assert_eq!(updated.created_at, task.created_at);
    assert!(updated.updated_at >= task.updated_at);
    assert_eq!(store.get(task.id).unwrap().title, "New");
}

#[tokio::test]
async fn update_unknown_id_is_a_no_op() {
    let persistence = MemoryPersistence::new();
    let mut store = TaskStore::new(persistence.clone());
    store.add(form("A")).await.unwrap();
    let calls = persistence.call_count();
    assert!(store.update(Uuid::new_v4(), TaskPatch::title("B")).await.is_none());
    assert!(store.toggle_completion(Uuid::new_v4()).await.is_none());
    assert_eq!(persistence.call_count(), calls);
}

#[tokio::test]
async fn stats_stay_consistent_under_every_filter() {
    let mut store = TaskStore::new(MemoryPersistence::new());
    for filter in TaskFilter::ALL {
        store.set_filter(filter);
        let a = store.add(form("a")).await.unwrap();
        assert_stats_consistent(&store);
        store.toggle_completion(a.id).await;
        assert_stats_consistent(&store);
        let b = store.add(form("b")).await.unwrap();
        store.update(b.id, TaskPatch::title("b2")).await;
        assert_stats_consistent(&store);
        store.delete(a.id).await;
        assert_stats_consistent(&store);
    }
}

#[tokio::test]
async fn switching_filters_never_touches_the_collection() {
    let mut store = TaskStore::new(MemoryPersistence::new());
    let a = store.add(form("a")).await.unwrap();
    store.add(form("b")).await.unwrap();
    store.toggle_completion(a.id).await.unwrap();

    let before: Vec<_> = store.tasks().cloned().collect();
    for filter in [TaskFilter::Completed, TaskFilter::Pending, TaskFilter::All] {
        store.set_filter(filter);
        let _ = store.visible_tasks();
    }
    let after: Vec<_> = store.tasks().cloned().collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn buy_milk_scenario() {
    let mut store = TaskStore::new(LocalPersistence::new(MemoryStorage::new()));
    store.add(form("Buy milk")).await.unwrap();
    assert_eq!(store.stats(), TaskStats { total: 1, completed: 0, pending: 1 });
    assert_eq!(store.visible_tasks().len(), 1);
    store.set_filter(TaskFilter::Completed);
    assert_eq!(store.visible_tasks().len(), 0);
}

#[tokio::test]
async fn newest_first_under_local_policy() {
    let mut store = TaskStore::new(LocalPersistence::new(MemoryStorage::new()));
    store.add(form("A")).await.unwrap();
    store.add(form("B")).await.unwrap();
    let titles: Vec<_> = store.visible_tasks().iter().map(|t| t.title.clone()).collect();
    assert_eq!(titles, ["B", "A"]);
}

#[tokio::test]
async fn toggled_task_moves_between_filters() {
    let mut store = TaskStore::new(MemoryPersistence::new());
    let task = store.add(form("Finish")).await.unwrap();
    store.toggle_completion(task.id).await.unwrap();
    store.set_filter(TaskFilter::Pending);
    assert!(store.visible_tasks().is_empty());
    store.set_filter(TaskFilter::Completed);
    assert_eq!(store.visible_tasks().len(), 1);
}

#[tokio::test]
async fn deleting_unknown_id_is_silent() {
    let persistence = MemoryPersistence::new();
    let mut store = TaskStore::new(persistence.clone());
    store.add(form("A")).await.unwrap();
    let calls = persistence.call_count();
    assert!(!store.delete(Uuid::new_v4()).await);
    assert_eq!(store.len(), 1);
    assert!(store.notices().is_empty());
    assert_eq!(persistence.call_count(), calls);
}

#[tokio::test]
async fn remote_failures_roll_back_each_operation() {
    let persistence = MemoryPersistence::new();
    let mut store = TaskStore::new(persistence.clone());
    let task = store.add(form("Stable")).await.unwrap();
    let snapshot: Vec<_> = store.tasks().cloned().collect();

    persistence.set_failing(true);
    assert!(store.add(form("Lost")).await.is_none());
    assert!(store.update(task.id, TaskPatch::title("Lost")).await.is_none());
    assert!(store.toggle_completion(task.id).await.is_none());
    assert!(!store.delete(task.id).await);
    store.load().await;

    let after: Vec<_> = store.tasks().cloned().collect();
    assert_eq!(snapshot, after);

    let operations: Vec<_> = store.take_notices().into_iter().map(|n| n.operation).collect();
    assert_eq!(
        operations,
        [
            Operation::Create,
            Operation::Update,
            Operation::Update,
            Operation::Delete,
            Operation::Load,
        ]
    );
}

#[tokio::test]
async fn interleaved_edit_and_toggle_keep_both_fields() {
    let persistence = MemoryPersistence::new();
    let mut store = TaskStore::new(persistence.clone());
    let task = store.add(form("Old")).await.unwrap();

    // Both calls are in flight before either settles.
    let edit = store.prepare_update(task.id, &TaskPatch::title("New")).unwrap();
    let toggle = store.prepare_toggle(task.id).unwrap();

    let edited = persistence.update(&edit.current, &edit.patch).await.unwrap();
    store.commit_update(edited);
    let toggled = persistence.update(&toggle.current, &toggle.patch).await.unwrap();
    store.commit_update(toggled);

    let local = store.get(task.id).unwrap();
    assert_eq!(local.title, "New");
    assert!(local.completed);

    let rows = persistence.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "New");
    assert!(rows[0].completed);
}

#[tokio::test]
async fn add_keeps_server_assigned_fields() {
    let persistence = MemoryPersistence::new();
    persistence.stamp_on_insert(true);
    let mut store = TaskStore::new(persistence.clone());
    let saved = store.add(form("Stamped")).await.unwrap();
    assert_eq!(store.get(saved.id), Some(&saved));
    assert_eq!(persistence.rows(), vec![saved]);
}

#[tokio::test]
async fn local_store_survives_reload() {
    let storage = MemoryStorage::new();
    let mut store = TaskStore::new(LocalPersistence::new(storage.clone()));
    let a = store.add(TaskFormData::new("A", "with notes")).await.unwrap();
    store.add(form("B")).await.unwrap();
    store.toggle_completion(a.id).await.unwrap();

    let mut reopened = TaskStore::new(LocalPersistence::new(storage));
    reopened.load().await;
    let original: Vec<_> = store.tasks().cloned().collect();
    let reloaded: Vec<_> = reopened.tasks().cloned().collect();
    assert_eq!(original, reloaded);
    assert_eq!(reopened.stats(), TaskStats { total: 2, completed: 1, pending: 1 });
}
