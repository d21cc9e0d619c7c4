use serde_json::json;
use std::sync::{PoisonError, RwLock};
use taskdeck_core::{StatusFilter, Task, decode_tasks, encode_tasks, filter_by_status};
use taskdeck_store::KeyValueStore;
use tracing::{debug, warn};

use crate::api::RemoteApi;
use crate::error::{AppError, Result};

/// Persistent key of the serialized task list.
pub const TASKS_KEY: &str = "tasks";

/// Ordered task list whose mutations go through the remote API first.
///
/// A mutation only touches state after its call resolves successfully. The
/// full list is then written to the persistent store before the new list
/// becomes visible, so a failed write leaves both copies as they were.
pub struct TaskStore<A, S> {
    api: A,
    store: S,
    tasks: RwLock<Vec<Task>>,
}

impl<A, S> TaskStore<A, S>
where
    A: RemoteApi,
    S: KeyValueStore,
{
    /// Build a store seeded from the persisted list. A missing or unparseable
    /// entry starts an empty list.
    ///
    /// # Errors
    /// Returns an error if the persistent store cannot be read.
    pub fn hydrate(api: A, store: S) -> Result<Self> {
        let tasks = match store.get(TASKS_KEY)? {
            Some(raw) => decode_tasks(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "ignoring unreadable stored task list");
                Vec::new()
            }),
            None => Vec::new(),
        };
        debug!(count = tasks.len(), "hydrated task list");
        Ok(Self {
            api,
            store,
            tasks: RwLock::new(tasks),
        })
    }

    /// Copy of the full list in insertion order.
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Tasks admitted by `status`, in list order. Not rate limited.
    pub fn filter_tasks(&self, status: StatusFilter) -> Vec<Task> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        filter_by_status(&tasks, status)
    }

    /// Append a pending task with a fresh id.
    ///
    /// # Errors
    /// Returns the remote error when the call fails, or a storage error when
    /// persisting fails. The list is unchanged in both cases.
    pub async fn add_task(&self, title: &str, due_date: &str) -> Result<Task> {
        self.api
            .call("add", Some(json!({ "title": title, "dueDate": due_date })))
            .await?;
        let task = Task::new(title, due_date);
        let created = task.clone();
        self.commit(move |tasks| tasks.push(task))?;
        debug!(id = %created.id, "added task");
        Ok(created)
    }

    /// Flip the completion flag of the task with `id`.
    ///
    /// Returns the updated task, or `None` when no task matches (still a
    /// successful call).
    ///
    /// # Errors
    /// Returns the remote error when the call fails, or a storage error when
    /// persisting fails.
    pub async fn toggle_task(&self, id: &str) -> Result<Option<Task>> {
        self.api.call("toggle", Some(json!({ "id": id }))).await?;
        self.commit(|tasks| {
            tasks.iter_mut().find(|task| task.id == *id).map(|task| {
                task.completed = !task.completed;
                task.clone()
            })
        })
    }

    /// Remove the task with `id`.
    ///
    /// Returns the removed task, or `None` when no task matches.
    ///
    /// # Errors
    /// Returns the remote error when the call fails, or a storage error when
    /// persisting fails.
    pub async fn delete_task(&self, id: &str) -> Result<Option<Task>> {
        self.api.call("delete", Some(json!({ "id": id }))).await?;
        self.commit(|tasks| {
            let position = tasks.iter().position(|task| task.id == *id)?;
            Some(tasks.remove(position))
        })
    }

    fn commit<T>(&self, change: impl FnOnce(&mut Vec<Task>) -> T) -> Result<T> {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = tasks.clone();
        let outcome = change(&mut next);
        let raw = encode_tasks(&next).map_err(AppError::encode("task list"))?;
        self.store.set(TASKS_KEY, &raw)?;
        debug!(count = next.len(), "persisted task list");
        *tasks = next;
        drop(tasks);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use crate::testing::{FlakyStore, ScriptedApi};
    use taskdeck_core::TaskId;
    use taskdeck_store::MemoryStore;

    fn empty_store() -> (TaskStore<ScriptedApi, MemoryStore>, ScriptedApi, MemoryStore) {
        let api = ScriptedApi::default();
        let store = MemoryStore::new();
        let tasks = TaskStore::hydrate(api.clone(), store.clone()).expect("hydrate");
        (tasks, api, store)
    }

    fn persisted(store: &MemoryStore) -> Vec<Task> {
        let raw = store.get(TASKS_KEY).expect("get").expect("tasks persisted");
        decode_tasks(&raw).expect("decode")
    }

    fn stored_task(id: &str, title: &str, completed: bool) -> Task {
        Task {
            id: TaskId::from(id),
            title: title.into(),
            due_date: "2024-03-25".into(),
            completed,
        }
    }

    #[test]
    fn hydrates_from_persisted_list() {
        let saved = vec![stored_task("1", "a", false), stored_task("2", "b", true)];
        let store = MemoryStore::with_entries([(
            TASKS_KEY,
            encode_tasks(&saved).expect("encode"),
        )]);

        let tasks = TaskStore::hydrate(ScriptedApi::default(), store).expect("hydrate");
        assert_eq!(tasks.tasks(), saved);
    }

    #[test]
    fn unreadable_list_hydrates_empty() {
        for raw in ["not json", "{}", "[{\"id\": 1}]"] {
            let store = MemoryStore::with_entries([(TASKS_KEY, raw)]);
            let tasks = TaskStore::hydrate(ScriptedApi::default(), store).expect("hydrate");
            assert!(tasks.tasks().is_empty(), "{raw} should hydrate empty");
        }
    }

    #[tokio::test]
    async fn add_toggle_delete_round_trip() {
        let (tasks, api, store) = empty_store();

        let added = tasks.add_task("X", "2024-01-01").await.expect("add");
        assert!(!added.completed);
        assert_eq!(tasks.tasks(), vec![added.clone()]);
        assert_eq!(persisted(&store), vec![added.clone()]);
        assert_eq!(
            api.last_payload(),
            Some(json!({"title": "X", "dueDate": "2024-01-01"}))
        );

        let toggled = tasks
            .toggle_task(added.id.as_str())
            .await
            .expect("toggle")
            .expect("task exists");
        assert!(toggled.completed);
        assert_eq!(persisted(&store), vec![toggled.clone()]);

        let removed = tasks
            .delete_task(added.id.as_str())
            .await
            .expect("delete")
            .expect("task exists");
        assert_eq!(removed.id, added.id);
        assert!(tasks.tasks().is_empty());
        assert!(persisted(&store).is_empty());

        assert_eq!(api.actions(), ["add", "toggle", "delete"]);
    }

    #[tokio::test]
    async fn toggle_twice_restores_pending() {
        let (tasks, _api, _store) = empty_store();
        let task = tasks.add_task("X", "2024-01-01").await.expect("add");

        tasks.toggle_task(task.id.as_str()).await.expect("toggle");
        tasks.toggle_task(task.id.as_str()).await.expect("toggle");

        assert!(!tasks.tasks()[0].completed);
    }

    #[tokio::test]
    async fn unknown_ids_are_successful_no_ops() {
        let (tasks, api, store) = empty_store();
        let task = tasks.add_task("X", "2024-01-01").await.expect("add");

        assert_eq!(tasks.toggle_task("missing").await.expect("toggle"), None);
        assert_eq!(tasks.delete_task("missing").await.expect("delete"), None);

        assert_eq!(tasks.tasks(), vec![task.clone()]);
        assert_eq!(persisted(&store), vec![task]);
        assert_eq!(api.actions(), ["add", "toggle", "delete"]);
    }

    #[tokio::test]
    async fn failed_add_changes_nothing() {
        let (tasks, api, store) = empty_store();
        let existing = tasks.add_task("keep", "2024-01-01").await.expect("add");
        let before = store.snapshot();
        api.fail_on("add");

        let err = tasks.add_task("X", "2024-01-02").await.unwrap_err();

        assert!(matches!(err, AppError::Api(_)));
        assert_eq!(tasks.tasks(), vec![existing]);
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn failed_toggle_and_delete_change_nothing() {
        let (tasks, api, store) = empty_store();
        let task = tasks.add_task("keep", "2024-01-01").await.expect("add");
        let before = store.snapshot();
        api.fail_on("toggle");
        api.fail_on("delete");

        assert!(tasks.toggle_task(task.id.as_str()).await.is_err());
        assert!(tasks.delete_task(task.id.as_str()).await.is_err());

        assert_eq!(tasks.tasks(), vec![task]);
        assert_eq!(store.snapshot(), before);

        api.recover("toggle");
        assert!(tasks.toggle_task("missing").await.is_ok());
    }

    #[tokio::test]
    async fn storage_failure_keeps_memory_unchanged() {
        let api = ScriptedApi::default();
        let store = FlakyStore::default();
        let tasks = TaskStore::hydrate(api, store.clone()).expect("hydrate");
        store.reject_writes(true);

        let err = tasks.add_task("X", "2024-01-01").await.unwrap_err();

        assert!(matches!(err, AppError::Store(_)));
        assert!(tasks.tasks().is_empty());
        assert_eq!(store.memory().get(TASKS_KEY).expect("get"), None);
    }

    #[tokio::test]
    async fn filters_partition_the_list_in_order() {
        let (tasks, _api, _store) = empty_store();
        let first = tasks.add_task("first", "2024-01-01").await.expect("add");
        let second = tasks.add_task("second", "2024-01-02").await.expect("add");
        let third = tasks.add_task("third", "2024-01-03").await.expect("add");
        tasks.toggle_task(second.id.as_str()).await.expect("toggle");

        let pending = tasks.filter_tasks(StatusFilter::Pending);
        let completed = tasks.filter_tasks(StatusFilter::Completed);
        let all = tasks.filter_tasks(StatusFilter::All);

        let ids = |list: &[Task]| list.iter().map(|t| t.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&pending), vec![first.id.clone(), third.id.clone()]);
        assert_eq!(ids(&completed), vec![second.id.clone()]);
        assert_eq!(ids(&all), vec![first.id, second.id, third.id]);
    }

    #[tokio::test]
    async fn rehydration_reproduces_the_list() {
        let (tasks, _api, store) = empty_store();
        tasks.add_task("a", "2024-01-01").await.expect("add");
        let b = tasks.add_task("b", "2024-01-02").await.expect("add");
        tasks.add_task("c", "2024-01-03").await.expect("add");
        tasks.toggle_task(b.id.as_str()).await.expect("toggle");

        let reloaded = TaskStore::hydrate(ScriptedApi::default(), store).expect("hydrate");
        assert_eq!(reloaded.tasks(), tasks.tasks());
    }
}
