use crate::error::AppError;
use crate::model::{IdSource, SequentialIds, Task, TaskId};
use time::Date;

/// Ordered in-memory task list. Insertion order is display order.
pub struct TaskStore {
    tasks: Vec<Task>,
    ids: Box<dyn IdSource>,
}

impl TaskStore {
    pub fn new<I: IdSource + 'static>(ids: I) -> Self {
        Self {
            tasks: Vec::new(),
            ids: Box::new(ids),
        }
    }

    /// Appends a new pending task. Callers reject blank text beforehand.
    pub fn append(&mut self, text: &str, deadline: Option<Date>) -> Task {
        let task = Task {
            id: self.ids.next_id(),
            text: text.to_string(),
            completed: false,
            deadline,
        };
        self.tasks.push(task.clone());
        task
    }

    /// Flips `completed`. Returns `None` and leaves the store untouched when the id is unknown.
    pub fn toggle_completed(&mut self, id: &TaskId) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|task| &task.id == id)?;
        task.completed = !task.completed;
        Some(task.clone())
    }

    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|task| &task.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Resolves an exact id or a unique id prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<&Task, AppError> {
        let trimmed = prefix.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("id is required"));
        }

        if let Some(task) = self.tasks.iter().find(|task| task.id.as_str() == trimmed) {
            return Ok(task);
        }

        let mut matches = self
            .tasks
            .iter()
            .filter(|task| task.id.as_str().starts_with(trimmed));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task),
            (Some(_), Some(_)) => Err(AppError::invalid_input(format!(
                "task id '{trimmed}' is ambiguous"
            ))),
            (None, _) => Err(AppError::invalid_input("task not found")),
        }
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new(SequentialIds::new())
    }
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::TaskStore;
    use crate::model::{TaskId, UuidIds};
    use time::macros::date;

    fn texts(store: &TaskStore) -> Vec<&str> {
        store.list().iter().map(|task| task.text.as_str()).collect()
    }

    #[test]
    fn append_preserves_submission_order() {
        let mut store = TaskStore::default();
        for text in ["first", "second", "third", "second"] {
            store.append(text, None);
        }

        assert_eq!(texts(&store), vec!["first", "second", "third", "second"]);
        assert_eq!(store.list()[0].id.as_str(), "task-1");
        assert_eq!(store.list()[3].id.as_str(), "task-4");
    }

    #[test]
    fn append_creates_pending_task_with_deadline() {
        let mut store = TaskStore::default();
        let task = store.append("Write report", Some(date!(2024 - 06 - 01)));

        assert!(!task.completed);
        assert_eq!(task.deadline, Some(date!(2024 - 06 - 01)));
        assert_eq!(store.get(&task.id), Some(&task));
    }

    #[test]
    fn toggle_completed_twice_restores_original_value() {
        let mut store = TaskStore::default();
        let task = store.append("Buy milk", None);

        let toggled = store.toggle_completed(&task.id).unwrap();
        assert!(toggled.completed);
        let restored = store.toggle_completed(&task.id).unwrap();
        assert!(!restored.completed);
        assert_eq!(store.list()[0], task);
    }

    #[test]
    fn toggle_completed_unknown_id_leaves_store_unchanged() {
        let mut store = TaskStore::default();
        store.append("Buy milk", None);
        let before = store.list().to_vec();

        assert!(store.toggle_completed(&TaskId::new("task-9")).is_none());
        assert_eq!(store.list(), before.as_slice());
    }

    #[test]
    fn remove_deletes_only_the_matching_task() {
        let mut store = TaskStore::default();
        store.append("a", None);
        let middle = store.append("b", None);
        store.append("c", None);

        let removed = store.remove(&middle.id).unwrap();
        assert_eq!(removed, middle);
        assert_eq!(texts(&store), vec!["a", "c"]);
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut store = TaskStore::default();
        store.append("a", None);

        assert!(store.remove(&TaskId::new("missing")).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn find_by_prefix_resolves_unique_ids() {
        let mut store = TaskStore::new(UuidIds);
        let task = store.append("demo", None);
        let prefix = &task.id.as_str()[..8];

        assert_eq!(store.find_by_prefix(prefix).unwrap().id, task.id);
    }

    #[test]
    fn find_by_prefix_prefers_exact_match() {
        let mut store = TaskStore::default();
        for index in 0..12 {
            store.append(&format!("task {index}"), None);
        }

        assert_eq!(store.find_by_prefix("task-1").unwrap().text, "task 0");
        let err = store.find_by_prefix("task").unwrap_err();
        assert_eq!(err.code(), "invalid_input");
        assert!(err.message().contains("ambiguous"));
    }

    #[test]
    fn find_by_prefix_rejects_blank_and_missing_ids() {
        let store = TaskStore::default();
        assert_eq!(store.find_by_prefix("  ").unwrap_err().message(), "id is required");
        assert_eq!(store.find_by_prefix("x").unwrap_err().message(), "task not found");
    }
}
