//! To-do tasks

use chrono::{DateTime, Local};
use dokan_api::TaskItem;
use dokan_store::Storage;
use dokan_util::{RecordId, Result};
use tracing::debug;

use crate::collection::{required_text, Collection, Placement};
use crate::ChangeBus;

#[derive(Clone)]
pub struct TaskStore {
    records: Collection<TaskItem>,
}

impl TaskStore {
    pub fn new(storage: Storage, bus: ChangeBus) -> Self {
        Self {
            records: Collection::new(storage, bus),
        }
    }

    pub fn list(&self) -> Vec<TaskItem> {
        self.records.load()
    }

    pub fn add(&self, text: &str, now: DateTime<Local>) -> Result<TaskItem> {
        let text = required_text(text, "Task")?;
        let items = self.records.snapshot()?;
        let task = TaskItem {
            id: Collection::fresh_id(&items, now),
            text,
            completed: false,
        };
        Ok(self.records.insert(items, task, Placement::Back))
    }

    /// Flip completion and return the new state
    pub fn toggle(&self, id: &RecordId) -> Result<bool> {
        let task = self.records.modify(id, |task| {
            task.completed = !task.completed;
            Ok(())
        })?;
        debug!(id = %id, completed = task.completed, "Task toggled");
        Ok(task.completed)
    }

    /// Mark done; called when a hold gesture completes
    pub fn complete(&self, id: &RecordId) -> Result<TaskItem> {
        self.records.modify(id, |task| {
            task.completed = true;
            Ok(())
        })
    }

    pub fn delete(&self, id: &RecordId) -> bool {
        self.records.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixed_now;
    use dokan_store::MemoryKvStore;
    use dokan_util::DokanError;
    use std::sync::Arc;

    fn store() -> TaskStore {
        TaskStore::new(Storage::new(Arc::new(MemoryKvStore::new())), ChangeBus::new())
    }

    #[test]
    fn add_toggle_complete() {
        let tasks = store();
        let now = fixed_now();
        let a = tasks.add("Call supplier", now).unwrap();
        let b = tasks.add("Restock rice", now).unwrap();
        assert_ne!(a.id, b.id);

        assert!(tasks.toggle(&a.id).unwrap());
        assert!(!tasks.toggle(&a.id).unwrap());
        assert!(tasks.complete(&b.id).unwrap().completed);
        assert!(tasks.complete(&b.id).unwrap().completed);

        let list = tasks.list();
        assert_eq!(list[0].text, "Call supplier");
        assert!(!list[0].completed);
        assert!(list[1].completed);
    }

    #[test]
    fn empty_text_rejected() {
        assert!(matches!(
            store().add(" ", fixed_now()),
            Err(DokanError::ValidationError(_))
        ));
    }

    #[test]
    fn unknown_ids() {
        let tasks = store();
        let id = RecordId::new("42");
        assert!(matches!(tasks.toggle(&id), Err(DokanError::RecordNotFound(_))));
        assert!(!tasks.delete(&id));
    }
}
