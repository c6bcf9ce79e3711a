//! Task records and the task store boundary.
//!
//! The scheduler only ever reads tasks; mutation happens through the
//! provided methods on [`TaskStore`], which rewrite the whole list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StoreError, ValidationError};

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub is_completed: bool,
}

impl Task {
    /// Create a pending task with a fresh id.
    ///
    /// The title is trimmed; a blank title is rejected.
    pub fn new(title: &str) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::Empty("Todo title"));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            created_at: Utc::now(),
            is_completed: false,
        })
    }
}

/// Incomplete tasks, in list order.
pub fn pending(tasks: &[Task]) -> impl Iterator<Item = &Task> {
    tasks.iter().filter(|t| !t.is_completed)
}

/// Ordered task list persisted as a single blob.
pub trait TaskStore: Send + Sync {
    fn list_tasks(&self) -> Result<Vec<Task>, StoreError>;

    /// Replace the whole list.
    fn save_tasks(&self, tasks: &[Task]) -> Result<(), StoreError>;

    /// Append a task and persist.
    fn add_task(&self, task: Task) -> Result<Task, StoreError> {
        let mut tasks = self.list_tasks()?;
        tasks.push(task.clone());
        self.save_tasks(&tasks)?;
        Ok(task)
    }

    /// Flip `is_completed` on the task with `id`.
    fn toggle_task(&self, id: &str) -> Result<Task, StoreError> {
        let mut tasks = self.list_tasks()?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))?;
        task.is_completed = !task.is_completed;
        let toggled = task.clone();
        self.save_tasks(&tasks)?;
        Ok(toggled)
    }

    fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        let mut tasks = self.list_tasks()?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(StoreError::TaskNotFound(id.to_string()));
        }
        self.save_tasks(&tasks)
    }
}
