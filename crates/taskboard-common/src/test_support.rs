//! Task builders for tests in this crate and its dependents.

use crate::models::{Priority, Task, TaskId, TaskStatus};

/// A task in project 1 with only the board fields set.
pub fn task(id: TaskId, status: TaskStatus, position: i64) -> Task {
    Task {
        id,
        project_id: 1,
        title: format!("Task {}", id),
        description: String::new(),
        status,
        position,
        priority: Priority::Medium,
        assigned_user: None,
        due_date: None,
    }
}
