//! Partitioning of a flat task list into status columns.

use crate::models::{Column, Task, TaskStatus};

/// Bucket `tasks` into `columns`, in the given column order.
///
/// Each bucket holds the tasks whose status equals that column, sorted
/// ascending by position. Equal positions keep their order in `tasks`.
/// Tasks whose status is not listed in `columns` land in no bucket. A
/// status repeated in `columns` gets only its first bucket.
pub fn group_by_column(tasks: &[Task], columns: &[TaskStatus]) -> Vec<Column> {
    let mut seen = Vec::with_capacity(columns.len());
    columns
        .iter()
        .filter(|status| {
            if seen.contains(*status) {
                return false;
            }
            seen.push(**status);
            true
        })
        .map(|status| {
            let mut bucket: Vec<Task> = tasks
                .iter()
                .filter(|t| t.status == *status)
                .cloned()
                .collect();
            // sort_by_key is stable
            bucket.sort_by_key(|t| t.position);
            Column {
                status: *status,
                tasks: bucket,
            }
        })
        .collect()
}

/// Merge grouped columns back into one ordered list: column order first,
/// then in-column order.
pub fn flatten_columns(columns: &[Column]) -> Vec<Task> {
    columns
        .iter()
        .flat_map(|c| c.tasks.iter().cloned())
        .collect()
}
