//! Optimistic reordering of the merged board list after a drop.
//!
//! The client applies [`reorder`] to its local list the moment a drag ends,
//! before the server has seen the move. Only the dragged task changes; every
//! other task keeps its position value and its place relative to the rest.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Task, TaskId, TaskOrder, TaskStatus};

/// Where a dragged card was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DropTarget {
    /// Onto another card: the dragged task goes right before it.
    Task(TaskId),
    /// Onto a column body: the dragged task goes to the top of that column.
    Column(TaskStatus),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("Dragged task {id} is not on the board")]
    UnknownTask { id: TaskId },

    #[error("Drop target task {id} is not on the board")]
    UnknownTarget { id: TaskId },
}

/// Compute the board list that results from dropping `active` on `target`.
///
/// `tasks` is the merged ordered list (all columns). Dropping a task onto
/// itself returns the list unchanged.
pub fn reorder(
    tasks: &[Task],
    active: TaskId,
    target: DropTarget,
) -> Result<Vec<Task>, ReorderError> {
    let from = tasks
        .iter()
        .position(|t| t.id == active)
        .ok_or(ReorderError::UnknownTask { id: active })?;

    if target == DropTarget::Task(active) {
        return Ok(tasks.to_vec());
    }

    let mut next = tasks.to_vec();
    let mut moved = next.remove(from);

    match target {
        DropTarget::Task(over) => {
            let at = next
                .iter()
                .position(|t| t.id == over)
                .ok_or(ReorderError::UnknownTarget { id: over })?;
            moved.status = next[at].status;
            moved.position = next[at].position.saturating_sub(1);
            next.insert(at, moved);
        }
        DropTarget::Column(status) => {
            moved.position = column_head_position(&next, status);
            moved.status = status;
            let at = next
                .iter()
                .position(|t| t.status == status)
                .unwrap_or(next.len());
            next.insert(at, moved);
        }
    }

    Ok(next)
}

/// Position that sorts before every task currently in `status`: one below
/// the column minimum, or `0` for an empty column.
pub fn column_head_position(tasks: &[Task], status: TaskStatus) -> i64 {
    tasks
        .iter()
        .filter(|t| t.status == status)
        .map(|t| t.position)
        .min()
        .map_or(0, |min| min.saturating_sub(1))
}

/// The `{id, status, position}` rows describing `tasks`, in list order.
pub fn order_rows(tasks: &[Task]) -> Vec<TaskOrder> {
    tasks.iter().map(Task::order_row).collect()
}
