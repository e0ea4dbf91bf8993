//! Single-pointer drag tracking.
//!
//! The tracker holds at most one [`DragSession`]. Idle is `None`, so there is
//! no way to be dragging without knowing which task is being dragged.

use taskboard_common::{DropTarget, TaskId, TaskStatus};
use thiserror::Error;

/// An in-progress drag gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub task_id: TaskId,
    /// Offset of the pointer from the card origin when the drag started.
    pub pointer_offset: (f64, f64),
}

/// Where a released card landed, resolved against the current board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropPoint {
    pub column: TaskStatus,
    pub over_task: Option<TaskId>,
}

impl DropPoint {
    pub fn target(&self) -> DropTarget {
        match self.over_task {
            Some(id) => DropTarget::Task(id),
            None => DropTarget::Column(self.column),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DragRefusal {
    #[error("You do not have permission to move tasks on this board")]
    PermissionDenied,
    #[error("Task {active} is already being dragged")]
    AlreadyDragging { active: TaskId },
    #[error("Wait for the previous move to finish")]
    SubmissionInFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Dropped {
        task_id: TaskId,
        column: TaskStatus,
        over_task: Option<TaskId>,
    },
    Cancelled,
}

#[derive(Debug, Default)]
pub struct DragTracker {
    session: Option<DragSession>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Start dragging `task_id`. The permission check happens here, before
    /// any gesture state exists.
    pub fn begin(
        &mut self,
        task_id: TaskId,
        pointer_offset: (f64, f64),
        can_move: bool,
        submitting: bool,
    ) -> Result<(), DragRefusal> {
        if !can_move {
            return Err(DragRefusal::PermissionDenied);
        }
        if let Some(active) = &self.session {
            return Err(DragRefusal::AlreadyDragging {
                active: active.task_id,
            });
        }
        if submitting {
            return Err(DragRefusal::SubmissionInFlight);
        }
        self.session = Some(DragSession {
            task_id,
            pointer_offset,
        });
        Ok(())
    }

    /// End the gesture. Without a drop point the drag counts as cancelled.
    pub fn release(&mut self, point: Option<DropPoint>) -> DragOutcome {
        match (self.session.take(), point) {
            (Some(session), Some(point)) => DragOutcome::Dropped {
                task_id: session.task_id,
                column: point.column,
                over_task: point.over_task,
            },
            _ => DragOutcome::Cancelled,
        }
    }

    pub fn cancel(&mut self) -> DragOutcome {
        self.session = None;
        DragOutcome::Cancelled
    }
}
