//! Client-side board controller.
//!
//! Moves are applied to the local task list immediately, then sent to the
//! server as one bulk order. A failed or timed-out submission restores the
//! pre-move snapshot; a successful one is followed by a full re-fetch.

use std::time::Duration;

use taskboard_common::{
    Column, DropTarget, Project, ProjectId, Task, TaskId, TaskStatus, flatten_columns,
    group_by_column, order_rows, reorder,
};

use super::drag::{DragOutcome, DragRefusal, DragTracker, DropPoint};
use super::transport::BoardTransport;
use crate::errors::BoardError;

/// Upper bound on a single order submission.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Released over nothing, or the drag was aborted.
    Cancelled,
    /// Dropped onto itself.
    Unchanged,
    /// The server accepted the order. `refreshed` is false when the
    /// follow-up fetch failed and the optimistic board is still shown.
    Committed { refreshed: bool },
}

pub struct BoardController<T: BoardTransport> {
    transport: T,
    project_id: ProjectId,
    project: Option<Project>,
    tasks: Vec<Task>,
    can_move: bool,
    drag: DragTracker,
    submission: SubmissionState,
    last_error: Option<String>,
    submit_timeout: Duration,
}

impl<T: BoardTransport> BoardController<T> {
    pub fn new(transport: T, project_id: ProjectId) -> Self {
        Self {
            transport,
            project_id,
            project: None,
            tasks: Vec::new(),
            can_move: false,
            drag: DragTracker::new(),
            submission: SubmissionState::Idle,
            last_error: None,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }

    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// The merged ordered task list currently shown.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn can_move(&self) -> bool {
        self.can_move
    }

    pub fn submission(&self) -> SubmissionState {
        self.submission
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn dragging(&self) -> Option<TaskId> {
        self.drag.active().map(|s| s.task_id)
    }

    /// Initial fetch of the board.
    pub async fn load(&mut self) -> Result<(), BoardError> {
        self.refresh().await?;
        tracing::debug!(
            project_id = self.project_id,
            tasks = self.tasks.len(),
            can_move = self.can_move,
            "board loaded"
        );
        Ok(())
    }

    /// Replace local state with the server's board.
    pub async fn refresh(&mut self) -> Result<(), BoardError> {
        let board = self.transport.fetch_board(self.project_id).await?;
        self.tasks = flatten_columns(&board.columns);
        self.can_move = board.can_move;
        self.project = Some(board.project);
        Ok(())
    }

    pub fn columns(&self) -> Vec<Column> {
        group_by_column(&self.tasks, &TaskStatus::ALL)
    }

    pub fn begin_drag(&mut self, task_id: TaskId, pointer_offset: (f64, f64)) -> Result<(), DragRefusal> {
        let submitting = self.submission == SubmissionState::Submitting;
        let result = self
            .drag
            .begin(task_id, pointer_offset, self.can_move, submitting);
        if let Err(refusal) = &result {
            tracing::debug!(task_id, %refusal, "drag refused");
            self.last_error = Some(refusal.to_string());
        }
        result
    }

    pub fn cancel_drag(&mut self) -> MoveOutcome {
        self.drag.cancel();
        MoveOutcome::Cancelled
    }

    /// Release the active drag over `target` (or over nothing).
    ///
    /// On failure the board is back at its pre-move state and the error is
    /// returned; it is never retried.
    pub async fn drop_on(&mut self, target: Option<DropTarget>) -> Result<MoveOutcome, BoardError> {
        let point = target.and_then(|t| self.resolve(t));
        let (task_id, point) = match self.drag.release(point) {
            DragOutcome::Cancelled => return Ok(MoveOutcome::Cancelled),
            DragOutcome::Dropped {
                task_id,
                column,
                over_task,
            } => (task_id, DropPoint { column, over_task }),
        };
        if point.over_task == Some(task_id) {
            return Ok(MoveOutcome::Unchanged);
        }

        let next = reorder(&self.tasks, task_id, point.target())?;
        let snapshot = std::mem::replace(&mut self.tasks, next);
        self.last_error = None;

        match self.submit().await {
            Ok(()) => {
                let refreshed = match self.refresh().await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(error = %e, "re-fetch after move failed; showing local order");
                        false
                    }
                };
                Ok(MoveOutcome::Committed { refreshed })
            }
            Err(e) => {
                tracing::warn!(task_id, kind = e.kind(), error = %e, "move rejected; rolling back");
                self.tasks = snapshot;
                self.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    async fn submit(&mut self) -> Result<(), BoardError> {
        let rows = order_rows(&self.tasks);
        self.submission = SubmissionState::Submitting;
        let result = tokio::time::timeout(
            self.submit_timeout,
            self.transport.submit_order(self.project_id, &rows),
        )
        .await;
        self.submission = SubmissionState::Idle;
        match result {
            Ok(Ok(ack)) => {
                tracing::info!(project_id = self.project_id, updated = ack.updated, "move committed");
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(BoardError::transport(format!(
                "no response within {} ms",
                self.submit_timeout.as_millis()
            ))),
        }
    }

    fn resolve(&self, target: DropTarget) -> Option<DropPoint> {
        match target {
            DropTarget::Task(id) => self.tasks.iter().find(|t| t.id == id).map(|t| DropPoint {
                column: t.status,
                over_task: Some(id),
            }),
            DropTarget::Column(status) => Some(DropPoint {
                column: status,
                over_task: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use taskboard_common::test_support::task;
    use taskboard_common::{BoardView, ReorderAck, RowError, TaskOrder};

    #[derive(Clone, Copy)]
    enum Reply {
        Accept,
        Reject(fn() -> BoardError),
        Hang,
    }

    /// In-memory server double. Accepted orders are applied to its board.
    #[derive(Clone)]
    struct MockTransport {
        inner: Arc<Mutex<MockState>>,
    }

    struct MockState {
        tasks: Vec<Task>,
        can_move: bool,
        reply: Reply,
        fail_fetch: bool,
        submitted: Vec<Vec<TaskOrder>>,
    }

    impl MockTransport {
        fn new(tasks: Vec<Task>) -> Self {
            Self {
                inner: Arc::new(Mutex::new(MockState {
                    tasks,
                    can_move: true,
                    reply: Reply::Accept,
                    fail_fetch: false,
                    submitted: Vec::new(),
                })),
            }
        }

        fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
            self.inner.lock().unwrap()
        }
    }

    #[async_trait]
    impl BoardTransport for MockTransport {
        async fn fetch_board(&self, project_id: ProjectId) -> Result<BoardView, BoardError> {
            let state = self.state();
            if state.fail_fetch {
                return Err(BoardError::transport("fetch failed"));
            }
            Ok(BoardView {
                project: Project {
                    id: project_id,
                    name: "p".into(),
                    created_at: "2026-01-01T00:00:00Z".into(),
                },
                columns: group_by_column(&state.tasks, &TaskStatus::ALL),
                can_move: state.can_move,
            })
        }

        async fn submit_order(
            &self,
            _project_id: ProjectId,
            rows: &[TaskOrder],
        ) -> Result<ReorderAck, BoardError> {
            let reply = {
                let mut state = self.state();
                state.submitted.push(rows.to_vec());
                state.reply
            };
            match reply {
                Reply::Accept => {
                    let mut state = self.state();
                    for row in rows {
                        if let Some(t) = state.tasks.iter_mut().find(|t| t.id == row.id) {
                            t.status = row.status;
                            t.position = row.position;
                        }
                    }
                    Ok(ReorderAck {
                        updated: rows.len(),
                        refetch: true,
                    })
                }
                Reply::Reject(make) => Err(make()),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(BoardError::transport("unreachable"))
                }
            }
        }
    }

    fn seed() -> Vec<Task> {
        vec![
            task(1, TaskStatus::Todo, 0),
            task(2, TaskStatus::Todo, 1),
            task(3, TaskStatus::InProgress, 5),
            task(4, TaskStatus::InProgress, 2),
            task(5, TaskStatus::InProgress, 8),
        ]
    }

    async fn loaded(mock: &MockTransport) -> BoardController<MockTransport> {
        let mut controller = BoardController::new(mock.clone(), 1);
        controller.load().await.unwrap();
        controller
    }

    fn column_ids(controller: &BoardController<MockTransport>, status: TaskStatus) -> Vec<TaskId> {
        controller
            .columns()
            .into_iter()
            .find(|c| c.status == status)
            .map(|c| c.tasks.iter().map(|t| t.id).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn load_groups_tasks_by_position() {
        let mock = MockTransport::new(seed());
        let controller = loaded(&mock).await;
        assert!(controller.can_move());
        assert_eq!(column_ids(&controller, TaskStatus::InProgress), vec![4, 3, 5]);
        assert_eq!(controller.project().map(|p| p.id), Some(1));
    }

    #[tokio::test]
    async fn column_drop_goes_to_head_and_commits() {
        let mock = MockTransport::new(seed());
        let mut controller = loaded(&mock).await;

        controller.begin_drag(1, (0.0, 0.0)).unwrap();
        let outcome = controller
            .drop_on(Some(DropTarget::Column(TaskStatus::InProgress)))
            .await
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Committed { refreshed: true });

        let moved = controller.tasks().iter().find(|t| t.id == 1).unwrap();
        assert_eq!(moved.status, TaskStatus::InProgress);
        assert_eq!(moved.position, 1);
        assert_eq!(column_ids(&controller, TaskStatus::InProgress), vec![1, 4, 3, 5]);
        assert_eq!(controller.submission(), SubmissionState::Idle);

        let state = mock.state();
        assert_eq!(state.submitted.len(), 1);
        assert_eq!(state.submitted[0].len(), 5);
    }

    #[tokio::test]
    async fn task_drop_lands_before_target() {
        let mock = MockTransport::new(seed());
        let mut controller = loaded(&mock).await;

        controller.begin_drag(5, (0.0, 0.0)).unwrap();
        controller.drop_on(Some(DropTarget::Task(2))).await.unwrap();
        assert_eq!(column_ids(&controller, TaskStatus::Todo), vec![1, 5, 2]);
        assert_eq!(column_ids(&controller, TaskStatus::InProgress), vec![4, 3]);
    }

    #[tokio::test]
    async fn self_drop_is_unchanged_and_not_submitted() {
        let mock = MockTransport::new(seed());
        let mut controller = loaded(&mock).await;
        let before = controller.tasks().to_vec();

        controller.begin_drag(3, (0.0, 0.0)).unwrap();
        let outcome = controller.drop_on(Some(DropTarget::Task(3))).await.unwrap();
        assert_eq!(outcome, MoveOutcome::Unchanged);
        assert_eq!(controller.tasks(), &before[..]);
        assert!(mock.state().submitted.is_empty());
    }

    #[tokio::test]
    async fn drop_over_nothing_cancels() {
        let mock = MockTransport::new(seed());
        let mut controller = loaded(&mock).await;
        controller.begin_drag(1, (0.0, 0.0)).unwrap();
        assert_eq!(controller.drop_on(None).await.unwrap(), MoveOutcome::Cancelled);
        assert_eq!(controller.dragging(), None);
        assert!(mock.state().submitted.is_empty());
    }

    #[tokio::test]
    async fn escape_cancels_without_mutation() {
        let mock = MockTransport::new(seed());
        let mut controller = loaded(&mock).await;
        let before = controller.tasks().to_vec();
        controller.begin_drag(2, (4.0, 4.0)).unwrap();
        assert_eq!(controller.cancel_drag(), MoveOutcome::Cancelled);
        assert_eq!(controller.tasks(), &before[..]);
    }

    #[tokio::test]
    async fn drag_refused_without_permission() {
        let mock = MockTransport::new(seed());
        mock.state().can_move = false;
        let mut controller = loaded(&mock).await;

        let refusal = controller.begin_drag(1, (0.0, 0.0)).unwrap_err();
        assert_eq!(refusal, DragRefusal::PermissionDenied);
        assert!(controller.last_error().is_some());
        assert_eq!(controller.dragging(), None);
    }

    #[tokio::test]
    async fn conflict_rolls_back() {
        let mock = MockTransport::new(seed());
        mock.state().reply = Reply::Reject(|| BoardError::conflict("task 4 was deleted"));
        let mut controller = loaded(&mock).await;
        let before = controller.tasks().to_vec();

        controller.begin_drag(1, (0.0, 0.0)).unwrap();
        let err = controller
            .drop_on(Some(DropTarget::Task(4)))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::ConcurrencyConflict { .. }));
        assert_eq!(controller.tasks(), &before[..]);
        assert_eq!(controller.submission(), SubmissionState::Idle);
        assert!(controller.last_error().unwrap().contains("reverted"));
    }

    #[tokio::test]
    async fn validation_failure_rolls_back() {
        let mock = MockTransport::new(seed());
        mock.state().reply = Reply::Reject(|| BoardError::Validation {
            rows: vec![RowError::new(0, "id", "task 1 not found")],
        });
        let mut controller = loaded(&mock).await;
        let before = controller.tasks().to_vec();

        controller.begin_drag(1, (0.0, 0.0)).unwrap();
        assert!(controller
            .drop_on(Some(DropTarget::Column(TaskStatus::Done)))
            .await
            .is_err());
        assert_eq!(controller.tasks(), &before[..]);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_rolls_back_as_transport_error() {
        let mock = MockTransport::new(seed());
        mock.state().reply = Reply::Hang;
        let mut controller = loaded(&mock).await;
        let before = controller.tasks().to_vec();

        controller.begin_drag(2, (0.0, 0.0)).unwrap();
        let err = controller
            .drop_on(Some(DropTarget::Column(TaskStatus::Done)))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Transport { .. }));
        assert_eq!(controller.tasks(), &before[..]);
        assert!(controller.last_error().unwrap().contains("try the move again"));
        assert_eq!(controller.submission(), SubmissionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_timeout_is_honored() {
        let mock = MockTransport::new(seed());
        mock.state().reply = Reply::Hang;
        let mut controller = loaded(&mock)
            .await
            .with_submit_timeout(Duration::from_millis(250));

        controller.begin_drag(2, (0.0, 0.0)).unwrap();
        let started = tokio::time::Instant::now();
        let err = controller
            .drop_on(Some(DropTarget::Column(TaskStatus::Done)))
            .await
            .unwrap_err();
        assert!(started.elapsed() < DEFAULT_SUBMIT_TIMEOUT);
        match err {
            BoardError::Transport { message } => assert!(message.contains("250 ms")),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_refetch_keeps_optimistic_board() {
        let mock = MockTransport::new(seed());
        let mut controller = loaded(&mock).await;
        mock.state().fail_fetch = true;

        controller.begin_drag(1, (0.0, 0.0)).unwrap();
        let outcome = controller
            .drop_on(Some(DropTarget::Column(TaskStatus::Done)))
            .await
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Committed { refreshed: false });
        assert_eq!(column_ids(&controller, TaskStatus::Done), vec![1]);
    }

    #[tokio::test]
    async fn refetch_replaces_optimistic_state() {
        let mock = MockTransport::new(seed());
        let mut controller = loaded(&mock).await;
        // Another viewer adds a task the controller has not seen yet.
        mock.state().tasks.push(task(6, TaskStatus::Done, -5));

        controller.begin_drag(1, (0.0, 0.0)).unwrap();
        controller
            .drop_on(Some(DropTarget::Column(TaskStatus::Done)))
            .await
            .unwrap();
        assert_eq!(column_ids(&controller, TaskStatus::Done), vec![6, 1]);
    }

    #[tokio::test]
    async fn unknown_target_task_cancels() {
        let mock = MockTransport::new(seed());
        let mut controller = loaded(&mock).await;
        controller.begin_drag(1, (0.0, 0.0)).unwrap();
        let outcome = controller.drop_on(Some(DropTarget::Task(42))).await.unwrap();
        assert_eq!(outcome, MoveOutcome::Cancelled);
    }

    #[tokio::test]
    async fn unknown_dragged_task_is_reorder_error() {
        let mock = MockTransport::new(seed());
        let mut controller = loaded(&mock).await;
        controller.begin_drag(99, (0.0, 0.0)).unwrap();
        let err = controller
            .drop_on(Some(DropTarget::Column(TaskStatus::Todo)))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Reorder(_)));
        assert!(mock.state().submitted.is_empty());
    }
}
