//! Bulk task-order reconciliation.
//!
//! A client submits its full post-move view of the board as
//! `{"tasks": [{id, status, position}, ...]}`. The batch is accepted or
//! rejected as a whole:
//!
//! 1. the principal must hold move capability for the project,
//! 2. every row must be well formed and name a distinct existing task,
//! 3. all rows are written in one transaction.
//!
//! Validation and the write run as separate store calls with no lock held
//! in between. A task deleted in that window makes the write roll back and
//! the request fail with `ConcurrencyConflict`. Two reorders of the same
//! tasks may race; the last commit wins, and clients re-fetch after success.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use taskboard_common::{ReorderAck, RowError, TaskOrder, TaskStatus};

use super::auth::{MovePermission, Principal};
use super::db::DbHandle;
use super::models::OrderCommit;
use crate::errors::BoardError;

pub struct Reconciler {
    db: DbHandle,
    permissions: Arc<dyn MovePermission>,
}

impl Reconciler {
    pub fn new(db: DbHandle, permissions: Arc<dyn MovePermission>) -> Self {
        Self { db, permissions }
    }

    /// Whether `principal` may move tasks on `project_id`.
    pub async fn can_move(&self, principal: &Principal, project_id: i64) -> Result<bool, BoardError> {
        Ok(self.permissions.can_move_tasks(principal, project_id).await?)
    }

    /// Run the full accept-or-reject pipeline for one submission.
    pub async fn reconcile(
        &self,
        principal: Option<Principal>,
        project_id: i64,
        payload: &Value,
    ) -> Result<ReorderAck, BoardError> {
        let principal = self.authorize(principal, project_id).await?;
        let rows = self.validate(project_id, payload).await?;
        let ack = self.persist(project_id, rows).await?;
        tracing::info!(
            project_id,
            user_id = principal.user_id,
            updated = ack.updated,
            "task order committed"
        );
        Ok(ack)
    }

    /// Reject callers without move capability. Runs before any task row is
    /// read.
    pub async fn authorize(
        &self,
        principal: Option<Principal>,
        project_id: i64,
    ) -> Result<Principal, BoardError> {
        let Some(principal) = principal else {
            tracing::warn!(project_id, "task order rejected: no principal");
            return Err(BoardError::permission_denied("request carries no user identity"));
        };
        if !self.can_move(&principal, project_id).await? {
            tracing::warn!(
                project_id,
                user_id = principal.user_id,
                "task order rejected: missing move permission"
            );
            return Err(BoardError::permission_denied(format!(
                "user {} may not move tasks in project {}",
                principal.user_id, project_id
            )));
        }
        Ok(principal)
    }

    /// Check the shape of every row, then that every id names a task of the
    /// project. Any failing row rejects the batch.
    pub async fn validate(&self, project_id: i64, payload: &Value) -> Result<Vec<TaskOrder>, BoardError> {
        let raw_rows = payload
            .get("tasks")
            .and_then(Value::as_array)
            .ok_or_else(|| BoardError::MalformedRequest {
                message: "body must be an object with a `tasks` array".to_string(),
            })?;

        let rows = parse_order_rows(raw_rows).map_err(|rows| {
            tracing::warn!(project_id, rejected = rows.len(), "task order rejected: malformed rows");
            BoardError::Validation { rows }
        })?;

        let (project_exists, known_ids) = self
            .db
            .call(move |db| {
                let exists = db.get_project(project_id)?.is_some();
                let ids = if exists { db.task_ids(project_id)? } else { HashSet::new() };
                Ok((exists, ids))
            })
            .await?;
        if !project_exists {
            return Err(BoardError::ProjectNotFound { id: project_id });
        }

        let missing: Vec<RowError> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !known_ids.contains(&row.id))
            .map(|(index, row)| {
                RowError::new(
                    index,
                    "id",
                    format!("task {} does not exist in project {}", row.id, project_id),
                )
            })
            .collect();
        if !missing.is_empty() {
            tracing::warn!(project_id, rejected = missing.len(), "task order rejected: unknown tasks");
            return Err(BoardError::Validation { rows: missing });
        }

        Ok(rows)
    }

    /// Write a validated batch atomically.
    pub async fn persist(&self, project_id: i64, rows: Vec<TaskOrder>) -> Result<ReorderAck, BoardError> {
        let outcome = self
            .db
            .call(move |db| db.apply_task_order(project_id, &rows))
            .await?;
        match outcome {
            OrderCommit::Applied { updated } => Ok(ReorderAck {
                updated,
                refetch: true,
            }),
            OrderCommit::Missing { id } => {
                tracing::warn!(project_id, task_id = id, "task order rolled back: task vanished");
                Err(BoardError::conflict(format!(
                    "task {} was removed before the new order could be saved",
                    id
                )))
            }
        }
    }
}

/// Parse raw JSON rows into typed orders, collecting every failure.
///
/// `id` and `position` must be JSON integers that fit in `i64`; `status`
/// must name a board column. An id may appear only once.
pub fn parse_order_rows(raw_rows: &[Value]) -> Result<Vec<TaskOrder>, Vec<RowError>> {
    let mut rows = Vec::with_capacity(raw_rows.len());
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, raw) in raw_rows.iter().enumerate() {
        let Some(obj) = raw.as_object() else {
            errors.push(RowError::new(
                index,
                "row",
                "expected an object with id, status and position",
            ));
            continue;
        };

        let id = obj.get("id").and_then(Value::as_i64);
        if id.is_none() {
            errors.push(RowError::new(index, "id", "must be an integer"));
        }

        let status = match obj.get("status") {
            Some(Value::String(s)) => match s.parse::<TaskStatus>() {
                Ok(status) => Some(status),
                Err(_) => {
                    errors.push(RowError::new(index, "status", format!("unknown status '{}'", s)));
                    None
                }
            },
            _ => {
                errors.push(RowError::new(
                    index,
                    "status",
                    "must be one of todo, in_progress, done",
                ));
                None
            }
        };

        let position = obj.get("position").and_then(Value::as_i64);
        if position.is_none() {
            errors.push(RowError::new(index, "position", "must be an integer"));
        }

        if let (Some(id), Some(status), Some(position)) = (id, status, position) {
            if !seen.insert(id) {
                errors.push(RowError::new(
                    index,
                    "id",
                    format!("task {} appears more than once", id),
                ));
                continue;
            }
            rows.push(TaskOrder { id, status, position });
        }
    }

    if errors.is_empty() { Ok(rows) } else { Err(errors) }
}
