//! Typed error hierarchy for board moves.
//!
//! `BoardError` is shared by the reconciliation endpoint and the client
//! controller. The first four variants are the move taxonomy; every one of
//! them ends the current move attempt and none is retried automatically.

use taskboard_common::{ReorderError, RowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("Invalid task order: {}", summarize_rows(.rows))]
    Validation { rows: Vec<RowError> },

    #[error("Concurrent change: {message}")]
    ConcurrencyConflict { message: String },

    #[error("Board server unreachable: {message}")]
    Transport { message: String },

    #[error("Project {id} not found")]
    ProjectNotFound { id: i64 },

    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    #[error(transparent)]
    Reorder(#[from] ReorderError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BoardError {
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::ConcurrencyConflict {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Stable machine-readable kind, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PermissionDenied { .. } => "permission_denied",
            Self::Validation { .. } => "validation_error",
            Self::ConcurrencyConflict { .. } => "concurrency_conflict",
            Self::Transport { .. } => "transport_error",
            Self::ProjectNotFound { .. } => "not_found",
            Self::MalformedRequest { .. } | Self::Reorder(_) => "bad_request",
            Self::Internal(_) => "internal",
        }
    }

    /// Message shown to the user after the board has been rolled back.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied { .. } => {
                "You do not have permission to move tasks on this board.".to_string()
            }
            Self::Validation { .. } => {
                "The board rejected this move. Your changes were reverted.".to_string()
            }
            Self::ConcurrencyConflict { .. } => {
                "The board changed while you were moving this task. Your changes were reverted."
                    .to_string()
            }
            Self::Transport { .. } => {
                "Could not reach the board server. Your changes were reverted; check your connection and try the move again."
                    .to_string()
            }
            other => format!("Move failed: {}", other),
        }
    }
}

fn summarize_rows(rows: &[RowError]) -> String {
    match rows {
        [] => "no rows reported".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}
