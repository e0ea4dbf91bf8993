use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, put},
};
use serde::Deserialize;
use serde_json::Value;
use taskboard_common::RowError;
use tokio::sync::broadcast;

use super::auth::Principal;
use super::db::DbHandle;
use super::models::NewTask;
use super::reconcile::Reconciler;
use super::ws::{self, WsMessage, broadcast_message};
use crate::errors::BoardError;

/// Header carrying the authenticated user id, set by the upstream gateway.
pub const PRINCIPAL_HEADER: &str = "x-user-id";

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub db: DbHandle,
    pub ws_tx: broadcast::Sender<WsMessage>,
    pub reconciler: Reconciler,
}

pub type SharedState = Arc<AppState>;

// ── Request payload types ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    PermissionDenied(String),
    Validation { message: String, rows: Vec<RowError> },
    Conflict(String),
    Internal(String),
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        let message = err.to_string();
        match err {
            BoardError::PermissionDenied { .. } => ApiError::PermissionDenied(message),
            BoardError::Validation { rows } => ApiError::Validation { message, rows },
            BoardError::ConcurrencyConflict { .. } => ApiError::Conflict(message),
            BoardError::ProjectNotFound { .. } => ApiError::NotFound(message),
            BoardError::MalformedRequest { .. } | BoardError::Reorder(_) => {
                ApiError::BadRequest(message)
            }
            BoardError::Transport { .. } | BoardError::Internal(_) => {
                tracing::error!(error = %message, "board request failed");
                ApiError::Internal(message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message, rows) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::PermissionDenied(msg) => {
                (StatusCode::FORBIDDEN, "permission_denied", msg, None)
            }
            ApiError::Validation { message, rows } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                message,
                Some(rows),
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "concurrency_conflict", msg, None),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg, None),
        };
        let mut error = serde_json::json!({"kind": kind, "message": message});
        if let Some(rows) = rows {
            error["rows"] = serde_json::json!(rows);
        }
        (status, Json(serde_json::json!({ "error": error }))).into_response()
    }
}

fn internal(e: anyhow::Error) -> ApiError {
    ApiError::from(BoardError::Internal(e))
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route("/api/projects/{id}/board", get(get_board))
        .route("/api/projects/{id}/tasks", axum::routing::post(create_task))
        .route("/api/projects/{id}/tasks/order", put(reorder_tasks))
        .route("/api/tasks/{id}", delete(delete_task))
        .route("/health", get(health_check))
        .route("/ws", get(ws::ws_handler))
}

// ── Helpers ───────────────────────────────────────────────────────────

/// The caller identity, if the gateway supplied a well-formed one.
fn principal_from(headers: &HeaderMap) -> Option<Principal> {
    headers
        .get(PRINCIPAL_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<i64>()
        .ok()
        .map(Principal::new)
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn list_projects(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let projects = state
        .db
        .call(move |db| db.list_projects())
        .await
        .map_err(internal)?;
    Ok(Json(projects))
}

async fn create_project(
    State(state): State<SharedState>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Project name must not be empty".into()));
    }
    let project = state
        .db
        .call(move |db| db.create_project(&name))
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_board(
    State(state): State<SharedState>,
    Path(project_id): Path<i64>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let can_move = match principal_from(&headers) {
        Some(principal) => state.reconciler.can_move(&principal, project_id).await?,
        None => false,
    };
    let board = state
        .db
        .call(move |db| db.get_board(project_id, can_move))
        .await
        .map_err(internal)?
        .ok_or(BoardError::ProjectNotFound { id: project_id })?;
    Ok(Json(board))
}

async fn create_task(
    State(state): State<SharedState>,
    Path(project_id): Path<i64>,
    Json(req): Json<NewTask>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Task title must not be empty".into()));
    }
    let task = state
        .db
        .call(move |db| {
            if db.get_project(project_id)?.is_none() {
                return Ok(None);
            }
            db.create_task(project_id, &req).map(Some)
        })
        .await
        .map_err(internal)?
        .ok_or(BoardError::ProjectNotFound { id: project_id })?;
    broadcast_message(&state.ws_tx, WsMessage::TaskCreated { task: task.clone() });
    Ok((StatusCode::CREATED, Json(task)))
}

async fn delete_task(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let project_id = state
        .db
        .call(move |db| {
            let Some(task) = db.get_task(id)? else {
                return Ok(None);
            };
            db.delete_task(id)?;
            Ok(Some(task.project_id))
        })
        .await
        .map_err(internal)?;
    match project_id {
        Some(project_id) => {
            broadcast_message(&state.ws_tx, WsMessage::TaskDeleted { project_id, task_id: id });
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::NotFound(format!("Task {} not found", id))),
    }
}

async fn reorder_tasks(
    State(state): State<SharedState>,
    Path(project_id): Path<i64>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    // Unparseable bodies fall through as null so the reconciler still
    // authorizes first and answers with the usual error envelope.
    let payload = serde_json::from_slice::<Value>(&body).unwrap_or_else(|e| {
        tracing::debug!(project_id, error = %e, "task order body is not JSON");
        Value::Null
    });
    let ack = state
        .reconciler
        .reconcile(principal_from(&headers), project_id, &payload)
        .await?;
    broadcast_message(
        &state.ws_tx,
        WsMessage::BoardReordered {
            project_id,
            updated: ack.updated,
        },
    );
    Ok(Json(ack))
}
