//! Live board notifications.
//!
//! Every mutation is published on a broadcast channel as a [`WsMessage`].
//! A viewer connects to `/ws`, optionally with `?project=<id>`, and receives
//! the messages for that project as JSON text frames. Messages only tell the
//! viewer to re-fetch; they are never merged into local state.

use std::time::Duration;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use taskboard_common::{ProjectId, Task, TaskId};
use tokio::sync::broadcast;
use tokio::time::Instant;

use super::api::SharedState;

const PING_EVERY: Duration = Duration::from_secs(30);
const PONG_DEADLINE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WsMessage {
    BoardReordered { project_id: ProjectId, updated: usize },
    TaskCreated { task: Task },
    TaskDeleted { project_id: ProjectId, task_id: TaskId },
}

impl WsMessage {
    pub fn project_id(&self) -> ProjectId {
        match self {
            Self::BoardReordered { project_id, .. } | Self::TaskDeleted { project_id, .. } => {
                *project_id
            }
            Self::TaskCreated { task } => task.project_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewerQuery {
    pub project: Option<ProjectId>,
}

/// Which notifications one connection receives.
#[derive(Debug, Clone, Copy, Default)]
struct ViewerFilter {
    project: Option<ProjectId>,
}

impl ViewerFilter {
    fn wants(&self, msg: &WsMessage) -> bool {
        self.project.is_none_or(|id| id == msg.project_id())
    }
}

/// Tracks whether the peer still answers pings.
struct Keepalive {
    last_pong: Instant,
    awaiting: bool,
}

impl Keepalive {
    fn new() -> Self {
        Self {
            last_pong: Instant::now(),
            awaiting: false,
        }
    }

    fn is_dead(&self) -> bool {
        self.awaiting && self.last_pong.elapsed() > PONG_DEADLINE
    }

    fn pinged(&mut self) {
        self.awaiting = true;
    }

    fn ponged(&mut self) {
        self.last_pong = Instant::now();
        self.awaiting = false;
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
    Query(query): Query<ViewerQuery>,
) -> impl IntoResponse {
    let rx = state.ws_tx.subscribe();
    let filter = ViewerFilter {
        project: query.project,
    };
    ws.on_upgrade(move |socket| serve_viewer(socket, rx, filter))
}

async fn serve_viewer(
    socket: WebSocket,
    mut rx: broadcast::Receiver<WsMessage>,
    filter: ViewerFilter,
) {
    let (mut outgoing, mut incoming) = socket.split();
    let mut ticker = tokio::time::interval_at(Instant::now() + PING_EVERY, PING_EVERY);
    let mut keepalive = Keepalive::new();
    tracing::debug!(project = ?filter.project, "board viewer connected");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if keepalive.is_dead() {
                    tracing::debug!("board viewer stopped answering pings");
                    break;
                }
                if outgoing.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
                keepalive.pinged();
            }
            published = rx.recv() => match published {
                Ok(msg) if filter.wants(&msg) => {
                    let Some(text) = encode(&msg) else { continue };
                    if outgoing.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "board viewer lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            frame = incoming.next() => match frame {
                Some(Ok(Message::Pong(_))) => keepalive.ponged(),
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }

    let _ = outgoing.send(Message::Close(None)).await;
    tracing::debug!(project = ?filter.project, "board viewer disconnected");
}

fn encode(msg: &WsMessage) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode board notification");
            None
        }
    }
}

/// Publish `msg` to every connected viewer. Having no viewers is fine.
pub fn broadcast_message(tx: &broadcast::Sender<WsMessage>, msg: WsMessage) {
    let project_id = msg.project_id();
    let receivers = tx.send(msg).unwrap_or(0);
    tracing::trace!(project_id, receivers, "board notification published");
}
