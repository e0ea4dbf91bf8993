use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use taskboard_common::{BoardView, OrderRequest, ProjectId, ReorderAck, RowError, TaskOrder};

use crate::board::api::PRINCIPAL_HEADER;
use crate::errors::BoardError;

/// How the board controller talks to the server.
#[async_trait]
pub trait BoardTransport: Send + Sync {
    async fn fetch_board(&self, project_id: ProjectId) -> Result<BoardView, BoardError>;

    async fn submit_order(
        &self,
        project_id: ProjectId,
        rows: &[TaskOrder],
    ) -> Result<ReorderAck, BoardError>;
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    rows: Vec<RowError>,
}

/// JSON-over-HTTP transport against a running board server.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    user_id: Option<i64>,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        user_id: Option<i64>,
        timeout: Duration,
    ) -> Result<Self, BoardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BoardError::transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match self.user_id {
            Some(id) => builder.header(PRINCIPAL_HEADER, id.to_string()),
            None => builder,
        }
    }
}

fn request_failed(e: reqwest::Error) -> BoardError {
    if e.is_timeout() {
        BoardError::transport("request timed out")
    } else if e.is_decode() {
        BoardError::transport(format!("unreadable response: {}", e))
    } else {
        BoardError::transport(e.to_string())
    }
}

/// Translate a non-success response into the move taxonomy.
async fn failure(resp: reqwest::Response, project_id: ProjectId) -> BoardError {
    let status = resp.status();
    let body = resp.json::<ErrorEnvelope>().await.ok().map(|e| e.error);
    let message = body
        .as_ref()
        .map(|b| b.message.clone())
        .unwrap_or_else(|| status.to_string());
    tracing::debug!(%status, %message, "board request rejected");
    match status {
        StatusCode::FORBIDDEN => BoardError::permission_denied(message),
        StatusCode::UNPROCESSABLE_ENTITY => BoardError::Validation {
            rows: body.map(|b| b.rows).unwrap_or_default(),
        },
        StatusCode::CONFLICT => BoardError::conflict(message),
        StatusCode::NOT_FOUND => BoardError::ProjectNotFound { id: project_id },
        StatusCode::BAD_REQUEST => BoardError::MalformedRequest { message },
        _ => BoardError::transport(format!("server returned {}: {}", status, message)),
    }
}

#[async_trait]
impl BoardTransport for HttpTransport {
    async fn fetch_board(&self, project_id: ProjectId) -> Result<BoardView, BoardError> {
        let resp = self
            .request(
                reqwest::Method::GET,
                &format!("/api/projects/{}/board", project_id),
            )
            .send()
            .await
            .map_err(request_failed)?;
        if !resp.status().is_success() {
            return Err(failure(resp, project_id).await);
        }
        resp.json().await.map_err(request_failed)
    }

    async fn submit_order(
        &self,
        project_id: ProjectId,
        rows: &[TaskOrder],
    ) -> Result<ReorderAck, BoardError> {
        let body = OrderRequest {
            tasks: rows.to_vec(),
        };
        let resp = self
            .request(
                reqwest::Method::PUT,
                &format!("/api/projects/{}/tasks/order", project_id),
            )
            .json(&body)
            .send()
            .await
            .map_err(request_failed)?;
        if !resp.status().is_success() {
            return Err(failure(resp, project_id).await);
        }
        resp.json().await.map_err(request_failed)
    }
}
