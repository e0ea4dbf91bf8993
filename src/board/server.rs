use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::api::{self, AppState};
use super::auth::RolePermissions;
use super::db::{BoardDb, DbHandle};
use super::reconcile::Reconciler;
use super::ws::WsMessage;

/// Configuration for the board server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub dev_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3142,
            db_path: PathBuf::from(".taskboard/board.db"),
            dev_mode: false,
        }
    }
}

/// Shared state wired to role-based move permissions.
pub fn app_state(db: DbHandle) -> Arc<AppState> {
    let (ws_tx, _rx) = broadcast::channel::<WsMessage>(256);
    let reconciler = Reconciler::new(db.clone(), Arc::new(RolePermissions::new(db.clone())));
    Arc::new(AppState {
        db,
        ws_tx,
        reconciler,
    })
}

/// Build the full application router with API and WebSocket routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    api::api_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the database named by `config` and build its shared state.
pub fn open_state(config: &ServerConfig) -> Result<Arc<AppState>> {
    if let Some(parent) = config.db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    let db = BoardDb::new(&config.db_path).context("Failed to initialize board database")?;
    Ok(app_state(DbHandle::new(db)))
}

/// Start the board server and run until Ctrl+C.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let state = open_state(&config)?;

    let mut app = build_router(state);
    if config.dev_mode {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, db = %config.db_path.display(), "board server listening");
    println!("Task board running at http://{}", local_addr);

    serve(listener, app, shutdown_signal()).await?;

    println!("Server shut down gracefully.");
    Ok(())
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")
}

/// Bind an ephemeral port on localhost and serve `state` in the background.
pub async fn spawn_local(state: Arc<AppState>) -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("Failed to bind ephemeral port")?;
    let addr = listener.local_addr()?;
    let app = build_router(state);
    tokio::spawn(async move {
        if let Err(e) = serve(listener, app, std::future::pending()).await {
            tracing::error!(error = %e, "background board server stopped");
        }
    });
    Ok(addr)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    println!("\nShutting down...");
}
