//! Task board back-end.
//!
//! ## Overview
//!
//! Tasks live in a SQLite database and are grouped into status columns.
//! Clients reorder a board by sending the complete post-move order of the
//! tasks they touched; the server authorizes the caller, validates every
//! row, and commits the batch in one transaction or not at all.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────┐
//! │  Client  │ ───────> │  server.rs  (axum Router, ServerConfig)      │
//! │          │ <─────── │    └─ api.rs  (route handlers, AppState)     │
//! └──────────┘ WebSocket│         │                                    │
//!                       │         │ Reconciler::reconcile()            │
//!                       │         v                                    │
//!                       │  reconcile.rs  authorize → validate → persist│
//!                       │         │                │                   │
//!                       │         v                v                   │
//!                       │  auth.rs (MovePermission)  db.rs (BoardDb)   │
//!                       └──────────────────────────────────────────────┘
//! ```
//!
//! | Module      | Responsibility                                        |
//! |-------------|-------------------------------------------------------|
//! | `models`    | Server-side types: `Role`, `User`, `NewTask`          |
//! | `db`        | SQLite access via `DbHandle` (thin `Arc<Mutex<_>>`)   |
//! | `auth`      | `MovePermission` trait and role-based implementation  |
//! | `reconcile` | Bulk order validation and atomic commit               |
//! | `ws`        | `WsMessage` enum + `broadcast_message()` helper       |
//!
//! ## Typical Request Flow (reorder)
//!
//! 1. `PUT /api/projects/{id}/tasks/order` → `api::reorder_tasks()`
//! 2. The `x-user-id` header becomes a `Principal`; a missing or
//!    unauthorized principal is rejected before the body is inspected.
//! 3. Each row is checked for a known status, an integer position and a
//!    task id that belongs to the project. Any bad row rejects the batch.
//! 4. `BoardDb::apply_task_order()` writes all rows in one transaction.
//! 5. A `board_reordered` message goes out over the WebSocket and the
//!    response tells the client to re-fetch.

pub mod api;
pub mod auth;
pub mod db;
pub mod models;
pub mod reconcile;
pub mod server;
pub mod ws;
