//! Kanban task board with optimistic drag-and-drop reordering.
//!
//! - [`board`]: SQLite-backed server, bulk order reconciliation, HTTP API
//!   and WebSocket notifications.
//! - [`client`]: drag tracking and the optimistic board controller.
//! - [`config`]: `taskboard.toml` loading and environment overrides.
//! - [`errors`]: the `BoardError` taxonomy shared by both sides.

pub mod board;
pub mod client;
pub mod config;
pub mod errors;
