//! Board client: drag tracking, optimistic moves and the HTTP transport.
//!
//! [`board::BoardController`] is the entry point. It owns the local copy of
//! a board, applies moves optimistically and hands the resulting order to a
//! [`transport::BoardTransport`].

pub mod board;
pub mod drag;
pub mod transport;

pub use board::{BoardController, DEFAULT_SUBMIT_TIMEOUT, MoveOutcome, SubmissionState};
pub use drag::{DragOutcome, DragRefusal, DragSession, DragTracker, DropPoint};
pub use transport::{BoardTransport, HttpTransport};
