//! CLI command implementations.
//!
//! | Module   | Commands handled                                    |
//! |----------|-----------------------------------------------------|
//! | `serve`  | `Serve`, `Init`                                     |
//! | `admin`  | `Project`, `User`, `Member`, `Task` (direct to DB)  |
//! | `board`  | `Board` (through the HTTP client)                   |

pub mod admin;
pub mod board;
pub mod serve;

pub use admin::{
    cmd_member_add, cmd_project_create, cmd_project_list, cmd_task_create, cmd_task_delete,
    cmd_user_create,
};
pub use board::{cmd_board_move, cmd_board_show};
pub use serve::{cmd_init, cmd_serve};
