//! Board types and ordering algorithms shared by the taskboard server and
//! client.
//!
//! | Module     | Responsibility                                          |
//! |------------|---------------------------------------------------------|
//! | `models`   | `Task`, `TaskStatus`, wire rows and `BoardView`         |
//! | `grouping` | Partition a task list into sorted status columns        |
//! | `reorder`  | Optimistic drop reordering over the merged list         |

pub mod grouping;
pub mod models;
pub mod reorder;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use grouping::{flatten_columns, group_by_column};
pub use models::*;
pub use reorder::{DropTarget, ReorderError, column_head_position, order_rows, reorder};
