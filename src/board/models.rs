use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taskboard_common::{Priority, TaskStatus};

/// Role a user holds within one project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Member => "member",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(Self::Manager),
            "member" => Ok(Self::Member),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub is_admin: bool,
}

/// Fields for a task created through the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assigned_user: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn in_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Result of writing a batch of task orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderCommit {
    /// Every row matched a task and the transaction committed.
    Applied { updated: usize },
    /// A row matched no task; the transaction was rolled back.
    Missing { id: i64 },
}
