//! Move capability checks.
//!
//! The reconciliation endpoint never looks at roles directly. It asks a
//! [`MovePermission`] whether a principal may move tasks on a project, so the
//! role system can be swapped without touching the ordering code.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use super::db::DbHandle;
use super::models::Role;

/// The authenticated caller of a board request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Principal {
    pub user_id: i64,
}

impl Principal {
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}

#[async_trait]
pub trait MovePermission: Send + Sync {
    async fn can_move_tasks(&self, principal: &Principal, project_id: i64) -> Result<bool>;
}

/// Role-based capability backed by the board database: global admins and
/// project managers may move tasks, plain members may not.
pub struct RolePermissions {
    db: DbHandle,
}

impl RolePermissions {
    pub fn new(db: DbHandle) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovePermission for RolePermissions {
    async fn can_move_tasks(&self, principal: &Principal, project_id: i64) -> Result<bool> {
        let user_id = principal.user_id;
        self.db
            .call(move |db| {
                let Some(user) = db.get_user(user_id)? else {
                    return Ok(false);
                };
                if user.is_admin {
                    return Ok(true);
                }
                Ok(db.member_role(project_id, user_id)? == Some(Role::Manager))
            })
            .await
    }
}

/// Fixed allow-list of user ids, for embedding and tests.
#[derive(Debug, Default)]
pub struct StaticPermissions {
    allowed: HashSet<i64>,
}

impl StaticPermissions {
    pub fn allow(user_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            allowed: user_ids.into_iter().collect(),
        }
    }

    pub fn deny_all() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MovePermission for StaticPermissions {
    async fn can_move_tasks(&self, principal: &Principal, _project_id: i64) -> Result<bool> {
        Ok(self.allowed.contains(&principal.user_id))
    }
}
