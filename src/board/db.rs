use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use taskboard_common::{
    BoardView, Priority, Project, Task, TaskOrder, TaskStatus, group_by_column,
};

use super::models::*;

/// Async-safe handle to the board database.
///
/// Wraps `BoardDb` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`, so synchronous SQLite I/O
/// never ties up async worker threads.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<BoardDb>>,
}

impl DbHandle {
    pub fn new(db: BoardDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&BoardDb) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
            f(&guard)
        })
        .await
        .context("DB task panicked")?
    }

    /// Acquire the database mutex synchronously. Only for startup and tests;
    /// never call this from an async request path.
    pub fn lock_sync(&self) -> Result<std::sync::MutexGuard<'_, BoardDb>> {
        self.inner
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))
    }
}

pub struct BoardDb {
    conn: Connection,
}

const TASK_COLUMNS: &str = "id, project_id, title, description, status, position, priority, assigned_user, due_date";

impl BoardDb {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        self.run_migrations().context("Failed to run migrations")?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS projects (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                );

                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    is_admin INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                );

                CREATE TABLE IF NOT EXISTS project_members (
                    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    role TEXT NOT NULL DEFAULT 'member',
                    PRIMARY KEY (project_id, user_id)
                );

                CREATE TABLE IF NOT EXISTS tasks (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    status TEXT NOT NULL DEFAULT 'todo',
                    position INTEGER NOT NULL DEFAULT 0,
                    order_seq INTEGER NOT NULL DEFAULT 0,
                    priority TEXT NOT NULL DEFAULT 'medium',
                    assigned_user TEXT,
                    due_date TEXT,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                );

                CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id);
                CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(project_id, status);
                ",
            )
            .context("Failed to create tables")?;

        // Databases created before order_seq existed.
        match self.conn.execute(
            "ALTER TABLE tasks ADD COLUMN order_seq INTEGER NOT NULL DEFAULT 0",
            [],
        ) {
            Ok(_) => {}
            Err(e) if e.to_string().contains("duplicate column") => {}
            Err(e) => return Err(anyhow::anyhow!("Failed to add order_seq column: {}", e)),
        }
        Ok(())
    }

    // ── Projects ──────────────────────────────────────────────────────

    pub fn create_project(&self, name: &str) -> Result<Project> {
        self.conn
            .execute("INSERT INTO projects (name) VALUES (?1)", params![name])
            .context("Failed to insert project")?;
        let id = self.conn.last_insert_rowid();
        self.get_project(id)?
            .context("Project not found after insert")
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM projects ORDER BY id")
            .context("Failed to prepare list_projects")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Project {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })
            .context("Failed to query projects")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read project row")
    }

    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        self.conn
            .query_row(
                "SELECT id, name, created_at FROM projects WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Project {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()
            .context("Failed to query project")
    }

    // ── Users and memberships ─────────────────────────────────────────

    pub fn create_user(&self, name: &str, is_admin: bool) -> Result<User> {
        self.conn
            .execute(
                "INSERT INTO users (name, is_admin) VALUES (?1, ?2)",
                params![name, is_admin],
            )
            .with_context(|| format!("Failed to insert user '{}'", name))?;
        let id = self.conn.last_insert_rowid();
        self.get_user(id)?.context("User not found after insert")
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, name, is_admin FROM users WHERE id = ?1",
                params![id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        is_admin: row.get(2)?,
                    })
                },
            )
            .optional()
            .context("Failed to query user")
    }

    /// Grant `user_id` a role in `project_id`, replacing any existing role.
    pub fn add_member(&self, project_id: i64, user_id: i64, role: Role) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO project_members (project_id, user_id, role) VALUES (?1, ?2, ?3)
                 ON CONFLICT(project_id, user_id) DO UPDATE SET role = excluded.role",
                params![project_id, user_id, role.as_str()],
            )
            .context("Failed to add project member")?;
        Ok(())
    }

    pub fn member_role(&self, project_id: i64, user_id: i64) -> Result<Option<Role>> {
        let role: Option<String> = self
            .conn
            .query_row(
                "SELECT role FROM project_members WHERE project_id = ?1 AND user_id = ?2",
                params![project_id, user_id],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query project member")?;
        role.map(|r| {
            Role::from_str(&r)
                .map_err(|e| anyhow::anyhow!(e))
                .context("Failed to parse member role")
        })
        .transpose()
    }

    // ── Tasks ─────────────────────────────────────────────────────────

    /// Insert a task at the end of its column (max position + 1).
    pub fn create_task(&self, project_id: i64, new: &NewTask) -> Result<Task> {
        let status = new.status.unwrap_or(TaskStatus::Todo);
        let max_pos: i64 = self
            .conn
            .query_row(
                "SELECT COALESCE(MAX(position), -1) FROM tasks WHERE project_id = ?1 AND status = ?2",
                params![project_id, status.as_str()],
                |row| row.get(0),
            )
            .context("Failed to get max position")?;

        self.conn
            .execute(
                "INSERT INTO tasks (project_id, title, description, status, position, priority, assigned_user, due_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    project_id,
                    new.title,
                    new.description,
                    status.as_str(),
                    max_pos + 1,
                    new.priority.as_str(),
                    new.assigned_user,
                    new.due_date.map(|d| d.to_string()),
                ],
            )
            .context("Failed to insert task")?;
        let id = self.conn.last_insert_rowid();
        self.get_task(id)?.context("Task not found after insert")
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                params![id],
                TaskRow::from_row,
            )
            .optional()
            .context("Failed to query task")?;
        match row {
            Some(r) => r.into_task(),
            None => Ok(None),
        }
    }

    pub fn delete_task(&self, id: i64) -> Result<bool> {
        let count = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])
            .context("Failed to delete task")?;
        Ok(count > 0)
    }

    /// Every task of a project in `(position, order_seq, id)` order.
    ///
    /// `order_seq` is the row's index in the last order batch that touched
    /// it, so equal positions come back in the order they were submitted.
    ///
    /// Rows with an unrecognized status are skipped: they belong to no
    /// column and the board never shows them.
    pub fn list_tasks_for_board(&self, project_id: i64) -> Result<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM tasks WHERE project_id = ?1 ORDER BY position, order_seq, id",
                TASK_COLUMNS
            ))
            .context("Failed to prepare list_tasks_for_board")?;
        let rows = stmt
            .query_map(params![project_id], TaskRow::from_row)
            .context("Failed to query tasks")?;
        let mut tasks = Vec::new();
        for row in rows {
            let r = row.context("Failed to read task row")?;
            if let Some(task) = r.into_task()? {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    /// Ids of every task currently stored for `project_id`.
    pub fn task_ids(&self, project_id: i64) -> Result<HashSet<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM tasks WHERE project_id = ?1")
            .context("Failed to prepare task_ids")?;
        let ids = stmt
            .query_map(params![project_id], |row| row.get(0))
            .context("Failed to query task ids")?
            .collect::<rusqlite::Result<HashSet<i64>>>()
            .context("Failed to read task id")?;
        Ok(ids)
    }

    /// Write `status`/`position` for every row in one transaction. Each
    /// row's index in `rows` becomes its `order_seq`.
    ///
    /// If any row matches no task of the project, nothing is written and
    /// the missing id is reported.
    pub fn apply_task_order(&self, project_id: i64, rows: &[TaskOrder]) -> Result<OrderCommit> {
        // Safety: DbHandle's Mutex already guarantees single-threaded access.
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;

        for (seq, row) in rows.iter().enumerate() {
            let changed = tx
                .execute(
                    "UPDATE tasks SET status = ?1, position = ?2, order_seq = ?3, updated_at = datetime('now')
                     WHERE id = ?4 AND project_id = ?5",
                    params![row.status.as_str(), row.position, seq as i64, row.id, project_id],
                )
                .with_context(|| format!("Failed to update order of task {}", row.id))?;
            if changed == 0 {
                tx.rollback().context("Failed to roll back task order")?;
                return Ok(OrderCommit::Missing { id: row.id });
            }
        }

        tx.commit().context("Failed to commit task order")?;
        Ok(OrderCommit::Applied {
            updated: rows.len(),
        })
    }

    // ── Board view ────────────────────────────────────────────────────

    pub fn get_board(&self, project_id: i64, can_move: bool) -> Result<Option<BoardView>> {
        let Some(project) = self.get_project(project_id)? else {
            return Ok(None);
        };
        let tasks = self.list_tasks_for_board(project_id)?;
        Ok(Some(BoardView {
            project,
            columns: group_by_column(&tasks, &TaskStatus::ALL),
            can_move,
        }))
    }

    #[cfg(test)]
    fn set_raw_position(&self, id: i64, position: i64) -> Result<()> {
        self.conn
            .execute("UPDATE tasks SET position = ?1 WHERE id = ?2", params![position, id])?;
        Ok(())
    }

    #[cfg(test)]
    fn set_raw_status(&self, id: i64, status: &str) -> Result<()> {
        self.conn
            .execute("UPDATE tasks SET status = ?1 WHERE id = ?2", params![status, id])?;
        Ok(())
    }
}

/// Intermediate row struct for reading tasks from SQLite before converting
/// status / priority / due_date strings into typed values.
struct TaskRow {
    id: i64,
    project_id: i64,
    title: String,
    description: String,
    status: String,
    position: i64,
    priority: String,
    assigned_user: Option<String>,
    due_date: Option<String>,
}

impl TaskRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            status: row.get(4)?,
            position: row.get(5)?,
            priority: row.get(6)?,
            assigned_user: row.get(7)?,
            due_date: row.get(8)?,
        })
    }

    /// `None` when the stored status is not a known column.
    fn into_task(self) -> Result<Option<Task>> {
        let status = match TaskStatus::from_str(&self.status) {
            Ok(s) => s,
            Err(_) => {
                tracing::warn!(
                    task_id = self.id,
                    status = %self.status,
                    "skipping task with unrecognized status"
                );
                return Ok(None);
            }
        };
        let priority = Priority::from_str(&self.priority)
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to parse task priority")?;
        let due_date = self
            .due_date
            .as_deref()
            .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
            .transpose()
            .context("Failed to parse task due_date")?;

        Ok(Some(Task {
            id: self.id,
            project_id: self.project_id,
            title: self.title,
            description: self.description,
            status,
            position: self.position,
            priority,
            assigned_user: self.assigned_user,
            due_date,
        }))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Result<(BoardDb, Project)> {
        let db = BoardDb::new_in_memory()?;
        let project = db.create_project("apollo")?;
        Ok((db, project))
    }

    #[test]
    fn test_create_database_and_run_migrations() -> Result<()> {
        let db = BoardDb::new_in_memory()?;
        let table_count: i32 = db.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('projects', 'users', 'project_members', 'tasks')",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(table_count, 4, "Expected 4 tables to exist");
        Ok(())
    }

    #[test]
    fn test_create_and_list_projects() -> Result<()> {
        let db = BoardDb::new_in_memory()?;
        db.create_project("alpha")?;
        db.create_project("beta")?;
        let projects = db.list_projects()?;
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].name, "alpha");
        assert!(!projects[1].created_at.is_empty());
        assert!(db.get_project(99)?.is_none());
        Ok(())
    }

    #[test]
    fn test_create_task_appends_to_column() -> Result<()> {
        let (db, project) = seeded()?;
        let a = db.create_task(project.id, &NewTask::titled("a"))?;
        let b = db.create_task(project.id, &NewTask::titled("b"))?;
        let c = db.create_task(project.id, &NewTask::titled("c").in_status(TaskStatus::Done))?;
        assert_eq!(a.position, 0);
        assert_eq!(b.position, 1);
        assert_eq!(c.position, 0);
        assert_eq!(c.status, TaskStatus::Done);
        assert_eq!(a.priority, Priority::Medium);
        Ok(())
    }

    #[test]
    fn test_task_round_trips_display_fields() -> Result<()> {
        let (db, project) = seeded()?;
        let new = NewTask {
            title: "Ship".into(),
            description: "Release 1.0".into(),
            status: Some(TaskStatus::InProgress),
            priority: Priority::Critical,
            assigned_user: Some("ana".into()),
            due_date: NaiveDate::from_ymd_opt(2026, 11, 2),
        };
        let task = db.create_task(project.id, &new)?;
        let fetched = db.get_task(task.id)?.expect("task should exist");
        assert_eq!(fetched.assigned_user.as_deref(), Some("ana"));
        assert_eq!(fetched.due_date, NaiveDate::from_ymd_opt(2026, 11, 2));
        assert_eq!(fetched.priority, Priority::Critical);
        Ok(())
    }

    #[test]
    fn test_list_tasks_ties_follow_submitted_order() -> Result<()> {
        let (db, project) = seeded()?;
        let a = db.create_task(project.id, &NewTask::titled("a"))?;
        let b = db.create_task(project.id, &NewTask::titled("b"))?;
        let c = db.create_task(project.id, &NewTask::titled("c"))?;
        db.apply_task_order(
            project.id,
            &[
                TaskOrder { id: c.id, status: TaskStatus::Todo, position: 0 },
                TaskOrder { id: b.id, status: TaskStatus::Todo, position: 0 },
                TaskOrder { id: a.id, status: TaskStatus::Todo, position: 1 },
            ],
        )?;
        let ids: Vec<i64> = db.list_tasks_for_board(project.id)?.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
        Ok(())
    }

    #[test]
    fn test_drop_before_task_survives_reload() -> Result<()> {
        let (db, project) = seeded()?;
        let a = db.create_task(project.id, &NewTask::titled("a"))?;
        let b = db.create_task(project.id, &NewTask::titled("b"))?;
        let e = db.create_task(project.id, &NewTask::titled("e"))?;
        // a dropped onto e takes position 1, tying with b above it.
        db.apply_task_order(
            project.id,
            &[
                TaskOrder { id: b.id, status: TaskStatus::Todo, position: 1 },
                TaskOrder { id: a.id, status: TaskStatus::Todo, position: 1 },
                TaskOrder { id: e.id, status: TaskStatus::Todo, position: 2 },
            ],
        )?;
        let ids: Vec<i64> = db.list_tasks_for_board(project.id)?.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b.id, a.id, e.id]);
        Ok(())
    }

    #[test]
    fn test_untouched_ties_fall_back_to_id() -> Result<()> {
        let (db, project) = seeded()?;
        let a = db.create_task(project.id, &NewTask::titled("a"))?;
        let b = db.create_task(project.id, &NewTask::titled("b"))?;
        db.set_raw_position(b.id, 0)?;
        let ids: Vec<i64> = db.list_tasks_for_board(project.id)?.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
        Ok(())
    }

    #[test]
    fn test_migrations_rerun_on_existing_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("board.db");
        {
            let db = BoardDb::new(&path)?;
            db.create_project("apollo")?;
        }
        let db = BoardDb::new(&path)?;
        assert_eq!(db.list_projects()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_unknown_status_rows_are_skipped() -> Result<()> {
        let (db, project) = seeded()?;
        let a = db.create_task(project.id, &NewTask::titled("a"))?;
        let b = db.create_task(project.id, &NewTask::titled("b"))?;
        db.set_raw_status(a.id, "archived")?;
        let tasks = db.list_tasks_for_board(project.id)?;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, b.id);
        assert!(db.get_task(a.id)?.is_none());
        Ok(())
    }

    #[test]
    fn test_apply_task_order_writes_all_rows() -> Result<()> {
        let (db, project) = seeded()?;
        let a = db.create_task(project.id, &NewTask::titled("a"))?;
        let b = db.create_task(project.id, &NewTask::titled("b"))?;
        let outcome = db.apply_task_order(
            project.id,
            &[
                TaskOrder { id: a.id, status: TaskStatus::Done, position: -1 },
                TaskOrder { id: b.id, status: TaskStatus::Todo, position: 4 },
            ],
        )?;
        assert_eq!(outcome, OrderCommit::Applied { updated: 2 });
        let a = db.get_task(a.id)?.expect("a exists");
        assert_eq!(a.status, TaskStatus::Done);
        assert_eq!(a.position, -1);
        assert_eq!(db.get_task(b.id)?.expect("b exists").position, 4);
        Ok(())
    }

    #[test]
    fn test_apply_task_order_rolls_back_on_missing_task() -> Result<()> {
        let (db, project) = seeded()?;
        let a = db.create_task(project.id, &NewTask::titled("a"))?;
        let b = db.create_task(project.id, &NewTask::titled("b"))?;
        db.delete_task(b.id)?;

        let outcome = db.apply_task_order(
            project.id,
            &[
                TaskOrder { id: a.id, status: TaskStatus::Done, position: 9 },
                TaskOrder { id: b.id, status: TaskStatus::Done, position: 10 },
            ],
        )?;
        assert_eq!(outcome, OrderCommit::Missing { id: b.id });

        let a = db.get_task(a.id)?.expect("a exists");
        assert_eq!(a.status, TaskStatus::Todo);
        assert_eq!(a.position, 0);
        Ok(())
    }

    #[test]
    fn test_apply_task_order_is_scoped_to_project() -> Result<()> {
        let (db, project) = seeded()?;
        let other = db.create_project("other")?;
        let foreign = db.create_task(other.id, &NewTask::titled("foreign"))?;
        let outcome = db.apply_task_order(
            project.id,
            &[TaskOrder { id: foreign.id, status: TaskStatus::Done, position: 0 }],
        )?;
        assert_eq!(outcome, OrderCommit::Missing { id: foreign.id });
        assert_eq!(db.get_task(foreign.id)?.expect("exists").status, TaskStatus::Todo);
        Ok(())
    }

    #[test]
    fn test_member_roles() -> Result<()> {
        let (db, project) = seeded()?;
        let user = db.create_user("ana", false)?;
        assert_eq!(db.member_role(project.id, user.id)?, None);
        db.add_member(project.id, user.id, Role::Member)?;
        assert_eq!(db.member_role(project.id, user.id)?, Some(Role::Member));
        db.add_member(project.id, user.id, Role::Manager)?;
        assert_eq!(db.member_role(project.id, user.id)?, Some(Role::Manager));
        Ok(())
    }

    #[test]
    fn test_duplicate_user_name_is_rejected() -> Result<()> {
        let db = BoardDb::new_in_memory()?;
        db.create_user("ana", false)?;
        assert!(db.create_user("ana", true).is_err());
        Ok(())
    }

    #[test]
    fn test_get_board_groups_columns() -> Result<()> {
        let (db, project) = seeded()?;
        db.create_task(project.id, &NewTask::titled("a"))?;
        db.create_task(project.id, &NewTask::titled("b").in_status(TaskStatus::Done))?;
        let board = db.get_board(project.id, true)?.expect("board exists");
        assert_eq!(board.columns.len(), 3);
        assert_eq!(board.columns[0].tasks.len(), 1);
        assert!(board.columns[1].tasks.is_empty());
        assert_eq!(board.columns[2].tasks[0].title, "b");
        assert!(board.can_move);
        assert!(db.get_board(42, true)?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_db_handle_runs_on_blocking_pool() -> Result<()> {
        let handle = DbHandle::new(BoardDb::new_in_memory()?);
        let project = handle.call(|db| db.create_project("async")).await?;
        let fetched = handle.call(move |db| db.get_project(project.id)).await?;
        assert_eq!(fetched.map(|p| p.name), Some("async".to_string()));
        Ok(())
    }
}
