//! Task store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/list/delete/reminder-scan APIs over the `tasks` table.
//! - Keep SQL and timestamp encoding inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate the description before SQL mutations.
//! - Read and delete paths are always filtered by `owner_id`, except the
//!   scheduler-facing `due_for_reminder`/`mark_reminded` pair.
//! - `reminded` only moves from 0 to 1.
//! - Deadlines are stored as minute-aligned unix seconds of the naive
//!   wall-clock value, so SQL comparisons match chronological order.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::task::{
    normalize_description, parse_deadline, truncate_to_minute, OwnerId, Task, TaskId,
    TaskValidationError,
};
use chrono::{DateTime, Duration, NaiveDateTime};
use log::debug;
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    description,
    deadline,
    reminded
FROM tasks";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for task persistence and query operations.
#[derive(Debug)]
pub enum StoreError {
    /// User input rejected before touching the database.
    Validation(TaskValidationError),
    /// The database could not serve the call; callers may retry later.
    Unavailable(DbError),
    /// A persisted row violates model invariants.
    InvalidData(String),
}

impl StoreError {
    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Unavailable(err) => write!(f, "task storage unavailable: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Unavailable(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Unavailable(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Unavailable(DbError::Sqlite(value))
    }
}

/// Owner-scoped task storage shared by request handling and the scheduler.
pub trait TaskStore: Send + Sync {
    /// Persists a new task with `reminded = false` and returns its fresh id.
    fn create(&self, owner_id: OwnerId, description: &str, deadline: NaiveDateTime)
        -> StoreResult<TaskId>;

    /// Lists the owner's tasks by ascending deadline, ties by ascending id.
    fn list(&self, owner_id: OwnerId) -> StoreResult<Vec<Task>>;

    /// Gets one task if it exists and belongs to `owner_id`.
    fn get(&self, owner_id: OwnerId, id: TaskId) -> StoreResult<Option<Task>>;

    /// Hard-deletes a task owned by `owner_id`; returns whether a row was removed.
    fn delete(&self, owner_id: OwnerId, id: TaskId) -> StoreResult<bool>;

    /// Returns unreminded tasks with `deadline - window <= now < deadline`.
    fn due_for_reminder(&self, now: NaiveDateTime, window: Duration) -> StoreResult<Vec<Task>>;

    /// Sets the reminded flag; returns `false` only when the task does not exist.
    fn mark_reminded(&self, id: TaskId) -> StoreResult<bool>;

    /// Parses a raw `YYYY-MM-DD HH:MM` deadline and creates the task.
    fn create_from_input(
        &self,
        owner_id: OwnerId,
        description: &str,
        deadline: &str,
    ) -> StoreResult<TaskId> {
        let description = normalize_description(description)?;
        let deadline = parse_deadline(deadline)?;
        self.create(owner_id, &description, deadline)
    }
}

/// SQLite-backed task store.
///
/// One connection guarded by a mutex; every method holds the lock for exactly
/// one statement.
pub struct SqliteTaskStore {
    conn: Mutex<Connection>,
}

impl SqliteTaskStore {
    /// Wraps a connection that already has migrations applied.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens (or creates) the database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }
}

impl TaskStore for SqliteTaskStore {
    fn create(
        &self,
        owner_id: OwnerId,
        description: &str,
        deadline: NaiveDateTime,
    ) -> StoreResult<TaskId> {
        let description = normalize_description(description)?;
        let deadline = truncate_to_minute(deadline);

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO tasks (owner_id, description, deadline, reminded)
             VALUES (?1, ?2, ?3, 0);",
            params![owner_id, description, deadline_to_db(deadline)],
        )?;
        let id = conn.last_insert_rowid();

        debug!("event=task_create module=store status=ok task_id={id} owner_id={owner_id}");
        Ok(id)
    }

    fn list(&self, owner_id: OwnerId) -> StoreResult<Vec<Task>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "{TASK_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY deadline ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([owner_id])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn get(&self, owner_id: OwnerId, id: TaskId) -> StoreResult<Option<Task>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "{TASK_SELECT_SQL}
             WHERE id = ?1 AND owner_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id, owner_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn delete(&self, owner_id: OwnerId, id: TaskId) -> StoreResult<bool> {
        let changed = self.conn.lock().execute(
            "DELETE FROM tasks WHERE id = ?1 AND owner_id = ?2;",
            params![id, owner_id],
        )?;

        debug!(
            "event=task_delete module=store status=ok task_id={id} owner_id={owner_id} removed={}",
            changed > 0
        );
        Ok(changed > 0)
    }

    fn due_for_reminder(&self, now: NaiveDateTime, window: Duration) -> StoreResult<Vec<Task>> {
        let now_secs = now.and_utc().timestamp();
        let horizon_secs = now_secs.saturating_add(window.num_seconds());

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "{TASK_SELECT_SQL}
             WHERE reminded = 0
               AND deadline > ?1
               AND deadline <= ?2
             ORDER BY deadline ASC, id ASC;"
        ))?;

        let mut rows = stmt.query(params![now_secs, horizon_secs])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn mark_reminded(&self, id: TaskId) -> StoreResult<bool> {
        // SQLite counts matched rows, so an already-set flag still reports 1.
        let changed = self
            .conn
            .lock()
            .execute("UPDATE tasks SET reminded = 1 WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn parse_task_row(row: &Row<'_>) -> StoreResult<Task> {
    let id: TaskId = row.get("id")?;

    let deadline_secs: i64 = row.get("deadline")?;
    let deadline = deadline_from_db(deadline_secs).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "deadline `{deadline_secs}` out of range for task {id}"
        ))
    })?;

    let reminded = match row.get::<_, i64>("reminded")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid reminded value `{other}` for task {id}"
            )));
        }
    };

    Ok(Task {
        id,
        owner_id: row.get("owner_id")?,
        description: row.get("description")?,
        deadline,
        reminded,
    })
}

fn deadline_to_db(deadline: NaiveDateTime) -> i64 {
    deadline.and_utc().timestamp()
}

fn deadline_from_db(secs: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0).map(|value| value.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::{deadline_from_db, deadline_to_db};
    use chrono::NaiveDate;

    #[test]
    fn deadline_encoding_is_reversible_and_ordered() {
        let early = NaiveDate::from_ymd_opt(2025, 9, 20)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        let late = NaiveDate::from_ymd_opt(2025, 9, 20)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();

        assert!(deadline_to_db(early) < deadline_to_db(late));
        assert_eq!(deadline_from_db(deadline_to_db(late)), Some(late));
        assert_eq!(deadline_to_db(late) % 60, 0);
    }
}
