//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Migration SQL is written with `IF NOT EXISTS`, so an untracked database
//!   (`user_version` 0) whose `tasks` table already has this schema's columns
//!   is adopted as-is.
//! - An untracked `tasks` table keyed by `user_id` with text deadlines is
//!   imported into the current schema. Rows without an owner, a description
//!   or a parseable deadline are dropped; ids and the id sequence are kept.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const LEGACY_TABLE: &str = "tasks_user_id_legacy";
const LEGACY_IMPORT_SQL: &str = include_str!("legacy_user_id_import.sql");

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_tasks.sql"),
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    let legacy = current_version == 0 && has_user_id_tasks_table(&tx)?;
    if legacy {
        tx.execute_batch(&format!("ALTER TABLE tasks RENAME TO {LEGACY_TABLE};"))?;
    }

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        info!(
            "event=db_migrate module=db status=ok version={}",
            migration.version
        );
    }

    if legacy {
        let found: i64 =
            tx.query_row(&format!("SELECT COUNT(*) FROM {LEGACY_TABLE};"), [], |row| {
                row.get(0)
            })?;
        tx.execute_batch(LEGACY_IMPORT_SQL)?;
        let imported: i64 = tx.query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))?;
        info!(
            "event=db_legacy_import module=db status=ok imported={} dropped={}",
            imported,
            found - imported
        );
    }
    tx.commit()?;

    Ok(())
}

fn has_user_id_tasks_table(conn: &Connection) -> DbResult<bool> {
    let found: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info('tasks') WHERE name = 'user_id';",
        [],
        |row| row.get(0),
    )?;
    Ok(found > 0)
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
