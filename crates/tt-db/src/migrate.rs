//! Upgrades stores written by older versions: integer `task_log` keys and
//! timestamps that are not in the canonical stored format.

use rand::RngCore;
use rand::rngs::OsRng;
use rusqlite::{Connection, Transaction, params};
use tt_core::TaskLogEntry;

use crate::log_id::{LogTable, unique_log_id};
use crate::logs::insert_entry;
use crate::{DbError, format_timestamp, parse_timestamp};

/// Rebuilds `task_log` with text identifiers if it still has an integer key.
///
/// Runs as one transaction. Stores already on the current schema are left
/// untouched.
pub(crate) fn migrate_legacy_ids(conn: &mut Connection) -> Result<(), DbError> {
    if !has_integer_ids(conn)? {
        return Ok(());
    }
    migrate_with(conn, &mut OsRng)
}

/// `GLOB` pattern matched by every canonical stored timestamp.
const CANONICAL_TIMESTAMP_GLOB: &str =
    "[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]T[0-9][0-9]:[0-9][0-9]:[0-9][0-9].[0-9][0-9][0-9]Z";

/// Rewrites any non-canonical timestamps in `task_log` and `active_task`.
///
/// The `end_time >= ?` filters compare text, so every stored value must share
/// the fixed-width UTC format. Runs as one transaction and only when at least
/// one row needs it.
pub(crate) fn canonicalize_timestamps(conn: &mut Connection) -> Result<(), DbError> {
    if !has_legacy_timestamps(conn)? {
        return Ok(());
    }
    let tx = conn.transaction()?;
    let logs = normalize_log_times(&tx)?;
    let active = normalize_active_times(&tx)?;
    tx.commit()?;

    tracing::info!(logs, active, "rewrote legacy timestamps");
    Ok(())
}

fn has_legacy_timestamps(conn: &Connection) -> Result<bool, DbError> {
    let found = conn.query_row(
        "
        SELECT EXISTS (
            SELECT 1 FROM task_log
            WHERE start_time NOT GLOB ?1 OR end_time NOT GLOB ?1
        ) OR EXISTS (
            SELECT 1 FROM active_task WHERE start_time NOT GLOB ?1
        )
        ",
        [CANONICAL_TIMESTAMP_GLOB],
        |row| row.get(0),
    )?;
    Ok(found)
}

fn has_integer_ids(conn: &Connection) -> Result<bool, DbError> {
    let mut stmt = conn.prepare("PRAGMA table_info(task_log)")?;
    let columns = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?))
    })?;
    for column in columns {
        let (name, declared_type) = column?;
        if name == "id" {
            return Ok(declared_type.to_ascii_uppercase().contains("INT"));
        }
    }
    Ok(false)
}

struct LegacyRow {
    task_name: String,
    start_time: String,
    end_time: String,
}

fn migrate_with<R: RngCore + ?Sized>(conn: &mut Connection, rng: &mut R) -> Result<(), DbError> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        "
        DROP TABLE IF EXISTS task_log_new;
        CREATE TABLE task_log_new (
            id TEXT PRIMARY KEY,
            task_name TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            duration_seconds INTEGER NOT NULL
        );
        ",
    )?;

    let legacy = {
        let mut stmt =
            tx.prepare("SELECT task_name, start_time, end_time FROM task_log ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(LegacyRow {
                task_name: row.get(0)?,
                start_time: row.get(1)?,
                end_time: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>()?
    };

    for row in &legacy {
        let start_time = parse_timestamp(&row.start_time, "task_log.start_time")?;
        let end_time = parse_timestamp(&row.end_time, "task_log.end_time")?.max(start_time);
        let id = unique_log_id(&tx, LogTable::TaskLogNew, rng)?;
        let entry = TaskLogEntry::new(id, row.task_name.as_str(), start_time, end_time);
        insert_entry(&tx, LogTable::TaskLogNew, &entry)?;
    }
    normalize_active_times(&tx)?;

    tx.execute_batch(
        "
        DROP TABLE task_log;
        ALTER TABLE task_log_new RENAME TO task_log;
        ",
    )?;
    tx.commit()?;

    tracing::info!(rows = legacy.len(), "migrated task log to text identifiers");
    Ok(())
}

/// Rewrites log timestamps in the canonical format. Durations are kept.
fn normalize_log_times(tx: &Transaction<'_>) -> Result<usize, DbError> {
    let logs = {
        let mut stmt = tx.prepare(
            "
            SELECT id, start_time, end_time
            FROM task_log
            WHERE start_time NOT GLOB ?1 OR end_time NOT GLOB ?1
            ",
        )?;
        let rows = stmt.query_map([CANONICAL_TIMESTAMP_GLOB], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        rows.collect::<Result<Vec<_>, _>>()?
    };
    for (id, start_raw, end_raw) in &logs {
        let start_time = parse_timestamp(start_raw, "task_log.start_time")?;
        let end_time = parse_timestamp(end_raw, "task_log.end_time")?;
        tx.execute(
            "UPDATE task_log SET start_time = ?1, end_time = ?2 WHERE id = ?3",
            params![format_timestamp(start_time), format_timestamp(end_time), id],
        )?;
    }
    Ok(logs.len())
}

/// Rewrites running-timer start times in the canonical format.
fn normalize_active_times(tx: &Transaction<'_>) -> Result<usize, DbError> {
    let active = {
        let mut stmt =
            tx.prepare("SELECT task_name, start_time FROM active_task WHERE start_time NOT GLOB ?1")?;
        let rows = stmt.query_map([CANONICAL_TIMESTAMP_GLOB], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        rows.collect::<Result<Vec<_>, _>>()?
    };
    for (name, raw) in &active {
        let start_time = parse_timestamp(raw, "active_task.start_time")?;
        tx.execute(
            "UPDATE active_task SET start_time = ?1 WHERE task_name = ?2",
            params![format_timestamp(start_time), name],
        )?;
    }
    Ok(active.len())
}
