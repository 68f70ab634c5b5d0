//! Collision-checked log identifiers.

use rand::RngCore;
use rusqlite::Connection;
use tt_core::LogId;

use crate::DbError;

/// Candidates drawn before giving up on finding a free identifier.
pub const MAX_ID_ATTEMPTS: usize = 32;

/// Tables that hold log identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogTable {
    TaskLog,
    /// Staging table used while rebuilding a legacy `task_log`.
    TaskLogNew,
}

impl LogTable {
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::TaskLog => "task_log",
            Self::TaskLogNew => "task_log_new",
        }
    }

    const fn lookup_query(self) -> &'static str {
        match self {
            Self::TaskLog => "SELECT 1 FROM task_log WHERE id = ?1",
            Self::TaskLogNew => "SELECT 1 FROM task_log_new WHERE id = ?1",
        }
    }
}

/// Draws identifiers until one is absent from `table`.
///
/// `conn` should be the transaction that will insert the row, so the check and
/// the insert see the same snapshot.
pub(crate) fn unique_log_id<R: RngCore + ?Sized>(
    conn: &Connection,
    table: LogTable,
    rng: &mut R,
) -> Result<LogId, DbError> {
    let mut stmt = conn.prepare_cached(table.lookup_query())?;
    for attempt in 1..=MAX_ID_ATTEMPTS {
        let candidate = LogId::random(rng)?;
        if !stmt.exists([&candidate])? {
            return Ok(candidate);
        }
        tracing::warn!(%candidate, attempt, table = table.name(), "log id collision");
    }
    Err(DbError::IdentifierSpaceExhausted {
        table: table.name(),
        attempts: MAX_ID_ATTEMPTS,
    })
}
