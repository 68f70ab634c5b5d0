//! `tt delete`: remove logged sessions or discard running timers.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use tt_core::window::{delete_days_start, period_start};
use tt_core::{LogId, Period};
use tt_db::{Database, DbError};

use super::util::{task_name, user_error, write_field};
use crate::cli::DeleteMode;

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    mode: &DeleteMode,
    now: &DateTime<Tz>,
) -> Result<()> {
    match mode {
        DeleteMode::All => {
            let counts = db
                .delete_all()
                .map_err(|err| user_error(err, "delete all data"))?;
            writeln!(writer, "[OK] Deleted all tracked data")?;
            write_field(writer, "logs", counts.logs)?;
            write_field(writer, "active", counts.active)?;
        }
        DeleteMode::Today => {
            let since = period_start(Period::Today, now).unwrap_or_else(|| now.with_timezone(&Utc));
            let deleted = db
                .delete_logs_since(since)
                .map_err(|err| user_error(err, "delete today's logs"))?;
            if deleted == 0 {
                writeln!(writer, "[ ] No logs found for today.")?;
                return Ok(());
            }
            writeln!(writer, "[OK] Deleted today's logs")?;
            write_field(writer, "count", deleted)?;
        }
        DeleteMode::Days(days) => {
            let since = delete_days_start(*days, now);
            let deleted = db
                .delete_logs_since(since)
                .map_err(|err| user_error(err, "delete recent logs"))?;
            if deleted == 0 {
                writeln!(writer, "[ ] No logs found in the last {days} days.")?;
                return Ok(());
            }
            writeln!(writer, "[OK] Deleted logs from today - {days} days")?;
            write_field(writer, "count", deleted)?;
        }
        DeleteMode::Id(raw) => {
            let id = LogId::new(raw.trim())
                .context("--id must be 8 characters from a-z and 0-9")?;
            db.delete_log(&id)
                .map_err(|err| user_error(err, "delete log"))?;
            writeln!(writer, "[OK] Deleted log {id}")?;
        }
        DeleteMode::Active(raw) => {
            let name = task_name(raw)?;
            match db.delete_active(name) {
                Ok(()) => writeln!(writer, "[OK] Deleted active task {name:?}")?,
                Err(DbError::TaskNotActive { .. }) => {
                    anyhow::bail!("active task {name:?} not found")
                }
                Err(err) => return Err(user_error(err, "delete active task")),
            }
        }
    }
    Ok(())
}
