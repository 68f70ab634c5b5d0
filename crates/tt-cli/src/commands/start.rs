//! `tt start`: begin timing a task.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tt_db::Database;

use super::util::{task_name, user_error};

pub fn run<W: Write>(writer: &mut W, db: &Database, task: &str, now: DateTime<Utc>) -> Result<()> {
    let name = task_name(task)?;
    db.start_at(name, now)
        .map_err(|err| user_error(err, "start task"))?;
    writeln!(writer, "[OK] Started task {name:?}")?;
    Ok(())
}
