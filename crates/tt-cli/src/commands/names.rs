//! `tt names`: task name suggestions for shell completion.

use std::io::Write;

use anyhow::Result;
use tt_db::Database;

use super::util::user_error;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    prefix: &str,
    active_only: bool,
    limit: usize,
) -> Result<()> {
    let names = if active_only {
        db.active_name_suggestions(prefix, limit)
    } else {
        db.name_suggestions(prefix, limit)
    }
    .map_err(|err| user_error(err, "load task names"))?;

    for name in names {
        writeln!(writer, "{name}")?;
    }
    Ok(())
}
