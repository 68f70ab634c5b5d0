//! `tt stop`: stop one task, or every active task.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tt_db::Database;

use super::util::{format_duration, task_name, user_error, write_field};

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    task: Option<&str>,
    now: DateTime<Utc>,
) -> Result<()> {
    if let Some(task) = task {
        let name = task_name(task)?;
        let spent = db
            .stop_at(name, now)
            .map_err(|err| user_error(err, "stop task"))?;
        writeln!(writer, "[OK] Stopped task {name:?}")?;
        write_field(writer, "spent", format_duration(spent))?;
        return Ok(());
    }

    let summary = db
        .stop_all_at(now)
        .map_err(|err| user_error(err, "stop active tasks"))?;
    if summary.stopped == 0 {
        writeln!(writer, "[ ] No active tasks.")?;
        return Ok(());
    }
    writeln!(writer, "[OK] Stopped all active tasks")?;
    write_field(writer, "count", summary.stopped)?;
    write_field(writer, "total", format_duration(summary.total))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};
    use insta::assert_snapshot;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn stops_named_task() {
        let mut db = Database::open_in_memory().unwrap();
        db.start_at("writing", t0()).unwrap();

        let out = output(|w| run(w, &mut db, Some("writing"), t0() + Duration::seconds(90)));
        assert_snapshot!(out, @r#"
        [OK] Stopped task "writing"
          spent:    1m 30s
        "#);
        assert_eq!(db.list_logs(None).unwrap()[0].duration_seconds, 90);
    }

    #[test]
    fn stops_every_active_task() {
        let mut db = Database::open_in_memory().unwrap();
        db.start_at("a", t0()).unwrap();
        db.start_at("b", t0() + Duration::minutes(30)).unwrap();

        let out = output(|w| run(w, &mut db, None, t0() + Duration::hours(2)));
        assert_snapshot!(out, @r"
        [OK] Stopped all active tasks
          count:    2
          total:    3h 30m
        ");
        assert!(db.list_active().unwrap().is_empty());
    }

    #[test]
    fn nothing_to_stop() {
        let mut db = Database::open_in_memory().unwrap();
        let out = output(|w| run(w, &mut db, None, t0()));
        assert_snapshot!(out, @"[ ] No active tasks.");
    }

    #[test]
    fn stopping_inactive_task_fails() {
        let mut db = Database::open_in_memory().unwrap();
        let err = run(&mut Vec::new(), &mut db, Some("writing"), t0()).unwrap_err();
        assert_eq!(err.to_string(), "task \"writing\" is not active");
    }
}
