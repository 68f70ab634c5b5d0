//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand};
use tt_core::{LogRange, Period};

/// Personal task time tracker.
///
/// Start and stop named timers, then review where the time went.
#[derive(Debug, Parser)]
#[command(name = "tt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start tracking a task.
    Start {
        /// Task name.
        task: String,
    },

    /// Stop tracking a task, or every active task when none is named.
    Stop {
        /// Task name.
        task: Option<String>,
    },

    /// Show active tasks.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show logged tasks, grouped by name unless --separate is given.
    Logs(LogsArgs),

    /// Show time spent per task with its share of the period.
    Dash(DashArgs),

    /// Edit a logged session.
    Update(UpdateArgs),

    /// Delete logged sessions or active tasks.
    Delete(DeleteArgs),

    /// List task names matching a prefix, one per line.
    Names {
        /// Case-insensitive name prefix.
        #[arg(default_value = "")]
        prefix: String,

        /// Only suggest names of active tasks.
        #[arg(long)]
        active: bool,

        /// Maximum number of names (defaults to the configured limit).
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Arguments for `tt logs`.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("range").multiple(false)))]
pub struct LogsArgs {
    /// Only show sessions that ended today.
    #[arg(long, group = "range")]
    pub today: bool,

    /// Only show sessions from the last 7 days.
    #[arg(long, group = "range")]
    pub week: bool,

    /// Only show sessions from the last N days (0 shows everything).
    #[arg(long, group = "range", value_name = "N")]
    pub days: Option<u32>,

    /// Show each session instead of per-task totals.
    #[arg(long)]
    pub separate: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

impl LogsArgs {
    pub const fn range(&self) -> LogRange {
        if self.today {
            LogRange::Today
        } else if self.week {
            LogRange::LastWeek
        } else if let Some(days) = self.days {
            LogRange::LastDays(days)
        } else {
            LogRange::All
        }
    }
}

/// Arguments for `tt dash`.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("period").multiple(false)))]
pub struct DashArgs {
    /// Today (default).
    #[arg(long, group = "period")]
    pub today: bool,

    /// The current week, starting Monday.
    #[arg(long, group = "period")]
    pub week: bool,

    /// The current calendar month.
    #[arg(long, group = "period")]
    pub month: bool,

    /// All logged time.
    #[arg(long, group = "period")]
    pub all: bool,

    /// Only count sessions ending on or after this date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub since: Option<NaiveDate>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

impl DashArgs {
    pub const fn period(&self) -> Period {
        if self.week {
            Period::Week
        } else if self.month {
            Period::Month
        } else if self.all {
            Period::AllTime
        } else {
            Period::Today
        }
    }
}

/// Arguments for `tt update`.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Log id (8 characters).
    pub id: String,

    /// New task name.
    #[arg(long)]
    pub name: Option<String>,

    /// New start time.
    #[arg(long, value_name = "TIME")]
    pub start: Option<String>,

    /// New end time.
    #[arg(long, value_name = "TIME")]
    pub end: Option<String>,
}

/// Arguments for `tt delete`. Exactly one mode is required.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("mode").required(true).multiple(false)))]
pub struct DeleteArgs {
    /// Delete every log and active task.
    #[arg(long, group = "mode")]
    pub all: bool,

    /// Delete sessions that ended today.
    #[arg(long, group = "mode")]
    pub today: bool,

    /// Delete sessions that ended since local midnight N days ago.
    #[arg(long, group = "mode", value_name = "N")]
    pub days: Option<u32>,

    /// Delete one session by id.
    #[arg(long, group = "mode", value_name = "ID")]
    pub id: Option<String>,

    /// Discard an active task without logging it.
    #[arg(long, group = "mode", value_name = "NAME")]
    pub active: Option<String>,
}

/// A single delete operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteMode {
    All,
    Today,
    Days(u32),
    Id(String),
    Active(String),
}

impl DeleteArgs {
    pub fn mode(&self) -> Option<DeleteMode> {
        if self.all {
            Some(DeleteMode::All)
        } else if self.today {
            Some(DeleteMode::Today)
        } else if let Some(days) = self.days {
            Some(DeleteMode::Days(days))
        } else if let Some(id) = &self.id {
            Some(DeleteMode::Id(id.clone()))
        } else {
            self.active.clone().map(DeleteMode::Active)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("tt").chain(args.iter().copied()))
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn logs_range_defaults_to_all() {
        let Some(Commands::Logs(args)) = parse(&["logs"]).unwrap().command else {
            panic!("expected logs");
        };
        assert_eq!(args.range(), LogRange::All);

        let Some(Commands::Logs(args)) = parse(&["logs", "--days", "14"]).unwrap().command else {
            panic!("expected logs");
        };
        assert_eq!(args.range(), LogRange::LastDays(14));
    }

    #[test]
    fn logs_ranges_are_exclusive() {
        assert!(parse(&["logs", "--today", "--week"]).is_err());
        assert!(parse(&["logs", "--days", "-1"]).is_err());
    }

    #[test]
    fn dash_period_and_since() {
        let Some(Commands::Dash(args)) = parse(&["dash", "--week", "--since", "2026-02-01"])
            .unwrap()
            .command
        else {
            panic!("expected dash");
        };
        assert_eq!(args.period(), Period::Week);
        assert_eq!(args.since, NaiveDate::from_ymd_opt(2026, 2, 1));

        assert!(parse(&["dash", "--week", "--month"]).is_err());
        assert!(parse(&["dash", "--since", "02/01/2026"]).is_err());
    }

    #[test]
    fn delete_requires_exactly_one_mode() {
        assert!(parse(&["delete"]).is_err());
        assert!(parse(&["delete", "--all", "--today"]).is_err());

        let Some(Commands::Delete(args)) = parse(&["delete", "--days", "0"]).unwrap().command else {
            panic!("expected delete");
        };
        assert_eq!(args.mode(), Some(DeleteMode::Days(0)));
    }

    #[test]
    fn stop_task_is_optional() {
        let Some(Commands::Stop { task }) = parse(&["stop"]).unwrap().command else {
            panic!("expected stop");
        };
        assert!(task.is_none());
    }
}
