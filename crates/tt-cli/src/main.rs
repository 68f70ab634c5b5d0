use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tt_cli::commands::{dash, delete, logs, names, start, status, stop, update};
use tt_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(tt_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = tt_db::Database::open(&config.database_path).with_context(|| {
        format!("failed to open database {}", config.database_path.display())
    })?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let now = Local::now();
    let now_utc = now.with_timezone(&Utc);
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Start { task } => start::run(&mut stdout, &db, task, now_utc)?,
        Commands::Stop { task } => stop::run(&mut stdout, &mut db, task.as_deref(), now_utc)?,
        Commands::Status { json } => status::run(&mut stdout, &db, *json, &now)?,
        Commands::Logs(args) => {
            let options = logs::LogsOptions {
                range: args.range(),
                separate: args.separate,
                json: args.json,
            };
            logs::run(&mut stdout, &db, options, &now)?;
        }
        Commands::Dash(args) => {
            dash::run(&mut stdout, &db, args.period(), args.since, args.json, &now)?;
        }
        Commands::Update(args) => {
            let fields = update::UpdateFields {
                name: args.name.as_deref(),
                start: args.start.as_deref(),
                end: args.end.as_deref(),
            };
            update::run(&mut stdout, &mut db, &args.id, fields, &now)?;
        }
        Commands::Delete(args) => {
            let mode = args
                .mode()
                .context("pick one delete mode: --all, --today, --days, --id, or --active")?;
            delete::run(&mut stdout, &mut db, &mode, &now)?;
        }
        Commands::Names {
            prefix,
            active,
            limit,
        } => {
            let limit = limit.unwrap_or(config.suggestion_limit);
            names::run(&mut stdout, &db, prefix, *active, limit)?;
        }
    }

    Ok(())
}
