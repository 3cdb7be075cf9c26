//! Record the elapsed occurrences of a user's recurring schedules as
//! transactions.
//!
//! Intended to be run on a schedule, e.g. daily from cron, so transactions
//! appear even when nobody opens the app.

use std::process::ExitCode;

use clap::Parser;
use rusqlite::Connection;
use time::Date;
use tracing_subscriber::EnvFilter;

use wealthwise::{UserId, generate_missing_occurrences, get_user, initialize_db, local_today};

/// Generate missing occurrences for a user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The ID of the user to generate occurrences for.
    #[arg(long)]
    user_id: i64,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// Generate occurrences up to this date (YYYY-MM-DD) instead of today.
    #[arg(long, value_parser = parse_date)]
    until: Option<Date>,
}

fn parse_date(text: &str) -> Result<Date, String> {
    let format = time::macros::format_description!("[year]-[month]-[day]");

    Date::parse(text, &format).map_err(|error| format!("invalid date \"{text}\": {error}"))
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Could not generate occurrences: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), wealthwise::Error> {
    let connection = Connection::open(&args.db_path)?;
    initialize_db(&connection)?;

    let today = match args.until {
        Some(date) => date,
        None => local_today(&args.timezone)?,
    };
    let user = get_user(UserId::new(args.user_id), &connection)?;

    let summary = generate_missing_occurrences(user.id, today, &connection)?;

    println!(
        "Generated occurrences for {} up to {today}: {} created, {} already recorded.",
        user.display_name, summary.created, summary.skipped
    );
    if !summary.failed_schedules.is_empty() {
        println!(
            "Could not process schedules {:?}, check the logs for details.",
            summary.failed_schedules
        );
    }

    Ok(())
}
