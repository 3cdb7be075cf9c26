//! Materializing the elapsed occurrences of recurring schedules as
//! transactions.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::ScheduleId,
    occurrence::projection::pending_dates,
    schedule::{RecurringSchedule, get_active_schedules_for_user, set_last_generated},
    transaction::{Transaction, create_transaction},
    user::UserId,
};

/// The outcome of a generation run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// The number of transactions created.
    pub created: usize,
    /// The number of occurrences that had already been recorded.
    pub skipped: usize,
    /// The schedules that could not be processed.
    pub failed_schedules: Vec<ScheduleId>,
}

/// Create a transaction for every occurrence of the user's active schedules
/// that has elapsed by `today` but has not been recorded yet.
///
/// Each occurrence is recorded together with the schedule's `last_generated`
/// date in one SQL transaction. Running the generator again, or at the same
/// time from another caller, does not record an occurrence twice.
///
/// A schedule that fails part way is logged and listed in
/// [GenerationSummary::failed_schedules]. The occurrences it recorded before
/// the failure are kept and the remaining schedules are still processed.
///
/// # Errors
/// Returns an error if the user's schedules could not be loaded.
pub fn generate_missing_occurrences(
    user_id: UserId,
    today: Date,
    connection: &Connection,
) -> Result<GenerationSummary, Error> {
    let schedules = get_active_schedules_for_user(user_id, connection)?;
    let mut summary = GenerationSummary::default();

    for schedule in &schedules {
        if let Err(error) = materialize_schedule(schedule, today, connection, &mut summary) {
            tracing::error!(
                "could not generate occurrences for schedule {}: {error}",
                schedule.id
            );
            summary.failed_schedules.push(schedule.id);
        }
    }

    tracing::info!(
        "generated occurrences for user {user_id} up to {today}: {} created, {} skipped, {} failed",
        summary.created,
        summary.skipped,
        summary.failed_schedules.len()
    );

    Ok(summary)
}

fn materialize_schedule(
    schedule: &RecurringSchedule,
    today: Date,
    connection: &Connection,
    summary: &mut GenerationSummary,
) -> Result<(), Error> {
    let description = if schedule.description.is_empty() {
        &schedule.title
    } else {
        &schedule.description
    };

    for date in pending_dates(schedule).take_while(|date| *date <= today) {
        let sql_transaction = connection.unchecked_transaction()?;

        let builder = Transaction::build(schedule.amount, schedule.direction, date, description)
            .category(&schedule.category)
            .schedule_id(Some(schedule.id));

        match create_transaction(schedule.user_id, builder, &sql_transaction) {
            Ok(_) => summary.created += 1,
            Err(Error::DuplicateOccurrence) => {
                tracing::debug!(
                    "occurrence of schedule {} on {date} was already recorded",
                    schedule.id
                );
                summary.skipped += 1;
            }
            Err(error) => return Err(error),
        }

        set_last_generated(schedule.id, date, &sql_transaction)?;
        sql_transaction.commit()?;
    }

    Ok(())
}
