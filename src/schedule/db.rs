//! Database operations for recurring schedules.

use rusqlite::{Connection, Row};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::ScheduleId,
    schedule::{RecurringSchedule, ScheduleBuilder},
    user::UserId,
};

const SCHEDULE_COLUMNS: &str = "id, user_id, title, amount, direction, category, description, \
    frequency, start_date, end_date, last_generated, is_active, created_at, updated_at";

/// Create a new schedule for `user_id` from a builder.
///
/// The builder is validated before it is written.
///
/// # Errors
/// This function will return a:
/// - validation error from [ScheduleBuilder::validate],
/// - [Error::InvalidUser] if `user_id` does not refer to a user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_schedule(
    user_id: UserId,
    builder: ScheduleBuilder,
    connection: &Connection,
) -> Result<RecurringSchedule, Error> {
    let builder = builder.validate()?;
    let now = OffsetDateTime::now_utc();

    let schedule = connection
        .prepare(&format!(
            "INSERT INTO recurring_schedule (user_id, title, amount, direction, category, \
                description, frequency, start_date, end_date, last_generated, is_active, \
                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL, ?10, ?11, ?11)
             RETURNING {SCHEDULE_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                &builder.title,
                builder.amount,
                builder.direction,
                &builder.category,
                &builder.description,
                builder.frequency,
                builder.start_date,
                builder.end_date,
                builder.is_active,
                now,
            ),
            map_schedule_row,
        )?;

    Ok(schedule)
}

/// Retrieve a schedule by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid schedule,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_schedule(id: ScheduleId, connection: &Connection) -> Result<RecurringSchedule, Error> {
    connection
        .prepare(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM recurring_schedule WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_schedule_row)
        .map_err(|error| error.into())
}

/// Retrieve all schedules belonging to `user_id`, active or not, ordered by
/// start date.
pub fn get_schedules_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<RecurringSchedule>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM recurring_schedule
             WHERE user_id = :user_id
             ORDER BY start_date ASC, id ASC"
        ))?
        .query_map(&[(":user_id", &user_id.as_i64())], map_schedule_row)?
        .map(|maybe_schedule| maybe_schedule.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the active schedules belonging to `user_id`.
pub fn get_active_schedules_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<RecurringSchedule>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM recurring_schedule
             WHERE user_id = :user_id AND is_active = 1
             ORDER BY start_date ASC, id ASC"
        ))?
        .query_map(&[(":user_id", &user_id.as_i64())], map_schedule_row)?
        .map(|maybe_schedule| maybe_schedule.map_err(|error| error.into()))
        .collect()
}

/// Replace the user-editable fields of a schedule.
///
/// `last_generated` is kept, so editing a schedule does not re-materialize
/// occurrences that were already recorded.
///
/// # Errors
/// Returns [Error::NotFound] if the schedule does not exist, or a validation
/// error from [ScheduleBuilder::validate].
pub fn update_schedule(
    id: ScheduleId,
    builder: ScheduleBuilder,
    connection: &Connection,
) -> Result<RecurringSchedule, Error> {
    let builder = builder.validate()?;

    connection
        .prepare(&format!(
            "UPDATE recurring_schedule
             SET title = ?1, amount = ?2, direction = ?3, category = ?4, description = ?5,
                 frequency = ?6, start_date = ?7, end_date = ?8, is_active = ?9, updated_at = ?10
             WHERE id = ?11
             RETURNING {SCHEDULE_COLUMNS}"
        ))?
        .query_row(
            (
                &builder.title,
                builder.amount,
                builder.direction,
                &builder.category,
                &builder.description,
                builder.frequency,
                builder.start_date,
                builder.end_date,
                builder.is_active,
                OffsetDateTime::now_utc(),
                id,
            ),
            map_schedule_row,
        )
        .map_err(|error| error.into())
}

/// Turn a schedule on or off.
///
/// # Errors
/// Returns [Error::NotFound] if the schedule does not exist.
pub fn set_schedule_active(
    id: ScheduleId,
    is_active: bool,
    connection: &Connection,
) -> Result<RecurringSchedule, Error> {
    connection
        .prepare(&format!(
            "UPDATE recurring_schedule SET is_active = ?1, updated_at = ?2 WHERE id = ?3
             RETURNING {SCHEDULE_COLUMNS}"
        ))?
        .query_row(
            (is_active, OffsetDateTime::now_utc(), id),
            map_schedule_row,
        )
        .map_err(|error| error.into())
}

/// Record `date` as the most recent materialized occurrence of a schedule.
///
/// # Errors
/// Returns [Error::NotFound] if the schedule does not exist.
pub fn set_last_generated(
    id: ScheduleId,
    date: Date,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE recurring_schedule SET last_generated = ?1, updated_at = ?2 WHERE id = ?3",
        (date, OffsetDateTime::now_utc(), id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete a schedule by ID.
///
/// Transactions that were materialized from the schedule are kept, their
/// schedule reference is cleared.
///
/// # Errors
/// Returns [Error::NotFound] if the schedule does not exist.
pub fn delete_schedule(id: ScheduleId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM recurring_schedule WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the recurring schedule table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_schedule_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS recurring_schedule (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            amount REAL NOT NULL,
            direction TEXT NOT NULL,
            category TEXT NOT NULL,
            description TEXT NOT NULL,
            frequency TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT,
            last_generated TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_recurring_schedule_user
            ON recurring_schedule(user_id, is_active);",
    )?;

    Ok(())
}

/// Map a database row to a [RecurringSchedule].
fn map_schedule_row(row: &Row) -> Result<RecurringSchedule, rusqlite::Error> {
    Ok(RecurringSchedule {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        title: row.get(2)?,
        amount: row.get(3)?,
        direction: row.get(4)?,
        category: row.get(5)?,
        description: row.get(6)?,
        frequency: row.get(7)?,
        start_date: row.get(8)?,
        end_date: row.get(9)?,
        last_generated: row.get(10)?,
        is_active: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}
