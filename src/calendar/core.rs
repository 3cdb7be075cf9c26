//! Calendar events and their database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, calendar::CalendarRange, database_id::EventId, user::UserId};

/// A one-off entry on a user's calendar, e.g. an exam or a birthday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// The ID of the event.
    pub id: EventId,
    /// The user that owns the event.
    pub user_id: UserId,
    /// A short name for the event.
    pub title: String,
    /// Free-text notes about the event.
    pub description: String,
    /// The day the event happens on.
    pub date: Date,
}

/// Create a calendar event for `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyTitle] if `title` is empty or only whitespace,
/// - [Error::InvalidUser] if `user_id` does not refer to a user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_event(
    user_id: UserId,
    title: &str,
    description: &str,
    date: Date,
    connection: &Connection,
) -> Result<CalendarEvent, Error> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::EmptyTitle);
    }

    let event = connection
        .prepare(
            "INSERT INTO calendar_event (user_id, title, description, date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, title, description, date",
        )?
        .query_row(
            (user_id.as_i64(), title, description.trim(), date),
            map_event_row,
        )?;

    Ok(event)
}

/// Retrieve all of a user's events, ordered by date.
pub fn get_events_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<CalendarEvent>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, title, description, date FROM calendar_event
             WHERE user_id = :user_id
             ORDER BY date ASC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_event_row)?
        .map(|maybe_event| maybe_event.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a user's events that fall within `range`, ordered by date.
pub fn get_events_in_range(
    user_id: UserId,
    range: CalendarRange,
    connection: &Connection,
) -> Result<Vec<CalendarEvent>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, title, description, date FROM calendar_event
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date ASC, id ASC",
        )?
        .query_map((user_id.as_i64(), range.start(), range.end()), map_event_row)?
        .map(|maybe_event| maybe_event.map_err(|error| error.into()))
        .collect()
}

/// Delete a calendar event by ID.
///
/// # Errors
/// Returns [Error::NotFound] if the event does not exist.
pub fn delete_event(id: EventId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM calendar_event WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the calendar event table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_event_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS calendar_event (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_calendar_event_user_date ON calendar_event(user_id, date);",
    )?;

    Ok(())
}

fn map_event_row(row: &Row) -> Result<CalendarEvent, rusqlite::Error> {
    Ok(CalendarEvent {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        date: row.get(4)?,
    })
}
