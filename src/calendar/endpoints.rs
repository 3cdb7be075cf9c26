//! Route handlers for the calendar and calendar events.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    calendar::{
        CalendarEntry, CalendarRange, build_calendar, create_event, delete_event,
        get_events_for_user, get_events_in_range,
    },
    database_id::EventId,
    occurrence::{FORECAST_WINDOW_DAYS, forecast_end},
    schedule::get_active_schedules_for_user,
    timezone::local_today,
    user::{UserId, get_user},
};

/// The state needed to show calendars and manage calendar events.
#[derive(Debug, Clone)]
pub struct CalendarState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for reading events and schedules.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CalendarState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters of the calendar endpoint.
///
/// `from` defaults to today and `to` defaults to 30 days after `from`.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    /// The first day to show.
    pub from: Option<Date>,
    /// The last day to show.
    pub to: Option<Date>,
}

/// The response body of the calendar endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    /// The first day of the calendar.
    pub from: Date,
    /// The last day of the calendar.
    pub to: Date,
    /// The events and occurrences sorted by date.
    pub entries: Vec<CalendarEntry>,
}

/// The request body for creating a calendar event.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventForm {
    /// A short name for the event.
    pub title: String,
    /// Free-text notes about the event.
    #[serde(default)]
    pub description: String,
    /// The day the event happens on.
    pub date: Date,
}

/// A route handler for a user's calendar over a range of days.
pub async fn get_calendar_endpoint(
    State(state): State<CalendarState>,
    Path(user_id): Path<i64>,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, Error> {
    let from = match query.from {
        Some(from) => from,
        None => local_today(&state.local_timezone)?,
    };
    let to = query
        .to
        .unwrap_or_else(|| forecast_end(from, FORECAST_WINDOW_DAYS));
    let range = CalendarRange::new(from, to)?;

    let connection = lock_connection(&state.db_connection)?;
    let user_id = UserId::new(user_id);
    get_user(user_id, &connection)?;

    let events = get_events_in_range(user_id, range, &connection)?;
    let schedules = get_active_schedules_for_user(user_id, &connection)?;

    Ok(Json(Calendar {
        from,
        to,
        entries: build_calendar(&events, &schedules, range),
    })
    .into_response())
}

/// A route handler for listing all of a user's calendar events.
pub async fn list_events_endpoint(
    State(state): State<CalendarState>,
    Path(user_id): Path<i64>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user_id = UserId::new(user_id);

    get_user(user_id, &connection)?;
    let events = get_events_for_user(user_id, &connection)?;

    Ok(Json(events).into_response())
}

/// A route handler for creating a calendar event, responds with the new event.
pub async fn create_event_endpoint(
    State(state): State<CalendarState>,
    Path(user_id): Path<i64>,
    Json(form): Json<EventForm>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let event = create_event(
        UserId::new(user_id),
        &form.title,
        &form.description,
        form.date,
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(event)).into_response())
}

/// A route handler for deleting a calendar event.
pub async fn delete_event_endpoint(
    State(state): State<CalendarState>,
    Path(event_id): Path<EventId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_event(event_id, &connection)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        AppState, build_router,
        calendar::{CalendarEntry, CalendarEvent, endpoints::Calendar},
        endpoints,
        endpoints::format_endpoint,
        user::create_user,
    };

    fn get_test_server() -> (TestServer, i64) {
        let state = AppState::new(Connection::open_in_memory().unwrap(), "Etc/UTC").unwrap();
        let user = create_user("Sam", "NZD", &state.db_connection.lock().unwrap()).unwrap();
        let server = TestServer::try_new(build_router(state)).expect("Could not create test server.");

        (server, user.id.as_i64())
    }

    #[tokio::test]
    async fn calendar_merges_events_and_schedules() {
        let (server, user_id) = get_test_server();
        let exam = server
            .post(&format_endpoint(endpoints::USER_EVENTS, user_id))
            .json(&json!({ "title": "Exam", "date": "2024-06-03" }))
            .await
            .json::<CalendarEvent>();
        server
            .post(&format_endpoint(endpoints::USER_SCHEDULES, user_id))
            .json(&json!({
                "title": "Rent",
                "amount": 450.0,
                "direction": "expense",
                "frequency": "weekly",
                "start_date": "2024-06-03",
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let calendar = server
            .get(&format_endpoint(endpoints::USER_CALENDAR, user_id))
            .add_query_param("from", "2024-06-01")
            .add_query_param("to", "2024-06-09")
            .await
            .json::<Calendar>();

        assert_eq!(calendar.from, date!(2024 - 06 - 01));
        assert_eq!(calendar.entries.len(), 2);
        assert_eq!(calendar.entries[0], CalendarEntry::Event(exam));
        assert!(matches!(
            &calendar.entries[1],
            CalendarEntry::Occurrence(occurrence) if occurrence.title == "Rent"
        ));
    }

    #[tokio::test]
    async fn calendar_rejects_reversed_range() {
        let (server, user_id) = get_test_server();

        server
            .get(&format_endpoint(endpoints::USER_CALENDAR, user_id))
            .add_query_param("from", "2024-06-09")
            .add_query_param("to", "2024-06-01")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn calendar_rejects_range_spanning_millennia() {
        let (server, user_id) = get_test_server();

        server
            .get(&format_endpoint(endpoints::USER_CALENDAR, user_id))
            .add_query_param("from", "0001-01-01")
            .add_query_param("to", "9999-12-31")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn calendar_for_missing_user_is_not_found() {
        let (server, user_id) = get_test_server();

        server
            .get(&format_endpoint(endpoints::USER_CALENDAR, user_id + 1))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn create_list_and_delete_event() {
        let (server, user_id) = get_test_server();

        let response = server
            .post(&format_endpoint(endpoints::USER_EVENTS, user_id))
            .json(&json!({ "title": "Birthday", "description": "Cake", "date": "2024-08-19" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let event = response.json::<CalendarEvent>();

        let listed = server
            .get(&format_endpoint(endpoints::USER_EVENTS, user_id))
            .await
            .json::<Vec<CalendarEvent>>();
        assert_eq!(listed, vec![event.clone()]);

        server
            .delete(&format_endpoint(endpoints::EVENT, event.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete(&format_endpoint(endpoints::EVENT, event.id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn create_event_rejects_empty_title() {
        let (server, user_id) = get_test_server();

        server
            .post(&format_endpoint(endpoints::USER_EVENTS, user_id))
            .json(&json!({ "title": " ", "date": "2024-08-19" }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
