//! WealthWise is a web service for tracking personal finances.
//!
//! It records income and expenses, projects recurring transactions forward in
//! time, materializes the occurrences that have already elapsed, and merges
//! projected occurrences with calendar events.
//!
//! This library provides a JSON API over a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use time::Date;
use tokio::signal;

mod app_state;
mod calendar;
mod currency;
mod database_id;
mod db;
mod endpoints;
mod goal;
mod logging;
mod occurrence;
mod routing;
mod schedule;
mod timezone;
mod transaction;
mod user;

pub use app_state::AppState;
pub use calendar::{
    CalendarEntry, CalendarEvent, CalendarRange, MAX_CALENDAR_DAYS, build_calendar,
};
pub use currency::CurrencyFormat;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use occurrence::{
    FORECAST_WINDOW_DAYS, GenerationSummary, ProjectedOccurrence, forecast_upcoming,
    generate_missing_occurrences,
};
pub use routing::build_router;
pub use schedule::{Direction, Frequency, RecurringSchedule, ScheduleBuilder};
pub use timezone::local_today;
pub use transaction::{Transaction, TransactionBuilder};
pub use user::{UserId, UserProfile, get_user};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An empty string was used for a schedule or event title.
    #[error("title cannot be empty")]
    EmptyTitle,

    /// An empty string was used for a display name or goal name.
    #[error("name cannot be empty")]
    EmptyName,

    /// An empty string was used for a category label.
    #[error("category cannot be empty")]
    EmptyCategory,

    /// A monetary amount was zero, negative, NaN or infinite.
    ///
    /// Amounts are stored as positive magnitudes, the direction (income or
    /// expense) carries the sign.
    #[error("{0} is not a valid amount, amounts must be positive numbers")]
    InvalidAmount(f64),

    /// A recurring schedule was given an end date before its start date.
    #[error("the end date {end} is before the start date {start}")]
    EndBeforeStart {
        /// The first occurrence of the schedule.
        start: Date,
        /// The requested last day of the schedule.
        end: Date,
    },

    /// A frequency tag did not match any known frequency.
    #[error("\"{0}\" is not a valid frequency")]
    InvalidFrequency(String),

    /// A direction tag was neither "income" nor "expense".
    #[error("\"{0}\" is not a valid direction")]
    InvalidDirection(String),

    /// A date range ended before it started.
    #[error("the date range {start} to {end} ends before it starts")]
    InvalidDateRange {
        /// The first day of the range.
        start: Date,
        /// The last day of the range.
        end: Date,
    },

    /// A date range covered more days than allowed.
    #[error("the date range {start} to {end} is longer than {max_days} days")]
    DateRangeTooLong {
        /// The first day of the range.
        start: Date,
        /// The last day of the range.
        end: Date,
        /// The most days a range may cover.
        max_days: i64,
    },

    /// The currency code is not one the application knows how to format.
    #[error("\"{0}\" is not a supported currency code")]
    UnknownCurrency(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// A record referred to a user that does not exist.
    #[error("the user ID does not refer to a valid user")]
    InvalidUser,

    /// The occurrence of the schedule has already been materialized.
    ///
    /// The database enforces that each schedule has at most one transaction
    /// per occurrence date, so concurrent or repeated generation runs cannot
    /// record the same occurrence twice.
    #[error("the occurrence has already been recorded")]
    DuplicateOccurrence,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidUser,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::EmptyTitle
            | Error::EmptyName
            | Error::EmptyCategory
            | Error::InvalidAmount(_)
            | Error::EndBeforeStart { .. }
            | Error::InvalidFrequency(_)
            | Error::InvalidDirection(_)
            | Error::InvalidDateRange { .. }
            | Error::DateRangeTooLong { .. }
            | Error::UnknownCurrency(_)
            | Error::InvalidUser => StatusCode::UNPROCESSABLE_ENTITY,
            Error::DuplicateOccurrence => StatusCode::CONFLICT,
            Error::InvalidTimezone(_) | Error::DatabaseLockError | Error::SqlError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            Error::InvalidTimezone(timezone) => {
                tracing::error!("could not get local timezone \"{timezone}\"");
                format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                )
            }
            // Internal errors are not intended to be shown to the client.
            error if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", error);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            error => error.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_response_tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use serde_json::Value;
    use time::macros::date;

    use crate::Error;

    async fn error_body(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("could not read response body");

        (status, serde_json::from_slice(&bytes).expect("body is not JSON"))
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let (status, body) = error_body(Error::NotFound).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "the requested resource could not be found");
    }

    #[tokio::test]
    async fn validation_errors_are_shown_to_client() {
        let (status, body) = error_body(Error::EndBeforeStart {
            start: date!(2024 - 02 - 01),
            end: date!(2024 - 01 - 01),
        })
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["error"],
            "the end date 2024-01-01 is before the start date 2024-02-01"
        );
    }

    #[tokio::test]
    async fn sql_errors_are_hidden_from_client() {
        let (status, body) = error_body(Error::SqlError(rusqlite::Error::InvalidQuery)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("SQL"));
    }

    #[tokio::test]
    async fn duplicate_occurrence_is_conflict() {
        let (status, _) = error_body(Error::DuplicateOccurrence).await;

        assert_eq!(status, StatusCode::CONFLICT);
    }
}
