//! Route handlers for generating and forecasting occurrences.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    occurrence::{
        ProjectedOccurrence, forecast_end, forecast_upcoming, generate_missing_occurrences,
    },
    schedule::get_active_schedules_for_user,
    timezone::local_today,
    user::{UserId, get_user},
};

/// The state needed to generate and forecast occurrences.
#[derive(Debug, Clone)]
pub struct OccurrenceState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// How many days ahead the forecast looks.
    pub forecast_window_days: u32,
    /// The database connection for reading schedules and writing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for OccurrenceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            forecast_window_days: state.forecast_window_days,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A forecast occurrence with its amount formatted in the user's currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingOccurrence {
    /// The projected occurrence.
    #[serde(flatten)]
    pub occurrence: ProjectedOccurrence,
    /// The signed amount formatted in the user's currency, e.g. "-$45.00".
    pub formatted_amount: String,
}

/// The response body of the upcoming occurrences endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingOccurrences {
    /// The first day of the forecast.
    pub from: Date,
    /// The last day of the forecast.
    pub to: Date,
    /// The ISO 4217 code the amounts are formatted in.
    pub currency: String,
    /// The occurrences sorted by date.
    pub occurrences: Vec<UpcomingOccurrence>,
    /// The sum of the signed amounts, formatted in the user's currency.
    pub formatted_net_amount: String,
}

/// A route handler that records the user's elapsed occurrences as
/// transactions, responds with a summary of the run.
pub async fn generate_occurrences_endpoint(
    State(state): State<OccurrenceState>,
    Path(user_id): Path<i64>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;
    let user_id = UserId::new(user_id);

    get_user(user_id, &connection)?;
    let summary = generate_missing_occurrences(user_id, today, &connection)?;

    Ok(Json(summary).into_response())
}

/// A route handler for the user's upcoming occurrences.
pub async fn upcoming_occurrences_endpoint(
    State(state): State<OccurrenceState>,
    Path(user_id): Path<i64>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;
    let user_id = UserId::new(user_id);

    let user = get_user(user_id, &connection)?;
    let currency_format = user.currency_format()?;
    let schedules = get_active_schedules_for_user(user_id, &connection)?;

    let occurrences = forecast_upcoming(&schedules, today, state.forecast_window_days);
    let net_amount: f64 = occurrences.iter().map(|o| o.signed_amount()).sum();

    let occurrences = occurrences
        .into_iter()
        .map(|occurrence| UpcomingOccurrence {
            formatted_amount: currency_format.format(occurrence.signed_amount()),
            occurrence,
        })
        .collect();

    Ok(Json(UpcomingOccurrences {
        from: today,
        to: forecast_end(today, state.forecast_window_days),
        currency: currency_format.code().to_owned(),
        occurrences,
        formatted_net_amount: currency_format.format(net_amount),
    })
    .into_response())
}
