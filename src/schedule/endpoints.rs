//! Route handlers for managing recurring schedules.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    app_state::lock_connection,
    database_id::ScheduleId,
    schedule::{
        ScheduleBuilder, create_schedule, delete_schedule, get_schedule, get_schedules_for_user,
        set_schedule_active, update_schedule,
    },
    user::{UserId, get_user},
};

/// The state needed to manage recurring schedules.
#[derive(Debug, Clone)]
pub struct ScheduleState {
    /// The database connection for managing schedules.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ScheduleState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for turning a schedule on or off.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActiveForm {
    /// Whether the schedule should be active.
    pub is_active: bool,
}

/// A route handler for creating a schedule, responds with the new schedule.
pub async fn create_schedule_endpoint(
    State(state): State<ScheduleState>,
    Path(user_id): Path<i64>,
    Json(builder): Json<ScheduleBuilder>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let schedule = create_schedule(UserId::new(user_id), builder, &connection)?;

    tracing::info!(
        "created {} schedule {} for user {user_id}",
        schedule.frequency,
        schedule.id
    );

    Ok((StatusCode::CREATED, Json(schedule)).into_response())
}

/// A route handler for listing a user's schedules.
pub async fn list_schedules_endpoint(
    State(state): State<ScheduleState>,
    Path(user_id): Path<i64>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user_id = UserId::new(user_id);

    // An empty list would hide a typo in the user ID.
    get_user(user_id, &connection)?;
    let schedules = get_schedules_for_user(user_id, &connection)?;

    Ok(Json(schedules).into_response())
}

/// A route handler for getting a single schedule.
pub async fn get_schedule_endpoint(
    State(state): State<ScheduleState>,
    Path(schedule_id): Path<ScheduleId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let schedule = get_schedule(schedule_id, &connection)?;

    Ok(Json(schedule).into_response())
}

/// A route handler for replacing the editable fields of a schedule.
pub async fn update_schedule_endpoint(
    State(state): State<ScheduleState>,
    Path(schedule_id): Path<ScheduleId>,
    Json(builder): Json<ScheduleBuilder>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let schedule = update_schedule(schedule_id, builder, &connection)?;

    Ok(Json(schedule).into_response())
}

/// A route handler for turning a schedule on or off.
pub async fn set_schedule_active_endpoint(
    State(state): State<ScheduleState>,
    Path(schedule_id): Path<ScheduleId>,
    Json(form): Json<ActiveForm>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let schedule = set_schedule_active(schedule_id, form.is_active, &connection)?;

    Ok(Json(schedule).into_response())
}

/// A route handler for deleting a schedule.
pub async fn delete_schedule_endpoint(
    State(state): State<ScheduleState>,
    Path(schedule_id): Path<ScheduleId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_schedule(schedule_id, &connection)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
