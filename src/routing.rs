//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde_json::json;

use crate::{
    AppState,
    calendar::{
        create_event_endpoint, delete_event_endpoint, get_calendar_endpoint, list_events_endpoint,
    },
    endpoints,
    goal::{
        add_contribution_endpoint, create_goal_endpoint, delete_goal_endpoint, get_goal_endpoint,
        list_goals_endpoint,
    },
    occurrence::{generate_occurrences_endpoint, upcoming_occurrences_endpoint},
    schedule::{
        create_schedule_endpoint, delete_schedule_endpoint, get_schedule_endpoint,
        list_schedules_endpoint, set_schedule_active_endpoint, update_schedule_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint,
    },
    user::{create_user_endpoint, get_user_endpoint, update_currency_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::USERS, post(create_user_endpoint))
        .route(endpoints::USER, get(get_user_endpoint))
        .route(endpoints::USER_CURRENCY, put(update_currency_endpoint))
        .route(
            endpoints::USER_SCHEDULES,
            get(list_schedules_endpoint).post(create_schedule_endpoint),
        )
        .route(
            endpoints::SCHEDULE,
            get(get_schedule_endpoint)
                .put(update_schedule_endpoint)
                .delete(delete_schedule_endpoint),
        )
        .route(endpoints::SCHEDULE_ACTIVE, put(set_schedule_active_endpoint))
        .route(endpoints::GENERATE_OCCURRENCES, post(generate_occurrences_endpoint))
        .route(endpoints::UPCOMING_OCCURRENCES, get(upcoming_occurrences_endpoint))
        .route(
            endpoints::USER_TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::USER_CALENDAR, get(get_calendar_endpoint))
        .route(
            endpoints::USER_EVENTS,
            get(list_events_endpoint).post(create_event_endpoint),
        )
        .route(endpoints::EVENT, delete(delete_event_endpoint))
        .route(
            endpoints::USER_GOALS,
            get(list_goals_endpoint).post(create_goal_endpoint),
        )
        .route(
            endpoints::GOAL,
            get(get_goal_endpoint).delete(delete_goal_endpoint),
        )
        .route(endpoints::GOAL_CONTRIBUTIONS, post(add_contribution_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "the requested route does not exist" })),
    )
        .into_response()
}
