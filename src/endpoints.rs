//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/users/{user_id}', use [format_endpoint].

/// The route to get a cup of coffee.
pub const COFFEE: &str = "/coffee";
/// The route to create a user profile.
pub const USERS: &str = "/api/users";
/// The route to access a single user profile.
pub const USER: &str = "/api/users/{user_id}";
/// The route to change a user's currency preference.
pub const USER_CURRENCY: &str = "/api/users/{user_id}/currency";
/// The route to list and create a user's recurring schedules.
pub const USER_SCHEDULES: &str = "/api/users/{user_id}/schedules";
/// The route to get, replace and delete a single schedule.
pub const SCHEDULE: &str = "/api/schedules/{schedule_id}";
/// The route to turn a schedule on or off.
pub const SCHEDULE_ACTIVE: &str = "/api/schedules/{schedule_id}/active";
/// The route to materialize a user's elapsed occurrences.
pub const GENERATE_OCCURRENCES: &str = "/api/users/{user_id}/occurrences/generate";
/// The route to forecast a user's upcoming occurrences.
pub const UPCOMING_OCCURRENCES: &str = "/api/users/{user_id}/occurrences/upcoming";
/// The route to list and create a user's transactions.
pub const USER_TRANSACTIONS: &str = "/api/users/{user_id}/transactions";
/// The route to get and delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to get a user's calendar.
pub const USER_CALENDAR: &str = "/api/users/{user_id}/calendar";
/// The route to list and create a user's calendar events.
pub const USER_EVENTS: &str = "/api/users/{user_id}/events";
/// The route to delete a single calendar event.
pub const EVENT: &str = "/api/events/{event_id}";
/// The route to list and create a user's savings goals.
pub const USER_GOALS: &str = "/api/users/{user_id}/goals";
/// The route to get and delete a single savings goal.
pub const GOAL: &str = "/api/goals/{goal_id}";
/// The route to add money to a savings goal.
pub const GOAL_CONTRIBUTIONS: &str = "/api/goals/{goal_id}/contributions";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
