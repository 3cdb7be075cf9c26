//! Savings goals and contributions towards them.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    database_id::GoalId,
    user::{UserId, get_user},
};

/// An amount of money a user is saving up towards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    /// The ID of the goal.
    pub id: GoalId,
    /// The user that owns the goal.
    pub user_id: UserId,
    /// What the user is saving for.
    pub name: String,
    /// The amount the user wants to save.
    pub target_amount: f64,
    /// The amount saved so far.
    pub saved_amount: f64,
    /// When the user wants to reach the target, if ever.
    pub target_date: Option<Date>,
    /// The fraction of the target that has been saved, between 0 and 1.
    pub progress: f64,
}

fn progress(saved_amount: f64, target_amount: f64) -> f64 {
    (saved_amount / target_amount).clamp(0.0, 1.0)
}

fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount(amount))
    }
}

/// Create a savings goal for `user_id` with nothing saved.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyName] if `name` is empty or only whitespace,
/// - [Error::InvalidAmount] if `target_amount` is not a positive number,
/// - [Error::InvalidUser] if `user_id` does not refer to a user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_goal(
    user_id: UserId,
    name: &str,
    target_amount: f64,
    target_date: Option<Date>,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }
    let target_amount = validate_amount(target_amount)?;

    let goal = connection
        .prepare(
            "INSERT INTO savings_goal (user_id, name, target_amount, saved_amount, target_date)
             VALUES (?1, ?2, ?3, 0, ?4)
             RETURNING id, user_id, name, target_amount, saved_amount, target_date",
        )?
        .query_row(
            (user_id.as_i64(), name, target_amount, target_date),
            map_goal_row,
        )?;

    Ok(goal)
}

/// Retrieve a savings goal by its `id`.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a goal.
pub fn get_goal(id: GoalId, connection: &Connection) -> Result<SavingsGoal, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, target_amount, saved_amount, target_date
             FROM savings_goal WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_goal_row)
        .map_err(|error| error.into())
}

/// Retrieve all of a user's savings goals in the order they were created.
pub fn get_goals_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<SavingsGoal>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, target_amount, saved_amount, target_date
             FROM savings_goal WHERE user_id = :user_id ORDER BY id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Add `amount` to the saved amount of a goal.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if `amount` is not a positive number or the new
///   saved amount would not be a finite number,
/// - [Error::NotFound] if `id` does not refer to a goal,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn add_contribution(
    id: GoalId,
    amount: f64,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    let amount = validate_amount(amount)?;
    let goal = get_goal(id, connection)?;

    let saved_amount = goal.saved_amount + amount;
    if !saved_amount.is_finite() {
        return Err(Error::InvalidAmount(amount));
    }

    connection.execute(
        "UPDATE savings_goal SET saved_amount = ?1 WHERE id = ?2",
        (saved_amount, id),
    )?;

    Ok(SavingsGoal {
        saved_amount,
        progress: progress(saved_amount, goal.target_amount),
        ..goal
    })
}

/// Delete a savings goal by ID.
///
/// # Errors
/// Returns [Error::NotFound] if the goal does not exist.
pub fn delete_goal(id: GoalId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM savings_goal WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the savings goal table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS savings_goal (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            target_amount REAL NOT NULL,
            saved_amount REAL NOT NULL DEFAULT 0,
            target_date TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_goal_row(row: &Row) -> Result<SavingsGoal, rusqlite::Error> {
    let target_amount = row.get(3)?;
    let saved_amount = row.get(4)?;

    Ok(SavingsGoal {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        name: row.get(2)?,
        target_amount,
        saved_amount,
        target_date: row.get(5)?,
        progress: progress(saved_amount, target_amount),
    })
}

/// The state needed to manage savings goals.
#[derive(Debug, Clone)]
pub struct GoalState {
    /// The database connection for managing goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a savings goal.
#[derive(Debug, Serialize, Deserialize)]
pub struct GoalForm {
    /// What the user is saving for.
    pub name: String,
    /// The amount the user wants to save.
    pub target_amount: f64,
    /// When the user wants to reach the target.
    #[serde(default)]
    pub target_date: Option<Date>,
}

/// The request body for adding money to a savings goal.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContributionForm {
    /// The amount to add.
    pub amount: f64,
}

/// A route handler for creating a savings goal, responds with the new goal.
pub async fn create_goal_endpoint(
    State(state): State<GoalState>,
    Path(user_id): Path<i64>,
    Json(form): Json<GoalForm>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let goal = create_goal(
        UserId::new(user_id),
        &form.name,
        form.target_amount,
        form.target_date,
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(goal)).into_response())
}

/// A route handler for listing a user's savings goals.
pub async fn list_goals_endpoint(
    State(state): State<GoalState>,
    Path(user_id): Path<i64>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user_id = UserId::new(user_id);

    get_user(user_id, &connection)?;
    let goals = get_goals_for_user(user_id, &connection)?;

    Ok(Json(goals).into_response())
}

/// A route handler for getting a single savings goal.
pub async fn get_goal_endpoint(
    State(state): State<GoalState>,
    Path(goal_id): Path<GoalId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let goal = get_goal(goal_id, &connection)?;

    Ok(Json(goal).into_response())
}

/// A route handler for adding money to a savings goal, responds with the
/// updated goal.
pub async fn add_contribution_endpoint(
    State(state): State<GoalState>,
    Path(goal_id): Path<GoalId>,
    Json(form): Json<ContributionForm>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let goal = add_contribution(goal_id, form.amount, &connection)?;

    tracing::info!(
        "added {} to goal {goal_id}, {:.0}% saved",
        form.amount,
        goal.progress * 100.0
    );

    Ok(Json(goal).into_response())
}

/// A route handler for deleting a savings goal.
pub async fn delete_goal_endpoint(
    State(state): State<GoalState>,
    Path(goal_id): Path<GoalId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_goal(goal_id, &connection)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
