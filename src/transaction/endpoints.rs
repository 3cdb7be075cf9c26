//! Route handlers for logging, listing and deleting transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    database_id::TransactionId,
    schedule::Direction,
    transaction::{
        Transaction, create_transaction, delete_transaction, get_transaction,
        get_transactions_for_user,
    },
    user::{UserId, get_user},
};

/// The state needed to manage transactions.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for logging a transaction by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionForm {
    /// The positive amount of money spent or earned.
    pub amount: f64,
    /// Whether money was earned or spent.
    pub direction: Direction,
    /// The category label, defaults to "Uncategorized".
    #[serde(default)]
    pub category: Option<String>,
    /// What the transaction was for.
    #[serde(default)]
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
}

/// A route handler for logging a transaction, responds with the new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(user_id): Path<i64>,
    Json(form): Json<TransactionForm>,
) -> Result<Response, Error> {
    let mut builder = Transaction::build(form.amount, form.direction, form.date, &form.description);
    if let Some(category) = &form.category {
        builder = builder.category(category);
    }

    let connection = lock_connection(&state.db_connection)?;
    let transaction = create_transaction(UserId::new(user_id), builder, &connection)
        .inspect_err(|error| match error {
            Error::SqlError(_) => {
                tracing::error!("could not create transaction with {form:?}: {error}")
            }
            _ => tracing::debug!("rejected transaction {form:?}: {error}"),
        })?;

    Ok((StatusCode::CREATED, Json(transaction)).into_response())
}

/// A route handler for listing a user's transactions, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Path(user_id): Path<i64>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user_id = UserId::new(user_id);

    get_user(user_id, &connection)?;
    let transactions = get_transactions_for_user(user_id, &connection)?;

    Ok(Json(transactions).into_response())
}

/// A route handler for getting a single transaction.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let transaction = get_transaction(transaction_id, &connection)?;

    Ok(Json(transaction).into_response())
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_transaction(transaction_id, &connection)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
