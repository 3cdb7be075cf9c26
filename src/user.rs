//! User profiles and their currency preference.

use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, app_state::lock_connection, currency::CurrencyFormat};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application and their preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The name shown to the user.
    pub display_name: String,
    /// The ISO 4217 code of the currency the user's amounts are shown in.
    pub currency: String,
}

impl UserProfile {
    /// The formatter for the user's preferred currency.
    ///
    /// # Errors
    /// Returns [Error::UnknownCurrency] if the stored code is not supported.
    pub fn currency_format(&self) -> Result<CurrencyFormat, Error> {
        CurrencyFormat::new(&self.currency)
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                display_name TEXT NOT NULL,
                currency TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// This function will return a:
/// - [Error::EmptyName] if `display_name` is empty or only whitespace,
/// - [Error::UnknownCurrency] if `currency` is not a supported currency code,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_user(
    display_name: &str,
    currency: &str,
    connection: &Connection,
) -> Result<UserProfile, Error> {
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err(Error::EmptyName);
    }

    let currency = CurrencyFormat::new(currency)?.code();

    connection.execute(
        "INSERT INTO user (display_name, currency) VALUES (?1, ?2)",
        (display_name, currency),
    )?;

    let id = UserId::new(connection.last_insert_rowid());

    Ok(UserProfile {
        id,
        display_name: display_name.to_owned(),
        currency: currency.to_owned(),
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user(user_id: UserId, connection: &Connection) -> Result<UserProfile, Error> {
    connection
        .prepare("SELECT id, display_name, currency FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], |row| {
            Ok(UserProfile {
                id: UserId::new(row.get(0)?),
                display_name: row.get(1)?,
                currency: row.get(2)?,
            })
        })
        .map_err(|error| error.into())
}

/// Change the currency preference of a user.
///
/// # Errors
///
/// This function will return a:
/// - [Error::UnknownCurrency] if `currency` is not a supported currency code,
/// - [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn update_currency(
    user_id: UserId,
    currency: &str,
    connection: &Connection,
) -> Result<UserProfile, Error> {
    let currency = CurrencyFormat::new(currency)?.code();

    let rows_affected = connection.execute(
        "UPDATE user SET currency = ?1 WHERE id = ?2",
        (currency, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_user(user_id, connection)
}

/// The state needed to manage user profiles.
#[derive(Debug, Clone)]
pub struct UserState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a user.
#[derive(Debug, Serialize, Deserialize)]
pub struct NewUserForm {
    /// The name shown to the user.
    pub display_name: String,
    /// The ISO 4217 code of the user's preferred currency.
    pub currency: String,
}

/// The request body for changing a user's currency.
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrencyForm {
    /// The ISO 4217 code of the user's preferred currency.
    pub currency: String,
}

/// A route handler for creating a new user profile, responds with the profile.
pub async fn create_user_endpoint(
    State(state): State<UserState>,
    Json(form): Json<NewUserForm>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let user = create_user(&form.display_name, &form.currency, &connection)
        .inspect_err(|error| tracing::error!("could not create user with {form:?}: {error}"))?;

    tracing::info!("created user {}", user.id);

    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// A route handler for getting a user profile.
pub async fn get_user_endpoint(
    State(state): State<UserState>,
    Path(user_id): Path<i64>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let user = get_user(UserId::new(user_id), &connection)?;

    Ok(Json(user).into_response())
}

/// A route handler for changing a user's currency preference.
pub async fn update_currency_endpoint(
    State(state): State<UserState>,
    Path(user_id): Path<i64>,
    Json(form): Json<CurrencyForm>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let user = update_currency(UserId::new(user_id), &form.currency, &connection)?;

    Ok(Json(user).into_response())
}

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        user::{UserId, create_user, get_user, update_currency},
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_user_normalises_fields() {
        let conn = get_test_connection();

        let user = create_user("  Sam ", "nzd", &conn).unwrap();

        assert_eq!(user.display_name, "Sam");
        assert_eq!(user.currency, "NZD");
        assert_eq!(get_user(user.id, &conn), Ok(user));
    }

    #[test]
    fn create_user_rejects_empty_name() {
        let conn = get_test_connection();

        assert_eq!(create_user(" ", "NZD", &conn), Err(Error::EmptyName));
    }

    #[test]
    fn create_user_rejects_unknown_currency() {
        let conn = get_test_connection();

        assert_eq!(
            create_user("Sam", "ABC", &conn),
            Err(Error::UnknownCurrency("ABC".to_owned()))
        );
    }

    #[test]
    fn get_user_fails_on_missing_id() {
        let conn = get_test_connection();

        assert_eq!(get_user(UserId::new(42), &conn), Err(Error::NotFound));
    }

    #[test]
    fn update_currency_succeeds() {
        let conn = get_test_connection();
        let user = create_user("Sam", "NZD", &conn).unwrap();

        let updated = update_currency(user.id, "EUR", &conn).unwrap();

        assert_eq!(updated.currency, "EUR");
        assert_eq!(get_user(user.id, &conn).unwrap().currency, "EUR");
    }

    #[test]
    fn update_currency_fails_on_missing_user() {
        let conn = get_test_connection();

        assert_eq!(
            update_currency(UserId::new(42), "EUR", &conn),
            Err(Error::NotFound)
        );
    }
}
