//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{ScheduleId, TransactionId},
    schedule::Direction,
    user::UserId,
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions are either logged by the user or materialized from an
/// occurrence of a recurring schedule.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user the transaction belongs to.
    pub user_id: UserId,
    /// The positive amount of money spent or earned in this transaction.
    pub amount: f64,
    /// Whether money was earned or spent.
    pub direction: Direction,
    /// The category label, e.g. "Groceries".
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// The schedule this transaction was materialized from, if any.
    pub schedule_id: Option<ScheduleId>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: f64,
        direction: Direction,
        date: Date,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            direction,
            category: "Uncategorized".to_owned(),
            description: description.to_owned(),
            date,
            schedule_id: None,
        }
    }

    /// The amount with the sign of the transaction's direction applied.
    pub fn signed_amount(&self) -> f64 {
        self.direction.signed(self.amount)
    }
}

/// A builder for creating [Transaction] instances.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The positive amount of money spent or earned.
    pub amount: f64,
    /// Whether money was earned or spent.
    pub direction: Direction,
    /// The category label.
    pub category: String,
    /// A human-readable description of the transaction.
    pub description: String,
    /// The date when the transaction occurred.
    pub date: Date,
    /// The schedule the transaction was materialized from.
    ///
    /// - `Some(id)` - Transaction is an occurrence of schedule `id`
    /// - `None` - Transaction was created manually by the user
    ///
    /// # Duplicate Prevention
    /// The database enforces uniqueness on the pair (schedule ID, date).
    /// Attempting to record the same occurrence twice fails with
    /// [Error::DuplicateOccurrence].
    pub schedule_id: Option<ScheduleId>,
}

impl TransactionBuilder {
    /// Set the category label for the transaction.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Set the schedule the transaction was materialized from.
    pub fn schedule_id(mut self, schedule_id: Option<ScheduleId>) -> Self {
        self.schedule_id = schedule_id;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction for `user_id` in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is not a positive, finite number,
/// - [Error::EmptyCategory] if the category is empty,
/// - [Error::DuplicateOccurrence] if the schedule already has a transaction on that date,
/// - [Error::InvalidUser] if `user_id` (or the schedule ID) does not refer to a record,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !builder.amount.is_finite() || builder.amount <= 0.0 {
        return Err(Error::InvalidAmount(builder.amount));
    }

    let category = builder.category.trim();
    if category.is_empty() {
        return Err(Error::EmptyCategory);
    }

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, amount, direction, category, description, date, schedule_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, amount, direction, category, description, date, schedule_id",
        )?
        .query_row(
            (
                user_id.as_i64(),
                builder.amount,
                builder.direction,
                category,
                builder.description.trim(),
                builder.date,
                builder.schedule_id,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateOccurrence,
            error => error.into(),
        })?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, amount, direction, category, description, date, schedule_id
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve the transactions of `user_id`, newest first.
pub fn get_transactions_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, direction, category, description, date, schedule_id
             FROM \"transaction\" WHERE user_id = :user_id
             ORDER BY date DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the transactions materialized from `schedule_id`, oldest first.
#[cfg(test)]
pub fn get_transactions_for_schedule(
    schedule_id: ScheduleId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, direction, category, description, date, schedule_id
             FROM \"transaction\" WHERE schedule_id = :schedule_id
             ORDER BY date ASC",
        )?
        .query_map(&[(":schedule_id", &schedule_id)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Delete a transaction by ID.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id",
        &[(":id", &id)],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            direction TEXT NOT NULL,
            category TEXT NOT NULL,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            schedule_id INTEGER,
            UNIQUE(schedule_id, date),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(schedule_id) REFERENCES recurring_schedule(id)
                ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        amount: row.get(2)?,
        direction: row.get(3)?,
        category: row.get(4)?,
        description: row.get(5)?,
        date: row.get(6)?,
        schedule_id: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        schedule::{Direction, Frequency, RecurringSchedule, create_schedule, delete_schedule},
        transaction::{
            Transaction, create_transaction, delete_transaction, get_transaction,
            get_transactions_for_schedule, get_transactions_for_user,
        },
        user::{UserId, create_user},
    };

    fn get_test_connection() -> (Connection, UserId) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user("Test", "USD", &conn).unwrap();
        (conn, user.id)
    }

    #[test]
    fn create_succeeds() {
        let (conn, user_id) = get_test_connection();
        let amount = 12.3;

        let result = create_transaction(
            user_id,
            Transaction::build(amount, Direction::Expense, date!(2025 - 10 - 05), "Lunch")
                .category("Food"),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.signed_amount(), -amount);
                assert_eq!(transaction.category, "Food");
                assert_eq!(transaction.schedule_id, None);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_fails_on_non_positive_amount() {
        let (conn, user_id) = get_test_connection();

        let result = create_transaction(
            user_id,
            Transaction::build(0.0, Direction::Income, date!(2025 - 10 - 05), ""),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidAmount(0.0)));
    }

    #[test]
    fn create_fails_on_invalid_user() {
        let (conn, user_id) = get_test_connection();

        let result = create_transaction(
            UserId::new(user_id.as_i64() + 1),
            Transaction::build(1.0, Direction::Income, date!(2025 - 10 - 05), ""),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidUser));
    }

    #[test]
    fn create_fails_on_duplicate_occurrence() {
        let (conn, user_id) = get_test_connection();
        let schedule = create_schedule(
            user_id,
            RecurringSchedule::build(
                "Rent",
                450.0,
                Direction::Expense,
                Frequency::Weekly,
                date!(2025 - 10 - 01),
            ),
            &conn,
        )
        .unwrap();
        let builder = Transaction::build(450.0, Direction::Expense, date!(2025 - 10 - 01), "Rent")
            .schedule_id(Some(schedule.id));
        create_transaction(user_id, builder.clone(), &conn).expect("Could not create transaction");

        let duplicate = create_transaction(user_id, builder, &conn);

        assert_eq!(duplicate, Err(Error::DuplicateOccurrence));
    }

    #[test]
    fn manual_transactions_on_same_date_are_allowed() {
        let (conn, user_id) = get_test_connection();
        let builder = Transaction::build(5.0, Direction::Expense, date!(2025 - 10 - 01), "Coffee");

        create_transaction(user_id, builder.clone(), &conn).unwrap();

        assert!(create_transaction(user_id, builder, &conn).is_ok());
    }

    #[test]
    fn get_round_trips() {
        let (conn, user_id) = get_test_connection();
        let want = create_transaction(
            user_id,
            Transaction::build(5.0, Direction::Expense, date!(2025 - 10 - 01), "Coffee"),
            &conn,
        )
        .unwrap();

        assert_eq!(get_transaction(want.id, &conn), Ok(want));
    }

    #[test]
    fn lists_newest_first() {
        let (conn, user_id) = get_test_connection();
        let older = create_transaction(
            user_id,
            Transaction::build(5.0, Direction::Expense, date!(2025 - 10 - 01), "Coffee"),
            &conn,
        )
        .unwrap();
        let newer = create_transaction(
            user_id,
            Transaction::build(50.0, Direction::Income, date!(2025 - 10 - 03), "Refund"),
            &conn,
        )
        .unwrap();

        let got = get_transactions_for_user(user_id, &conn).unwrap();

        assert_eq!(got, vec![newer, older]);
    }

    #[test]
    fn deleting_schedule_keeps_its_transactions() {
        let (conn, user_id) = get_test_connection();
        let schedule = create_schedule(
            user_id,
            RecurringSchedule::build(
                "Rent",
                450.0,
                Direction::Expense,
                Frequency::Weekly,
                date!(2025 - 10 - 01),
            ),
            &conn,
        )
        .unwrap();
        let transaction = create_transaction(
            user_id,
            Transaction::build(450.0, Direction::Expense, date!(2025 - 10 - 01), "Rent")
                .schedule_id(Some(schedule.id)),
            &conn,
        )
        .unwrap();
        assert_eq!(
            get_transactions_for_schedule(schedule.id, &conn).unwrap(),
            vec![transaction.clone()]
        );

        delete_schedule(schedule.id, &conn).unwrap();

        let kept = get_transaction(transaction.id, &conn).unwrap();
        assert_eq!(kept.schedule_id, None);
    }

    #[test]
    fn delete_removes_transaction() {
        let (conn, user_id) = get_test_connection();
        let transaction = create_transaction(
            user_id,
            Transaction::build(5.0, Direction::Expense, date!(2025 - 10 - 01), "Coffee"),
            &conn,
        )
        .unwrap();

        delete_transaction(transaction.id, &conn).unwrap();

        assert_eq!(get_transaction(transaction.id, &conn), Err(Error::NotFound));
        assert_eq!(delete_transaction(transaction.id, &conn), Err(Error::NotFound));
    }
}
