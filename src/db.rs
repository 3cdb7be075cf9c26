/*! Sets up the application's database. */

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, calendar::create_event_table, goal::create_goal_table,
    schedule::create_schedule_table, transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the tables for the domain models if they do not already exist.
///
/// Foreign key enforcement is switched on for `connection`, the unique and
/// foreign key constraints are what keep occurrences from being recorded
/// twice and records from pointing at missing users.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_schedule_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_event_table(&transaction)?;
    create_goal_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
