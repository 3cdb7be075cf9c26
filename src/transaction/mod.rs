//! Transactions that have actually happened.
//!
//! This module contains:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing and querying transactions
//! - Route handlers for logging, viewing and deleting transactions

mod core;
mod endpoints;

pub use core::{
    Transaction, TransactionBuilder, create_transaction, create_transaction_table,
    delete_transaction, get_transaction, get_transactions_for_user,
};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    list_transactions_endpoint,
};

#[cfg(test)]
pub use core::get_transactions_for_schedule;
