//! Transaction records for the ledger.
//!
//! This module contains the `Transaction` model and the row level database
//! functions for storing and querying transactions. These functions do not
//! maintain the history tables; the operations in [crate::ledger] wrap them
//! together with the history updates in a single SQL transaction.

mod core;
mod query;

pub use core::{
    NewTransaction, Transaction, TransactionChanges, TransactionId, TransactionType,
    count_transactions, create_transaction_table, delete_transaction_row, get_transaction_by_id,
    get_user_transaction, insert_transaction, map_transaction_row, update_transaction,
};
pub use query::get_transactions_in_range;
