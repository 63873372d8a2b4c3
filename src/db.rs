//! Creates the database schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, category::create_category_table, history::create_history_tables,
    transaction::create_transaction_table, user_settings::create_user_settings_table,
};

/// Create all the tables the ledger needs, if they do not exist yet.
///
/// The tables are created in one exclusive transaction, so a database is
/// never left with only part of the schema.
///
/// # Errors
/// Returns an [Error::SqlError] if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;
    create_history_tables(&transaction)?;
    create_category_table(&transaction)?;
    create_user_settings_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
