//! Removing transactions.

use rusqlite::Connection;

use crate::{
    Error,
    history::{BucketDelta, apply_to_date},
    transaction::{TransactionId, delete_transaction_row, get_user_transaction},
    user::UserId,
};

/// Delete the transaction `id` of `user_id` and take it out of the history totals.
///
/// History rows that no other transaction contributes to are removed.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    user_id: &UserId,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let transaction = get_user_transaction(user_id, id, &sql_transaction)?;
    delete_transaction_row(user_id, id, &sql_transaction)?;
    apply_to_date(
        user_id,
        transaction.date,
        BucketDelta::debit(transaction.kind, transaction.amount),
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    tracing::info!("deleted transaction {id} for user {user_id}");

    Ok(())
}
