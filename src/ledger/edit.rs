//! Changing recorded transactions.

use rusqlite::Connection;

use crate::{
    Error,
    category::get_category,
    history::{BucketDelta, apply_to_date},
    ledger::TransactionForm,
    transaction::{
        Transaction, TransactionChanges, TransactionId, get_user_transaction, update_transaction,
    },
    user::UserId,
};

/// Replace the amount, date, description, type, category and account of the
/// transaction `id` of `user_id` and move its contribution in the history
/// totals to match.
///
/// The installment plan of the form is ignored; an installment keeps its
/// position in its series.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the form is invalid,
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - [Error::CategoryNotFound] if the user has no category of the new type and name,
/// - or [Error::SqlError] if there is an SQL error.
pub fn edit_transaction(
    user_id: &UserId,
    id: TransactionId,
    form: TransactionForm,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let form = form.validate()?;

    let sql_transaction = connection.unchecked_transaction()?;

    let previous = get_user_transaction(user_id, id, &sql_transaction)?;
    let category = get_category(user_id, form.category.as_ref(), form.kind, &sql_transaction)?;

    let updated = update_transaction(
        user_id,
        id,
        TransactionChanges {
            amount: form.amount,
            date: form.date,
            description: form.description,
            kind: form.kind,
            category: category.name.to_string(),
            category_icon: category.icon,
            account: form.account,
        },
        &sql_transaction,
    )?;

    let removed = BucketDelta::debit(previous.kind, previous.amount);
    let added = BucketDelta::credit(updated.kind, updated.amount);

    if previous.date == updated.date {
        let net = removed.checked_add(added)?;
        apply_to_date(user_id, updated.date, net, &sql_transaction)?;
    } else {
        apply_to_date(user_id, previous.date, removed, &sql_transaction)?;
        apply_to_date(user_id, updated.date, added, &sql_transaction)?;
    }

    sql_transaction.commit()?;

    tracing::info!("updated transaction {id} for user {user_id}");
    tracing::debug!("transaction {id} changed from {previous:?} to {updated:?}");

    Ok(updated)
}
