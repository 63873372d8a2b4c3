//! Bulk importing transactions from normalized records.

use std::collections::BTreeMap;

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    amount::Amount,
    category::{DEFAULT_CATEGORY_ICON, NewCategory, ensure_categories},
    history::{BucketDelta, DayKey, MonthKey, apply_to_day, apply_to_month},
    ledger::form::non_blank,
    transaction::{NewTransaction, TransactionType, insert_transaction},
    user::UserId,
};

/// A transaction from an external source, such as a bank export, that has
/// already been mapped onto the ledger's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    /// The value of the transaction.
    pub amount: Decimal,
    /// The date the transaction happened on.
    pub date: Date,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The name of the category, created if the user does not have it yet.
    pub category: String,
    /// The icon to give the category if it has to be created.
    #[serde(default)]
    pub category_icon: Option<String>,
    /// Who or how the transaction was paid.
    #[serde(default, alias = "payMethod")]
    pub account: Option<String>,
}

/// What a successful import wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// The number of transactions created.
    pub transactions_imported: usize,
    /// The number of categories that did not exist before the import.
    pub categories_created: usize,
}

struct ValidRecord {
    amount: Amount,
    date: Date,
    description: String,
    category: NewCategory,
    account: Option<String>,
}

/// Import `records` as transactions of `user_id`.
///
/// Categories the user does not have yet are created. Categories are matched
/// by type and name ignoring case, and when a new category is named more
/// than once, its first occurrence decides the spelling and icon. The
/// history totals are updated once per affected day and month.
///
/// The import is all or nothing: if any record is invalid or any write
/// fails, no categories, transactions or totals are written.
///
/// # Errors
/// Returns an [Error::Import] wrapping the cause of the failure.
pub fn import_records(
    user_id: &UserId,
    records: &[NormalizedRecord],
    connection: &Connection,
) -> Result<ImportSummary, Error> {
    write_records(user_id, records, connection).map_err(|error| {
        tracing::error!(
            "could not import {} records for user {user_id}: {error}",
            records.len()
        );
        Error::Import(Box::new(error))
    })
}

fn write_records(
    user_id: &UserId,
    records: &[NormalizedRecord],
    connection: &Connection,
) -> Result<ImportSummary, Error> {
    if records.is_empty() {
        return Ok(ImportSummary::default());
    }

    let records = records
        .iter()
        .enumerate()
        .map(|(index, record)| validate_record(record).map_err(|error| at_record(error, index)))
        .collect::<Result<Vec<_>, Error>>()?;

    let category_requests: Vec<NewCategory> = records
        .iter()
        .map(|record| record.category.clone())
        .collect();

    let sql_transaction = connection.unchecked_transaction()?;

    let ensured = ensure_categories(user_id, &category_requests, &sql_transaction)?;

    let mut day_deltas: BTreeMap<DayKey, BucketDelta> = BTreeMap::new();
    let mut month_deltas: BTreeMap<MonthKey, BucketDelta> = BTreeMap::new();

    for record in &records {
        let category = ensured
            .categories
            .get(&record.category.key())
            .ok_or_else(|| Error::CategoryNotFound {
                name: record.category.name.to_string(),
                kind: record.category.kind,
            })?;

        let transaction = insert_transaction(
            user_id,
            NewTransaction {
                amount: record.amount,
                date: record.date,
                description: record.description.clone(),
                kind: category.kind,
                category: category.name.to_string(),
                category_icon: category.icon.clone(),
                account: record.account.clone(),
                installment_count: 1,
                installment_number: None,
            },
            &sql_transaction,
        )?;

        let delta = BucketDelta::credit(transaction.kind, transaction.amount);
        let day = DayKey::from_date(transaction.date);
        add_delta(&mut day_deltas, day, delta)?;
        add_delta(&mut month_deltas, day.month_key(), delta)?;
    }

    for (key, delta) in day_deltas {
        apply_to_day(user_id, key, delta, &sql_transaction)?;
    }

    for (key, delta) in month_deltas {
        apply_to_month(user_id, key, delta, &sql_transaction)?;
    }

    sql_transaction.commit()?;

    let summary = ImportSummary {
        transactions_imported: records.len(),
        categories_created: ensured.created,
    };

    tracing::info!(
        "imported {} transactions and created {} categories for user {user_id}",
        summary.transactions_imported,
        summary.categories_created
    );

    Ok(summary)
}

fn add_delta<K: Ord>(
    deltas: &mut BTreeMap<K, BucketDelta>,
    key: K,
    delta: BucketDelta,
) -> Result<(), Error> {
    let total = deltas.entry(key).or_default();
    *total = total.checked_add(delta)?;

    Ok(())
}

fn validate_record(record: &NormalizedRecord) -> Result<ValidRecord, Error> {
    let icon = non_blank(record.category_icon.clone())
        .unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_owned());

    Ok(ValidRecord {
        amount: Amount::new(record.amount)?,
        date: record.date,
        description: record
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_owned(),
        category: NewCategory::new(&record.category, &icon, record.kind)?,
        account: non_blank(record.account.clone()),
    })
}

fn at_record(error: Error, index: usize) -> Error {
    match error {
        Error::Validation { field, message } => Error::Validation {
            field,
            message: format!("{message} (record {})", index + 1),
        },
        error => error,
    }
}
