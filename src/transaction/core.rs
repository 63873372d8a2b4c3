//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, OptionalExtension, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{Error, amount::Amount, calendar::now_utc, user::UserId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money that was earned.
    Income,
    /// Money that was spent.
    Expense,
}

impl TransactionType {
    /// The lower-case name used in the database and serialized data.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::validation(
                "type",
                format!("\"{other}\" is not one of income or expense"),
            )),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// The unique, opaque identifier of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Generate a new random transaction ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TransactionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| Error::validation("id", format!("\"{s}\" is not a transaction ID")))
    }
}

impl ToSql for TransactionId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for TransactionId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Uuid::parse_str(value.as_str()?)
            .map(Self)
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserId,
    /// The amount of money spent or earned in this transaction.
    ///
    /// For installment purchases this is the amount of this installment.
    pub amount: Amount,
    /// The UTC calendar date the transaction happened on.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The name of the category, copied from the category when the
    /// transaction was written.
    pub category: String,
    /// The icon of the category, copied along with the name.
    pub category_icon: String,
    /// Who or how the transaction was paid, e.g. "cash" or "visa".
    pub account: Option<String>,
    /// The number of installments in the purchase, 1 if it was paid at once.
    pub installment_count: u32,
    /// The 1-based position of this transaction within its installment
    /// series, only set when `installment_count` is greater than 1.
    pub installment_number: Option<u32>,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    pub updated_at: OffsetDateTime,
}

/// The validated fields of a transaction row that is about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The amount of the transaction, or of this installment.
    pub amount: Amount,
    /// The UTC calendar date of the transaction.
    pub date: Date,
    /// What the transaction was for, may be empty.
    pub description: String,
    /// Whether money was earned or spent.
    pub kind: TransactionType,
    /// The category name as stored in the category directory.
    pub category: String,
    /// The category icon as stored in the category directory.
    pub category_icon: String,
    /// Who or how the transaction was paid.
    pub account: Option<String>,
    /// The number of installments in the purchase.
    pub installment_count: u32,
    /// The position within the installment series.
    pub installment_number: Option<u32>,
}

/// The fields an edit replaces on an existing transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionChanges {
    /// The new amount.
    pub amount: Amount,
    /// The new UTC calendar date.
    pub date: Date,
    /// The new description.
    pub description: String,
    /// The new transaction type.
    pub kind: TransactionType,
    /// The new category name.
    pub category: String,
    /// The new category icon.
    pub category_icon: String,
    /// The new account.
    pub account: Option<String>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str = "id, user_id, amount, date, description, type, category, \
    category_icon, account, installment_count, installment_number, created_at, updated_at";

/// Insert a transaction row for `user_id`, generating its ID and timestamps.
///
/// This does not touch the history tables, see [crate::create_transaction]
/// for the operation that keeps them consistent.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn insert_transaction(
    user_id: &UserId,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = now_utc();

    let transaction = connection
        .prepare_cached(&format!(
            "INSERT INTO \"transaction\" ({TRANSACTION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                TransactionId::new(),
                user_id,
                transaction.amount,
                transaction.date,
                transaction.description,
                transaction.kind,
                transaction.category,
                transaction.category_icon,
                transaction.account,
                transaction.installment_count,
                transaction.installment_number,
                now,
                now,
            ],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`, regardless of owner.
///
/// Returns `None` if there is no transaction with that ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transaction_by_id(
    id: TransactionId,
    connection: &Connection,
) -> Result<Option<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve a transaction owned by `user_id` by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_user_transaction(
    user_id: &UserId,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id), map_transaction_row)?;

    Ok(transaction)
}

/// Overwrite the editable fields of a transaction owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    user_id: &UserId,
    id: TransactionId,
    changes: TransactionChanges,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "UPDATE \"transaction\"
             SET amount = ?1, date = ?2, description = ?3, type = ?4, category = ?5,
                 category_icon = ?6, account = ?7, updated_at = ?8
             WHERE id = ?9 AND user_id = ?10
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                changes.amount,
                changes.date,
                changes.description,
                changes.kind,
                changes.category,
                changes.category_icon,
                changes.account,
                now_utc(),
                id,
                user_id,
            ],
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}

/// Delete a transaction owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction_row(
    user_id: &UserId,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the number of transactions owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(user_id: &UserId, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            amount INTEGER NOT NULL CHECK (amount > 0),
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            category TEXT NOT NULL,
            category_icon TEXT NOT NULL,
            account TEXT,
            installment_count INTEGER NOT NULL DEFAULT 1 CHECK (installment_count >= 1),
            installment_number INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// The row must contain the transaction columns in table order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        description: row.get(4)?,
        kind: row.get(5)?,
        category: row.get(6)?,
        category_icon: row.get(7)?,
        account: row.get(8)?,
        installment_count: row.get(9)?,
        installment_number: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
