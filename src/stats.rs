//! Summary statistics over a date range of a user's transactions.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::{
    Error, amount::cents_to_decimal, calendar::DateRange, transaction::TransactionType,
    user::UserId,
};

/// The income and expense totals over a date range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    /// The total income.
    pub income: Decimal,
    /// The total expenses.
    pub expense: Decimal,
}

impl Totals {
    /// Income minus expenses.
    pub fn balance(&self) -> Decimal {
        self.income - self.expense
    }
}

/// The total of one category over a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStat {
    /// The type of the transactions.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The category name stored on the transactions.
    pub category: String,
    /// The category icon stored on the transactions.
    pub category_icon: String,
    /// The sum of the transaction amounts.
    pub total: Decimal,
}

/// Get the income and expense totals of `user_id` between `from` and `to` inclusive.
///
/// # Errors
/// Returns a:
/// - [Error::Validation] if `from` is after `to`,
/// - or [Error::SqlError] if there is an SQL error.
pub fn get_balance_stats(
    user_id: &UserId,
    from: Date,
    to: Date,
    connection: &Connection,
) -> Result<Totals, Error> {
    let range = DateRange::new(from, to)?;

    let (income, expense): (i64, i64) = connection.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN type = 'income' THEN amount ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN type = 'expense' THEN amount ELSE 0 END), 0)
        FROM \"transaction\"
        WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3",
        (user_id, range.from(), range.to()),
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(Totals {
        income: cents_to_decimal(income),
        expense: cents_to_decimal(expense),
    })
}

/// Get the per category totals of `user_id` between `from` and `to` inclusive,
/// largest first.
///
/// Transactions are grouped by the category name and icon they were recorded
/// with, so deleted categories still show up.
///
/// # Errors
/// Returns a:
/// - [Error::Validation] if `from` is after `to`,
/// - or [Error::SqlError] if there is an SQL error.
pub fn get_category_stats(
    user_id: &UserId,
    from: Date,
    to: Date,
    connection: &Connection,
) -> Result<Vec<CategoryStat>, Error> {
    let range = DateRange::new(from, to)?;

    connection
        .prepare(
            "SELECT type, category, category_icon, SUM(amount) AS total
            FROM \"transaction\"
            WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
            GROUP BY type, category, category_icon
            ORDER BY total DESC, category ASC",
        )?
        .query_map((user_id, range.from(), range.to()), |row| {
            Ok(CategoryStat {
                kind: row.get(0)?,
                category: row.get(1)?,
                category_icon: row.get(2)?,
                total: cents_to_decimal(row.get(3)?),
            })
        })?
        .map(|stat| stat.map_err(Error::SqlError))
        .collect()
}
