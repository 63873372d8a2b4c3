//! The daily and monthly running totals kept alongside the transaction ledger.
//!
//! `month_history` holds one row per user and calendar day, `year_history`
//! one row per user and calendar month. Months are zero-based (January is 0)
//! and days are one-based. Both tables are updated together with every change
//! to the ledger and are never derived from one another.
//!
//! Totals are stored as integer cents and changed with single statement
//! upserts, so concurrent writers cannot lose updates. A row only exists
//! while at least one transaction contributes to it.

use rusqlite::{Connection, Row, ToSql};
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error,
    amount::{Amount, cents_to_decimal},
    calendar::month_index,
    transaction::TransactionType,
    user::UserId,
};

/// A signed change to the income and expense totals of a bucket, in cents.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BucketDelta {
    /// The change to the income total.
    pub income: i64,
    /// The change to the expense total.
    pub expense: i64,
}

impl BucketDelta {
    /// The change caused by adding a transaction.
    pub fn credit(kind: TransactionType, amount: Amount) -> Self {
        match kind {
            TransactionType::Income => Self {
                income: amount.cents(),
                expense: 0,
            },
            TransactionType::Expense => Self {
                income: 0,
                expense: amount.cents(),
            },
        }
    }

    /// The change caused by removing a transaction.
    pub fn debit(kind: TransactionType, amount: Amount) -> Self {
        let credit = Self::credit(kind, amount);

        Self {
            income: -credit.income,
            expense: -credit.expense,
        }
    }

    /// Whether applying this delta would leave the totals unchanged.
    pub fn is_zero(&self) -> bool {
        self.income == 0 && self.expense == 0
    }

    /// Combine two deltas into one.
    ///
    /// # Errors
    /// Returns an [Error::Validation] on the `amount` field if either total
    /// does not fit in 64 bits of cents.
    pub fn checked_add(self, other: Self) -> Result<Self, Error> {
        match (
            self.income.checked_add(other.income),
            self.expense.checked_add(other.expense),
        ) {
            (Some(income), Some(expense)) => Ok(Self { income, expense }),
            _ => Err(Error::validation(
                "amount",
                "the totals would be too large to store",
            )),
        }
    }
}

/// The key of a daily bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayKey {
    /// The calendar year.
    pub year: i32,
    /// The zero-based month.
    pub month: u8,
    /// The one-based day of the month.
    pub day: u8,
}

impl DayKey {
    /// The key of the bucket `date` falls in.
    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: month_index(date.month()),
            day: date.day(),
        }
    }

    /// The key of the monthly bucket containing this day.
    pub fn month_key(&self) -> MonthKey {
        MonthKey {
            year: self.year,
            month: self.month,
        }
    }
}

/// The key of a monthly bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    /// The calendar year.
    pub year: i32,
    /// The zero-based month.
    pub month: u8,
}

impl MonthKey {
    /// The key of the bucket `date` falls in.
    pub fn from_date(date: Date) -> Self {
        DayKey::from_date(date).month_key()
    }
}

/// The income and expense totals of one user on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    /// Which day the totals are for.
    pub key: DayKey,
    /// The total income on the day.
    pub income: Decimal,
    /// The total expenses on the day.
    pub expense: Decimal,
}

/// The income and expense totals of one user in one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    /// Which month the totals are for.
    pub key: MonthKey,
    /// The total income in the month.
    pub income: Decimal,
    /// The total expenses in the month.
    pub expense: Decimal,
}

struct BucketTable {
    name: &'static str,
    key_columns: &'static str,
    key_values: &'static str,
    key_predicate: &'static str,
}

const DAY_BUCKETS: BucketTable = BucketTable {
    name: "month_history",
    key_columns: "user_id, year, month, day",
    key_values: ":user_id, :year, :month, :day",
    key_predicate: "user_id = :user_id AND year = :year AND month = :month AND day = :day",
};

const MONTH_BUCKETS: BucketTable = BucketTable {
    name: "year_history",
    key_columns: "user_id, year, month",
    key_values: ":user_id, :year, :month",
    key_predicate: "user_id = :user_id AND year = :year AND month = :month",
};

/// Add `delta` to the daily bucket of `user_id` at `key`.
///
/// The bucket is created if it does not exist. Totals that would drop below
/// zero are clamped at zero and logged as a warning, and the bucket is
/// deleted once both totals are zero.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn apply_to_day(
    user_id: &UserId,
    key: DayKey,
    delta: BucketDelta,
    connection: &Connection,
) -> Result<(), Error> {
    apply_delta(
        &DAY_BUCKETS,
        &[
            (":user_id", user_id as &dyn ToSql),
            (":year", &key.year as &dyn ToSql),
            (":month", &key.month as &dyn ToSql),
            (":day", &key.day as &dyn ToSql),
        ],
        delta,
        connection,
    )
}

/// Add `delta` to the monthly bucket of `user_id` at `key`.
///
/// Follows the same rules as [apply_to_day].
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn apply_to_month(
    user_id: &UserId,
    key: MonthKey,
    delta: BucketDelta,
    connection: &Connection,
) -> Result<(), Error> {
    apply_delta(
        &MONTH_BUCKETS,
        &[
            (":user_id", user_id as &dyn ToSql),
            (":year", &key.year as &dyn ToSql),
            (":month", &key.month as &dyn ToSql),
        ],
        delta,
        connection,
    )
}

/// Add `delta` to both the daily and the monthly bucket that `date` falls in.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn apply_to_date(
    user_id: &UserId,
    date: Date,
    delta: BucketDelta,
    connection: &Connection,
) -> Result<(), Error> {
    let key = DayKey::from_date(date);

    apply_to_day(user_id, key, delta, connection)?;
    apply_to_month(user_id, key.month_key(), delta, connection)
}

fn apply_delta(
    table: &BucketTable,
    key: &[(&str, &dyn ToSql)],
    delta: BucketDelta,
    connection: &Connection,
) -> Result<(), Error> {
    if delta.is_zero() {
        return Ok(());
    }

    let mut params = key.to_vec();
    params.push((":income", &delta.income as &dyn ToSql));
    params.push((":expense", &delta.expense as &dyn ToSql));

    let (income, expense): (i64, i64) = connection
        .prepare_cached(&format!(
            "INSERT INTO {name} ({columns}, income, expense)
             VALUES ({values}, :income, :expense)
             ON CONFLICT({columns}) DO UPDATE SET
                income = income + excluded.income,
                expense = expense + excluded.expense
             RETURNING income, expense",
            name = table.name,
            columns = table.key_columns,
            values = table.key_values,
        ))?
        .query_row(params.as_slice(), |row| Ok((row.get(0)?, row.get(1)?)))?;

    if income < 0 || expense < 0 {
        tracing::warn!(
            "{} bucket went below zero (income {}, expense {}), clamping at zero",
            table.name,
            income,
            expense
        );
    }

    if income <= 0 && expense <= 0 {
        connection
            .prepare_cached(&format!(
                "DELETE FROM {} WHERE {}",
                table.name, table.key_predicate
            ))?
            .execute(key)?;
    } else if income < 0 || expense < 0 {
        connection
            .prepare_cached(&format!(
                "UPDATE {} SET income = MAX(income, 0), expense = MAX(expense, 0) WHERE {}",
                table.name, table.key_predicate
            ))?
            .execute(key)?;
    }

    Ok(())
}

/// Get the daily buckets of `user_id` in the zero-based `month` of `year`,
/// ordered by day.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_day_buckets(
    user_id: &UserId,
    year: i32,
    month: u8,
    connection: &Connection,
) -> Result<Vec<DayBucket>, Error> {
    connection
        .prepare(
            "SELECT year, month, day, income, expense FROM month_history
             WHERE user_id = ?1 AND year = ?2 AND month = ?3
             ORDER BY day ASC",
        )?
        .query_map((user_id, year, month), map_day_bucket)?
        .map(|bucket| bucket.map_err(Error::SqlError))
        .collect()
}

/// Get the monthly buckets of `user_id` in `year`, ordered by month.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_month_buckets(
    user_id: &UserId,
    year: i32,
    connection: &Connection,
) -> Result<Vec<MonthBucket>, Error> {
    connection
        .prepare(
            "SELECT year, month, income, expense FROM year_history
             WHERE user_id = ?1 AND year = ?2
             ORDER BY month ASC",
        )?
        .query_map((user_id, year), map_month_bucket)?
        .map(|bucket| bucket.map_err(Error::SqlError))
        .collect()
}

/// Get every daily bucket of `user_id`, ordered by key.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_all_day_buckets(
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<DayBucket>, Error> {
    connection
        .prepare(
            "SELECT year, month, day, income, expense FROM month_history
             WHERE user_id = ?1
             ORDER BY year ASC, month ASC, day ASC",
        )?
        .query_map([user_id], map_day_bucket)?
        .map(|bucket| bucket.map_err(Error::SqlError))
        .collect()
}

/// Get every monthly bucket of `user_id`, ordered by key.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_all_month_buckets(
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<MonthBucket>, Error> {
    connection
        .prepare(
            "SELECT year, month, income, expense FROM year_history
             WHERE user_id = ?1
             ORDER BY year ASC, month ASC",
        )?
        .query_map([user_id], map_month_bucket)?
        .map(|bucket| bucket.map_err(Error::SqlError))
        .collect()
}

/// Get the distinct years `user_id` has monthly buckets in, in ascending order.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_bucket_years(user_id: &UserId, connection: &Connection) -> Result<Vec<i32>, Error> {
    connection
        .prepare("SELECT DISTINCT year FROM year_history WHERE user_id = ?1 ORDER BY year ASC")?
        .query_map([user_id], |row| row.get(0))?
        .map(|year| year.map_err(Error::SqlError))
        .collect()
}

/// Create the daily and monthly bucket tables.
///
/// # Errors
/// Returns an error if the tables cannot be created.
pub fn create_history_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS month_history (
            user_id TEXT NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 0 AND 11),
            day INTEGER NOT NULL CHECK (day BETWEEN 1 AND 31),
            income INTEGER NOT NULL DEFAULT 0,
            expense INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (user_id, year, month, day)
        );

        CREATE TABLE IF NOT EXISTS year_history (
            user_id TEXT NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 0 AND 11),
            income INTEGER NOT NULL DEFAULT 0,
            expense INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (user_id, year, month)
        );",
    )?;

    Ok(())
}

fn map_day_bucket(row: &Row) -> Result<DayBucket, rusqlite::Error> {
    Ok(DayBucket {
        key: DayKey {
            year: row.get(0)?,
            month: row.get(1)?,
            day: row.get(2)?,
        },
        income: cents_to_decimal(row.get(3)?),
        expense: cents_to_decimal(row.get(4)?),
    })
}

fn map_month_bucket(row: &Row) -> Result<MonthBucket, rusqlite::Error> {
    Ok(MonthBucket {
        key: MonthKey {
            year: row.get(0)?,
            month: row.get(1)?,
        },
        income: cents_to_decimal(row.get(2)?),
        expense: cents_to_decimal(row.get(3)?),
    })
}

#[cfg(test)]
mod bucket_delta_tests {
    use crate::{Error, amount::Amount, history::BucketDelta, transaction::TransactionType};

    #[test]
    fn credit_and_debit_touch_only_their_type() {
        let amount = Amount::from_cents(250).unwrap();

        assert_eq!(
            BucketDelta::credit(TransactionType::Income, amount),
            BucketDelta {
                income: 250,
                expense: 0
            }
        );
        assert_eq!(
            BucketDelta::debit(TransactionType::Expense, amount),
            BucketDelta {
                income: 0,
                expense: -250
            }
        );
    }

    #[test]
    fn opposite_deltas_cancel_out() {
        let amount = Amount::from_cents(999).unwrap();

        let delta = BucketDelta::credit(TransactionType::Expense, amount)
            .checked_add(BucketDelta::debit(TransactionType::Expense, amount))
            .unwrap();

        assert!(delta.is_zero());
    }

    #[test]
    fn checked_add_fails_when_total_overflows() {
        let amount = Amount::from_cents(i64::MAX / 2 + 1).unwrap();
        let delta = BucketDelta::credit(TransactionType::Income, amount);

        let result = delta.checked_add(delta);

        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "amount",
                ..
            })
        ));
    }
}
