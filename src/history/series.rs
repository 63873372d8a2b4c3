//! Zero-filled chart series built from the history buckets.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{Error, calendar::days_in_month, user::UserId};

use super::bucket::{get_bucket_years, get_day_buckets, get_month_buckets};

/// The income and expense totals of one month or one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    /// The calendar year.
    pub year: i32,
    /// The zero-based month.
    pub month: u8,
    /// The one-based day, only set for points of a month series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
    /// The total income.
    pub income: Decimal,
    /// The total expenses.
    pub expense: Decimal,
}

impl HistoryPoint {
    fn empty(year: i32, month: u8, day: Option<u8>) -> Self {
        Self {
            year,
            month,
            day,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
        }
    }
}

/// Get the monthly totals of `user_id` for `year`.
///
/// There is always exactly one point per month, January first, and months
/// without transactions have zero totals.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_year_series(
    user_id: &UserId,
    year: i32,
    connection: &Connection,
) -> Result<Vec<HistoryPoint>, Error> {
    let mut series: Vec<HistoryPoint> = (0..12)
        .map(|month| HistoryPoint::empty(year, month, None))
        .collect();

    for bucket in get_month_buckets(user_id, year, connection)? {
        if let Some(point) = series.get_mut(usize::from(bucket.key.month)) {
            point.income = bucket.income;
            point.expense = bucket.expense;
        }
    }

    Ok(series)
}

/// Get the daily totals of `user_id` for the zero-based `month` of `year`.
///
/// There is always exactly one point per calendar day, from the 1st to the
/// last day of the month inclusive, and days without transactions have zero
/// totals.
///
/// # Errors
/// Returns a:
/// - [Error::Validation] if `month` is not between 0 and 11,
/// - or [Error::SqlError] if there is an SQL error.
pub fn get_month_series(
    user_id: &UserId,
    year: i32,
    month: u8,
    connection: &Connection,
) -> Result<Vec<HistoryPoint>, Error> {
    let day_count = days_in_month(year, month)?;

    let mut series: Vec<HistoryPoint> = (1..=day_count)
        .map(|day| HistoryPoint::empty(year, month, Some(day)))
        .collect();

    for bucket in get_day_buckets(user_id, year, month, connection)? {
        let index = usize::from(bucket.key.day).saturating_sub(1);

        if let Some(point) = series.get_mut(index) {
            point.income = bucket.income;
            point.expense = bucket.expense;
        }
    }

    Ok(series)
}

/// Get the years `user_id` has history for, in ascending order.
///
/// If the user has no history yet, the current UTC year is returned so there
/// is always at least one year to pick.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_history_years(user_id: &UserId, connection: &Connection) -> Result<Vec<i32>, Error> {
    let years = get_bucket_years(user_id, connection)?;

    if years.is_empty() {
        return Ok(vec![OffsetDateTime::now_utc().year()]);
    }

    Ok(years)
}
