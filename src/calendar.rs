//! Calendar helpers for normalizing dates and stepping through months.

use serde::{Deserialize, Serialize};
use time::{Date, Month, OffsetDateTime, UtcOffset};

use crate::Error;

/// Normalize a timestamp to the calendar date it falls on in UTC.
///
/// Dates are stored without a time zone, so this is the only conversion a
/// caller holding a timestamp should use to avoid timezone drift.
pub fn utc_date(timestamp: OffsetDateTime) -> Date {
    timestamp.to_offset(UtcOffset::UTC).date()
}

/// The current time in UTC truncated to whole seconds.
pub(crate) fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();

    now.replace_nanosecond(0).unwrap_or(now)
}

/// The zero-based index of a month, January being 0.
pub fn month_index(month: Month) -> u8 {
    u8::from(month) - 1
}

/// The number of days in `month` (zero-based) of `year`.
///
/// # Errors
///
/// Returns an [Error::Validation] on the `month` field if `month` is not in
/// the range 0 to 11.
pub fn days_in_month(year: i32, month: u8) -> Result<u8, Error> {
    let days = match month {
        0 | 2 | 4 | 6 | 7 | 9 | 11 => 31,
        3 | 5 | 8 | 10 => 30,
        1 if time::util::is_leap_year(year) => 29,
        1 => 28,
        _ => return Err(Error::validation("month", "must be between 0 and 11")),
    };

    Ok(days)
}

/// Advance `date` by `months` calendar months, keeping the day of the month.
///
/// If the target month is shorter than the day of the month, the last day of
/// the target month is used instead, e.g. January 31st plus one month is the
/// last day of February.
///
/// # Errors
///
/// Returns an [Error::Validation] on the `date` field if the resulting date
/// is outside the supported range.
pub fn add_months(date: Date, months: u32) -> Result<Date, Error> {
    let out_of_range = || Error::validation("date", "is too far in the future");

    let total_months = i64::from(month_index(date.month())) + i64::from(months);
    let year = i64::from(date.year()) + total_months / 12;
    let year = i32::try_from(year).map_err(|_| out_of_range())?;
    let month = (total_months % 12) as u8;

    let day = date.day().min(days_in_month(year, month)?);
    let month = Month::try_from(month + 1).map_err(|_| out_of_range())?;

    Date::from_calendar_date(year, month, day).map_err(|_| out_of_range())
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    from: Date,
    to: Date,
}

impl DateRange {
    /// Create a date range covering `from` through `to`, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] on the `from` field if `from` is after `to`.
    pub fn new(from: Date, to: Date) -> Result<Self, Error> {
        if from > to {
            return Err(Error::validation(
                "from",
                format!("{from} is after the end of the range {to}"),
            ));
        }

        Ok(Self { from, to })
    }

    /// The first date in the range.
    pub fn from(&self) -> Date {
        self.from
    }

    /// The last date in the range.
    pub fn to(&self) -> Date {
        self.to
    }
}
