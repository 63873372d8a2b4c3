//! Money amounts with a fixed scale of two fractional digits.
//!
//! Amounts are handled as [Decimal] in Rust and stored as integer cents in
//! the database so that running totals can be incremented exactly in SQL.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The number of fractional digits money amounts are kept to.
pub const AMOUNT_SCALE: u32 = 2;

/// A strictly positive amount of money with at most two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount {
    cents: i64,
}

impl Amount {
    /// Create an amount from a decimal value.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] on the `amount` field if `value` is zero
    /// or negative, has more than two fractional digits, or is too large to
    /// store.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value <= Decimal::ZERO {
            return Err(Error::validation("amount", "must be greater than zero"));
        }

        if value.normalize().scale() > AMOUNT_SCALE {
            return Err(Error::validation(
                "amount",
                "must not have more than two decimal places",
            ));
        }

        let cents = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .ok_or_else(|| Error::validation("amount", "is too large"))?;

        Self::from_cents(cents)
    }

    /// Create an amount from a whole number of cents.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] on the `amount` field if `cents` is not positive.
    pub fn from_cents(cents: i64) -> Result<Self, Error> {
        if cents <= 0 {
            Err(Error::validation("amount", "must be greater than zero"))
        } else {
            Ok(Self { cents })
        }
    }

    /// The amount as a whole number of cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// The amount as a decimal with two fractional digits.
    pub fn as_decimal(&self) -> Decimal {
        cents_to_decimal(self.cents)
    }
}

/// Convert a whole number of cents to a decimal with two fractional digits.
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, AMOUNT_SCALE)
}

impl TryFrom<Decimal> for Amount {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(value: Amount) -> Self {
        value.as_decimal()
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_decimal())
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.cents))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let cents = i64::column_result(value)?;

        Amount::from_cents(cents).map_err(|_| FromSqlError::OutOfRange(cents))
    }
}
