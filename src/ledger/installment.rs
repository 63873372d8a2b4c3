//! Splitting a purchase into monthly installments.

use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{Error, amount::Amount, calendar::add_months};

/// The largest number of installments a purchase can be split into.
pub const MAX_INSTALLMENTS: u32 = 120;

/// How a purchase is paid off over several months.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstallmentPlan {
    /// The number of monthly installments, 1 meaning paid at once.
    pub count: u32,
    /// The amount of each installment when it should not be derived from
    /// the total.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl InstallmentPlan {
    /// Split the total evenly into `count` installments.
    pub fn new(count: u32) -> Self {
        Self {
            count,
            amount: None,
        }
    }

    /// Charge `amount` for every installment instead of splitting the total.
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }
}

/// One of the transactions a purchase is recorded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Installment {
    /// The one-based position in the series, `None` for a purchase paid at once.
    pub number: Option<u32>,
    /// When the installment is due.
    pub date: Date,
    /// How much the installment is for.
    pub amount: Amount,
}

/// Work out the installments of a purchase of `total` made on `date`.
///
/// Without a plan, or with a plan of one installment, the purchase is a
/// single transaction for the full amount. Otherwise installment `i` falls
/// `i` months after `date`, on the same day of the month or the last day of
/// shorter months. Unless the plan gives a fixed installment amount, the
/// total is split evenly in cents and any leftover cents go one each to the
/// earliest installments, so the installments always add up to the total.
///
/// # Errors
///
/// Returns an [Error::Validation] if the count is outside 1 to
/// [MAX_INSTALLMENTS], the installment amount is invalid, the total is less
/// than one cent per installment, or a due date is out of range.
pub fn split_into_installments(
    total: Amount,
    date: Date,
    plan: Option<&InstallmentPlan>,
) -> Result<Vec<Installment>, Error> {
    let Some(plan) = plan else {
        return Ok(vec![Installment {
            number: None,
            date,
            amount: total,
        }]);
    };

    if !(1..=MAX_INSTALLMENTS).contains(&plan.count) {
        return Err(Error::validation(
            "installments",
            format!("must be between 1 and {MAX_INSTALLMENTS}"),
        ));
    }

    if plan.count == 1 {
        return Ok(vec![Installment {
            number: None,
            date,
            amount: total,
        }]);
    }

    let count = i64::from(plan.count);
    let fixed_amount = plan
        .amount
        .map(|amount| {
            Amount::new(amount).map_err(|_| {
                Error::validation(
                    "installments",
                    "the installment amount must be a positive amount with at most two decimal places",
                )
            })
        })
        .transpose()?;

    let base_cents = total.cents() / count;
    let leftover_cents = total.cents() % count;

    if fixed_amount.is_none() && base_cents == 0 {
        return Err(Error::validation(
            "installments",
            format!("{total} is too small to split into {count} installments"),
        ));
    }

    (0..plan.count)
        .map(|index| -> Result<Installment, Error> {
            let amount = match fixed_amount {
                Some(amount) => amount,
                None if i64::from(index) < leftover_cents => Amount::from_cents(base_cents + 1)?,
                None => Amount::from_cents(base_cents)?,
            };

            Ok(Installment {
                number: Some(index + 1),
                date: add_months(date, index)?,
                amount,
            })
        })
        .collect()
}
