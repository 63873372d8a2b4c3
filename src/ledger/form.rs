//! The input for creating and editing transactions.

use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    amount::Amount,
    category::CategoryName,
    ledger::InstallmentPlan,
    transaction::TransactionType,
};

/// The form data for creating or editing a transaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionForm {
    /// The total value of the transaction.
    pub amount: Decimal,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The name of an existing category of the same type.
    pub category: String,
    /// The date when the transaction ocurred, or the first installment is due.
    pub date: Date,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
    /// Who or how the transaction was paid.
    #[serde(default, alias = "payMethod")]
    pub account: Option<String>,
    /// How the purchase is paid off, ignored when editing.
    #[serde(default)]
    pub installments: Option<InstallmentPlan>,
}

impl TransactionForm {
    /// Create a form for a transaction paid at once with no description or account.
    pub fn new(amount: Decimal, kind: TransactionType, category: &str, date: Date) -> Self {
        Self {
            amount,
            kind,
            category: category.to_owned(),
            date,
            description: None,
            account: None,
            installments: None,
        }
    }

    /// Set the description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    /// Set the account.
    pub fn account(mut self, account: &str) -> Self {
        self.account = Some(account.to_owned());
        self
    }

    /// Pay the purchase off in installments.
    pub fn installments(mut self, plan: InstallmentPlan) -> Self {
        self.installments = Some(plan);
        self
    }

    pub(crate) fn validate(self) -> Result<ValidTransactionForm, Error> {
        Ok(ValidTransactionForm {
            amount: Amount::new(self.amount)?,
            kind: self.kind,
            category: CategoryName::new(&self.category)?,
            date: self.date,
            description: self
                .description
                .map(|description| description.trim().to_owned())
                .unwrap_or_default(),
            account: non_blank(self.account),
            installments: self.installments,
        })
    }
}

pub(crate) struct ValidTransactionForm {
    pub amount: Amount,
    pub kind: TransactionType,
    pub category: CategoryName,
    pub date: Date,
    pub description: String,
    pub account: Option<String>,
    pub installments: Option<InstallmentPlan>,
}

/// Trim `text`, treating blank text as absent.
pub(crate) fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}
