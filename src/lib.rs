//! A personal finance ledger that keeps daily and monthly income and expense
//! totals consistent with the transactions they are computed from.
//!
//! Transactions are stored in SQLite together with two history tables of
//! running totals, one per day and one per month. The operations in this
//! crate that change transactions ([create_transaction], [edit_transaction],
//! [delete_transaction] and [import_records]) update the history tables in
//! the same SQL transaction, so charts can be read straight from the totals
//! with [get_year_series] and [get_month_series].
//!
//! All data is scoped to a [UserId] issued by an external identity provider.

#![warn(missing_docs)]

pub mod amount;
pub mod calendar;
pub mod category;
mod db;
mod error;
pub mod history;
pub mod ledger;
mod logging;
pub mod stats;
pub mod transaction;
mod user;
pub mod user_settings;

#[cfg(test)]
mod test_utils;

pub use amount::Amount;
pub use calendar::{DateRange, utc_date};
pub use category::{
    Category, CategoryName, NewCategory, create_category, delete_category, ensure_categories,
    get_categories, get_category,
};
pub use db::initialize as initialize_db;
pub use error::{Error, ErrorKind};
pub use history::{HistoryPoint, get_history_years, get_month_series, get_year_series};
pub use ledger::{
    ImportSummary, InstallmentPlan, NormalizedRecord, TransactionForm, create_transaction,
    delete_transaction, edit_transaction, import_records,
};
pub use logging::setup_logging;
pub use stats::{CategoryStat, Totals, get_balance_stats, get_category_stats};
pub use transaction::{
    Transaction, TransactionId, TransactionType, get_transaction_by_id,
    get_transactions_in_range, get_user_transaction,
};
pub use user::UserId;
pub use user_settings::{
    Currency, UserRole, UserSettings, get_user_settings, update_user_currency, update_user_role,
};
