#![allow(missing_docs)]

use std::collections::BTreeMap;

use rusqlite::Connection;
use time::Date;

use crate::{
    amount::{Amount, cents_to_decimal},
    category::{Category, NewCategory, create_category},
    db::initialize,
    history::{
        BucketDelta, DayBucket, DayKey, MonthBucket, MonthKey, get_all_day_buckets,
        get_all_month_buckets,
    },
    transaction::TransactionType,
    user::UserId,
};

pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    initialize(&conn).unwrap();
    conn
}

pub(crate) fn test_user() -> UserId {
    UserId::new("user_test").unwrap()
}

pub(crate) fn other_user() -> UserId {
    UserId::new("user_other").unwrap()
}

/// Create a category called `name` for [test_user].
pub(crate) fn create_test_category(
    name: &str,
    kind: TransactionType,
    conn: &Connection,
) -> Category {
    create_category(
        &test_user(),
        NewCategory::new(name, "🏷️", kind).unwrap(),
        conn,
    )
    .expect("Could not create test category")
}

/// Recompute the daily and monthly totals of `user_id` from the transaction
/// table and check they equal the stored history rows, with no extra rows.
#[track_caller]
pub(crate) fn assert_buckets_match_ledger(user_id: &UserId, conn: &Connection) {
    let mut days: BTreeMap<DayKey, BucketDelta> = BTreeMap::new();
    let mut months: BTreeMap<MonthKey, BucketDelta> = BTreeMap::new();

    let rows: Vec<(Date, TransactionType, Amount)> = conn
        .prepare("SELECT date, type, amount FROM \"transaction\" WHERE user_id = ?1")
        .unwrap()
        .query_map([user_id], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .map(Result::unwrap)
        .collect();

    for (date, kind, amount) in rows {
        let delta = BucketDelta::credit(kind, amount);
        let day = days.entry(DayKey::from_date(date)).or_default();
        *day = day.checked_add(delta).unwrap();
        let month = months.entry(MonthKey::from_date(date)).or_default();
        *month = month.checked_add(delta).unwrap();
    }

    let want_days: Vec<DayBucket> = days
        .into_iter()
        .map(|(key, totals)| DayBucket {
            key,
            income: cents_to_decimal(totals.income),
            expense: cents_to_decimal(totals.expense),
        })
        .collect();
    let want_months: Vec<MonthBucket> = months
        .into_iter()
        .map(|(key, totals)| MonthBucket {
            key,
            income: cents_to_decimal(totals.income),
            expense: cents_to_decimal(totals.expense),
        })
        .collect();

    assert_eq!(
        get_all_day_buckets(user_id, conn).unwrap(),
        want_days,
        "daily history does not match the transactions"
    );
    assert_eq!(
        get_all_month_buckets(user_id, conn).unwrap(),
        want_months,
        "monthly history does not match the transactions"
    );
}
