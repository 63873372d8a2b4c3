//! Date range queries over a user's transactions.

use rusqlite::Connection;
use time::Date;

use crate::{Error, calendar::DateRange, user::UserId};

use super::core::{Transaction, map_transaction_row};

/// Get the transactions owned by `user_id` dated within `from` to `to`, both inclusive.
///
/// Transactions are sorted by date, newest first, and then by the time they
/// were recorded to keep the order stable after edits.
///
/// # Errors
/// Returns a:
/// - [Error::Validation] if `from` is after `to`,
/// - or [Error::SqlError] if the query fails or a row cannot be mapped.
pub fn get_transactions_in_range(
    user_id: &UserId,
    from: Date,
    to: Date,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let range = DateRange::new(from, to)?;

    connection
        .prepare(
            "SELECT id, user_id, amount, date, description, type, category, category_icon, \
            account, installment_count, installment_number, created_at, updated_at \
            FROM \"transaction\" \
            WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3 \
            ORDER BY date DESC, created_at ASC, installment_number ASC",
        )?
        .query_map((user_id, range.from(), range.to()), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

#[cfg(test)]
mod tests {
    use time::{Duration, macros::date};

    use crate::{
        Error,
        amount::Amount,
        test_utils::{get_test_connection, other_user, test_user},
        transaction::{NewTransaction, TransactionType, insert_transaction},
    };

    use super::get_transactions_in_range;

    fn new_transaction(cents: i64, date: time::Date) -> NewTransaction {
        NewTransaction {
            amount: Amount::from_cents(cents).unwrap(),
            date,
            description: format!("transaction #{cents}"),
            kind: TransactionType::Expense,
            category: "Groceries".to_owned(),
            category_icon: "🛒".to_owned(),
            account: None,
            installment_count: 1,
            installment_number: None,
        }
    }

    #[test]
    fn returns_transactions_in_inclusive_range() {
        let conn = get_test_connection();
        let today = date!(2025 - 10 - 05);
        for i in 0..10 {
            insert_transaction(
                &test_user(),
                new_transaction(i + 1, today - Duration::days(i)),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got =
            get_transactions_in_range(&test_user(), today - Duration::days(4), today, &conn)
                .unwrap();

        assert_eq!(got.len(), 5, "got {} transactions, want 5", got.len());
    }

    #[test]
    fn orders_newest_date_first() {
        let conn = get_test_connection();
        let today = date!(2025 - 10 - 05);
        for i in 1..=6 {
            let date = if i % 2 == 0 {
                today
            } else {
                today - Duration::days(1)
            };
            insert_transaction(&test_user(), new_transaction(i, date), &conn)
                .expect("Could not create transaction");
        }

        let got =
            get_transactions_in_range(&test_user(), today - Duration::days(1), today, &conn)
                .unwrap();

        let dates: Vec<_> = got.iter().map(|transaction| transaction.date).collect();
        let mut want = dates.clone();
        want.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, want);
        assert_eq!(got.len(), 6);
    }

    #[test]
    fn excludes_other_users() {
        let conn = get_test_connection();
        let today = date!(2025 - 10 - 05);
        insert_transaction(&other_user(), new_transaction(100, today), &conn).unwrap();

        let got = get_transactions_in_range(&test_user(), today, today, &conn).unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn rejects_reversed_range() {
        let conn = get_test_connection();

        let result = get_transactions_in_range(
            &test_user(),
            date!(2025 - 10 - 05),
            date!(2025 - 10 - 04),
            &conn,
        );

        assert!(matches!(result, Err(Error::Validation { field: "from", .. })));
    }
}
