//! The operations that change the ledger.
//!
//! Every operation here writes the transaction rows together with the daily
//! and monthly history totals in one SQL transaction, so that after it
//! returns, successfully or not, each history row equals the sum of the
//! user's transactions in that day or month.

mod create;
mod delete;
mod edit;
mod form;
mod import;
mod installment;

pub use create::create_transaction;
pub use delete::delete_transaction;
pub use edit::edit_transaction;
pub use form::TransactionForm;
pub use import::{ImportSummary, NormalizedRecord, import_records};
pub use installment::{Installment, InstallmentPlan, MAX_INSTALLMENTS, split_into_installments};

#[cfg(test)]
mod consistency_tests {
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        category::get_categories,
        history::{get_month_buckets, get_year_series},
        ledger::{
            InstallmentPlan, NormalizedRecord, TransactionForm, create_transaction,
            delete_transaction, edit_transaction, import_records,
        },
        test_utils::{assert_buckets_match_ledger, create_test_category, get_test_connection, test_user},
        transaction::{TransactionType, get_transaction_by_id},
    };

    #[test]
    fn create_then_get_returns_same_fields() {
        let conn = get_test_connection();
        create_test_category("Groceries", TransactionType::Expense, &conn);
        let form = TransactionForm::new(
            Decimal::new(4599, 2),
            TransactionType::Expense,
            "Groceries",
            date!(2024 - 06 - 30),
        );

        let created = create_transaction(&test_user(), form, &conn).unwrap().remove(0);
        let got = get_transaction_by_id(created.id, &conn).unwrap().unwrap();

        assert_eq!(got.amount.as_decimal(), Decimal::new(4599, 2));
        assert_eq!(got.date, date!(2024 - 06 - 30));
        assert_eq!(got.kind, TransactionType::Expense);
        assert_eq!(got.category, "Groceries");
        assert_eq!(got, created);
    }

    #[test]
    fn installments_are_counted_in_their_own_month() {
        let conn = get_test_connection();
        create_test_category("Furniture", TransactionType::Expense, &conn);
        let form = TransactionForm::new(
            Decimal::new(300, 0),
            TransactionType::Expense,
            "Furniture",
            date!(2024 - 01 - 15),
        )
        .installments(InstallmentPlan::new(3));

        let created = create_transaction(&test_user(), form, &conn).unwrap();

        let dates: Vec<_> = created.iter().map(|transaction| transaction.date).collect();
        assert_eq!(
            dates,
            [date!(2024 - 01 - 15), date!(2024 - 02 - 15), date!(2024 - 03 - 15)]
        );
        let months = get_month_buckets(&test_user(), 2024, &conn).unwrap();
        let totals: Vec<_> = months
            .iter()
            .map(|bucket| (bucket.key.month, bucket.expense))
            .collect();
        assert_eq!(
            totals,
            [
                (0, Decimal::new(100, 0)),
                (1, Decimal::new(100, 0)),
                (2, Decimal::new(100, 0)),
            ]
        );
    }

    #[test]
    fn year_series_with_single_march_transaction() {
        let conn = get_test_connection();
        create_test_category("Salary", TransactionType::Income, &conn);
        let form = TransactionForm::new(
            Decimal::new(250000, 2),
            TransactionType::Income,
            "Salary",
            date!(2024 - 03 - 01),
        );
        create_transaction(&test_user(), form, &conn).unwrap();

        let series = get_year_series(&test_user(), 2024, &conn).unwrap();

        assert_eq!(series.len(), 12);
        for (month, point) in series.iter().enumerate() {
            if month == 2 {
                assert_eq!(point.income, Decimal::new(250000, 2));
            } else {
                assert_eq!(point.income, Decimal::ZERO, "month {month}");
            }
            assert_eq!(point.expense, Decimal::ZERO, "month {month}");
        }
    }

    #[test]
    fn import_with_repeated_new_category_creates_it_once() {
        let conn = get_test_connection();
        let records: Vec<NormalizedRecord> = serde_json::from_str(
            r#"[
                {"amount": "30.00", "date": "2024-05-01", "type": "expense", "category": "Gym"},
                {"amount": "30.00", "date": "2024-06-01", "type": "expense", "category": "Gym"}
            ]"#,
        )
        .unwrap();

        let summary = import_records(&test_user(), &records, &conn).unwrap();

        assert_eq!(summary.categories_created, 1);
        let categories = get_categories(&test_user(), None, &conn).unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name.as_ref(), "Gym");
        assert_buckets_match_ledger(&test_user(), &conn);
    }

    #[test]
    fn history_matches_ledger_after_every_operation() {
        let conn = get_test_connection();
        create_test_category("Food", TransactionType::Expense, &conn);
        create_test_category("Gifts", TransactionType::Income, &conn);
        let day = date!(2024 - 02 - 29);
        let form = |cents: i64, kind: TransactionType, date: time::Date| {
            let category = match kind {
                TransactionType::Income => "Gifts",
                TransactionType::Expense => "Food",
            };
            TransactionForm::new(Decimal::new(cents, 2), kind, category, date)
        };

        let a = create_transaction(&test_user(), form(1000, TransactionType::Expense, day), &conn)
            .unwrap()
            .remove(0);
        assert_buckets_match_ledger(&test_user(), &conn);
        let b = create_transaction(&test_user(), form(2500, TransactionType::Income, day), &conn)
            .unwrap()
            .remove(0);
        assert_buckets_match_ledger(&test_user(), &conn);
        let c = create_transaction(&test_user(), form(700, TransactionType::Expense, day), &conn)
            .unwrap()
            .remove(0);
        assert_buckets_match_ledger(&test_user(), &conn);

        edit_transaction(
            &test_user(),
            a.id,
            form(1000, TransactionType::Income, date!(2024 - 03 - 01)),
            &conn,
        )
        .unwrap();
        assert_buckets_match_ledger(&test_user(), &conn);

        edit_transaction(&test_user(), b.id, form(1, TransactionType::Expense, day), &conn)
            .unwrap();
        assert_buckets_match_ledger(&test_user(), &conn);

        delete_transaction(&test_user(), c.id, &conn).unwrap();
        assert_buckets_match_ledger(&test_user(), &conn);

        edit_transaction(
            &test_user(),
            a.id,
            form(1000, TransactionType::Income, day),
            &conn,
        )
        .unwrap();
        assert_buckets_match_ledger(&test_user(), &conn);

        delete_transaction(&test_user(), a.id, &conn).unwrap();
        delete_transaction(&test_user(), b.id, &conn).unwrap();
        assert_buckets_match_ledger(&test_user(), &conn);
    }
}
