//! Recording new transactions.

use rusqlite::Connection;

use crate::{
    Error,
    category::get_category,
    history::{BucketDelta, apply_to_date},
    ledger::{TransactionForm, split_into_installments},
    transaction::{NewTransaction, Transaction, insert_transaction},
    user::UserId,
};

/// Record a transaction for `user_id` and add it to the history totals.
///
/// A purchase paid in installments is recorded as one transaction per
/// installment, each counted in the history of its own due date. The stored
/// category name and icon are copied onto every transaction.
///
/// Either every transaction and total is written or, on error, nothing is.
///
/// Returns the created transactions in installment order.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the form is invalid,
/// - [Error::CategoryNotFound] if the user has no category of that type and name,
/// - or [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    user_id: &UserId,
    form: TransactionForm,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let form = form.validate()?;
    let installments =
        split_into_installments(form.amount, form.date, form.installments.as_ref())?;
    let installment_count = u32::try_from(installments.len())
        .map_err(|_| Error::validation("installments", "too many installments"))?;

    let sql_transaction = connection.unchecked_transaction()?;

    let category = get_category(user_id, form.category.as_ref(), form.kind, &sql_transaction)?;

    let mut created = Vec::with_capacity(installments.len());
    for installment in installments {
        let transaction = insert_transaction(
            user_id,
            NewTransaction {
                amount: installment.amount,
                date: installment.date,
                description: form.description.clone(),
                kind: form.kind,
                category: category.name.to_string(),
                category_icon: category.icon.clone(),
                account: form.account.clone(),
                installment_count,
                installment_number: installment.number,
            },
            &sql_transaction,
        )?;

        apply_to_date(
            user_id,
            transaction.date,
            BucketDelta::credit(transaction.kind, transaction.amount),
            &sql_transaction,
        )?;

        created.push(transaction);
    }

    sql_transaction.commit()?;

    tracing::info!(
        "created {} {} transaction(s) in {} for user {user_id}",
        created.len(),
        form.kind,
        category.name
    );

    Ok(created)
}

#[cfg(test)]
mod create_transaction_tests {
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        Error,
        history::{get_all_day_buckets, get_all_month_buckets},
        ledger::{InstallmentPlan, TransactionForm, create_transaction},
        test_utils::{
            assert_buckets_match_ledger, create_test_category, get_test_connection, other_user,
            test_user,
        },
        transaction::{TransactionType, count_transactions},
    };

    #[test]
    fn creates_transaction_and_buckets() {
        let conn = get_test_connection();
        create_test_category("Groceries", TransactionType::Expense, &conn);
        let form = TransactionForm::new(
            Decimal::new(1234, 2),
            TransactionType::Expense,
            "groceries",
            date!(2024 - 03 - 10),
        )
        .description("weekly shop")
        .account("visa");

        let created = create_transaction(&test_user(), form, &conn).unwrap();

        assert_eq!(created.len(), 1);
        let transaction = &created[0];
        assert_eq!(transaction.category, "Groceries", "stored spelling is copied");
        assert_eq!(transaction.installment_count, 1);
        assert_eq!(transaction.installment_number, None);
        assert_eq!(transaction.account.as_deref(), Some("visa"));

        let days = get_all_day_buckets(&test_user(), &conn).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].expense, Decimal::new(1234, 2));
        assert_buckets_match_ledger(&test_user(), &conn);
    }

    #[test]
    fn second_transaction_on_same_day_increments_bucket() {
        let conn = get_test_connection();
        create_test_category("Salary", TransactionType::Income, &conn);
        let date = date!(2024 - 03 - 10);

        for cents in [100000, 2550] {
            let form = TransactionForm::new(
                Decimal::new(cents, 2),
                TransactionType::Income,
                "Salary",
                date,
            );
            create_transaction(&test_user(), form, &conn).unwrap();
        }

        let months = get_all_month_buckets(&test_user(), &conn).unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].income, Decimal::new(102550, 2));
        assert_buckets_match_ledger(&test_user(), &conn);
    }

    #[test]
    fn installments_create_one_row_per_month() {
        let conn = get_test_connection();
        create_test_category("Electronics", TransactionType::Expense, &conn);
        let form = TransactionForm::new(
            Decimal::new(10000, 2),
            TransactionType::Expense,
            "Electronics",
            date!(2024 - 01 - 31),
        )
        .installments(InstallmentPlan::new(3));

        let created = create_transaction(&test_user(), form, &conn).unwrap();

        let summary: Vec<_> = created
            .iter()
            .map(|transaction| {
                (
                    transaction.date,
                    transaction.amount.cents(),
                    transaction.installment_number,
                    transaction.installment_count,
                )
            })
            .collect();
        assert_eq!(
            summary,
            [
                (date!(2024 - 01 - 31), 3334, Some(1), 3),
                (date!(2024 - 02 - 29), 3333, Some(2), 3),
                (date!(2024 - 03 - 31), 3333, Some(3), 3),
            ]
        );
        assert_eq!(get_all_month_buckets(&test_user(), &conn).unwrap().len(), 3);
        assert_buckets_match_ledger(&test_user(), &conn);
    }

    #[test]
    fn missing_category_fails_and_writes_nothing() {
        let conn = get_test_connection();
        create_test_category("Salary", TransactionType::Income, &conn);
        let form = TransactionForm::new(
            Decimal::ONE,
            TransactionType::Expense,
            "Salary",
            date!(2024 - 03 - 10),
        );

        let result = create_transaction(&test_user(), form, &conn);

        assert_eq!(
            result,
            Err(Error::CategoryNotFound {
                name: "Salary".to_owned(),
                kind: TransactionType::Expense
            })
        );
        assert_eq!(count_transactions(&test_user(), &conn), Ok(0));
        assert!(get_all_day_buckets(&test_user(), &conn).unwrap().is_empty());
    }

    #[test]
    fn other_users_category_is_not_visible() {
        let conn = get_test_connection();
        create_test_category("Groceries", TransactionType::Expense, &conn);
        let form = TransactionForm::new(
            Decimal::ONE,
            TransactionType::Expense,
            "Groceries",
            date!(2024 - 03 - 10),
        );

        let result = create_transaction(&other_user(), form, &conn);

        assert!(matches!(result, Err(Error::CategoryNotFound { .. })));
    }

    #[test]
    fn invalid_amount_fails_before_writing() {
        let conn = get_test_connection();
        create_test_category("Groceries", TransactionType::Expense, &conn);
        let form = TransactionForm::new(
            Decimal::new(-500, 2),
            TransactionType::Expense,
            "Groceries",
            date!(2024 - 03 - 10),
        );

        let result = create_transaction(&test_user(), form, &conn);

        assert!(matches!(result, Err(Error::Validation { field: "amount", .. })));
        assert_eq!(count_transactions(&test_user(), &conn), Ok(0));
    }
}
