use std::{
    error::Error,
    path::{Path, PathBuf},
    process::exit,
};

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use budget_ledger::{
    InstallmentPlan, NewCategory, TransactionForm, TransactionType, UserId, create_category,
    create_transaction, initialize_db, setup_logging,
};

/// Seeds a fresh budget_ledger database with a few categories and transactions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Where to write the new SQLite database, e.g. 'ledger.db'.
    #[arg(long, short)]
    output_path: PathBuf,

    /// The user that owns the seeded data.
    #[arg(long, default_value = "test_user")]
    user_id: String,
}

/// Refuse paths without an extension and paths that would overwrite a file.
fn check_output_path(path: &Path) -> Result<(), String> {
    if path.extension().is_none_or(|extension| extension.is_empty()) {
        return Err(format!(
            "{} has no file extension, try something like 'ledger.db'",
            path.display()
        ));
    }

    if path.exists() {
        return Err(format!("{} already exists", path.display()));
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();
    let args = Args::parse();

    if let Err(message) = check_output_path(&args.output_path) {
        eprintln!("{message}");
        exit(1);
    }

    println!("Seeding {}", args.output_path.display());
    let conn = Connection::open(&args.output_path)?;

    initialize_db(&conn)?;

    let user_id = UserId::new(&args.user_id)?;

    println!("Creating categories for {user_id}...");

    for (name, icon, kind) in [
        ("Salary", "💼", TransactionType::Income),
        ("Groceries", "🛒", TransactionType::Expense),
        ("Rent", "🏠", TransactionType::Expense),
        ("Electronics", "💻", TransactionType::Expense),
    ] {
        create_category(&user_id, NewCategory::new(name, icon, kind)?, &conn)?;
    }

    println!("Creating transactions...");

    let today = OffsetDateTime::now_utc().date();
    let forms = [
        TransactionForm::new(
            Decimal::new(450000, 2),
            TransactionType::Income,
            "Salary",
            today - Duration::days(30),
        )
        .description("Monthly salary"),
        TransactionForm::new(
            Decimal::new(120000, 2),
            TransactionType::Expense,
            "Rent",
            today - Duration::days(28),
        ),
        TransactionForm::new(
            Decimal::new(8735, 2),
            TransactionType::Expense,
            "Groceries",
            today - Duration::days(3),
        )
        .description("Weekly shop")
        .account("debit card"),
        TransactionForm::new(
            Decimal::new(119999, 2),
            TransactionType::Expense,
            "Electronics",
            today,
        )
        .description("Laptop")
        .account("visa")
        .installments(InstallmentPlan::new(6)),
    ];

    for form in forms {
        create_transaction(&user_id, form, &conn)?;
    }

    println!("Success!");

    Ok(())
}
