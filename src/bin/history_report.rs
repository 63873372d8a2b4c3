use std::error::Error;

use clap::Parser;
use rusqlite::Connection;

use budget_ledger::{
    UserId, get_history_years, get_month_series, get_year_series, initialize_db, setup_logging,
};

/// Print the income and expense history of a user as JSON.
///
/// Prints one point per month of the year, or one point per day when a
/// month is given.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite database.
    #[arg(long, env = "BUDGET_LEDGER_DB")]
    db_path: String,

    /// The user to report on.
    #[arg(long, env = "BUDGET_LEDGER_USER")]
    user_id: String,

    /// The year to report on, defaults to the latest year with history.
    #[arg(long)]
    year: Option<i32>,

    /// The month to report on, from 1 for January to 12 for December.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
    month: Option<u8>,
}

fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();
    let args = Args::parse();

    let user_id = UserId::new(&args.user_id)?;
    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let year = match args.year {
        Some(year) => year,
        None => get_history_years(&user_id, &conn)?
            .last()
            .copied()
            .ok_or("no history years")?,
    };

    let series = match args.month {
        Some(month) => get_month_series(&user_id, year, month - 1, &conn)?,
        None => get_year_series(&user_id, year, &conn)?,
    };

    println!("{}", serde_json::to_string_pretty(&series)?);

    Ok(())
}
