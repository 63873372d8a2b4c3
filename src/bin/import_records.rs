use std::error::Error;
use std::fs;

use clap::Parser;
use rusqlite::Connection;

use budget_ledger::{NormalizedRecord, UserId, import_records, initialize_db, setup_logging};

/// Import transactions from a JSON file into a budget_ledger database.
///
/// The file must contain a JSON array of records with the fields `amount`,
/// `date`, `type`, `category` and optionally `description`, `categoryIcon`
/// and `account`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite database.
    #[arg(long, env = "BUDGET_LEDGER_DB")]
    db_path: String,

    /// The user to import the transactions for.
    #[arg(long, env = "BUDGET_LEDGER_USER")]
    user_id: String,

    /// File path to the JSON records.
    #[arg(long, short)]
    input: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();
    let args = Args::parse();

    let user_id = UserId::new(&args.user_id)?;
    let records: Vec<NormalizedRecord> = serde_json::from_str(&fs::read_to_string(&args.input)?)?;

    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let summary = import_records(&user_id, &records, &conn)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
