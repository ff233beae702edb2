use anyhow::Result;
use rusqlite::Connection;
use std::env;
use std::path::Path;

use brokerage_backoffice::{
    count_account_holders, count_general_accounts, count_rep_codes, setup_database,
    search_rep_codes,
};

const DB_PATH: &str = "backoffice.db";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("init") => run_init()?,
        Some("summary") => run_summary()?,
        _ => print_usage(),
    }

    Ok(())
}

fn print_usage() {
    println!("Brokerage Back-Office v{}", brokerage_backoffice::VERSION);
    println!();
    println!("Usage:");
    println!("  brokerage-backoffice init       Create the database schema");
    println!("  brokerage-backoffice summary    Print record counts");
    println!();
    println!("Admin API: cargo run --bin backoffice-server --features server");
}

fn run_init() -> Result<()> {
    let db_path = Path::new(DB_PATH);

    println!("Setting up database at {:?}...", db_path);
    let conn = Connection::open(db_path)?;
    setup_database(&conn)?;
    println!("✓ Database initialized (WAL mode, foreign keys on)");

    Ok(())
}

fn run_summary() -> Result<()> {
    let db_path = Path::new(DB_PATH);

    if !db_path.exists() {
        eprintln!("Database not found at {:?}", db_path);
        eprintln!("Run: brokerage-backoffice init");
        std::process::exit(1);
    }

    let conn = Connection::open(db_path)?;
    setup_database(&conn)?;

    println!("Rep codes:        {}", count_rep_codes(&conn)?);
    println!("General accounts: {}", count_general_accounts(&conn)?);
    println!("Account holders:  {}", count_account_holders(&conn)?);

    let reps = search_rep_codes(&conn, None)?;
    if !reps.is_empty() {
        println!();
        for rep in reps {
            println!("  {}  [{}]", rep, rep.status.label());
        }
    }

    Ok(())
}
