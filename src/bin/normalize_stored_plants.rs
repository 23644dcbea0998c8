// Maintenance utility: re-apply plant normalization to every stored employee.
//
// Usage:
//   cargo run --bin normalize_stored_plants -- [db_path]
//
// Without db_path the default location (VACATION_LEDGER_DB_PATH or the user data dir) is used.

use std::sync::{Arc, Mutex};
use vacation_ledger::api::EmployeeApi;
use vacation_ledger::config::get_default_db_path;
use vacation_ledger::db::open_and_init;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    vacation_ledger::logging::init();

    let db_path = std::env::args()
        .nth(1)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(get_default_db_path);

    let conn = Arc::new(Mutex::new(open_and_init(&db_path)?));
    let changed = EmployeeApi::new(conn).normalize_stored_plants()?;

    println!("db_path={} changed={}", db_path, changed);
    Ok(())
}
