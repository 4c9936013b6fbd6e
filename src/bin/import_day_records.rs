// Import one business day's weight and item exports into the database.
//
// Usage:
//   cargo run --bin import_day_records -- <YYYY-MM-DD> [--weights FILE] [--items FILE] [--replace] [--db PATH]
//
// Files may be CSV or XLSX. Unparsable cells are stored as missing and listed as warnings.

use chrono::NaiveDate;
use laundry_line_balance::app::{get_default_db_path, AppState};
use laundry_line_balance::logging;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let raw_date = args
        .next()
        .ok_or("usage: import_day_records <YYYY-MM-DD> [--weights FILE] [--items FILE] [--replace] [--db PATH]")?;
    let business_date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid business date: {}", raw_date))?;

    let mut weight_file: Option<PathBuf> = None;
    let mut item_file: Option<PathBuf> = None;
    let mut replace_existing = false;
    let mut db_path: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--weights" => weight_file = Some(args.next().ok_or("--weights needs a file")?.into()),
            "--items" => item_file = Some(args.next().ok_or("--items needs a file")?.into()),
            "--replace" => replace_existing = true,
            "--db" => db_path = Some(args.next().ok_or("--db needs a path")?),
            other => return Err(format!("unknown argument: {}", other).into()),
        }
    }

    let state = AppState::new(db_path.unwrap_or_else(get_default_db_path))?;
    let summary = state.balance_api.import_day(
        business_date,
        weight_file.as_deref(),
        item_file.as_deref(),
        replace_existing,
    )?;

    for warning in &summary.warnings {
        eprintln!(
            "row {} [{}]: {}",
            warning.row_number, warning.field, warning.message
        );
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
