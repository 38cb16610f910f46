//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `gvg_core` linkage.
//! - Open the configured store and print a deterministic summary.

use gvg_core::db::migrations::current_user_version;
use gvg_core::db::{open_db, open_db_in_memory};
use gvg_core::{
    CounterRepository, DefenseRepository, SqliteCounterRepository, SqliteDefenseRepository,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("gvg_core ping={}", gvg_core::ping());
    println!("gvg_core version={}", gvg_core::core_version());

    match summarize() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("gvg_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn summarize() -> Result<(), Box<dyn Error>> {
    let config = gvg_core::config::load(None)?;
    gvg_core::init_logging_from_config(&config)?;

    let conn = match config.db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    println!("gvg_core schema_version={}", current_user_version(&conn)?);

    let defenses = SqliteDefenseRepository::try_new(&conn)?.list_defenses()?;
    let counters = SqliteCounterRepository::try_new(&conn)?;
    let mut counter_total = 0;
    for defense in &defenses {
        counter_total += counters.count_for_defense(defense.uuid)?;
    }
    println!("gvg_core defenses={} counters={counter_total}", defenses.len());
    Ok(())
}
