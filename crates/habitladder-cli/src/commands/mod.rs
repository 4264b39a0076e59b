pub mod config;
pub mod daemon;
pub mod goals;
pub mod program;
pub mod survey;
pub mod week;

use habitladder_core::{Coach, Config, Database, SystemClock};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Coach over the on-disk database, in the configured participant time zone.
pub fn open_coach() -> CliResult<Coach<Database, SystemClock>> {
    let config = Config::load()?;
    let clock = SystemClock::with_offset_minutes(config.program.utc_offset_min);
    let db = Database::open()?;
    Ok(Coach::new(config, db, clock)?)
}

pub fn no_program(id: i64) -> Box<dyn std::error::Error> {
    format!("no active program for participant {id}").into()
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
