mod config;
pub mod database;
pub mod migrations;

pub use config::{
    ClockLadder, Config, LadderConfig, MinuteLadder, ProgramConfig, ScheduleConfig,
    ScoringConfig, ToleranceConfig,
};
pub use database::Database;

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::Result;
use crate::program::{DayLog, ParticipantId, UserProgram};
use crate::survey::SurveyRecord;

/// Returns the data directory.
///
/// `HABITLADDER_HOME` wins when set. Otherwise `~/.config/habitladder[-dev]/`
/// based on HABITLADDER_ENV (set HABITLADDER_ENV=dev to use a development
/// data directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("HABITLADDER_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env =
                std::env::var("HABITLADDER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitladder-dev")
            } else {
                base_dir.join("habitladder")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Keyed record store for programs, day logs and open surveys.
///
/// Each participant's records are read, updated and written back as a unit;
/// nothing here spans participants.
pub trait ProgramStore {
    fn get_program(&self, id: ParticipantId) -> Result<Option<UserProgram>>;

    fn upsert_program(&self, program: &UserProgram) -> Result<()>;

    fn active_programs(&self) -> Result<Vec<UserProgram>>;

    fn get_survey(&self, id: ParticipantId) -> Result<Option<SurveyRecord>>;

    /// Replaces any open survey for the same participant.
    fn upsert_survey(&self, survey: &SurveyRecord) -> Result<()>;

    /// Record a finished day: write its log (overwriting an earlier log for
    /// the same date), close the participant's survey and save the advanced
    /// program. Either all three happen or none.
    fn commit_day(&self, log: &DayLog, program: &UserProgram) -> Result<()>;

    /// Replace a program and close its survey. Either both happen or neither.
    fn reset_program(&self, program: &UserProgram) -> Result<()>;

    /// Logs with `from <= date <= to`, oldest first.
    fn logs_in_range(
        &self,
        id: ParticipantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DayLog>>;
}
