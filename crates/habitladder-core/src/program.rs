//! Persisted per-participant records.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::habit::HabitValues;
use crate::ladder::initial_targets;
use crate::scoring::DayFlags;
use crate::storage::Config;
use crate::survey::ReportedDay;

/// Opaque, stable participant identifier (a chat id for chat transports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub i64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One participant's position on the ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgram {
    pub participant: ParticipantId,
    /// Daily events only fire for active programs.
    pub active: bool,
    pub start_date: NaiveDate,
    /// Completed days, capped at the program duration.
    pub day_index: u32,
    pub targets: HabitValues,
    /// Fixed at program start.
    pub deltas: HabitValues,
    pub points: i64,
    /// Consecutive fully successful days.
    pub streak: u32,
}

impl UserProgram {
    /// A fresh, active program starting on `start_date`.
    pub fn new(participant: ParticipantId, start_date: NaiveDate, config: &Config) -> Self {
        let (targets, deltas) = initial_targets(&config.ladder, config.program.duration_days);
        Self {
            participant,
            active: true,
            start_date,
            day_index: 0,
            targets,
            deltas,
            points: 0,
            streak: 0,
        }
    }
}

/// What a participant reported for one day and how each habit scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayLog {
    pub participant: ParticipantId,
    pub date: NaiveDate,
    pub reported: ReportedDay,
    pub flags: DayFlags,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_program_starts_at_day_zero() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let program = UserProgram::new(ParticipantId(7), date, &Config::default());
        assert!(program.active);
        assert_eq!(program.day_index, 0);
        assert_eq!(program.points, 0);
        assert_eq!(program.targets.reading, 20.0);
        assert_eq!(program.deltas.tg, -1.0);
    }

    #[test]
    fn participant_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ParticipantId(42)).unwrap(), "42");
    }
}
