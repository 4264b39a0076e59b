//! # Habitladder Core Library
//!
//! Core logic for a 60-day habit-building coach. Each participant follows six
//! daily goals that move a little every day from a start value to an end
//! value, reports what they actually did in an evening survey, and earns
//! points and a streak for the goals they met.
//!
//! ## Architecture
//!
//! - **Ladder**: Initial targets, per-day deltas and display clamping
//! - **Survey**: Six-question state machine with per-answer validation
//! - **Scoring / Progression**: Day flags, points, streak and target updates
//! - **Weekly**: Trailing-week summaries derived from day logs
//! - **Storage**: SQLite-backed records and TOML-based configuration
//! - **Coach**: Event handlers the transport and scheduler call into
//!
//! ## Key Components
//!
//! - [`Coach`]: Day-open, survey-open and answer handlers
//! - [`Database`]: Program, survey and day-log persistence
//! - [`Config`]: Program configuration management

pub mod clock;
pub mod coach;
pub mod error;
pub mod habit;
pub mod ladder;
pub mod program;
pub mod progression;
pub mod scoring;
pub mod storage;
pub mod survey;
pub mod trigger;
pub mod weekly;

pub use clock::{Clock, ClockTime, FixedClock, SystemClock};
pub use coach::{AnswerReply, Coach, DayOutcome, MorningBrief, ProgramStatus};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use habit::{Direction, Habit, HabitValues};
pub use program::{DayLog, ParticipantId, UserProgram};
pub use scoring::DayFlags;
pub use storage::{Config, Database, ProgramStore};
pub use survey::{Rejection, ReportedDay, SurveySession};
pub use trigger::{next_trigger, Trigger};
pub use weekly::WeekSummary;
