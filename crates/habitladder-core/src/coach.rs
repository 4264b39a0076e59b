//! Event handlers tying the ladder, survey, scoring and storage together.
//!
//! The transport and scheduler call into [`Coach`] with a participant id;
//! each handler loads that participant's records, computes, and writes them
//! back as a unit. Handlers for participants without an (active) program or
//! without an open survey return `Ok(None)` and change nothing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{ConfigError, Result, ValidationError};
use crate::habit::{Habit, HabitValues};
use crate::ladder::clamp_targets;
use crate::program::{DayLog, ParticipantId, UserProgram};
use crate::progression::advance;
use crate::scoring::{apply_points_and_streak, evaluate_day, score, DayFlags};
use crate::storage::{Config, ProgramStore};
use crate::survey::{AnswerStep, Rejection, ReportedDay, SurveyRecord, SurveySession};
use crate::weekly::{summarize, weekly_window, WeekSummary};

/// Goals announced when a participant's day opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorningBrief {
    pub participant: ParticipantId,
    pub date: NaiveDate,
    pub day_index: u32,
    pub duration_days: u32,
    /// Clamped targets, ready to round and show.
    pub goals: HabitValues,
    /// Present on week boundaries when the past week has logs.
    pub week: Option<WeekSummary>,
}

/// Result of finalizing a survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOutcome {
    pub date: NaiveDate,
    pub reported: ReportedDay,
    pub flags: DayFlags,
    pub points_delta: i64,
    pub total_points: i64,
    pub streak: u32,
    pub day_index: u32,
}

/// What happened to one survey answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerReply {
    /// Not accepted; ask the same question again.
    Rejected { rejection: Rejection },
    /// Accepted; ask about `next`.
    Next { next: Habit },
    /// Last answer accepted and the day was scored.
    Finalized { outcome: DayOutcome },
}

/// Snapshot of a program for status views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramStatus {
    pub participant: ParticipantId,
    pub active: bool,
    pub start_date: NaiveDate,
    pub day_index: u32,
    pub duration_days: u32,
    pub points: i64,
    pub streak: u32,
    /// Stored targets, unclamped.
    pub targets: HabitValues,
    pub wake_tolerance_min: u32,
    pub sleep_tolerance_min: u32,
    /// Habit the open survey is waiting on, if any.
    pub survey_awaiting: Option<Habit>,
}

/// The habit coach.
pub struct Coach<S, C> {
    config: Config,
    store: S,
    clock: C,
}

impl<S: ProgramStore, C: Clock> Coach<S, C> {
    /// Build a coach, rejecting configurations that violate the ladder
    /// invariants.
    pub fn new(config: Config, store: S, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            clock,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn active_program(&self, id: ParticipantId) -> Result<Option<UserProgram>> {
        Ok(self.store.get_program(id)?.filter(|p| p.active))
    }

    /// Start a program, or reactivate an existing one where it left off.
    pub fn start_program(&self, id: ParticipantId) -> Result<UserProgram> {
        let program = match self.store.get_program(id)? {
            Some(mut existing) => {
                existing.active = true;
                tracing::info!(participant = %id, day = existing.day_index, "program resumed");
                existing
            }
            None => {
                let fresh = UserProgram::new(id, self.clock.today(), &self.config);
                tracing::info!(participant = %id, start = %fresh.start_date, "program started");
                fresh
            }
        };
        self.store.upsert_program(&program)?;
        Ok(program)
    }

    /// Throw away all progress and start the ladder again from today.
    ///
    /// Day logs are kept; any open survey is discarded.
    pub fn restart_program(&self, id: ParticipantId) -> Result<UserProgram> {
        let program = UserProgram::new(id, self.clock.today(), &self.config);
        self.store.reset_program(&program)?;
        tracing::info!(participant = %id, start = %program.start_date, "program restarted");
        Ok(program)
    }

    /// Deactivate a program. Nothing is deleted.
    pub fn stop_program(&self, id: ParticipantId) -> Result<Option<UserProgram>> {
        let Some(mut program) = self.store.get_program(id)? else {
            return Ok(None);
        };
        program.active = false;
        self.store.upsert_program(&program)?;
        tracing::info!(participant = %id, "program stopped");
        Ok(Some(program))
    }

    /// Today's goals, plus last week's summary on week boundaries.
    pub fn day_opens(&self, id: ParticipantId) -> Result<Option<MorningBrief>> {
        let Some(program) = self.active_program(id)? else {
            return Ok(None);
        };
        let today = self.clock.today();

        let week = match weekly_window(program.start_date, today) {
            Some((from, to)) => {
                Some(self.week_summary(id, from, to)?).filter(|summary| summary.days > 0)
            }
            None => None,
        };

        Ok(Some(MorningBrief {
            participant: id,
            date: today,
            day_index: program.day_index,
            duration_days: self.config.program.duration_days,
            goals: clamp_targets(&program.targets, &self.config.ladder),
            week,
        }))
    }

    /// Open today's survey, silently replacing any unfinished one.
    pub fn survey_opens(&self, id: ParticipantId) -> Result<Option<SurveySession>> {
        if self.active_program(id)?.is_none() {
            return Ok(None);
        }
        if let Some(previous) = self.store.get_survey(id)? {
            tracing::debug!(
                participant = %id,
                date = %previous.date,
                step = previous.step,
                "replacing unfinished survey"
            );
        }
        let session = SurveySession::open(id, self.clock.today());
        self.store.upsert_survey(&SurveyRecord::from(&session))?;
        Ok(Some(session))
    }

    /// Feed one raw text answer to the participant's open survey.
    pub fn answer_received(&self, id: ParticipantId, text: &str) -> Result<Option<AnswerReply>> {
        let Some(record) = self.store.get_survey(id)? else {
            return Ok(None);
        };
        let session = SurveySession::try_from(record)?;

        match session.answer(text) {
            AnswerStep::Rejected(rejection) => {
                tracing::debug!(participant = %id, ?rejection, "answer rejected");
                Ok(Some(AnswerReply::Rejected { rejection }))
            }
            AnswerStep::Next(next) => {
                self.store.upsert_survey(&SurveyRecord::from(&next))?;
                tracing::debug!(participant = %id, awaiting = ?next.awaiting(), "answer accepted");
                Ok(Some(AnswerReply::Next {
                    next: next.awaiting(),
                }))
            }
            AnswerStep::Complete(answers) => {
                let reported = ReportedDay::from(&answers);
                let outcome = self.finalize_day(id, session.date, reported)?;
                Ok(outcome.map(|outcome| AnswerReply::Finalized { outcome }))
            }
        }
    }

    /// Score a finished day and move the program along its ladder.
    fn finalize_day(
        &self,
        id: ParticipantId,
        date: NaiveDate,
        reported: ReportedDay,
    ) -> Result<Option<DayOutcome>> {
        let Some(mut program) = self.store.get_program(id)? else {
            return Ok(None);
        };

        let flags = evaluate_day(&program.targets, &self.config.tolerance, &reported);
        let points_delta = score(&flags, &self.config.scoring);
        let (points, streak) = apply_points_and_streak(
            program.points,
            program.streak,
            points_delta,
            flags.all_ok(),
            &self.config.scoring,
        );
        program.points = points;
        program.streak = streak;
        advance(&mut program, &flags, self.config.program.duration_days);

        let log = DayLog {
            participant: id,
            date,
            reported,
            flags,
        };
        self.store.commit_day(&log, &program)?;

        tracing::info!(
            participant = %id,
            %date,
            passed = flags.passed(),
            points_delta,
            points,
            streak,
            day = program.day_index,
            "day finalized"
        );

        Ok(Some(DayOutcome {
            date,
            reported,
            flags,
            points_delta,
            total_points: points,
            streak,
            day_index: program.day_index,
        }))
    }

    pub fn status(&self, id: ParticipantId) -> Result<Option<ProgramStatus>> {
        let Some(program) = self.store.get_program(id)? else {
            return Ok(None);
        };
        let survey_awaiting = match self.store.get_survey(id)? {
            Some(record) => Some(SurveySession::try_from(record)?.awaiting()),
            None => None,
        };
        Ok(Some(ProgramStatus {
            participant: id,
            active: program.active,
            start_date: program.start_date,
            day_index: program.day_index,
            duration_days: self.config.program.duration_days,
            points: program.points,
            streak: program.streak,
            targets: program.targets,
            wake_tolerance_min: self.config.tolerance.wake_min,
            sleep_tolerance_min: self.config.tolerance.sleep_min,
            survey_awaiting,
        }))
    }

    /// Summary of the participant's logs within `from..=to`.
    pub fn week_summary(
        &self,
        id: ParticipantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<WeekSummary> {
        if to < from {
            return Err(ValidationError::InvalidDateRange { from, to }.into());
        }
        let logs = self.store.logs_in_range(id, from, to)?;
        Ok(summarize(&logs, from, to))
    }

    /// Participants whose daily events should fire.
    pub fn active_participants(&self) -> Result<Vec<ParticipantId>> {
        Ok(self
            .store
            .active_programs()?
            .into_iter()
            .map(|p| p.participant)
            .collect())
    }
}
