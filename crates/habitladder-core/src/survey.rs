//! Evening survey state machine.
//!
//! Six questions in fixed order, one per habit:
//!
//! ```text
//! Reading -> Focus -> Screen -> Telegram -> Wake -> Sleep -> (complete)
//! ```
//!
//! Each stage carries the answers captured so far, so a session can never
//! be "at Telegram" without knowing the screen ceiling. A malformed answer
//! leaves the session where it was and yields a [`Rejection`] for the
//! transport to re-prompt with.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::{ClockTime, LAST_MINUTE};
use crate::error::DatabaseError;
use crate::habit::Habit;
use crate::program::ParticipantId;

/// Upper bound for reading and focus answers.
pub const MAX_ACTIVITY_MINUTES: u32 = 10_000;

/// Upper bound for screen and telegram answers: one full day.
pub const MAX_SCREEN_MINUTES: u32 = 1_440;

/// Stored step value for a finished survey.
pub const STEP_COMPLETE: u8 = 6;

/// Where the survey stands, with everything answered so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "awaiting", rename_all = "snake_case")]
pub enum SurveyStage {
    Reading,
    Focus {
        reading: u32,
    },
    Screen {
        reading: u32,
        focus: u32,
    },
    Telegram {
        reading: u32,
        focus: u32,
        screen: u32,
    },
    Wake {
        reading: u32,
        focus: u32,
        screen: u32,
        tg: u32,
    },
    Sleep {
        reading: u32,
        focus: u32,
        screen: u32,
        tg: u32,
        wake: ClockTime,
    },
}

impl SurveyStage {
    /// The habit this stage is asking about.
    pub fn habit(&self) -> Habit {
        match self {
            SurveyStage::Reading => Habit::Reading,
            SurveyStage::Focus { .. } => Habit::Focus,
            SurveyStage::Screen { .. } => Habit::Screen,
            SurveyStage::Telegram { .. } => Habit::Telegram,
            SurveyStage::Wake { .. } => Habit::Wake,
            SurveyStage::Sleep { .. } => Habit::Sleep,
        }
    }

    /// Stored step number, 0..=5.
    pub fn step(&self) -> u8 {
        self.habit().index() as u8
    }

    pub fn answers(&self) -> SurveyAnswers {
        let mut answers = SurveyAnswers::default();
        match *self {
            SurveyStage::Reading => {}
            SurveyStage::Focus { reading } => {
                answers.reading = Some(reading);
            }
            SurveyStage::Screen { reading, focus } => {
                answers.reading = Some(reading);
                answers.focus = Some(focus);
            }
            SurveyStage::Telegram {
                reading,
                focus,
                screen,
            } => {
                answers.reading = Some(reading);
                answers.focus = Some(focus);
                answers.screen = Some(screen);
            }
            SurveyStage::Wake {
                reading,
                focus,
                screen,
                tg,
            } => {
                answers.reading = Some(reading);
                answers.focus = Some(focus);
                answers.screen = Some(screen);
                answers.tg = Some(tg);
            }
            SurveyStage::Sleep {
                reading,
                focus,
                screen,
                tg,
                wake,
            } => {
                answers.reading = Some(reading);
                answers.focus = Some(focus);
                answers.screen = Some(screen);
                answers.tg = Some(tg);
                answers.wake = Some(wake.minutes());
            }
        }
        answers
    }
}

/// Answers captured by a survey; wake and sleep as minutes of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurveyAnswers {
    pub reading: Option<u32>,
    pub focus: Option<u32>,
    pub screen: Option<u32>,
    pub tg: Option<u32>,
    pub wake: Option<u16>,
    pub sleep: Option<u16>,
}

/// A day's reported values with the gaps filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedDay {
    pub reading: u32,
    pub focus: u32,
    pub screen: u32,
    pub tg: u32,
    pub wake: u16,
    pub sleep: u16,
}

impl From<&SurveyAnswers> for ReportedDay {
    /// Missing durations count as zero; missing times as the last minute of
    /// the day.
    fn from(answers: &SurveyAnswers) -> Self {
        Self {
            reading: answers.reading.unwrap_or(0),
            focus: answers.focus.unwrap_or(0),
            screen: answers.screen.unwrap_or(0),
            tg: answers.tg.unwrap_or(0),
            wake: answers.wake.unwrap_or(LAST_MINUTE),
            sleep: answers.sleep.unwrap_or(LAST_MINUTE),
        }
    }
}

/// Why an answer was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// Not a whole number of minutes in `0..=max`.
    InvalidMinutes { habit: Habit, max: u32 },
    /// Telegram minutes above the screen minutes given earlier.
    TelegramExceedsScreen { screen: u32 },
    /// Not a 24-hour `HH:MM` time.
    InvalidClockTime { habit: Habit },
}

/// Result of feeding one answer to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerStep {
    /// Accepted; the survey continues with the returned session.
    Next(SurveySession),
    /// Not accepted; the session is unchanged.
    Rejected(Rejection),
    /// The last answer was accepted and the survey is finished.
    Complete(SurveyAnswers),
}

/// An open evening survey for one participant and one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySession {
    pub participant: ParticipantId,
    /// The day being reported on.
    pub date: NaiveDate,
    pub stage: SurveyStage,
}

fn parse_minutes(raw: &str, habit: Habit, max: u32) -> Result<u32, Rejection> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|v| *v <= max)
        .ok_or(Rejection::InvalidMinutes { habit, max })
}

fn parse_clock(raw: &str, habit: Habit) -> Result<ClockTime, Rejection> {
    raw.parse::<ClockTime>()
        .map_err(|_| Rejection::InvalidClockTime { habit })
}

impl SurveySession {
    /// A new survey awaiting the reading answer.
    pub fn open(participant: ParticipantId, date: NaiveDate) -> Self {
        Self {
            participant,
            date,
            stage: SurveyStage::Reading,
        }
    }

    pub fn awaiting(&self) -> Habit {
        self.stage.habit()
    }

    /// Validate `raw` against the current question and move on.
    pub fn answer(&self, raw: &str) -> AnswerStep {
        let next = match self.stage {
            SurveyStage::Reading => parse_minutes(raw, Habit::Reading, MAX_ACTIVITY_MINUTES)
                .map(|reading| SurveyStage::Focus { reading }),
            SurveyStage::Focus { reading } => {
                parse_minutes(raw, Habit::Focus, MAX_ACTIVITY_MINUTES)
                    .map(|focus| SurveyStage::Screen { reading, focus })
            }
            SurveyStage::Screen { reading, focus } => {
                parse_minutes(raw, Habit::Screen, MAX_SCREEN_MINUTES).map(|screen| {
                    SurveyStage::Telegram {
                        reading,
                        focus,
                        screen,
                    }
                })
            }
            SurveyStage::Telegram {
                reading,
                focus,
                screen,
            } => parse_minutes(raw, Habit::Telegram, MAX_SCREEN_MINUTES).and_then(|tg| {
                if tg > screen {
                    Err(Rejection::TelegramExceedsScreen { screen })
                } else {
                    Ok(SurveyStage::Wake {
                        reading,
                        focus,
                        screen,
                        tg,
                    })
                }
            }),
            SurveyStage::Wake {
                reading,
                focus,
                screen,
                tg,
            } => parse_clock(raw, Habit::Wake).map(|wake| SurveyStage::Sleep {
                reading,
                focus,
                screen,
                tg,
                wake,
            }),
            SurveyStage::Sleep { .. } => {
                return match parse_clock(raw, Habit::Sleep) {
                    Ok(sleep) => {
                        let mut answers = self.stage.answers();
                        answers.sleep = Some(sleep.minutes());
                        AnswerStep::Complete(answers)
                    }
                    Err(rejection) => AnswerStep::Rejected(rejection),
                };
            }
        };

        match next {
            Ok(stage) => AnswerStep::Next(Self { stage, ..*self }),
            Err(rejection) => AnswerStep::Rejected(rejection),
        }
    }
}

/// Storage shape of an open survey: a step number plus six optional values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub participant: ParticipantId,
    pub date: NaiveDate,
    pub step: u8,
    pub answers: SurveyAnswers,
}

impl From<&SurveySession> for SurveyRecord {
    fn from(session: &SurveySession) -> Self {
        Self {
            participant: session.participant,
            date: session.date,
            step: session.stage.step(),
            answers: session.stage.answers(),
        }
    }
}

impl TryFrom<SurveyRecord> for SurveySession {
    type Error = DatabaseError;

    fn try_from(record: SurveyRecord) -> Result<Self, Self::Error> {
        let corrupt = |message: String| DatabaseError::CorruptRow {
            table: "surveys",
            participant: record.participant.0,
            message,
        };
        let missing = |field: &str| corrupt(format!("step {} without {field}", record.step));
        let a = record.answers;

        let stage = match record.step {
            0 => SurveyStage::Reading,
            1 => SurveyStage::Focus {
                reading: a.reading.ok_or_else(|| missing("reading"))?,
            },
            2 => SurveyStage::Screen {
                reading: a.reading.ok_or_else(|| missing("reading"))?,
                focus: a.focus.ok_or_else(|| missing("focus"))?,
            },
            3 => SurveyStage::Telegram {
                reading: a.reading.ok_or_else(|| missing("reading"))?,
                focus: a.focus.ok_or_else(|| missing("focus"))?,
                screen: a.screen.ok_or_else(|| missing("screen"))?,
            },
            4 => SurveyStage::Wake {
                reading: a.reading.ok_or_else(|| missing("reading"))?,
                focus: a.focus.ok_or_else(|| missing("focus"))?,
                screen: a.screen.ok_or_else(|| missing("screen"))?,
                tg: a.tg.ok_or_else(|| missing("tg"))?,
            },
            5 => SurveyStage::Sleep {
                reading: a.reading.ok_or_else(|| missing("reading"))?,
                focus: a.focus.ok_or_else(|| missing("focus"))?,
                screen: a.screen.ok_or_else(|| missing("screen"))?,
                tg: a.tg.ok_or_else(|| missing("tg"))?,
                wake: a
                    .wake
                    .and_then(ClockTime::from_minutes)
                    .ok_or_else(|| missing("wake"))?,
            },
            STEP_COMPLETE => return Err(corrupt("survey already completed".to_string())),
            other => return Err(corrupt(format!("step {other} is not an open survey"))),
        };

        Ok(Self {
            participant: record.participant,
            date: record.date,
            stage,
        })
    }
}
