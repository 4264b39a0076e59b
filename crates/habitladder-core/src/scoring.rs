//! Day scoring: success flags, point deltas and the streak.
//!
//! ## Rules
//!
//! | Habit | Passes when |
//! |-------|-------------|
//! | reading, focus | reported ≥ round(target) |
//! | screen | reported ≤ round(target) |
//! | telegram | reported ≤ round(min(tg target, screen target)) |
//! | wake, sleep | reported ≤ round(target) + tolerance |
//!
//! ```text
//! delta = passed × ok + failed × fail + (all_ok_bonus if all passed)
//! points = max(0, points + delta + (commit_bonus if all passed))
//! ```

use serde::{Deserialize, Serialize};

use crate::habit::{Habit, HabitValues};
use crate::storage::{ScoringConfig, ToleranceConfig};
use crate::survey::ReportedDay;

/// Pass/fail outcome for each habit on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayFlags {
    pub reading: bool,
    pub focus: bool,
    pub screen: bool,
    pub tg: bool,
    pub wake: bool,
    pub sleep: bool,
}

impl DayFlags {
    pub fn all_passed() -> Self {
        Self {
            reading: true,
            focus: true,
            screen: true,
            tg: true,
            wake: true,
            sleep: true,
        }
    }

    pub fn get(&self, habit: Habit) -> bool {
        match habit {
            Habit::Reading => self.reading,
            Habit::Focus => self.focus,
            Habit::Screen => self.screen,
            Habit::Telegram => self.tg,
            Habit::Wake => self.wake,
            Habit::Sleep => self.sleep,
        }
    }

    /// Flags in survey order.
    pub fn iter(&self) -> impl Iterator<Item = (Habit, bool)> + '_ {
        Habit::ALL.into_iter().map(move |h| (h, self.get(h)))
    }

    pub fn passed(&self) -> usize {
        self.iter().filter(|(_, ok)| *ok).count()
    }

    pub fn failed(&self) -> usize {
        Habit::ALL.len() - self.passed()
    }

    pub fn all_ok(&self) -> bool {
        self.failed() == 0
    }
}

/// Round half away from zero, like the goals are displayed.
///
/// This follows JavaScript's `Math.round` for positive values; Python's
/// `round` would send halves such as 32.5 to the even neighbour instead.
fn rounded(value: f64) -> i64 {
    value.round() as i64
}

/// Compare a day's reports against the stored targets.
pub fn evaluate_day(
    targets: &HabitValues,
    tolerance: &ToleranceConfig,
    reported: &ReportedDay,
) -> DayFlags {
    DayFlags {
        reading: i64::from(reported.reading) >= rounded(targets.reading),
        focus: i64::from(reported.focus) >= rounded(targets.focus),
        screen: i64::from(reported.screen) <= rounded(targets.screen),
        tg: i64::from(reported.tg) <= rounded(targets.effective_tg()),
        wake: i64::from(reported.wake) <= rounded(targets.wake) + i64::from(tolerance.wake_min),
        sleep: i64::from(reported.sleep) <= rounded(targets.sleep) + i64::from(tolerance.sleep_min),
    }
}

/// Points earned (or lost) for the day.
pub fn score(flags: &DayFlags, scoring: &ScoringConfig) -> i64 {
    let passed = flags.passed() as i64;
    let failed = flags.failed() as i64;
    let bonus = if flags.all_ok() { scoring.all_ok_bonus } else { 0 };
    passed * scoring.ok + failed * scoring.fail + bonus
}

/// New running total and streak after committing a day.
///
/// A perfect day also receives `commit_bonus` on top of `points_delta`,
/// which by default already contains `all_ok_bonus`. Points never drop
/// below zero; any failed habit resets the streak.
pub fn apply_points_and_streak(
    points: i64,
    streak: u32,
    points_delta: i64,
    all_ok: bool,
    scoring: &ScoringConfig,
) -> (i64, u32) {
    let commit_bonus = if all_ok { scoring.commit_bonus } else { 0 };
    let new_points = (points + points_delta + commit_bonus).max(0);
    let new_streak = if all_ok { streak + 1 } else { 0 };
    (new_points, new_streak)
}
