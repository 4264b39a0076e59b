//! Daily trigger times for the morning goals and the evening survey.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::storage::ScheduleConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// Announce today's goals.
    Morning,
    /// Open the evening survey.
    Evening,
}

/// Next firing of `at` strictly after `now`.
fn next_at(now: NaiveDateTime, at: ClockTime) -> NaiveDateTime {
    let today = now.date().and_time(at.to_naive_time());
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// The earliest trigger strictly after `now`.
pub fn next_trigger(now: NaiveDateTime, schedule: &ScheduleConfig) -> (NaiveDateTime, Trigger) {
    let morning = next_at(now, schedule.morning);
    let evening = next_at(now, schedule.evening);
    if morning <= evening {
        (morning, Trigger::Morning)
    } else {
        (evening, Trigger::Evening)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn morning_comes_first_after_midnight() {
        let schedule = ScheduleConfig::default();
        assert_eq!(next_trigger(at(3, 1, 0), &schedule), (at(3, 7, 0), Trigger::Morning));
    }

    #[test]
    fn evening_after_morning_has_passed() {
        let schedule = ScheduleConfig::default();
        assert_eq!(next_trigger(at(3, 7, 0), &schedule), (at(3, 22, 50), Trigger::Evening));
        assert_eq!(next_trigger(at(3, 12, 0), &schedule), (at(3, 22, 50), Trigger::Evening));
    }

    #[test]
    fn rolls_over_to_tomorrow() {
        let schedule = ScheduleConfig::default();
        assert_eq!(next_trigger(at(3, 23, 0), &schedule), (at(4, 7, 0), Trigger::Morning));
    }
}
