//! Trailing-week summaries of logged days.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::program::DayLog;

/// Totals over a date range. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Number of logged days in the range.
    pub days: u32,
    pub sum_reading: u64,
    pub sum_focus: u64,
    pub sum_screen: u64,
    pub sum_tg: u64,
    /// Mean wake time in minutes since midnight, 0 when nothing was logged.
    pub avg_wake: f64,
    /// Mean sleep time in minutes since midnight, 0 when nothing was logged.
    pub avg_sleep: f64,
}

impl WeekSummary {
    /// Rounded per-day average of one of the sums; `None` without logs.
    pub fn per_day(&self, sum: u64) -> Option<u64> {
        (self.days > 0).then(|| (sum as f64 / f64::from(self.days)).round() as u64)
    }
}

/// Summarize the logs dated within `from..=to`; others are ignored.
pub fn summarize(logs: &[DayLog], from: NaiveDate, to: NaiveDate) -> WeekSummary {
    let mut summary = WeekSummary {
        from,
        to,
        days: 0,
        sum_reading: 0,
        sum_focus: 0,
        sum_screen: 0,
        sum_tg: 0,
        avg_wake: 0.0,
        avg_sleep: 0.0,
    };
    let mut wake_total = 0u64;
    let mut sleep_total = 0u64;

    for log in logs.iter().filter(|l| l.date >= from && l.date <= to) {
        summary.days += 1;
        summary.sum_reading += u64::from(log.reported.reading);
        summary.sum_focus += u64::from(log.reported.focus);
        summary.sum_screen += u64::from(log.reported.screen);
        summary.sum_tg += u64::from(log.reported.tg);
        wake_total += u64::from(log.reported.wake);
        sleep_total += u64::from(log.reported.sleep);
    }

    if summary.days > 0 {
        let days = f64::from(summary.days);
        summary.avg_wake = wake_total as f64 / days;
        summary.avg_sleep = sleep_total as f64 / days;
    }
    summary
}

/// The seven days before `today`, when `today` closes a program week.
///
/// A week closes when the number of days since `start_date` is a positive
/// multiple of seven.
pub fn weekly_window(start_date: NaiveDate, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let days = (today - start_date).num_days();
    if days >= 7 && days % 7 == 0 {
        Some((today - Duration::days(7), today - Duration::days(1)))
    } else {
        None
    }
}
