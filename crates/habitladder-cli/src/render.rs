//! Plain-text messages shown to participants.

use habitladder_core::coach::{DayOutcome, MorningBrief, ProgramStatus};
use habitladder_core::survey::Rejection;
use habitladder_core::{ClockTime, Direction, Habit, WeekSummary};

fn minutes(value: f64) -> i64 {
    value.round() as i64
}

fn clock(value: f64) -> ClockTime {
    ClockTime::wrapping(value.round() as i64)
}

fn goal_line(habit: Habit, value: f64) -> String {
    let bound = match (habit.is_clock_time(), habit.direction()) {
        (true, _) => format!("no later than {}", clock(value)),
        (false, Direction::AtLeast) => format!("at least {} min", minutes(value)),
        (false, Direction::AtMost) => format!("at most {} min", minutes(value)),
    };
    let note = if habit == Habit::Telegram {
        " (never above screen time)"
    } else {
        ""
    };
    format!("- {}: {bound}{note}", habit.label())
}

pub fn goals(brief: &MorningBrief) -> String {
    let mut lines = vec![
        format!("Day {}/{}", brief.day_index, brief.duration_days),
        "Today's goals:".to_string(),
    ];
    lines.extend(
        Habit::ALL
            .into_iter()
            .map(|habit| goal_line(habit, brief.goals.get(habit))),
    );
    if let Some(week) = &brief.week {
        lines.push(String::new());
        lines.push(week_summary(week));
    }
    lines.join("\n")
}

pub fn week_summary(week: &WeekSummary) -> String {
    if week.days == 0 {
        return format!("No days logged between {} and {}.", week.from, week.to);
    }
    let per_day = |sum: u64| week.per_day(sum).unwrap_or(0);
    [
        format!("Week {} to {} ({} days logged):", week.from, week.to, week.days),
        format!(
            "- Reading: {} min total ({}/day)",
            week.sum_reading,
            per_day(week.sum_reading)
        ),
        format!(
            "- Deep focus: {} min total ({}/day)",
            week.sum_focus,
            per_day(week.sum_focus)
        ),
        format!(
            "- Screen time: {} min total ({}/day)",
            week.sum_screen,
            per_day(week.sum_screen)
        ),
        format!(
            "- Telegram: {} min total ({}/day)",
            week.sum_tg,
            per_day(week.sum_tg)
        ),
        format!("- Wake-up (avg): {}", clock(week.avg_wake)),
        format!("- Bedtime (avg): {}", clock(week.avg_sleep)),
    ]
    .join("\n")
}

pub fn question(habit: Habit) -> &'static str {
    match habit {
        Habit::Reading => "1) How many minutes did you read today? (whole number)",
        Habit::Focus => "2) How many minutes of deep focus today?",
        Habit::Screen => "3) How many minutes of total screen time today?",
        Habit::Telegram => "4) How many minutes in Telegram? (no more than screen time)",
        Habit::Wake => "5) What time did you wake up today? (HH:MM, 24h, e.g. 07:15)",
        Habit::Sleep => "6) What time are you going to bed? (last question, answer right before sleep)",
    }
}

pub fn rejection(rejection: &Rejection) -> String {
    match rejection {
        Rejection::InvalidMinutes { habit, max } => {
            format!("Enter a whole number of {} minutes (0-{max}).", habit.label().to_lowercase())
        }
        Rejection::TelegramExceedsScreen { screen } => {
            format!("Telegram can't exceed screen time. Enter a number <= {screen}.")
        }
        Rejection::InvalidClockTime { .. } => "Use the HH:MM time format, e.g. 07:15.".to_string(),
    }
}

pub fn outcome(outcome: &DayOutcome) -> String {
    let mut lines = vec!["Saved!".to_string()];
    for (habit, ok) in outcome.flags.iter() {
        let mark = if ok { "[x]" } else { "[ ]" };
        lines.push(format!("{mark} {}", habit.label()));
    }
    lines.push(String::new());
    lines.push(format!("Points today: {:+}", outcome.points_delta));
    lines.push(format!(
        "Total points: {}, streak: {}",
        outcome.total_points, outcome.streak
    ));
    if outcome.flags.all_ok() {
        lines.push("Perfect day: bonus points added.".to_string());
    } else {
        lines.push("Goals marked [ ] stay where they are. Try again tomorrow.".to_string());
    }
    lines.join("\n")
}

pub fn status(status: &ProgramStatus) -> String {
    let t = &status.targets;
    let mut lines = vec![
        format!(
            "Participant {} ({})",
            status.participant,
            if status.active { "active" } else { "stopped" }
        ),
        format!("Started: {}", status.start_date),
        format!("Ladder day: {}/{}", status.day_index, status.duration_days),
        format!("Points: {} | Streak: {}", status.points, status.streak),
        String::new(),
        "Current goals (with time tolerances):".to_string(),
        format!("Reading >= {} min", minutes(t.reading)),
        format!("Focus >= {} min", minutes(t.focus)),
        format!("Screen <= {} min", minutes(t.screen)),
        format!("Telegram <= {} min", minutes(t.effective_tg())),
        format!(
            "Wake-up no later than {} (+{} min)",
            clock(t.wake),
            status.wake_tolerance_min
        ),
        format!(
            "Bedtime no later than {} (+{} min)",
            clock(t.sleep),
            status.sleep_tolerance_min
        ),
    ];
    if let Some(habit) = status.survey_awaiting {
        lines.push(String::new());
        lines.push(format!("Survey open, waiting on: {}", habit.label()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use habitladder_core::{Config, DayFlags, HabitValues, ParticipantId, ReportedDay};

    fn brief(goals: HabitValues) -> MorningBrief {
        MorningBrief {
            participant: ParticipantId(1),
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            day_index: 3,
            duration_days: 60,
            goals,
            week: None,
        }
    }

    #[test]
    fn goals_are_rounded_for_display() {
        let goals = HabitValues {
            reading: 23.5,
            focus: 37.49,
            screen: 174.0,
            tg: 87.0,
            wake: 505.5,
            sleep: 97.5,
        };
        let text = goals_text(goals);
        assert!(text.contains("Day 3/60"));
        assert!(text.contains("Reading: at least 24 min"));
        assert!(text.contains("Deep focus: at least 37 min"));
        assert!(text.contains("Wake-up: no later than 08:26"));
        assert!(text.contains("Bedtime: no later than 01:38"));
    }

    fn goals_text(values: HabitValues) -> String {
        goals(&brief(values))
    }

    #[test]
    fn default_goals_read_like_the_first_morning() {
        let text = goals_text(Config::default().ladder.start_values());
        assert!(text.contains("Wake-up: no later than 08:30"));
        assert!(text.contains("Bedtime: no later than 00:30"));
    }

    #[test]
    fn outcome_lists_every_habit() {
        let out = DayOutcome {
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            reported: ReportedDay {
                reading: 25,
                focus: 10,
                screen: 150,
                tg: 80,
                wake: 525,
                sleep: 20,
            },
            flags: DayFlags {
                focus: false,
                ..DayFlags::all_passed()
            },
            points_delta: 45,
            total_points: 45,
            streak: 0,
            day_index: 1,
        };
        let text = outcome(&out);
        assert!(text.contains("[ ] Deep focus"));
        assert!(text.contains("[x] Reading"));
        assert!(text.contains("Points today: +45"));
    }

    #[test]
    fn telegram_rejection_names_the_ceiling() {
        let text = rejection(&Rejection::TelegramExceedsScreen { screen: 100 });
        assert!(text.contains("<= 100"));
    }
}
