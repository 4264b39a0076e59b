//! Moving a program one day along its ladder.

use crate::habit::Habit;
use crate::program::UserProgram;
use crate::scoring::DayFlags;

/// Apply a scored day to the program's targets and day counter.
///
/// Each habit that passed moves exactly one delta; a failed habit keeps its
/// target for another day. Afterwards the telegram target is pulled down to
/// the screen target if it ended up above it, and the day counter advances
/// without passing `duration_days`.
pub fn advance(program: &mut UserProgram, flags: &DayFlags, duration_days: u32) {
    for habit in Habit::ALL {
        if flags.get(habit) {
            *program.targets.get_mut(habit) += program.deltas.get(habit);
        }
    }
    if program.targets.tg > program.targets.screen {
        program.targets.tg = program.targets.screen;
    }
    program.day_index = (program.day_index + 1).min(duration_days);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::HabitValues;
    use crate::program::ParticipantId;
    use crate::storage::Config;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn program() -> UserProgram {
        UserProgram::new(
            ParticipantId(1),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            &Config::default(),
        )
    }

    #[test]
    fn only_passed_habits_move() {
        let mut p = program();
        let before = p.targets;
        let flags = DayFlags {
            focus: false,
            ..DayFlags::all_passed()
        };
        advance(&mut p, &flags, 60);
        assert_eq!(p.targets.focus, before.focus);
        assert_eq!(p.targets.reading, before.reading + p.deltas.reading);
        assert_eq!(p.targets.screen, 178.0);
        assert_eq!(p.targets.tg, 89.0);
        assert_eq!(p.targets.wake, 508.5);
        assert_eq!(p.targets.sleep, 52.5);
        assert_eq!(p.day_index, 1);
    }

    #[test]
    fn tg_is_pulled_down_to_screen() {
        let mut p = program();
        p.targets.screen = 100.0;
        p.targets.tg = 100.0;
        p.deltas.screen = -2.0;
        p.deltas.tg = 0.0;
        let flags = DayFlags {
            tg: false,
            ..DayFlags::all_passed()
        };
        advance(&mut p, &flags, 60);
        assert_eq!(p.targets.screen, 98.0);
        assert_eq!(p.targets.tg, 98.0);
    }

    #[test]
    fn day_index_stops_at_duration() {
        let mut p = program();
        for _ in 0..75 {
            advance(&mut p, &DayFlags::default(), 60);
        }
        assert_eq!(p.day_index, 60);
        assert_eq!(p.targets, program().targets);
    }

    fn any_flags() -> impl Strategy<Value = DayFlags> {
        proptest::array::uniform6(any::<bool>()).prop_map(|f| DayFlags {
            reading: f[0],
            focus: f[1],
            screen: f[2],
            tg: f[3],
            wake: f[4],
            sleep: f[5],
        })
    }

    proptest! {
        #[test]
        fn tg_never_exceeds_screen(days in proptest::collection::vec(any_flags(), 0..120)) {
            let mut p = program();
            for flags in &days {
                advance(&mut p, flags, 60);
                prop_assert!(p.targets.tg <= p.targets.screen);
                prop_assert!(p.day_index <= 60);
            }
        }

        #[test]
        fn each_target_moves_by_zero_or_one_delta(flags in any_flags()) {
            let mut p = program();
            p.targets = HabitValues { tg: 50.0, ..p.targets };
            let before = p.targets;
            advance(&mut p, &flags, 60);
            for habit in Habit::ALL {
                let expected = if flags.get(habit) {
                    before.get(habit) + p.deltas.get(habit)
                } else {
                    before.get(habit)
                };
                prop_assert_eq!(p.targets.get(habit), expected);
            }
        }
    }
}
