//! Target ladder: initial targets, per-day deltas and end-of-ladder clamps.
//!
//! Every habit climbs (or descends) from its configured start value to its
//! end value in `duration_days` equal real-valued steps. Targets are never
//! rounded when stored; rounding only happens when a day is scored or shown.

use crate::habit::HabitValues;
use crate::storage::LadderConfig;

/// Starting targets and the fixed per-day deltas.
///
/// `delta = (end - start) / duration_days` for every habit. `duration_days`
/// is validated to be non-zero when the config is loaded.
pub fn initial_targets(ladder: &LadderConfig, duration_days: u32) -> (HabitValues, HabitValues) {
    let start = ladder.start_values();
    let end = ladder.end_values();
    let days = f64::from(duration_days);

    let deltas = HabitValues {
        reading: (end.reading - start.reading) / days,
        focus: (end.focus - start.focus) / days,
        screen: (end.screen - start.screen) / days,
        tg: (end.tg - start.tg) / days,
        wake: (end.wake - start.wake) / days,
        sleep: (end.sleep - start.sleep) / days,
    };
    (start, deltas)
}

/// Keep targets from overshooting the final goal.
///
/// Applied to the goals announced each morning, never to the stored targets.
/// Ascending goals are capped at their end value, descending ones floored at
/// it, and telegram additionally never exceeds screen.
pub fn clamp_targets(targets: &HabitValues, ladder: &LadderConfig) -> HabitValues {
    let end = ladder.end_values();
    let screen = targets.screen.max(end.screen);
    HabitValues {
        reading: targets.reading.min(end.reading),
        focus: targets.focus.min(end.focus),
        screen,
        tg: targets.tg.min(screen).max(end.tg),
        wake: targets.wake.max(end.wake),
        sleep: targets.sleep.max(end.sleep),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::Habit;
    use proptest::prelude::*;

    #[test]
    fn initial_targets_start_at_start_values() {
        let ladder = LadderConfig::default();
        let (targets, deltas) = initial_targets(&ladder, 60);
        assert_eq!(targets, ladder.start_values());
        assert_eq!(deltas.screen, -2.0);
        assert_eq!(deltas.tg, -1.0);
        assert_eq!(deltas.wake, -1.5);
        assert_eq!(deltas.focus, 2.5);
    }

    #[test]
    fn full_ladder_lands_on_end_values() {
        let ladder = LadderConfig::default();
        let (start, deltas) = initial_targets(&ladder, 60);
        let end = ladder.end_values();
        for habit in Habit::ALL {
            assert_eq!(start.get(habit) + 60.0 * deltas.get(habit), end.get(habit), "{habit:?}");
        }
    }

    #[test]
    fn accumulated_drift_is_clamped_back_to_end() {
        let ladder = LadderConfig::default();
        let (mut targets, deltas) = initial_targets(&ladder, 60);
        for _ in 0..60 {
            for habit in Habit::ALL {
                *targets.get_mut(habit) += deltas.get(habit);
            }
        }
        let clamped = clamp_targets(&targets, &ladder);
        assert_eq!(clamped.reading, 90.0);
        assert_eq!(clamped.focus, 180.0);
        assert_eq!(clamped.screen, 60.0);
        assert_eq!(clamped.tg, 30.0);
    }

    #[test]
    fn clamp_keeps_tg_below_screen() {
        let ladder = LadderConfig::default();
        let targets = HabitValues {
            reading: 30.0,
            focus: 40.0,
            screen: 100.0,
            tg: 120.0,
            wake: 500.0,
            sleep: 60.0,
        };
        let clamped = clamp_targets(&targets, &ladder);
        assert_eq!(clamped.tg, 100.0);
        assert_eq!(clamped.reading, 30.0);
    }

    #[test]
    fn clamp_leaves_mid_ladder_values_alone() {
        let ladder = LadderConfig::default();
        let (targets, _) = initial_targets(&ladder, 60);
        let clamped = clamp_targets(&targets, &ladder);
        assert_eq!(clamped.reading, targets.reading);
        assert_eq!(clamped.screen, targets.screen);
        assert_eq!(clamped.wake, targets.wake);
    }

    fn any_targets() -> impl Strategy<Value = HabitValues> {
        (
            0.0..400.0f64,
            0.0..400.0f64,
            0.0..1440.0f64,
            0.0..1440.0f64,
            0.0..1440.0f64,
            0.0..1440.0f64,
        )
            .prop_map(|(reading, focus, screen, tg, wake, sleep)| HabitValues {
                reading,
                focus,
                screen,
                tg,
                wake,
                sleep,
            })
    }

    proptest! {
        #[test]
        fn clamp_is_idempotent(targets in any_targets()) {
            let ladder = LadderConfig::default();
            let once = clamp_targets(&targets, &ladder);
            prop_assert_eq!(clamp_targets(&once, &ladder), once);
        }

        #[test]
        fn clamped_tg_never_exceeds_screen(targets in any_targets()) {
            let ladder = LadderConfig::default();
            let clamped = clamp_targets(&targets, &ladder);
            prop_assert!(clamped.tg <= clamped.screen);
        }
    }
}
