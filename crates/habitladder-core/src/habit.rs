//! The six tracked habits and per-habit value sets.

use serde::{Deserialize, Serialize};

/// One of the six tracked behaviors, in survey order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Habit {
    Reading,
    Focus,
    Screen,
    Telegram,
    Wake,
    Sleep,
}

/// Whether a goal is met by reaching or by staying under the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    AtLeast,
    AtMost,
}

impl Habit {
    /// All habits in the order the evening survey asks about them.
    pub const ALL: [Habit; 6] = [
        Habit::Reading,
        Habit::Focus,
        Habit::Screen,
        Habit::Telegram,
        Habit::Wake,
        Habit::Sleep,
    ];

    /// Reading and focus are "at least" goals; the rest are "at most".
    ///
    /// For wake and sleep smaller is better: an earlier clock time means
    /// fewer minutes since midnight.
    pub fn direction(self) -> Direction {
        match self {
            Habit::Reading | Habit::Focus => Direction::AtLeast,
            Habit::Screen | Habit::Telegram | Habit::Wake | Habit::Sleep => Direction::AtMost,
        }
    }

    /// Time-of-day habits are answered as `HH:MM`, the others as minutes.
    pub fn is_clock_time(self) -> bool {
        matches!(self, Habit::Wake | Habit::Sleep)
    }

    /// Survey position, 0..=5.
    pub fn index(self) -> usize {
        match self {
            Habit::Reading => 0,
            Habit::Focus => 1,
            Habit::Screen => 2,
            Habit::Telegram => 3,
            Habit::Wake => 4,
            Habit::Sleep => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Habit::Reading => "Reading",
            Habit::Focus => "Deep focus",
            Habit::Screen => "Screen time",
            Habit::Telegram => "Telegram",
            Habit::Wake => "Wake-up",
            Habit::Sleep => "Bedtime",
        }
    }
}

/// Six floating-point values, one per habit.
///
/// Used both for the current targets and for the fixed per-day deltas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HabitValues {
    pub reading: f64,
    pub focus: f64,
    pub screen: f64,
    pub tg: f64,
    pub wake: f64,
    pub sleep: f64,
}

impl HabitValues {
    pub fn get(&self, habit: Habit) -> f64 {
        match habit {
            Habit::Reading => self.reading,
            Habit::Focus => self.focus,
            Habit::Screen => self.screen,
            Habit::Telegram => self.tg,
            Habit::Wake => self.wake,
            Habit::Sleep => self.sleep,
        }
    }

    pub fn get_mut(&mut self, habit: Habit) -> &mut f64 {
        match habit {
            Habit::Reading => &mut self.reading,
            Habit::Focus => &mut self.focus,
            Habit::Screen => &mut self.screen,
            Habit::Telegram => &mut self.tg,
            Habit::Wake => &mut self.wake,
            Habit::Sleep => &mut self.sleep,
        }
    }

    /// Telegram target as it is presented and scored: never above screen.
    pub fn effective_tg(&self) -> f64 {
        self.tg.min(self.screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survey_order_matches_index() {
        for (i, habit) in Habit::ALL.iter().enumerate() {
            assert_eq!(habit.index(), i);
        }
    }

    #[test]
    fn get_mut_writes_through() {
        let mut values = HabitValues::default();
        for habit in Habit::ALL {
            *values.get_mut(habit) = habit.index() as f64;
        }
        assert_eq!(values.get(Habit::Wake), 4.0);
        assert_eq!(values.tg, 3.0);
    }

    #[test]
    fn directions() {
        assert_eq!(Habit::Focus.direction(), Direction::AtLeast);
        assert_eq!(Habit::Sleep.direction(), Direction::AtMost);
        assert!(Habit::Wake.is_clock_time());
        assert!(!Habit::Telegram.is_clock_time());
    }
}
