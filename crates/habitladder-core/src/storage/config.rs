//! TOML-based program configuration.
//!
//! Holds every constant the coach needs, loaded once at process start:
//! - Program duration and the participant's UTC offset
//! - Start/end values of the six habit ladders
//! - Morning and evening trigger times
//! - Wake/sleep tolerances
//! - Scoring constants
//!
//! Configuration is stored at `~/.config/habitladder/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::clock::ClockTime;
use crate::error::{ConfigError, Result};
use crate::habit::HabitValues;

/// Program-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramConfig {
    #[serde(default = "default_duration_days")]
    pub duration_days: u32,
    /// Offset of participant-local time from UTC, in minutes.
    #[serde(default)]
    pub utc_offset_min: i32,
}

/// Ladder for a duration habit, in minutes per day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinuteLadder {
    pub start: u32,
    pub end: u32,
}

/// Ladder for a time-of-day habit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockLadder {
    pub start: ClockTime,
    pub end: ClockTime,
}

/// Start and end values of all six ladders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LadderConfig {
    #[serde(default = "default_reading")]
    pub reading: MinuteLadder,
    #[serde(default = "default_focus")]
    pub focus: MinuteLadder,
    #[serde(default = "default_screen")]
    pub screen: MinuteLadder,
    #[serde(default = "default_telegram")]
    pub telegram: MinuteLadder,
    #[serde(default = "default_wake")]
    pub wake: ClockLadder,
    #[serde(default = "default_sleep")]
    pub sleep: ClockLadder,
}

/// Daily trigger times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_morning")]
    pub morning: ClockTime,
    #[serde(default = "default_evening")]
    pub evening: ClockTime,
}

/// Grace minutes added to the wake and sleep targets when scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceConfig {
    #[serde(default = "default_tolerance")]
    pub wake_min: u32,
    #[serde(default = "default_tolerance")]
    pub sleep_min: u32,
}

/// Point values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Per passed habit.
    #[serde(default = "default_ok")]
    pub ok: i64,
    /// Per failed habit.
    #[serde(default = "default_fail")]
    pub fail: i64,
    /// Added to the day's delta when all six habits pass.
    #[serde(default = "default_bonus")]
    pub all_ok_bonus: i64,
    /// Added again when committing a perfect day to the running total.
    /// Set to 0 to count the perfect-day bonus only once.
    #[serde(default = "default_bonus")]
    pub commit_bonus: i64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/habitladder/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub program: ProgramConfig,
    #[serde(default)]
    pub ladder: LadderConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

// Default functions
fn default_duration_days() -> u32 {
    60
}
fn default_reading() -> MinuteLadder {
    MinuteLadder { start: 20, end: 90 }
}
fn default_focus() -> MinuteLadder {
    MinuteLadder { start: 30, end: 180 }
}
fn default_screen() -> MinuteLadder {
    MinuteLadder { start: 180, end: 60 }
}
fn default_telegram() -> MinuteLadder {
    MinuteLadder { start: 90, end: 30 }
}
fn clock(minutes: u16) -> ClockTime {
    ClockTime::wrapping(i64::from(minutes))
}
fn default_wake() -> ClockLadder {
    ClockLadder {
        start: clock(8 * 60 + 30),
        end: clock(7 * 60),
    }
}
fn default_sleep() -> ClockLadder {
    ClockLadder {
        start: clock(30),
        end: clock(23 * 60),
    }
}
fn default_morning() -> ClockTime {
    clock(7 * 60)
}
fn default_evening() -> ClockTime {
    clock(22 * 60 + 50)
}
fn default_tolerance() -> u32 {
    15
}
fn default_ok() -> i64 {
    10
}
fn default_fail() -> i64 {
    -5
}
fn default_bonus() -> i64 {
    50
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            duration_days: default_duration_days(),
            utc_offset_min: 0,
        }
    }
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            reading: default_reading(),
            focus: default_focus(),
            screen: default_screen(),
            telegram: default_telegram(),
            wake: default_wake(),
            sleep: default_sleep(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            morning: default_morning(),
            evening: default_evening(),
        }
    }
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            wake_min: default_tolerance(),
            sleep_min: default_tolerance(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ok: default_ok(),
            fail: default_fail(),
            all_ok_bonus: default_bonus(),
            commit_bonus: default_bonus(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            program: ProgramConfig::default(),
            ladder: LadderConfig::default(),
            schedule: ScheduleConfig::default(),
            tolerance: ToleranceConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl LadderConfig {
    /// Start values as targets; wake and sleep in minutes since midnight.
    pub fn start_values(&self) -> HabitValues {
        HabitValues {
            reading: f64::from(self.reading.start),
            focus: f64::from(self.focus.start),
            screen: f64::from(self.screen.start),
            tg: f64::from(self.telegram.start),
            wake: f64::from(self.wake.start.minutes()),
            sleep: f64::from(self.sleep.start.minutes()),
        }
    }

    pub fn end_values(&self) -> HabitValues {
        HabitValues {
            reading: f64::from(self.reading.end),
            focus: f64::from(self.focus.end),
            screen: f64::from(self.screen.end),
            tg: f64::from(self.telegram.end),
            wake: f64::from(self.wake.end.minutes()),
            sleep: f64::from(self.sleep.end.minutes()),
        }
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(key, e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(invalid(key, format!("cannot parse '{value}' as integer")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(key, e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// `<data_dir>/config.toml`
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults first if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Check the startup invariants. A failure here is fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program.duration_days == 0 {
            return Err(invalid("program.duration_days", "must be greater than zero"));
        }
        if !(-14 * 60..=14 * 60).contains(&self.program.utc_offset_min) {
            return Err(invalid("program.utc_offset_min", "must be within +/-14 hours"));
        }

        let ladder = &self.ladder;
        for (key, l) in [("ladder.reading", ladder.reading), ("ladder.focus", ladder.focus)] {
            if l.end < l.start {
                return Err(invalid(key, format!("end {} is below start {}", l.end, l.start)));
            }
        }
        for (key, l) in [("ladder.screen", ladder.screen), ("ladder.telegram", ladder.telegram)] {
            if l.end > l.start {
                return Err(invalid(key, format!("end {} is above start {}", l.end, l.start)));
            }
        }
        if ladder.telegram.start > ladder.screen.start {
            return Err(invalid("ladder.telegram.start", "must not exceed ladder.screen.start"));
        }
        if ladder.telegram.end > ladder.screen.end {
            return Err(invalid("ladder.telegram.end", "must not exceed ladder.screen.end"));
        }

        if self.schedule.morning == self.schedule.evening {
            return Err(invalid("schedule.evening", "must differ from schedule.morning"));
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving. The result must still pass
    /// [`Config::validate`].
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| invalid(key, e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert!(toml_str.contains("\"08:30\""));
    }

    #[test]
    fn defaults_match_program_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.program.duration_days, 60);
        let start = cfg.ladder.start_values();
        assert_eq!(start.reading, 20.0);
        assert_eq!(start.tg, 90.0);
        assert_eq!(start.wake, 510.0);
        assert_eq!(start.sleep, 30.0);
        let end = cfg.ladder.end_values();
        assert_eq!(end.focus, 180.0);
        assert_eq!(end.wake, 420.0);
        assert_eq!(end.sleep, 1380.0);
        assert_eq!(cfg.schedule.evening.to_string(), "22:50");
        assert_eq!(cfg.scoring.fail, -5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let cfg: Config = toml::from_str(
            "[program]\nduration_days = 30\n\n[ladder.wake]\nstart = \"09:00\"\nend = \"06:30\"\n",
        )
        .unwrap();
        assert_eq!(cfg.program.duration_days, 30);
        assert_eq!(cfg.ladder.wake.end.minutes(), 390);
        assert_eq!(cfg.ladder.reading, default_reading());
        assert_eq!(cfg.tolerance.sleep_min, 15);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("program.duration_days").as_deref(), Some("60"));
        assert_eq!(cfg.get("ladder.sleep.end").as_deref(), Some("23:00"));
        assert!(cfg.get("ladder.missing").is_none());
    }

    #[test]
    fn apply_updates_negative_numbers() {
        let mut cfg = Config::default();
        cfg.apply("scoring.fail", "-10").unwrap();
        assert_eq!(cfg.scoring.fail, -10);
    }

    #[test]
    fn apply_parses_clock_times() {
        let mut cfg = Config::default();
        cfg.apply("schedule.morning", "06:45").unwrap();
        assert_eq!(cfg.schedule.morning.minutes(), 405);
        assert!(cfg.apply("schedule.morning", "6h45").is_err());
        assert_eq!(cfg.schedule.morning.minutes(), 405);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("ladder.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn apply_rejects_values_that_break_invariants() {
        let mut cfg = Config::default();
        assert!(cfg.apply("program.duration_days", "0").is_err());
        assert_eq!(cfg.program.duration_days, 60);
    }

    #[test]
    fn validate_rejects_non_monotone_ladders() {
        let mut cfg = Config::default();
        cfg.ladder.reading = MinuteLadder { start: 50, end: 40 };
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.ladder.screen = MinuteLadder { start: 60, end: 120 };
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.ladder.telegram = MinuteLadder { start: 200, end: 30 };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_colliding_triggers() {
        let mut cfg = Config::default();
        cfg.schedule.evening = cfg.schedule.morning;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.tolerance.wake_min = 5;
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().tolerance.wake_min, 5);
    }
}
