//! SQLite-backed record store.
//!
//! Provides persistent storage for:
//! - One program row per participant
//! - One day log per (participant, date), upserted
//! - At most one open survey per participant

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{data_dir, migrations, ProgramStore};
use crate::error::{DatabaseError, Result};
use crate::habit::HabitValues;
use crate::program::{DayLog, ParticipantId, UserProgram};
use crate::scoring::DayFlags;
use crate::survey::{ReportedDay, SurveyAnswers, SurveyRecord};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite database for program state.
pub struct Database {
    conn: Connection,
}

/// A program row before its date column is parsed.
struct ProgramRow {
    program: UserProgram,
    start_date: String,
}

fn parse_date(table: &'static str, participant: i64, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        DatabaseError::CorruptRow {
            table,
            participant,
            message: format!("bad date '{raw}': {e}"),
        }
        .into()
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn program_from_row(row: &Row<'_>) -> rusqlite::Result<ProgramRow> {
    let participant = ParticipantId(row.get("participant_id")?);
    Ok(ProgramRow {
        start_date: row.get("start_date")?,
        program: UserProgram {
            participant,
            active: row.get("active")?,
            // Replaced once start_date is parsed.
            start_date: NaiveDate::MIN,
            day_index: row.get("day_index")?,
            targets: HabitValues {
                reading: row.get("reading_target")?,
                focus: row.get("focus_target")?,
                screen: row.get("screen_target")?,
                tg: row.get("tg_target")?,
                wake: row.get("wake_target")?,
                sleep: row.get("sleep_target")?,
            },
            deltas: HabitValues {
                reading: row.get("d_reading")?,
                focus: row.get("d_focus")?,
                screen: row.get("d_screen")?,
                tg: row.get("d_tg")?,
                wake: row.get("d_wake")?,
                sleep: row.get("d_sleep")?,
            },
            points: row.get("points")?,
            streak: row.get("streak")?,
        },
    })
}

impl ProgramRow {
    fn finish(self) -> Result<UserProgram> {
        let mut program = self.program;
        program.start_date = parse_date("programs", program.participant.0, &self.start_date)?;
        Ok(program)
    }
}

fn write_program(conn: &Connection, p: &UserProgram) -> Result<()> {
    conn.execute(
        "INSERT INTO programs (participant_id, active, start_date, day_index,
            reading_target, focus_target, screen_target, tg_target, wake_target, sleep_target,
            d_reading, d_focus, d_screen, d_tg, d_wake, d_sleep, points, streak)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
         ON CONFLICT(participant_id) DO UPDATE SET
            active=excluded.active, start_date=excluded.start_date,
            day_index=excluded.day_index,
            reading_target=excluded.reading_target, focus_target=excluded.focus_target,
            screen_target=excluded.screen_target, tg_target=excluded.tg_target,
            wake_target=excluded.wake_target, sleep_target=excluded.sleep_target,
            d_reading=excluded.d_reading, d_focus=excluded.d_focus,
            d_screen=excluded.d_screen, d_tg=excluded.d_tg,
            d_wake=excluded.d_wake, d_sleep=excluded.d_sleep,
            points=excluded.points, streak=excluded.streak",
        params![
            p.participant.0,
            p.active,
            format_date(p.start_date),
            p.day_index,
            p.targets.reading,
            p.targets.focus,
            p.targets.screen,
            p.targets.tg,
            p.targets.wake,
            p.targets.sleep,
            p.deltas.reading,
            p.deltas.focus,
            p.deltas.screen,
            p.deltas.tg,
            p.deltas.wake,
            p.deltas.sleep,
            p.points,
            p.streak,
        ],
    )?;
    Ok(())
}

fn remove_survey(conn: &Connection, id: ParticipantId) -> Result<()> {
    conn.execute("DELETE FROM surveys WHERE participant_id = ?1", params![id.0])?;
    Ok(())
}

fn write_log(conn: &Connection, log: &DayLog) -> Result<()> {
    let r = &log.reported;
    let f = &log.flags;
    conn.execute(
        "INSERT INTO day_logs (participant_id, day,
            reading_done, focus_done, screen_done, tg_done, wake_actual, sleep_actual,
            ok_reading, ok_focus, ok_screen, ok_tg, ok_wake, ok_sleep)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
         ON CONFLICT(participant_id, day) DO UPDATE SET
            reading_done=excluded.reading_done, focus_done=excluded.focus_done,
            screen_done=excluded.screen_done, tg_done=excluded.tg_done,
            wake_actual=excluded.wake_actual, sleep_actual=excluded.sleep_actual,
            ok_reading=excluded.ok_reading, ok_focus=excluded.ok_focus,
            ok_screen=excluded.ok_screen, ok_tg=excluded.ok_tg,
            ok_wake=excluded.ok_wake, ok_sleep=excluded.ok_sleep",
        params![
            log.participant.0,
            format_date(log.date),
            r.reading,
            r.focus,
            r.screen,
            r.tg,
            r.wake,
            r.sleep,
            f.reading,
            f.focus,
            f.screen,
            f.tg,
            f.wake,
            f.sleep,
        ],
    )?;
    Ok(())
}

impl Database {
    /// Open the database at `HABITLADDER_DB`, or `<data_dir>/habitladder.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = match std::env::var_os("HABITLADDER_DB") {
            Some(p) => p.into(),
            None => data_dir()?.join("habitladder.db"),
        };
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Run `f` inside `BEGIN IMMEDIATE`, committing on success and rolling
    /// back on any error.
    fn in_transaction<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        match f(&self.conn) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(value)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err)
            }
        }
    }

    fn migrate(&self) -> Result<()> {
        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }
}

impl ProgramStore for Database {
    fn get_program(&self, id: ParticipantId) -> Result<Option<UserProgram>> {
        let row = self
            .conn
            .query_row(
                "SELECT * FROM programs WHERE participant_id = ?1",
                params![id.0],
                program_from_row,
            )
            .optional()?;
        row.map(ProgramRow::finish).transpose()
    }

    fn upsert_program(&self, program: &UserProgram) -> Result<()> {
        write_program(&self.conn, program)
    }

    fn active_programs(&self) -> Result<Vec<UserProgram>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM programs WHERE active = 1 ORDER BY participant_id")?;
        let rows = stmt.query_map([], program_from_row)?;

        let mut programs = Vec::new();
        for row in rows {
            programs.push(row?.finish()?);
        }
        Ok(programs)
    }

    fn get_survey(&self, id: ParticipantId) -> Result<Option<SurveyRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT step, day, tmp_reading, tmp_focus, tmp_screen, tmp_tg, tmp_wake, tmp_sleep
                 FROM surveys WHERE participant_id = ?1",
                params![id.0],
                |row| {
                    Ok((
                        row.get::<_, u8>(0)?,
                        row.get::<_, String>(1)?,
                        SurveyAnswers {
                            reading: row.get(2)?,
                            focus: row.get(3)?,
                            screen: row.get(4)?,
                            tg: row.get(5)?,
                            wake: row.get(6)?,
                            sleep: row.get(7)?,
                        },
                    ))
                },
            )
            .optional()?;

        match row {
            Some((step, day, answers)) => Ok(Some(SurveyRecord {
                participant: id,
                date: parse_date("surveys", id.0, &day)?,
                step,
                answers,
            })),
            None => Ok(None),
        }
    }

    fn upsert_survey(&self, s: &SurveyRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO surveys (participant_id, step, day,
                tmp_reading, tmp_focus, tmp_screen, tmp_tg, tmp_wake, tmp_sleep)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(participant_id) DO UPDATE SET
                step=excluded.step, day=excluded.day,
                tmp_reading=excluded.tmp_reading, tmp_focus=excluded.tmp_focus,
                tmp_screen=excluded.tmp_screen, tmp_tg=excluded.tmp_tg,
                tmp_wake=excluded.tmp_wake, tmp_sleep=excluded.tmp_sleep",
            params![
                s.participant.0,
                s.step,
                format_date(s.date),
                s.answers.reading,
                s.answers.focus,
                s.answers.screen,
                s.answers.tg,
                s.answers.wake,
                s.answers.sleep,
            ],
        )?;
        Ok(())
    }

    fn commit_day(&self, log: &DayLog, program: &UserProgram) -> Result<()> {
        self.in_transaction(|conn| {
            write_log(conn, log)?;
            remove_survey(conn, program.participant)?;
            write_program(conn, program)
        })
    }

    fn reset_program(&self, program: &UserProgram) -> Result<()> {
        self.in_transaction(|conn| {
            remove_survey(conn, program.participant)?;
            write_program(conn, program)
        })
    }

    fn logs_in_range(
        &self,
        id: ParticipantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DayLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT day, reading_done, focus_done, screen_done, tg_done, wake_actual, sleep_actual,
                    ok_reading, ok_focus, ok_screen, ok_tg, ok_wake, ok_sleep
             FROM day_logs
             WHERE participant_id = ?1 AND day BETWEEN ?2 AND ?3
             ORDER BY day",
        )?;
        let rows = stmt.query_map(params![id.0, format_date(from), format_date(to)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                ReportedDay {
                    reading: row.get(1)?,
                    focus: row.get(2)?,
                    screen: row.get(3)?,
                    tg: row.get(4)?,
                    wake: row.get(5)?,
                    sleep: row.get(6)?,
                },
                DayFlags {
                    reading: row.get(7)?,
                    focus: row.get(8)?,
                    screen: row.get(9)?,
                    tg: row.get(10)?,
                    wake: row.get(11)?,
                    sleep: row.get(12)?,
                },
            ))
        })?;

        let mut logs = Vec::new();
        for row in rows {
            let (day, reported, flags) = row?;
            logs.push(DayLog {
                participant: id,
                date: parse_date("day_logs", id.0, &day)?,
                reported,
                flags,
            });
        }
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Config;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    fn log(day: u32, reading: u32) -> DayLog {
        DayLog {
            participant: ParticipantId(5),
            date: date(day),
            reported: ReportedDay {
                reading,
                focus: 45,
                screen: 200,
                tg: 60,
                wake: 480,
                sleep: 1400,
            },
            flags: DayFlags {
                reading: true,
                ..DayFlags::default()
            },
        }
    }

    #[test]
    fn program_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert!(db.get_program(ParticipantId(5)).unwrap().is_none());

        let mut program = UserProgram::new(ParticipantId(5), date(1), &Config::default());
        program.points = 42;
        program.targets.reading = 21.1666;
        db.upsert_program(&program).unwrap();
        assert_eq!(db.get_program(ParticipantId(5)).unwrap(), Some(program.clone()));

        program.active = false;
        db.upsert_program(&program).unwrap();
        assert!(db.active_programs().unwrap().is_empty());
    }

    #[test]
    fn active_programs_are_listed_in_id_order() {
        let db = Database::open_memory().unwrap();
        for id in [9, 3, 6] {
            let program = UserProgram::new(ParticipantId(id), date(1), &Config::default());
            db.upsert_program(&program).unwrap();
        }
        let ids: Vec<i64> = db
            .active_programs()
            .unwrap()
            .iter()
            .map(|p| p.participant.0)
            .collect();
        assert_eq!(ids, vec![3, 6, 9]);
    }

    #[test]
    fn survey_upsert_replaces_and_delete_removes() {
        let db = Database::open_memory().unwrap();
        let mut record = SurveyRecord {
            participant: ParticipantId(5),
            date: date(2),
            step: 2,
            answers: SurveyAnswers {
                reading: Some(10),
                focus: Some(20),
                ..SurveyAnswers::default()
            },
        };
        db.upsert_survey(&record).unwrap();
        assert_eq!(db.get_survey(ParticipantId(5)).unwrap(), Some(record.clone()));

        record.step = 0;
        record.answers = SurveyAnswers::default();
        db.upsert_survey(&record).unwrap();
        assert_eq!(db.get_survey(ParticipantId(5)).unwrap(), Some(record));

        remove_survey(&db.conn, ParticipantId(5)).unwrap();
        assert!(db.get_survey(ParticipantId(5)).unwrap().is_none());
    }

    #[test]
    fn rewriting_a_day_overwrites_its_log() {
        let db = Database::open_memory().unwrap();
        write_log(&db.conn, &log(3, 10)).unwrap();
        write_log(&db.conn, &log(3, 35)).unwrap();
        let logs = db.logs_in_range(ParticipantId(5), date(1), date(30)).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].reported.reading, 35);
        assert!(logs[0].flags.reading);
        assert!(!logs[0].flags.sleep);
    }

    #[test]
    fn range_query_is_inclusive() {
        let db = Database::open_memory().unwrap();
        for day in 1..=10 {
            write_log(&db.conn, &log(day, day)).unwrap();
        }
        let logs = db.logs_in_range(ParticipantId(5), date(3), date(5)).unwrap();
        let days: Vec<u32> = logs.iter().map(|l| l.reported.reading).collect();
        assert_eq!(days, vec![3, 4, 5]);
        assert!(db
            .logs_in_range(ParticipantId(6), date(1), date(10))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn reopening_a_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habitladder.db");
        {
            let db = Database::open_at(&path).unwrap();
            let program = UserProgram::new(ParticipantId(1), date(1), &Config::default());
            db.upsert_program(&program).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert!(db.get_program(ParticipantId(1)).unwrap().is_some());
    }

    fn open_survey(db: &Database) {
        let record = SurveyRecord {
            participant: ParticipantId(5),
            date: date(4),
            step: 5,
            answers: SurveyAnswers {
                reading: Some(10),
                focus: Some(20),
                screen: Some(30),
                tg: Some(5),
                wake: Some(480),
                sleep: None,
            },
        };
        db.upsert_survey(&record).unwrap();
    }

    #[test]
    fn commit_day_writes_log_program_and_closes_survey() {
        let db = Database::open_memory().unwrap();
        let mut program = UserProgram::new(ParticipantId(5), date(1), &Config::default());
        db.upsert_program(&program).unwrap();
        open_survey(&db);

        program.day_index = 1;
        program.points = 45;
        db.commit_day(&log(4, 10), &program).unwrap();

        assert!(db.get_survey(ParticipantId(5)).unwrap().is_none());
        assert_eq!(db.logs_in_range(ParticipantId(5), date(4), date(4)).unwrap().len(), 1);
        assert_eq!(db.get_program(ParticipantId(5)).unwrap(), Some(program));
    }

    #[test]
    fn failed_program_write_rolls_back_the_whole_day() {
        let db = Database::open_memory().unwrap();
        let mut program = UserProgram::new(ParticipantId(5), date(1), &Config::default());
        db.upsert_program(&program).unwrap();
        open_survey(&db);
        db.conn
            .execute_batch(
                "CREATE TRIGGER reject_program_update BEFORE UPDATE ON programs
                 BEGIN SELECT RAISE(ABORT, 'programs are read-only'); END;",
            )
            .unwrap();

        program.day_index = 1;
        program.points = 45;
        assert!(db.commit_day(&log(4, 10), &program).is_err());

        assert!(db.get_survey(ParticipantId(5)).unwrap().is_some());
        assert!(db
            .logs_in_range(ParticipantId(5), date(1), date(30))
            .unwrap()
            .is_empty());
        let stored = db.get_program(ParticipantId(5)).unwrap().unwrap();
        assert_eq!(stored.day_index, 0);
        assert_eq!(stored.points, 0);

        // The connection is usable again after the rollback.
        db.conn
            .execute_batch("DROP TRIGGER reject_program_update;")
            .unwrap();
        db.commit_day(&log(4, 10), &program).unwrap();
        assert!(db.get_survey(ParticipantId(5)).unwrap().is_none());
    }

    #[test]
    fn reset_program_keeps_survey_when_write_fails() {
        let db = Database::open_memory().unwrap();
        let program = UserProgram::new(ParticipantId(5), date(1), &Config::default());
        db.upsert_program(&program).unwrap();
        open_survey(&db);
        db.conn
            .execute_batch(
                "CREATE TRIGGER reject_program_update BEFORE UPDATE ON programs
                 BEGIN SELECT RAISE(ABORT, 'programs are read-only'); END;",
            )
            .unwrap();

        let fresh = UserProgram::new(ParticipantId(5), date(9), &Config::default());
        assert!(db.reset_program(&fresh).is_err());
        assert!(db.get_survey(ParticipantId(5)).unwrap().is_some());
        assert_eq!(
            db.get_program(ParticipantId(5)).unwrap().unwrap().start_date,
            date(1)
        );
    }
}
