//! Database schema migrations for habitladder.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    match conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    }) {
        Ok(v) => Ok(v),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: programs, day logs and open surveys.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS programs (
            participant_id  INTEGER PRIMARY KEY,
            active          INTEGER NOT NULL DEFAULT 0,
            start_date      TEXT NOT NULL,
            day_index       INTEGER NOT NULL DEFAULT 0,
            reading_target  REAL NOT NULL,
            focus_target    REAL NOT NULL,
            screen_target   REAL NOT NULL,
            tg_target       REAL NOT NULL,
            wake_target     REAL NOT NULL,
            sleep_target    REAL NOT NULL,
            d_reading       REAL NOT NULL,
            d_focus         REAL NOT NULL,
            d_screen        REAL NOT NULL,
            d_tg            REAL NOT NULL,
            d_wake          REAL NOT NULL,
            d_sleep         REAL NOT NULL,
            points          INTEGER NOT NULL DEFAULT 0,
            streak          INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS day_logs (
            participant_id  INTEGER NOT NULL,
            day             TEXT NOT NULL,
            reading_done    INTEGER NOT NULL,
            focus_done      INTEGER NOT NULL,
            screen_done     INTEGER NOT NULL,
            tg_done         INTEGER NOT NULL,
            wake_actual     INTEGER NOT NULL,
            sleep_actual    INTEGER NOT NULL,
            ok_reading      INTEGER NOT NULL,
            ok_focus        INTEGER NOT NULL,
            ok_screen       INTEGER NOT NULL,
            ok_tg           INTEGER NOT NULL,
            ok_wake         INTEGER NOT NULL,
            ok_sleep        INTEGER NOT NULL,
            PRIMARY KEY (participant_id, day)
        );

        CREATE TABLE IF NOT EXISTS surveys (
            participant_id  INTEGER PRIMARY KEY,
            step            INTEGER NOT NULL,
            day             TEXT NOT NULL,
            tmp_reading     INTEGER,
            tmp_focus       INTEGER,
            tmp_screen      INTEGER,
            tmp_tg          INTEGER,
            tmp_wake        INTEGER,
            tmp_sleep       INTEGER
        );",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()?;
    Ok(())
}

/// Migration v2: index for the scheduler's active-program scan.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch("CREATE INDEX IF NOT EXISTS idx_programs_active ON programs(active);")?;
    set_schema_version(&tx, 2)?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrates_fresh_database_to_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('programs', 'day_logs', 'surveys')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }
}
