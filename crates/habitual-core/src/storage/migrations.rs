//! Database schema migrations for habitual.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations to bring the database to the current schema
/// version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or(0)
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// v1: base tables.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            user_id    TEXT PRIMARY KEY,
            username   TEXT NOT NULL UNIQUE,
            email      TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS habit_categories (
            category_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE,
            description TEXT,
            color       TEXT NOT NULL DEFAULT '#FFFFFF'
        );

        CREATE TABLE IF NOT EXISTS priority_levels (
            priority_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE,
            rank        INTEGER NOT NULL,
            color       TEXT NOT NULL DEFAULT '#FFFFFF'
        );

        CREATE TABLE IF NOT EXISTS habits (
            habit_id    TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(user_id),
            title       TEXT NOT NULL,
            points      REAL NOT NULL DEFAULT 1.0,
            positive    INTEGER NOT NULL DEFAULT 1,
            description TEXT,
            active      INTEGER NOT NULL DEFAULT 1,
            category_id INTEGER NOT NULL REFERENCES habit_categories(category_id),
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL,
            UNIQUE (user_id, title)
        );

        CREATE TABLE IF NOT EXISTS habit_weekdays (
            habit_id TEXT NOT NULL REFERENCES habits(habit_id) ON DELETE CASCADE,
            weekday  TEXT NOT NULL,
            UNIQUE (habit_id, weekday)
        );

        CREATE TABLE IF NOT EXISTS week_periods (
            week_id     INTEGER PRIMARY KEY AUTOINCREMENT,
            week_number INTEGER NOT NULL,
            year        INTEGER NOT NULL,
            start_date  TEXT NOT NULL,
            end_date    TEXT NOT NULL,
            UNIQUE (week_number, year)
        );

        CREATE TABLE IF NOT EXISTS calendar_days (
            day_id  INTEGER PRIMARY KEY AUTOINCREMENT,
            date    TEXT NOT NULL UNIQUE,
            weekday TEXT NOT NULL,
            week_id INTEGER NOT NULL REFERENCES week_periods(week_id)
        );

        CREATE TABLE IF NOT EXISTS completions (
            completion_id TEXT PRIMARY KEY,
            habit_id      TEXT NOT NULL REFERENCES habits(habit_id) ON DELETE CASCADE,
            day_id        INTEGER NOT NULL REFERENCES calendar_days(day_id),
            completed     INTEGER NOT NULL DEFAULT 0,
            completed_at  TEXT,
            created_at    TEXT NOT NULL,
            UNIQUE (habit_id, day_id)
        );

        CREATE TABLE IF NOT EXISTS day_rates (
            user_id    TEXT NOT NULL REFERENCES users(user_id),
            date       TEXT NOT NULL,
            rate       REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, date)
        );

        CREATE TABLE IF NOT EXISTS week_rates (
            user_id    TEXT NOT NULL REFERENCES users(user_id),
            week_id    INTEGER NOT NULL REFERENCES week_periods(week_id),
            rate       REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, week_id)
        );",
    )?;
    set_schema_version(conn, 1)
}

/// v2: indexes for the hot query paths (existence checks, backfill markers,
/// range scans).
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_completions_created_at ON completions(created_at);
        CREATE INDEX IF NOT EXISTS idx_completions_day ON completions(day_id);
        CREATE INDEX IF NOT EXISTS idx_calendar_days_week ON calendar_days(week_id);
        CREATE INDEX IF NOT EXISTS idx_habit_weekdays_weekday ON habit_weekdays(weekday);
        CREATE INDEX IF NOT EXISTS idx_week_periods_start ON week_periods(start_date);
        CREATE INDEX IF NOT EXISTS idx_day_rates_created_at ON day_rates(created_at);
        CREATE INDEX IF NOT EXISTS idx_week_rates_created_at ON week_rates(created_at);",
    )?;
    set_schema_version(conn, 2)
}
