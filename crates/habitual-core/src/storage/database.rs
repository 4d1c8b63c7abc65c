//! SQLite-backed storage for the materialization engine.
//!
//! The [`Database`] is the storage collaborator the engine talks to: plain
//! CRUD-style accessors keyed by identifiers and date ranges. All relations
//! are foreign-key columns; none of the engine modules ever touch SQL.
//!
//! Batch inserts run inside a single transaction, so a batch either lands
//! whole or not at all.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::data_dir;
use super::migrations;
use crate::error::{CoreError, StoreError};
use crate::model::{
    CalendarDay, CompletionFact, DayRate, Habit, HabitCategory, NewCalendarDay, NewHabitCategory,
    NewPriorityLevel, NewWeekPeriod, PriorityLevel, User, WeekPeriod, WeekRate,
    WeightedCompletion,
};

// === Helper Functions ===

/// Format a weekday for database storage
pub(crate) fn format_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Parse a weekday from its database string
pub(crate) fn parse_weekday(raw: &str) -> Option<Weekday> {
    match raw {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Read a UUID stored as TEXT
fn uuid_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Read a weekday stored as TEXT
fn weekday_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Weekday> {
    let raw: String = row.get(idx)?;
    parse_weekday(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unknown weekday '{raw}'").into(),
        )
    })
}

fn row_to_week(row: &rusqlite::Row) -> rusqlite::Result<WeekPeriod> {
    Ok(WeekPeriod {
        week_id: row.get(0)?,
        week_number: row.get(1)?,
        year: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
    })
}

fn row_to_day(row: &rusqlite::Row) -> rusqlite::Result<CalendarDay> {
    Ok(CalendarDay {
        day_id: row.get(0)?,
        date: row.get(1)?,
        weekday: weekday_column(row, 2)?,
        week_id: row.get(3)?,
    })
}

fn row_to_completion(row: &rusqlite::Row) -> rusqlite::Result<CompletionFact> {
    Ok(CompletionFact {
        completion_id: uuid_column(row, 0)?,
        habit_id: uuid_column(row, 1)?,
        day_id: row.get(2)?,
        completed: row.get(3)?,
        completed_at: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        user_id: uuid_column(row, 0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn row_to_day_rate(row: &rusqlite::Row) -> rusqlite::Result<DayRate> {
    Ok(DayRate {
        user_id: uuid_column(row, 0)?,
        date: row.get(1)?,
        rate: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn row_to_week_rate(row: &rusqlite::Row) -> rusqlite::Result<WeekRate> {
    Ok(WeekRate {
        user_id: uuid_column(row, 0)?,
        week_id: row.get(1)?,
        rate: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

const HABIT_COLUMNS: &str =
    "habit_id, user_id, title, points, positive, description, active, category_id, created_at, updated_at";

fn row_to_habit(row: &rusqlite::Row) -> rusqlite::Result<Habit> {
    Ok(Habit {
        habit_id: uuid_column(row, 0)?,
        user_id: uuid_column(row, 1)?,
        title: row.get(2)?,
        points: row.get(3)?,
        positive: row.get(4)?,
        description: row.get(5)?,
        active: row.get(6)?,
        category_id: row.get(7)?,
        weekdays: Vec::new(),
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// SQLite database holding the habit calendar, completions, and rates.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/habitual.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("habitual.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (tests and throwaway runs).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        migrations::migrate(&self.conn)
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))
    }

    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // === Users ===

    pub fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO users (user_id, username, email, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.user_id.to_string(),
                user.username,
                user.email,
                user.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id, username, email, created_at FROM users ORDER BY username")?;
        let rows = stmt.query_map([], row_to_user)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id, username, email, created_at FROM users WHERE user_id = ?1")?;
        Ok(stmt
            .query_row(params![user_id.to_string()], row_to_user)
            .optional()?)
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id, username, email, created_at FROM users WHERE username = ?1")?;
        Ok(stmt.query_row(params![username], row_to_user).optional()?)
    }

    // === Reference data ===

    /// Insert missing categories by name; existing names are left untouched.
    /// Returns the number actually inserted.
    pub fn seed_categories(&self, categories: &[NewHabitCategory]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut added = 0;
        for category in categories {
            added += tx.execute(
                "INSERT OR IGNORE INTO habit_categories (name, description, color) VALUES (?1, ?2, ?3)",
                params![category.name, category.description, category.color],
            )?;
        }
        tx.commit()?;
        Ok(added)
    }

    /// Insert missing priority levels by name. Returns the number inserted.
    pub fn seed_priority_levels(&self, levels: &[NewPriorityLevel]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut added = 0;
        for level in levels {
            added += tx.execute(
                "INSERT OR IGNORE INTO priority_levels (name, rank, color) VALUES (?1, ?2, ?3)",
                params![level.name, level.rank, level.color],
            )?;
        }
        tx.commit()?;
        Ok(added)
    }

    pub fn list_categories(&self) -> Result<Vec<HabitCategory>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT category_id, name, description, color FROM habit_categories ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(HabitCategory {
                category_id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                color: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn find_category_by_name(&self, name: &str) -> Result<Option<HabitCategory>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT category_id, name, description, color FROM habit_categories WHERE name = ?1",
        )?;
        Ok(stmt
            .query_row(params![name], |row| {
                Ok(HabitCategory {
                    category_id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    color: row.get(3)?,
                })
            })
            .optional()?)
    }

    pub fn list_priority_levels(&self) -> Result<Vec<PriorityLevel>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT priority_id, name, rank, color FROM priority_levels ORDER BY rank DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PriorityLevel {
                priority_id: row.get(0)?,
                name: row.get(1)?,
                rank: row.get(2)?,
                color: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // === Habits ===

    /// Insert a habit together with its weekday schedule (one transaction).
    pub fn insert_habit(&self, habit: &Habit) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO habits (habit_id, user_id, title, points, positive, description, active, category_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                habit.habit_id.to_string(),
                habit.user_id.to_string(),
                habit.title,
                habit.points,
                habit.positive,
                habit.description,
                habit.active,
                habit.category_id,
                habit.created_at,
                habit.updated_at,
            ],
        )?;
        for weekday in &habit.weekdays {
            tx.execute(
                "INSERT OR IGNORE INTO habit_weekdays (habit_id, weekday) VALUES (?1, ?2)",
                params![habit.habit_id.to_string(), format_weekday(*weekday)],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn find_habit(&self, habit_id: Uuid) -> Result<Option<Habit>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {HABIT_COLUMNS} FROM habits WHERE habit_id = ?1"))?;
        let habit = stmt
            .query_row(params![habit_id.to_string()], row_to_habit)
            .optional()?;
        match habit {
            Some(mut habit) => {
                habit.weekdays = self.load_weekdays(habit.habit_id)?;
                Ok(Some(habit))
            }
            None => Ok(None),
        }
    }

    pub fn list_habits_for_user(&self, user_id: Uuid) -> Result<Vec<Habit>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE user_id = ?1 ORDER BY title"
        ))?;
        let rows = stmt.query_map(params![user_id.to_string()], row_to_habit)?;
        let mut habits = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        for habit in &mut habits {
            habit.weekdays = self.load_weekdays(habit.habit_id)?;
        }
        Ok(habits)
    }

    /// All habits whose weekday set includes `weekday`.
    pub fn habits_scheduled_on(&self, weekday: Weekday) -> Result<Vec<Habit>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits
             WHERE habit_id IN (SELECT habit_id FROM habit_weekdays WHERE weekday = ?1)
             ORDER BY title"
        ))?;
        let rows = stmt.query_map(params![format_weekday(weekday)], row_to_habit)?;
        let mut habits = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        for habit in &mut habits {
            habit.weekdays = self.load_weekdays(habit.habit_id)?;
        }
        Ok(habits)
    }

    fn load_weekdays(&self, habit_id: Uuid) -> Result<Vec<Weekday>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT weekday FROM habit_weekdays WHERE habit_id = ?1")?;
        let rows = stmt.query_map(params![habit_id.to_string()], |row| weekday_column(row, 0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // === Week periods ===

    /// Batch-insert week periods in one transaction. Returns the count saved.
    pub fn insert_week_periods(&self, periods: &[NewWeekPeriod]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut saved = 0;
        for period in periods {
            saved += tx.execute(
                "INSERT OR IGNORE INTO week_periods (week_number, year, start_date, end_date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![period.week_number, period.year, period.start_date, period.end_date],
            )?;
        }
        tx.commit()?;
        Ok(saved)
    }

    pub fn find_week_by_number_and_year(
        &self,
        week_number: u32,
        year: i32,
    ) -> Result<Option<WeekPeriod>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT week_id, week_number, year, start_date, end_date FROM week_periods
             WHERE week_number = ?1 AND year = ?2",
        )?;
        Ok(stmt
            .query_row(params![week_number, year], row_to_week)
            .optional()?)
    }

    pub fn find_week_by_id(&self, week_id: i64) -> Result<Option<WeekPeriod>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT week_id, week_number, year, start_date, end_date FROM week_periods
             WHERE week_id = ?1",
        )?;
        Ok(stmt.query_row(params![week_id], row_to_week).optional()?)
    }

    /// The week period with the latest end date, if any.
    pub fn latest_week_period(&self) -> Result<Option<WeekPeriod>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT week_id, week_number, year, start_date, end_date FROM week_periods
             ORDER BY end_date DESC LIMIT 1",
        )?;
        Ok(stmt.query_row([], row_to_week).optional()?)
    }

    pub fn count_week_periods(&self) -> Result<i64, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM week_periods", [], |row| row.get(0))?)
    }

    /// Week periods whose start date falls in `[start, end]`, ordered.
    pub fn week_periods_starting_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WeekPeriod>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT week_id, week_number, year, start_date, end_date FROM week_periods
             WHERE start_date >= ?1 AND start_date <= ?2 ORDER BY start_date",
        )?;
        let rows = stmt.query_map(params![start, end], row_to_week)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // === Calendar days ===

    /// Batch-insert calendar days in one transaction. Returns the count saved.
    pub fn insert_calendar_days(&self, days: &[NewCalendarDay]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut saved = 0;
        for day in days {
            saved += tx.execute(
                "INSERT OR IGNORE INTO calendar_days (date, weekday, week_id) VALUES (?1, ?2, ?3)",
                params![day.date, format_weekday(day.weekday), day.week_id],
            )?;
        }
        tx.commit()?;
        Ok(saved)
    }

    pub fn find_day_by_date(&self, date: NaiveDate) -> Result<Option<CalendarDay>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT day_id, date, weekday, week_id FROM calendar_days WHERE date = ?1",
        )?;
        Ok(stmt.query_row(params![date], row_to_day).optional()?)
    }

    pub fn find_day_by_id(&self, day_id: i64) -> Result<Option<CalendarDay>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT day_id, date, weekday, week_id FROM calendar_days WHERE day_id = ?1",
        )?;
        Ok(stmt.query_row(params![day_id], row_to_day).optional()?)
    }

    /// The most recent calendar day, if any.
    pub fn latest_calendar_day(&self) -> Result<Option<CalendarDay>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT day_id, date, weekday, week_id FROM calendar_days ORDER BY date DESC LIMIT 1",
        )?;
        Ok(stmt.query_row([], row_to_day).optional()?)
    }

    /// Calendar days with dates in `[start, end]`, ordered by date.
    pub fn calendar_days_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CalendarDay>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT day_id, date, weekday, week_id FROM calendar_days
             WHERE date >= ?1 AND date <= ?2 ORDER BY date",
        )?;
        let rows = stmt.query_map(params![start, end], row_to_day)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // === Completion facts ===

    /// Batch-insert completion facts in one transaction. Returns the count
    /// saved. A backfill pass calls this exactly once for its whole gap.
    pub fn insert_completions(&self, facts: &[CompletionFact]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut saved = 0;
        for fact in facts {
            saved += tx.execute(
                "INSERT OR IGNORE INTO completions (completion_id, habit_id, day_id, completed, completed_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    fact.completion_id.to_string(),
                    fact.habit_id.to_string(),
                    fact.day_id,
                    fact.completed,
                    fact.completed_at,
                    fact.created_at,
                ],
            )?;
        }
        tx.commit()?;
        Ok(saved)
    }

    pub fn completion_exists(&self, habit_id: Uuid, day_id: i64) -> Result<bool, StoreError> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM completions WHERE habit_id = ?1 AND day_id = ?2)",
            params![habit_id.to_string(), day_id],
            |row| row.get(0),
        )?)
    }

    /// Creation timestamp of the most recently created completion fact.
    ///
    /// This is the backfill marker; it is always re-derived from storage
    /// rather than cached.
    pub fn latest_completion_created_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.conn.query_row(
            "SELECT MAX(created_at) FROM completions",
            [],
            |row| row.get(0),
        )?)
    }

    /// Completion facts for one user (via habit ownership) on one day, each
    /// carrying its habit's point weight.
    pub fn completions_for_user_and_day(
        &self,
        user_id: Uuid,
        day_id: i64,
    ) -> Result<Vec<WeightedCompletion>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.completion_id, c.habit_id, c.day_id, c.completed, c.completed_at, c.created_at, h.points
             FROM completions c
             JOIN habits h ON h.habit_id = c.habit_id
             WHERE h.user_id = ?1 AND c.day_id = ?2",
        )?;
        let rows = stmt.query_map(params![user_id.to_string(), day_id], |row| {
            Ok(WeightedCompletion {
                fact: row_to_completion(row)?,
                points: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Look up a completion fact, scoped to the habit owner.
    pub fn find_completion_for_user(
        &self,
        user_id: Uuid,
        completion_id: Uuid,
    ) -> Result<Option<CompletionFact>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.completion_id, c.habit_id, c.day_id, c.completed, c.completed_at, c.created_at
             FROM completions c
             JOIN habits h ON h.habit_id = c.habit_id
             WHERE c.completion_id = ?1 AND h.user_id = ?2",
        )?;
        Ok(stmt
            .query_row(
                params![completion_id.to_string(), user_id.to_string()],
                row_to_completion,
            )
            .optional()?)
    }

    /// Persist a toggled completion status. Returns false when the row is
    /// missing.
    pub fn update_completion_status(&self, fact: &CompletionFact) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "UPDATE completions SET completed = ?1, completed_at = ?2 WHERE completion_id = ?3",
            params![
                fact.completed,
                fact.completed_at,
                fact.completion_id.to_string(),
            ],
        )?;
        Ok(changed > 0)
    }

    // === Day rates ===

    /// Batch-insert zero-initialized day-rate rows. Existing `(user, date)`
    /// rows are left untouched. Returns the count saved.
    pub fn insert_day_rates(&self, rates: &[DayRate]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut saved = 0;
        for rate in rates {
            saved += tx.execute(
                "INSERT OR IGNORE INTO day_rates (user_id, date, rate, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    rate.user_id.to_string(),
                    rate.date,
                    rate.rate,
                    rate.created_at,
                    rate.updated_at,
                ],
            )?;
        }
        tx.commit()?;
        Ok(saved)
    }

    pub fn day_rate_exists(&self, user_id: Uuid, date: NaiveDate) -> Result<bool, StoreError> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM day_rates WHERE user_id = ?1 AND date = ?2)",
            params![user_id.to_string(), date],
            |row| row.get(0),
        )?)
    }

    pub fn find_day_rate(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DayRate>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, date, rate, created_at, updated_at FROM day_rates
             WHERE user_id = ?1 AND date = ?2",
        )?;
        Ok(stmt
            .query_row(params![user_id.to_string(), date], row_to_day_rate)
            .optional()?)
    }

    /// Update an existing day-rate row in place. Returns false when no row
    /// exists for `(user, date)`.
    pub fn update_day_rate(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        rate: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "UPDATE day_rates SET rate = ?1, updated_at = ?2 WHERE user_id = ?3 AND date = ?4",
            params![rate, updated_at, user_id.to_string(), date],
        )?;
        Ok(changed > 0)
    }

    pub fn latest_day_rate_created_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT MAX(created_at) FROM day_rates", [], |row| {
                row.get(0)
            })?)
    }

    /// Day rates for a user whose date falls inside a week period, ordered.
    pub fn day_rates_for_user_in_period(
        &self,
        user_id: Uuid,
        period: &WeekPeriod,
    ) -> Result<Vec<DayRate>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, date, rate, created_at, updated_at FROM day_rates
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3 ORDER BY date",
        )?;
        let rows = stmt.query_map(
            params![user_id.to_string(), period.start_date, period.end_date],
            row_to_day_rate,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // === Week rates ===

    /// Batch-insert zero-initialized week-rate rows. Returns the count saved.
    pub fn insert_week_rates(&self, rates: &[WeekRate]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut saved = 0;
        for rate in rates {
            saved += tx.execute(
                "INSERT OR IGNORE INTO week_rates (user_id, week_id, rate, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    rate.user_id.to_string(),
                    rate.week_id,
                    rate.rate,
                    rate.created_at,
                    rate.updated_at,
                ],
            )?;
        }
        tx.commit()?;
        Ok(saved)
    }

    pub fn week_rate_exists(&self, user_id: Uuid, week_id: i64) -> Result<bool, StoreError> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM week_rates WHERE user_id = ?1 AND week_id = ?2)",
            params![user_id.to_string(), week_id],
            |row| row.get(0),
        )?)
    }

    pub fn find_week_rate(
        &self,
        user_id: Uuid,
        week_id: i64,
    ) -> Result<Option<WeekRate>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, week_id, rate, created_at, updated_at FROM week_rates
             WHERE user_id = ?1 AND week_id = ?2",
        )?;
        Ok(stmt
            .query_row(params![user_id.to_string(), week_id], row_to_week_rate)
            .optional()?)
    }

    /// Update an existing week-rate row in place. Returns false when no row
    /// exists for `(user, week)`.
    pub fn update_week_rate(
        &self,
        user_id: Uuid,
        week_id: i64,
        rate: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "UPDATE week_rates SET rate = ?1, updated_at = ?2 WHERE user_id = ?3 AND week_id = ?4",
            params![rate, updated_at, user_id.to_string(), week_id],
        )?;
        Ok(changed > 0)
    }

    pub fn latest_week_rate_created_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT MAX(created_at) FROM week_rates", [], |row| {
                row.get(0)
            })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewWeekPeriod;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_week(n: u32) -> NewWeekPeriod {
        let start = date(2025, 1, 6) + chrono::Duration::weeks((n - 2) as i64);
        NewWeekPeriod {
            week_number: n,
            year: 2025,
            start_date: start,
            end_date: start + chrono::Duration::days(6),
        }
    }

    #[test]
    fn week_period_round_trip() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.count_week_periods().unwrap(), 0);

        let saved = db
            .insert_week_periods(&[sample_week(2), sample_week(3)])
            .unwrap();
        assert_eq!(saved, 2);

        let week = db.find_week_by_number_and_year(2, 2025).unwrap().unwrap();
        assert_eq!(week.start_date, date(2025, 1, 6));
        assert_eq!(week.end_date, date(2025, 1, 12));

        let latest = db.latest_week_period().unwrap().unwrap();
        assert_eq!(latest.week_number, 3);
    }

    #[test]
    fn duplicate_week_periods_are_ignored() {
        let db = Database::open_memory().unwrap();
        db.insert_week_periods(&[sample_week(2)]).unwrap();
        let saved = db.insert_week_periods(&[sample_week(2)]).unwrap();
        assert_eq!(saved, 0);
        assert_eq!(db.count_week_periods().unwrap(), 1);
    }

    #[test]
    fn calendar_day_round_trip() {
        let db = Database::open_memory().unwrap();
        db.insert_week_periods(&[sample_week(2)]).unwrap();
        let week = db.find_week_by_number_and_year(2, 2025).unwrap().unwrap();

        let saved = db
            .insert_calendar_days(&[NewCalendarDay {
                date: date(2025, 1, 7),
                weekday: Weekday::Tue,
                week_id: week.week_id,
            }])
            .unwrap();
        assert_eq!(saved, 1);

        let day = db.find_day_by_date(date(2025, 1, 7)).unwrap().unwrap();
        assert_eq!(day.weekday, Weekday::Tue);
        assert_eq!(day.week_id, week.week_id);
        assert_eq!(db.find_day_by_id(day.day_id).unwrap().unwrap(), day);
    }

    #[test]
    fn weekday_format_parse_round_trip() {
        for weekday in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            assert_eq!(parse_weekday(format_weekday(weekday)), Some(weekday));
        }
        assert_eq!(parse_weekday("someday"), None);
    }

    #[test]
    fn habit_with_weekdays_round_trip() {
        let db = Database::open_memory().unwrap();
        let user = User::new("taha", None);
        db.insert_user(&user).unwrap();
        db.seed_categories(&[NewHabitCategory::new("Fitness", "move", "#FF5733")])
            .unwrap();
        let category = db.find_category_by_name("Fitness").unwrap().unwrap();

        let habit = Habit::new(
            user.user_id,
            "Morning run",
            2.0,
            true,
            None,
            category.category_id,
            vec![Weekday::Mon, Weekday::Fri],
        )
        .unwrap();
        db.insert_habit(&habit).unwrap();

        let loaded = db.find_habit(habit.habit_id).unwrap().unwrap();
        assert_eq!(loaded.title, "Morning run");
        assert_eq!(loaded.weekdays.len(), 2);

        let monday = db.habits_scheduled_on(Weekday::Mon).unwrap();
        assert_eq!(monday.len(), 1);
        assert!(db.habits_scheduled_on(Weekday::Tue).unwrap().is_empty());
    }

    #[test]
    fn completion_marker_is_max_created_at() {
        let db = Database::open_memory().unwrap();
        let user = User::new("taha", None);
        db.insert_user(&user).unwrap();
        db.seed_categories(&[NewHabitCategory::new("Fitness", "move", "#FF5733")])
            .unwrap();
        let category = db.find_category_by_name("Fitness").unwrap().unwrap();
        let habit = Habit::new(
            user.user_id,
            "Run",
            1.0,
            true,
            None,
            category.category_id,
            vec![Weekday::Mon],
        )
        .unwrap();
        db.insert_habit(&habit).unwrap();
        db.insert_week_periods(&[sample_week(2)]).unwrap();
        let week = db.find_week_by_number_and_year(2, 2025).unwrap().unwrap();
        db.insert_calendar_days(&[NewCalendarDay {
            date: date(2025, 1, 6),
            weekday: Weekday::Mon,
            week_id: week.week_id,
        }])
        .unwrap();
        let day = db.find_day_by_date(date(2025, 1, 6)).unwrap().unwrap();

        assert!(db.latest_completion_created_at().unwrap().is_none());

        let older = Utc::now() - chrono::Duration::days(3);
        let newer = Utc::now();
        db.insert_completions(&[
            CompletionFact::placeholder(habit.habit_id, day.day_id, older),
            // same habit+day is ignored, so use a second habit
        ])
        .unwrap();
        let habit2 = Habit::new(
            user.user_id,
            "Stretch",
            1.0,
            true,
            None,
            category.category_id,
            vec![Weekday::Mon],
        )
        .unwrap();
        db.insert_habit(&habit2).unwrap();
        db.insert_completions(&[CompletionFact::placeholder(
            habit2.habit_id,
            day.day_id,
            newer,
        )])
        .unwrap();

        let marker = db.latest_completion_created_at().unwrap().unwrap();
        assert!((marker - newer).num_seconds().abs() < 2);
    }

    #[test]
    fn rate_rows_update_in_place() {
        let db = Database::open_memory().unwrap();
        let user = User::new("taha", None);
        db.insert_user(&user).unwrap();
        let now = Utc::now();

        assert!(!db.day_rate_exists(user.user_id, date(2025, 3, 3)).unwrap());
        db.insert_day_rates(&[DayRate::zero(user.user_id, date(2025, 3, 3), now)])
            .unwrap();
        assert!(db.day_rate_exists(user.user_id, date(2025, 3, 3)).unwrap());

        assert!(db
            .update_day_rate(user.user_id, date(2025, 3, 3), 0.75, now)
            .unwrap());
        let row = db.find_day_rate(user.user_id, date(2025, 3, 3)).unwrap().unwrap();
        assert_eq!(row.rate, 0.75);

        // missing row is reported, not upserted
        assert!(!db
            .update_day_rate(user.user_id, date(2025, 3, 4), 0.5, now)
            .unwrap());
    }
}
