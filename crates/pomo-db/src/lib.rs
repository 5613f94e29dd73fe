//! Durable storage for pomodoro intervals.
//!
//! Provides a [`Repository`] implementation backed by `rusqlite`.
//!
//! # Thread Safety
//!
//! `rusqlite::Connection` is `Send` but not `Sync`, so [`SqliteRepository`]
//! keeps its connection behind a `Mutex`. One repository can be shared by the
//! tick loop and a pausing caller through an `Arc`. Separate processes
//! coordinate through SQLite's own file locking; the busy timeout lets a
//! `pause` from another process wait out an in-flight tick.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! `start_time` is stored as TEXT in RFC 3339 UTC with millisecond precision
//! (e.g., `2024-01-15T10:30:00.000Z`). Every row uses the same format, so
//! lexicographic comparison matches chronological order and day ranges can be
//! queried with plain string bounds. It is NULL until the interval starts.
//!
//! ## Durations
//!
//! Planned and actual durations are INTEGER milliseconds.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use pomo_core::{Category, CategoryFilter, Interval, Repository, State, UnknownCategory};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use thiserror::Error;

/// How long a writer waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_INTERVAL: &str = "
    SELECT id, start_time, planned_duration_ms, actual_duration_ms, category, state
    FROM intervals
";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Another thread panicked while holding the connection.
    #[error("database connection lock poisoned")]
    Poisoned,
    /// Failed to parse a stored start time.
    #[error("invalid start time for interval {id}: {timestamp}")]
    TimestampParse {
        id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Stored category is not a known category.
    #[error("invalid category for interval {id}")]
    InvalidCategory {
        id: i64,
        #[source]
        source: UnknownCategory,
    },
    /// Stored state is not a known state.
    #[error("invalid state for interval {id}: {state}")]
    InvalidState { id: i64, state: i64 },
    /// A duration does not fit the storage column.
    #[error("duration out of range: {0}")]
    DurationOutOfRange(String),
    /// A summary day without a following day.
    #[error("day out of range: {0}")]
    DayOutOfRange(NaiveDate),
}

impl From<DbError> for pomo_core::Error {
    fn from(err: DbError) -> Self {
        match err {
            DbError::InvalidState { state, .. } => Self::InvalidState(state),
            other => Self::storage(other),
        }
    }
}

/// SQLite-backed interval repository.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

/// Raw column values before validation.
struct IntervalRow {
    id: i64,
    start_time: Option<String>,
    planned_duration_ms: i64,
    actual_duration_ms: i64,
    category: String,
    state: i64,
}

impl IntervalRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            start_time: row.get(1)?,
            planned_duration_ms: row.get(2)?,
            actual_duration_ms: row.get(3)?,
            category: row.get(4)?,
            state: row.get(5)?,
        })
    }

    fn into_interval(self) -> Result<Interval, DbError> {
        let id = self.id;
        let start_time = self
            .start_time
            .map(|timestamp| parse_timestamp(&timestamp, id))
            .transpose()?;
        let category = self
            .category
            .parse::<Category>()
            .map_err(|source| DbError::InvalidCategory { id, source })?;
        let state = State::try_from(self.state).map_err(|_| DbError::InvalidState {
            id,
            state: self.state,
        })?;

        Ok(Interval {
            id,
            start_time,
            planned_duration: duration_from_ms(self.planned_duration_ms)?,
            actual_duration: duration_from_ms(self.actual_duration_ms)?,
            category,
            state,
        })
    }
}

impl SqliteRepository {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(conn: Connection) -> Result<Self, DbError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(
            "
            -- start_time: RFC 3339 UTC (e.g., '2024-01-15T10:30:00.000Z'), NULL until started
            -- state: 0 not started, 1 running, 2 paused, 3 done, 4 cancelled
            CREATE TABLE IF NOT EXISTS intervals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                start_time TEXT,
                planned_duration_ms INTEGER NOT NULL,
                actual_duration_ms INTEGER NOT NULL DEFAULT 0,
                category TEXT NOT NULL,
                state INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_intervals_category ON intervals(category);
            CREATE INDEX IF NOT EXISTS idx_intervals_start_time ON intervals(start_time);
            ",
        )?;
        tracing::debug!("interval schema ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    fn insert(&self, interval: &Interval) -> Result<i64, DbError> {
        let conn = self.conn()?;
        conn.execute(
            "
            INSERT INTO intervals
            (start_time, planned_duration_ms, actual_duration_ms, category, state)
            VALUES (?, ?, ?, ?, ?)
            ",
            params![
                interval.start_time.map(format_timestamp),
                duration_to_ms(interval.planned_duration)?,
                duration_to_ms(interval.actual_duration)?,
                interval.category.as_str(),
                interval.state.as_i64(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Returns the number of rows changed.
    fn overwrite(&self, interval: &Interval) -> Result<usize, DbError> {
        let changed = self.conn()?.execute(
            "
            UPDATE intervals
            SET start_time = ?, planned_duration_ms = ?, actual_duration_ms = ?, category = ?, state = ?
            WHERE id = ?
            ",
            params![
                interval.start_time.map(format_timestamp),
                duration_to_ms(interval.planned_duration)?,
                duration_to_ms(interval.actual_duration)?,
                interval.category.as_str(),
                interval.state.as_i64(),
                interval.id,
            ],
        )?;
        Ok(changed)
    }

    fn find_one(&self, clause: &str, id: Option<i64>) -> Result<Option<Interval>, DbError> {
        let conn = self.conn()?;
        let sql = format!("{SELECT_INTERVAL} {clause}");
        let row = match id {
            Some(id) => conn
                .query_row(&sql, [id], IntervalRow::from_row)
                .optional()?,
            None => conn.query_row(&sql, [], IntervalRow::from_row).optional()?,
        };
        row.map(IntervalRow::into_interval).transpose()
    }

    fn recent_breaks(&self, n: usize) -> Result<Vec<Interval>, DbError> {
        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_INTERVAL} WHERE category IN (?, ?) ORDER BY id DESC LIMIT ?"
        ))?;
        let rows = stmt.query_map(
            params![
                Category::ShortBreak.as_str(),
                Category::LongBreak.as_str(),
                limit
            ],
            IntervalRow::from_row,
        )?;
        let mut breaks = Vec::new();
        for row in rows {
            breaks.push(row?.into_interval()?);
        }
        Ok(breaks)
    }

    fn summary(&self, day: NaiveDate, filter: CategoryFilter) -> Result<Duration, DbError> {
        let next_day = day.succ_opt().ok_or(DbError::DayOutOfRange(day))?;
        let categories = filter_categories(filter);
        let placeholders = vec!["?"; categories.len()].join(", ");

        let mut values = vec![day_start(day), day_start(next_day)];
        values.extend(categories.iter().map(|c| c.as_str().to_string()));

        let total_ms: i64 = self.conn()?.query_row(
            &format!(
                "
                SELECT COALESCE(SUM(actual_duration_ms), 0)
                FROM intervals
                WHERE start_time >= ? AND start_time < ? AND category IN ({placeholders})
                "
            ),
            params_from_iter(values),
            |row| row.get(0),
        )?;
        duration_from_ms(total_ms)
    }
}

impl Repository for SqliteRepository {
    fn create(&self, interval: &Interval) -> pomo_core::Result<i64> {
        Ok(self.insert(interval)?)
    }

    fn update(&self, interval: &Interval) -> pomo_core::Result<()> {
        if self.overwrite(interval)? == 0 {
            return Err(pomo_core::Error::NotFound(interval.id));
        }
        Ok(())
    }

    fn by_id(&self, id: i64) -> pomo_core::Result<Interval> {
        self.find_one("WHERE id = ?", Some(id))?
            .ok_or(pomo_core::Error::NotFound(id))
    }

    fn last(&self) -> pomo_core::Result<Interval> {
        self.find_one("ORDER BY id DESC LIMIT 1", None)?
            .ok_or(pomo_core::Error::NoIntervals)
    }

    fn breaks(&self, n: usize) -> pomo_core::Result<Vec<Interval>> {
        Ok(self.recent_breaks(n)?)
    }

    fn category_summary(&self, day: NaiveDate, filter: CategoryFilter) -> pomo_core::Result<Duration> {
        Ok(self.summary(day, filter)?)
    }
}

fn filter_categories(filter: CategoryFilter) -> Vec<Category> {
    [Category::Pomodoro, Category::ShortBreak, Category::LongBreak]
        .into_iter()
        .filter(|category| filter.matches(*category))
        .collect()
}

fn day_start(day: NaiveDate) -> String {
    format_timestamp(day.and_time(chrono::NaiveTime::MIN).and_utc())
}

fn parse_timestamp(timestamp: &str, id: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            id,
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn duration_to_ms(duration: Duration) -> Result<i64, DbError> {
    i64::try_from(duration.as_millis())
        .map_err(|_| DbError::DurationOutOfRange(format!("{duration:?}")))
}

fn duration_from_ms(ms: i64) -> Result<Duration, DbError> {
    u64::try_from(ms)
        .map(Duration::from_millis)
        .map_err(|_| DbError::DurationOutOfRange(format!("{ms}ms")))
}
