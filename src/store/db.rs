//! SQLite connection and schema management for the contest store

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc, Weekday};
use rusqlite::Connection;

use crate::domain::{parse_weekday, weekday_token};
use crate::store::StoreError;

/// Database wrapper shared by the store implementation
#[derive(Clone)]
pub struct MatrixDb {
    conn: Arc<Mutex<Connection>>,
}

impl MatrixDb {
    /// Open or create the contest database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open contest db: {}", path.display()))?;
        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory database (tests, dry runs)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Get a reference to the connection
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("contest db lock poisoned")
    }

    fn init_schema(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA_SQL)?;
        Ok(())
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id                TEXT PRIMARY KEY,
    full_name         TEXT NOT NULL,
    email             TEXT NOT NULL UNIQUE,
    longrich_code     TEXT NOT NULL,
    office            TEXT NOT NULL,
    role              TEXT NOT NULL DEFAULT 'user',
    current_level     INTEGER NOT NULL DEFAULT 1,
    terms_accepted    INTEGER NOT NULL DEFAULT 0,
    terms_accepted_at TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS challenges (
    id               TEXT PRIMARY KEY,
    title            TEXT NOT NULL,
    description      TEXT NOT NULL DEFAULT '',
    level            INTEGER NOT NULL,
    start_date       TEXT NOT NULL,
    end_date         TEXT NOT NULL,
    submission_start TEXT NOT NULL,
    submission_end   TEXT NOT NULL,
    submission_days  TEXT NOT NULL DEFAULT '',
    min_points       INTEGER NOT NULL DEFAULT 0,
    status           TEXT NOT NULL DEFAULT 'draft',
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

-- At most one active challenge per level
CREATE UNIQUE INDEX IF NOT EXISTS idx_challenges_active_level
    ON challenges(level) WHERE status = 'active';

CREATE TABLE IF NOT EXISTS rewards (
    id           TEXT PRIMARY KEY,
    challenge_id TEXT NOT NULL REFERENCES challenges(id) ON DELETE CASCADE,
    title        TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    image_url    TEXT,
    kind         TEXT NOT NULL,
    min_points   INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_rewards_challenge ON rewards(challenge_id, min_points);

CREATE TABLE IF NOT EXISTS challenge_participants (
    id             TEXT PRIMARY KEY,
    user_id        TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    challenge_id   TEXT NOT NULL REFERENCES challenges(id) ON DELETE CASCADE,
    current_points INTEGER NOT NULL DEFAULT 0,
    status         TEXT NOT NULL DEFAULT 'active',
    completed_at   TEXT,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL,
    UNIQUE(user_id, challenge_id)
);

CREATE TABLE IF NOT EXISTS matrix_submissions (
    id             TEXT PRIMARY KEY,
    user_id        TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    challenge_id   TEXT NOT NULL REFERENCES challenges(id) ON DELETE CASCADE,
    mxf            INTEGER NOT NULL DEFAULT 0,
    mxm            INTEGER NOT NULL DEFAULT 0,
    mx             INTEGER NOT NULL DEFAULT 0,
    mx_global      INTEGER NOT NULL DEFAULT 0,
    screenshot_url TEXT NOT NULL,
    submitted_at   TEXT NOT NULL,
    status         TEXT NOT NULL DEFAULT 'pending',
    created_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_submissions_status ON matrix_submissions(status, submitted_at);
CREATE INDEX IF NOT EXISTS idx_submissions_user ON matrix_submissions(user_id, submitted_at);
"#;

// --- column encoding helpers ---

pub(crate) fn fmt_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Malformed(format!("bad timestamp {s:?}: {e}")))
}

pub(crate) fn fmt_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| StoreError::Malformed(format!("bad date {s:?}: {e}")))
}

pub(crate) fn fmt_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub(crate) fn parse_time(s: &str) -> Result<NaiveTime, StoreError> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| StoreError::Malformed(format!("bad time of day {s:?}: {e}")))
}

pub(crate) fn fmt_days(days: &[Weekday]) -> String {
    days.iter()
        .map(|d| weekday_token(*d))
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn parse_days(s: &str) -> Result<Vec<Weekday>, StoreError> {
    s.split(',')
        .filter(|t| !t.is_empty())
        .map(|t| parse_weekday(t).ok_or_else(|| StoreError::Malformed(format!("bad weekday {t:?}"))))
        .collect()
}
