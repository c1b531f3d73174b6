// SQLite persistence layer for cached draft snapshots and session state.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// SQLite-backed persistence for per-draft feed payloads and key-value
/// session state.
pub struct Database {
    conn: Mutex<Connection>,
}

/// One cached feed payload with the time it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedFeed {
    pub payload: String,
    pub fetched_at: DateTime<Utc>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS snapshot_cache (
                draft_id   TEXT NOT NULL,
                feed       TEXT NOT NULL,
                payload    TEXT NOT NULL,
                fetched_at TEXT NOT NULL,
                PRIMARY KEY (draft_id, feed)
            );

            CREATE TABLE IF NOT EXISTS draft_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Snapshot cache
    // ------------------------------------------------------------------

    /// Store one feed's raw JSON payload for a draft, replacing any earlier
    /// copy of the same feed.
    pub fn save_feed(
        &self,
        draft_id: &str,
        feed: &str,
        payload: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR REPLACE INTO snapshot_cache (draft_id, feed, payload, fetched_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![draft_id, feed, payload, fetched_at.to_rfc3339()],
        )
        .with_context(|| format!("failed to save {feed} feed for draft {draft_id}"))?;
        Ok(())
    }

    /// Load a cached feed payload. Returns `None` if nothing is stored.
    pub fn load_feed(&self, draft_id: &str, feed: &str) -> Result<Option<CachedFeed>> {
        let conn = self.conn();
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT payload, fetched_at FROM snapshot_cache
                 WHERE draft_id = ?1 AND feed = ?2",
                params![draft_id, feed],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .with_context(|| format!("failed to load {feed} feed for draft {draft_id}"))?;

        let Some((payload, fetched_at)) = row else {
            return Ok(None);
        };
        let fetched_at = DateTime::parse_from_rfc3339(&fetched_at)
            .with_context(|| format!("invalid fetched_at timestamp {fetched_at:?}"))?
            .with_timezone(&Utc);
        Ok(Some(CachedFeed {
            payload,
            fetched_at,
        }))
    }

    // ------------------------------------------------------------------
    // Key-value state
    // ------------------------------------------------------------------

    /// Persist an arbitrary JSON value under `key`.
    pub fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn();
        let json_str =
            serde_json::to_string(value).context("failed to serialize state value")?;
        conn.execute(
            "INSERT OR REPLACE INTO draft_state (key, value) VALUES (?1, ?2)",
            params![key, json_str],
        )
        .context("failed to save state")?;
        Ok(())
    }

    /// Load a previously saved JSON value by `key`.
    pub fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn();
        let json_str: Option<String> = conn
            .query_row(
                "SELECT value FROM draft_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query draft state")?;

        match json_str {
            Some(json_str) => {
                let value = serde_json::from_str(&json_str)
                    .context("failed to deserialize state value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    const DRAFT_ID_KEY: &'static str = "current_draft_id";
    const IS_LIVE_KEY: &'static str = "is_live";

    /// The draft id last entered by the user, if any.
    pub fn get_draft_id(&self) -> Result<Option<String>> {
        let value = self.load_state(Self::DRAFT_ID_KEY)?;
        Ok(value.and_then(|v| v.as_str().map(|s| s.to_string())))
    }

    pub fn set_draft_id(&self, draft_id: &str) -> Result<()> {
        self.save_state(
            Self::DRAFT_ID_KEY,
            &serde_json::Value::String(draft_id.to_string()),
        )
    }

    pub fn get_is_live(&self) -> Result<Option<bool>> {
        let value = self.load_state(Self::IS_LIVE_KEY)?;
        Ok(value.and_then(|v| v.as_bool()))
    }

    pub fn set_is_live(&self, is_live: bool) -> Result<()> {
        self.save_state(Self::IS_LIVE_KEY, &serde_json::Value::Bool(is_live))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    #[test]
    fn open_creates_tables() {
        let db = test_db();
        let conn = db.conn();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"snapshot_cache".to_string()));
        assert!(tables.contains(&"draft_state".to_string()));
    }

    #[test]
    fn feed_save_and_load() {
        let db = test_db();
        let at = Utc.with_ymd_and_hms(2025, 8, 30, 18, 5, 0).unwrap();
        db.save_feed("d1", "picks", "[]", at).unwrap();

        let cached = db.load_feed("d1", "picks").unwrap().expect("should be cached");
        assert_eq!(cached.payload, "[]");
        assert_eq!(cached.fetched_at, at);
        assert!(db.load_feed("d1", "valuations").unwrap().is_none());
        assert!(db.load_feed("d2", "picks").unwrap().is_none());
    }

    #[test]
    fn feed_save_replaces_previous() {
        let db = test_db();
        let first = Utc.with_ymd_and_hms(2025, 8, 30, 18, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2025, 8, 30, 18, 1, 0).unwrap();
        db.save_feed("d1", "picks", "[1]", first).unwrap();
        db.save_feed("d1", "picks", "[1,2]", second).unwrap();

        let cached = db.load_feed("d1", "picks").unwrap().unwrap();
        assert_eq!(cached.payload, "[1,2]");
        assert_eq!(cached.fetched_at, second);
    }

    #[test]
    fn state_round_trip_and_missing_key() {
        let db = test_db();
        assert!(db.load_state("nothing").unwrap().is_none());
        db.save_state("k", &serde_json::json!({"a": 1})).unwrap();
        assert_eq!(db.load_state("k").unwrap(), Some(serde_json::json!({"a": 1})));
    }

    #[test]
    fn session_values_persist() {
        let db = test_db();
        assert_eq!(db.get_draft_id().unwrap(), None);
        assert_eq!(db.get_is_live().unwrap(), None);

        db.set_draft_id("1112223334445").unwrap();
        db.set_is_live(true).unwrap();
        assert_eq!(db.get_draft_id().unwrap().as_deref(), Some("1112223334445"));
        assert_eq!(db.get_is_live().unwrap(), Some(true));
    }
}
