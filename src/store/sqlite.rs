//! SQLite-backed sample history
//!
//! One row per sample keyed by millisecond timestamp, so `INSERT OR REPLACE`
//! gives last-write-wins deduplication and the primary key gives ordering.

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::Path;
use tracing::{debug, info};

use super::HistoryStore;
use crate::queue::{QueueSample, SampleHistory};

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

CREATE TABLE IF NOT EXISTS queue_history (
    timestamp_ms INTEGER PRIMARY KEY,
    queue_length INTEGER NOT NULL,
    position REAL NOT NULL,
    wait_time_estimate REAL NOT NULL,
    velocity REAL NOT NULL,
    acceleration REAL NOT NULL,
    stake_rate REAL NOT NULL
);
"#;

pub struct SqliteHistoryStore {
    // Single connection; the mutex also serializes appends.
    conn: Mutex<Connection>,
}

impl SqliteHistoryStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(path, flags)
            .with_context(|| format!("Failed to open queue history at {}", path.display()))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize queue history schema")?;

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap_or_default();
        if journal_mode.to_lowercase() != "wal" {
            debug!(journal_mode = %journal_mode, "WAL mode not active");
        }

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM queue_history", [], |row| row.get(0))
            .context("Failed to count queue history rows")?;
        info!(path = %path.display(), samples = count, "📊 Queue history opened");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn load(&self) -> Result<SampleHistory> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT timestamp_ms, queue_length, position, wait_time_estimate,
                        velocity, acceleration, stake_rate
                 FROM queue_history
                 ORDER BY timestamp_ms ASC",
            )
            .context("Failed to prepare history query")?;

        let samples = stmt
            .query_map([], row_to_sample)
            .context("Failed to query queue history")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to decode queue history row")?;

        Ok(SampleHistory::from_samples(samples))
    }

    fn append(&self, sample: &QueueSample) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO queue_history
             (timestamp_ms, queue_length, position, wait_time_estimate, velocity, acceleration, stake_rate)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                sample.timestamp.timestamp_millis(),
                i64::try_from(sample.queue_length).unwrap_or(i64::MAX),
                sample.position,
                sample.wait_time_estimate,
                sample.velocity,
                sample.acceleration,
                sample.stake_rate,
            ],
        )
        .context("Failed to append queue sample")?;
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM queue_history", [], |row| row.get(0))
            .context("Failed to count queue history rows")?;
        Ok(count.max(0) as usize)
    }
}

fn row_to_sample(row: &Row<'_>) -> rusqlite::Result<QueueSample> {
    let timestamp_ms: i64 = row.get(0)?;
    let timestamp = Utc
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(0, timestamp_ms))?;
    let queue_length: i64 = row.get(1)?;

    Ok(QueueSample {
        timestamp,
        queue_length: queue_length.max(0) as u64,
        position: row.get(2)?,
        wait_time_estimate: row.get(3)?,
        velocity: row.get(4)?,
        acceleration: row.get(5)?,
        stake_rate: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(hour: i64, position: f64) -> QueueSample {
        QueueSample {
            queue_length: 100,
            position,
            wait_time_estimate: 72.0,
            velocity: 1.2,
            acceleration: 0.05,
            stake_rate: 32.0,
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hour),
        }
    }

    #[test]
    fn test_sqlite_store_create() {
        let store = SqliteHistoryStore::in_memory().expect("Failed to create database");
        assert_eq!(store.len().unwrap(), 0);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_sqlite_store_loads_sorted() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        store.append(&sample(3, 7.0)).unwrap();
        store.append(&sample(1, 9.0)).unwrap();
        store.append(&sample(2, 8.0)).unwrap();

        let history = store.load().unwrap();
        let positions: Vec<f64> = history.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![9.0, 8.0, 7.0]);
        assert_eq!(history.first().unwrap(), &sample(1, 9.0));
    }

    #[test]
    fn test_sqlite_store_last_write_wins() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        store.append(&sample(1, 9.0)).unwrap();
        store.append(&sample(1, 4.5)).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.load().unwrap().last().unwrap().position, 4.5);
    }

    #[test]
    fn test_sqlite_store_append_error_propagates() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        store
            .conn
            .lock()
            .execute_batch("DROP TABLE queue_history")
            .unwrap();

        assert!(store.append(&sample(1, 9.0)).is_err());
    }

    #[test]
    fn test_sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue_history.db");

        {
            let store = SqliteHistoryStore::open(&path).unwrap();
            store.append(&sample(0, 45.0)).unwrap();
        }

        let reopened = SqliteHistoryStore::open(&path).unwrap();
        assert_eq!(reopened.len().unwrap(), 1);
        assert_eq!(reopened.load().unwrap().last().unwrap().position, 45.0);
    }

    #[test]
    fn test_sqlite_store_missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("queue_history.db");
        assert!(SqliteHistoryStore::open(&path).is_err());
    }
}
