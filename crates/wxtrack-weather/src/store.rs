//! SQLite-backed observation cache.
//!
//! Holds the most recent observation per location key. One row per key,
//! replaced on write, never expired. `most_recently_written` orders by the
//! `observed_at` column so the answer survives restarts regardless of the
//! order keys were written in.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::StoreError;
use crate::types::Observation;

/// Durable keyed store of last-known observations.
pub struct ObservationStore {
    conn: Mutex<Connection>,
}

impl ObservationStore {
    /// Open (or create) the store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS observations (
                location_key TEXT PRIMARY KEY,
                temperature_c REAL NOT NULL,
                feels_like_c REAL NOT NULL,
                humidity_pct INTEGER NOT NULL,
                uv_index REAL NOT NULL,
                condition_text TEXT NOT NULL,
                condition_icon TEXT NOT NULL,
                observed_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_observations_observed_at
                ON observations(observed_at DESC);
            "#,
        )?;
        Ok(())
    }

    /// Look up the observation for an exact location key.
    pub fn get(&self, location_key: &str) -> Result<Option<Observation>, StoreError> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT location_key, temperature_c, feels_like_c, humidity_pct, uv_index,
                        condition_text, condition_icon, observed_at
                 FROM observations WHERE location_key = ?1",
                params![location_key],
                Self::row_to_observation,
            )
            .optional()?;
        Ok(row)
    }

    /// Upsert an observation; an existing row for the same key is replaced.
    pub fn put(&self, observation: &Observation) -> Result<(), StoreError> {
        self.conn.lock().execute(
            r#"
            INSERT OR REPLACE INTO observations
            (location_key, temperature_c, feels_like_c, humidity_pct, uv_index,
             condition_text, condition_icon, observed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                observation.location_key,
                observation.temperature_c as f64,
                observation.feels_like_c as f64,
                i64::from(observation.humidity_pct),
                observation.uv_index as f64,
                observation.condition_text,
                observation.condition_icon,
                observation.observed_at.timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    /// The observation with the maximum `observed_at` across all keys.
    pub fn most_recently_written(&self) -> Result<Option<Observation>, StoreError> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT location_key, temperature_c, feels_like_c, humidity_pct, uv_index,
                        condition_text, condition_icon, observed_at
                 FROM observations ORDER BY observed_at DESC LIMIT 1",
                [],
                Self::row_to_observation,
            )
            .optional()?;
        Ok(row)
    }

    fn row_to_observation(row: &rusqlite::Row) -> rusqlite::Result<Observation> {
        let observed_ms: i64 = row.get(7)?;
        // A corrupted timestamp must not masquerade as a fresh observation
        // and win most_recently_written.
        let observed_at = DateTime::<Utc>::from_timestamp_millis(observed_ms).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                rusqlite::types::Type::Integer,
                format!("observed_at out of range: {}", observed_ms).into(),
            )
        })?;

        Ok(Observation {
            location_key: row.get(0)?,
            temperature_c: row.get::<_, f64>(1)? as f32,
            feels_like_c: row.get::<_, f64>(2)? as f32,
            humidity_pct: row.get::<_, i64>(3)? as i32,
            uv_index: row.get::<_, f64>(4)? as f32,
            condition_text: row.get(5)?,
            condition_icon: row.get(6)?,
            observed_at,
        })
    }
}
