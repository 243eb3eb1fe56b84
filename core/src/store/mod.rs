//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The session calls store methods; it never executes SQL directly.
//!
//! The database is a plain key/value table of JSON blobs, one row per
//! storage key. The roster lives under a single key.

mod roster;

pub use roster::{RosterLoad, RosterOrigin};

use crate::error::DashResult;
use rusqlite::{params, Connection, OptionalExtension};

pub struct RosterStore {
    conn: Connection,
}

impl RosterStore {
    pub fn open(path: &str) -> DashResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DashResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DashResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_storage.sql"))?;
        Ok(())
    }

    // ── Blobs ─────────────────────────────────────────────────────

    pub fn read_blob(&self, key: &str) -> DashResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM storage WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Insert or replace the blob stored under `key`.
    pub fn write_blob(&self, key: &str, value: &str) -> DashResult<()> {
        let updated_at = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, updated_at],
        )?;
        Ok(())
    }
}
