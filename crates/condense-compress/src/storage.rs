use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;

use condense_core::{CompressionResult, Method};

use crate::cache::{CacheEntry, CacheError, CacheStore};
use crate::Fingerprint;

/// Bump when the `cache_entries` layout changes
pub const SCHEMA_VERSION: i64 = 1;

/// Persistent cache in a SQLite database
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Open or create the database.
    ///
    /// An older schema is dropped and rebuilt; a newer one fails with
    /// [`CacheError::Incompatible`] so the caller can fall back.
    pub fn open(db_path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), CacheError> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        let has_table: i64 = conn.query_row(
            "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'cache_entries'",
            [],
            |row| row.get(0),
        )?;

        if has_table > 0 && version > SCHEMA_VERSION {
            return Err(CacheError::Incompatible {
                found: version,
                expected: SCHEMA_VERSION,
            });
        }
        if has_table > 0 && version != SCHEMA_VERSION {
            warn!(
                found = version,
                expected = SCHEMA_VERSION,
                "cache incompatible, recompute"
            );
            conn.execute_batch("DROP TABLE cache_entries;")?;
        }

        conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS cache_entries (
                key TEXT PRIMARY KEY,
                method TEXT NOT NULL,
                original_size INTEGER NOT NULL,
                compressed_size INTEGER NOT NULL,
                compression_ratio REAL NOT NULL,
                estimated_token_savings INTEGER NOT NULL,
                preview TEXT,
                compressed_text TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            PRAGMA user_version = {};
            ",
            SCHEMA_VERSION
        ))?;
        Ok(())
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<CacheEntry> {
        let method: String = row.get(1)?;
        let method: Method = method.parse().map_err(|e: condense_core::CompressError| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    e.to_string(),
                )),
            )
        })?;
        let created_at: String = row.get(8)?;
        let created_at: DateTime<Utc> = created_at.parse().map_err(|e: chrono::ParseError| {
            rusqlite::Error::FromSqlConversionFailure(
                8,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    e.to_string(),
                )),
            )
        })?;

        Ok(CacheEntry {
            key: Fingerprint::from_hex(row.get::<_, String>(0)?),
            result: CompressionResult::restore(
                row.get::<_, i64>(2)? as usize,
                row.get::<_, i64>(3)? as usize,
                method,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ),
            compressed_text: row.get(7)?,
            created_at,
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::Poisoned)
    }
}

impl CacheStore for SqliteCache {
    fn get(&self, key: &Fingerprint) -> Result<Option<CacheEntry>, CacheError> {
        let conn = self.lock()?;
        let entry = conn
            .query_row(
                "SELECT key, method, original_size, compressed_size, compression_ratio,
                        estimated_token_savings, preview, compressed_text, created_at
                 FROM cache_entries WHERE key = ?",
                params![key.as_str()],
                Self::row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    fn put(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        let conn = self.lock()?;
        let result = &entry.result;
        conn.execute(
            "INSERT OR REPLACE INTO cache_entries VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.key.as_str(),
                result.method().as_str(),
                result.original_size() as i64,
                result.compressed_size() as i64,
                result.compression_ratio(),
                result.estimated_token_savings(),
                result.preview(),
                entry.compressed_text,
                entry.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.lock()?.execute("DELETE FROM cache_entries", [])?;
        Ok(())
    }

    fn len(&self) -> Result<usize, CacheError> {
        let count: i64 =
            self.lock()?
                .query_row("SELECT count(*) FROM cache_entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
