//! SQLite cache store.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension};

use super::error::StoreError;
use super::location::CACHE_LAYER_NAME;
use super::store::{CacheStore, FIELD_BLOB, FIELD_URL};

/// Cache store in an SQLite database, opened with `synchronous = OFF`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open an existing database file.
    pub fn open_existing(path: &Path) -> Result<Self, StoreError> {
        if !path.is_file() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::configure(conn)
    }

    /// Create (or open) a database file.
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        Self::configure(Connection::open(path)?)
    }

    /// Create a database that lives only as long as this store.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self, StoreError> {
        // Opening is lazy; this read fails on files that are not databases.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })?;
        conn.pragma_update(None, "synchronous", "OFF")?;
        Ok(Self { conn })
    }

    fn columns(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({CACHE_LAYER_NAME})"))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }
}

impl CacheStore for SqliteStore {
    fn ensure_layer(&mut self, create: bool) -> Result<bool, StoreError> {
        let columns = self.columns()?;

        if columns.is_empty() {
            if !create {
                return Ok(false);
            }
            self.conn.execute_batch(&format!(
                "CREATE TABLE {CACHE_LAYER_NAME} ({FIELD_URL} TEXT, {FIELD_BLOB} TEXT);
                 CREATE INDEX idx_{FIELD_URL}_{CACHE_LAYER_NAME} ON {CACHE_LAYER_NAME} ({FIELD_URL});"
            ))?;
            return Ok(true);
        }

        if columns.iter().any(|c| c == FIELD_URL) && columns.iter().any(|c| c == FIELD_BLOB) {
            Ok(true)
        } else {
            Err(StoreError::InvalidSchema(CACHE_LAYER_NAME.to_string()))
        }
    }

    fn lookup(&mut self, url: &str) -> Result<Option<String>, StoreError> {
        let body = self
            .conn
            .query_row(
                &format!(
                    "SELECT {FIELD_BLOB} FROM {CACHE_LAYER_NAME} WHERE {FIELD_URL} = ?1 ORDER BY rowid LIMIT 1"
                ),
                [url],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(body.flatten())
    }

    fn append(&mut self, url: &str, body: &str) -> Result<(), StoreError> {
        self.conn.execute(
            &format!("INSERT INTO {CACHE_LAYER_NAME} ({FIELD_URL}, {FIELD_BLOB}) VALUES (?1, ?2)"),
            [url, body],
        )?;
        Ok(())
    }
}
