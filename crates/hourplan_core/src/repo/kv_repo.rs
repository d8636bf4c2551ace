//! Key-value repository contracts and implementations.
//!
//! # Responsibility
//! - Store whole-collection JSON blobs under stable string keys.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `put` replaces the full value for a key; there are no partial updates.
//! - `get` on a missing key returns `Ok(None)`, never an error.

use crate::db::DbError;
use crate::repo::snapshot::SnapshotError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for snapshot reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Snapshot(SnapshotError),
    /// Backend cannot serve the request (non-SQLite stores).
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SnapshotError> for RepoError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

/// Whole-value key-value storage.
pub trait KvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn put(&self, key: &str, value: &str) -> RepoResult<()>;
}

impl<T: KvRepository + ?Sized> KvRepository for &T {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).put(key, value)
    }
}

/// SQLite-backed key-value repository over `kv_entries`.
pub struct SqliteKvRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KvRepository for SqliteKvRepository<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Process-local repository for tests and hosts without storage.
#[derive(Debug, Default)]
pub struct MemoryKvRepository {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryKvRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one raw value, e.g. a legacy blob.
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.borrow_mut().insert(key.into(), value.into());
        self
    }
}

impl KvRepository for MemoryKvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> RepoResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KvRepository, MemoryKvRepository, SqliteKvRepository};
    use crate::db::open_db_in_memory;

    #[test]
    fn sqlite_get_missing_key_returns_none() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteKvRepository::new(&conn);
        assert_eq!(repo.get("projects").unwrap(), None);
    }

    #[test]
    fn sqlite_put_replaces_whole_value() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteKvRepository::new(&conn);
        repo.put("projects", "[1]").unwrap();
        repo.put("projects", "[]").unwrap();
        assert_eq!(repo.get("projects").unwrap().as_deref(), Some("[]"));

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn memory_repo_seeds_and_overwrites() {
        let repo = MemoryKvRepository::new().with_entry("allocations", "[]");
        assert_eq!(repo.get("allocations").unwrap().as_deref(), Some("[]"));
        repo.put("allocations", "[{}]").unwrap();
        assert_eq!(repo.get("allocations").unwrap().as_deref(), Some("[{}]"));
        assert_eq!((&repo).get("missing").unwrap(), None);
    }
}
