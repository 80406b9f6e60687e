//! Blob store contract with SQLite and in-memory implementations.
//!
//! # Invariants
//! - `put_blobs` overwrites every given key in one transaction.
//! - Values are opaque bytes; encoding is the caller's concern.

use crate::db::{table_exists, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const BLOB_TABLE: &str = "kv_blobs";

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure while reading or writing blobs.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Connection was not migrated before use.
    MissingRequiredTable(&'static str),
    /// Storage refused the write (quota, read-only medium, injected fault).
    WriteRejected(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::WriteRejected(reason) => write!(f, "blob write rejected: {reason}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) | Self::WriteRejected(_) => None,
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

/// Named byte-blob storage.
pub trait BlobStore {
    /// Reads one blob; `None` when the key was never written.
    fn get_blob(&self, key: &str) -> RepoResult<Option<Vec<u8>>>;
    /// Overwrites all `entries` atomically.
    fn put_blobs(&mut self, entries: &[(&str, Vec<u8>)]) -> RepoResult<()>;
}

/// SQLite-backed blob store over the `kv_blobs` table.
pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    /// Wraps a connection returned by `db::open_db*`.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when migrations were not applied.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        if !table_exists(&conn, BLOB_TABLE)? {
            return Err(RepoError::MissingRequiredTable(BLOB_TABLE));
        }
        Ok(Self { conn })
    }
}

impl BlobStore for SqliteBlobStore {
    fn get_blob(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_blobs WHERE key = ?1;",
                [key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_blobs(&mut self, entries: &[(&str, Vec<u8>)]) -> RepoResult<()> {
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT INTO kv_blobs (key, value, updated_at)
                 VALUES (?1, ?2, strftime('%s', 'now') * 1000)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Process-local blob store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value, bypassing any encoding.
    pub fn insert_raw(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.blobs.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get_blob(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn put_blobs(&mut self, entries: &[(&str, Vec<u8>)]) -> RepoResult<()> {
        for (key, value) in entries {
            self.blobs.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}
