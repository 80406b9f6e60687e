//! Mirror of the record collections into a blob store.
//!
//! # Responsibility
//! - Load the three collections at startup, tolerating bad data.
//! - Overwrite all three blobs after each mutation.
//!
//! # Invariants
//! - A missing, unreadable or malformed blob loads as an empty collection.
//! - `save` writes every blob in one `put_blobs` call, never a subset.
//! - Bytes of a malformed blob are copied to `<key>.malformed` by the first
//!   save after load, in the same write that replaces them.
//! - Failures never touch the caller's in-memory state.

use crate::model::snapshot::Snapshot;
use crate::repo::blob_repo::{BlobStore, RepoError};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub const PROJECTS_KEY: &str = "projects";
pub const TODOS_KEY: &str = "todos";
pub const NOTES_KEY: &str = "notes";
const MALFORMED_SUFFIX: &str = ".malformed";

pub type PersistResult<T> = Result<T, PersistError>;

/// Failure while writing the snapshot.
#[derive(Debug)]
pub enum PersistError {
    Encode {
        key: &'static str,
        source: serde_json::Error,
    },
    Repo(RepoError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode { key, source } => write!(f, "failed to encode `{key}`: {source}"),
            Self::Repo(err) => write!(f, "failed to write board data: {err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for PersistError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// What happened to one blob during `load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobStatus {
    Loaded(usize),
    /// Never written; normal on first start.
    Missing,
    /// Storage read failed; collection reset to empty.
    Unreadable,
    /// Bytes did not decode; collection reset to empty.
    Malformed,
}

impl BlobStatus {
    pub fn is_recovered(self) -> bool {
        matches!(self, Self::Unreadable | Self::Malformed)
    }
}

/// Result of a startup load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedBoard {
    pub snapshot: Snapshot,
    pub projects: BlobStatus,
    pub todos: BlobStatus,
    pub notes: BlobStatus,
}

impl LoadedBoard {
    /// Keys whose content was discarded.
    pub fn recovered_keys(&self) -> Vec<&'static str> {
        [
            (PROJECTS_KEY, self.projects),
            (TODOS_KEY, self.todos),
            (NOTES_KEY, self.notes),
        ]
        .into_iter()
        .filter(|(_, status)| status.is_recovered())
        .map(|(key, _)| key)
        .collect()
    }
}

/// JSON codec between `Snapshot` and a `BlobStore`.
pub struct PersistenceAdapter<B: BlobStore> {
    blobs: B,
    /// `(backup key, original bytes)` awaiting the next save.
    pending_backups: Vec<(String, Vec<u8>)>,
}

impl<B: BlobStore> PersistenceAdapter<B> {
    pub fn new(blobs: B) -> Self {
        Self {
            blobs,
            pending_backups: Vec::new(),
        }
    }

    pub fn blob_store(&self) -> &B {
        &self.blobs
    }

    /// Reads all collections. Never fails.
    ///
    /// Malformed blobs are remembered so the next `save` can back them up.
    pub fn load(&mut self) -> LoadedBoard {
        let (projects, projects_status) = self.load_collection(PROJECTS_KEY);
        let (todos, todos_status) = self.load_collection(TODOS_KEY);
        let (notes, notes_status) = self.load_collection(NOTES_KEY);

        info!(
            "event=board_load module=persistence status=ok projects={} todos={} notes={}",
            projects.len(),
            todos.len(),
            notes.len()
        );

        LoadedBoard {
            snapshot: Snapshot {
                projects,
                todos,
                notes,
            },
            projects: projects_status,
            todos: todos_status,
            notes: notes_status,
        }
    }

    /// Overwrites the three blobs with `snapshot`, plus any pending backups.
    pub fn save(&mut self, snapshot: &Snapshot) -> PersistResult<()> {
        let started_at = Instant::now();
        let mut entries: Vec<(&str, Vec<u8>)> = self
            .pending_backups
            .iter()
            .map(|(backup_key, bytes)| (backup_key.as_str(), bytes.clone()))
            .collect();
        for (backup_key, _) in &self.pending_backups {
            warn!("event=blob_backup module=persistence status=pending backup_key={backup_key}");
        }
        entries.push((PROJECTS_KEY, encode(PROJECTS_KEY, &snapshot.projects)?));
        entries.push((TODOS_KEY, encode(TODOS_KEY, &snapshot.todos)?));
        entries.push((NOTES_KEY, encode(NOTES_KEY, &snapshot.notes)?));
        let bytes: usize = entries.iter().map(|(_, value)| value.len()).sum();

        match self.blobs.put_blobs(&entries) {
            Ok(()) => {
                self.pending_backups.clear();
                info!(
                    "event=board_save module=persistence status=ok bytes={bytes} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=board_save module=persistence status=error error_code=blob_write_failed duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err.into())
            }
        }
    }

    fn load_collection<T: DeserializeOwned>(
        &mut self,
        key: &'static str,
    ) -> (Vec<T>, BlobStatus) {
        let bytes = match self.blobs.get_blob(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return (Vec::new(), BlobStatus::Missing),
            Err(err) => {
                warn!(
                    "event=blob_read module=persistence status=recovered key={key} error_code=blob_read_failed error={err}"
                );
                return (Vec::new(), BlobStatus::Unreadable);
            }
        };

        match serde_json::from_slice::<Vec<T>>(&bytes) {
            Ok(records) => {
                let count = records.len();
                (records, BlobStatus::Loaded(count))
            }
            Err(err) => {
                // Only the decoder position is logged; the payload may hold user text.
                warn!(
                    "event=blob_decode module=persistence status=recovered key={key} error_code=blob_malformed line={} column={}",
                    err.line(),
                    err.column()
                );
                self.pending_backups
                    .push((format!("{key}{MALFORMED_SUFFIX}"), bytes));
                (Vec::new(), BlobStatus::Malformed)
            }
        }
    }
}

fn encode<T: Serialize>(key: &'static str, records: &[T]) -> PersistResult<Vec<u8>> {
    serde_json::to_vec(records).map_err(|source| PersistError::Encode { key, source })
}

#[cfg(test)]
mod tests {
    use super::{BlobStatus, PersistenceAdapter, NOTES_KEY, PROJECTS_KEY, TODOS_KEY};
    use crate::model::snapshot::Snapshot;
    use crate::repo::blob_repo::{BlobStore, MemoryBlobStore};

    #[test]
    fn empty_store_loads_missing_collections() {
        let mut adapter = PersistenceAdapter::new(MemoryBlobStore::new());
        let loaded = adapter.load();
        assert!(loaded.snapshot.is_empty());
        assert_eq!(loaded.projects, BlobStatus::Missing);
        assert!(loaded.recovered_keys().is_empty());
    }

    #[test]
    fn save_writes_all_three_keys_as_json_arrays() {
        let mut adapter = PersistenceAdapter::new(MemoryBlobStore::new());
        adapter.save(&Snapshot::default()).unwrap();

        let blobs = adapter.blob_store();
        for key in [PROJECTS_KEY, TODOS_KEY, NOTES_KEY] {
            assert_eq!(blobs.get_blob(key).unwrap().as_deref(), Some(&b"[]"[..]));
        }
    }

    #[test]
    fn malformed_blob_only_resets_its_own_collection() {
        let mut blobs = MemoryBlobStore::new();
        blobs.insert_raw(PROJECTS_KEY, r#"[{"id":"1","name":"Website","description":""}]"#);
        blobs.insert_raw(TODOS_KEY, "{not json");
        blobs.insert_raw(
            NOTES_KEY,
            r#"[{"id":"n1","projectId":"1","content":"hi","date":"2024-13-45"}]"#,
        );

        let loaded = PersistenceAdapter::new(blobs).load();
        assert_eq!(loaded.projects, BlobStatus::Loaded(1));
        assert_eq!(loaded.todos, BlobStatus::Malformed);
        assert_eq!(loaded.notes, BlobStatus::Malformed);
        assert_eq!(loaded.snapshot.projects[0].name, "Website");
        assert_eq!(loaded.recovered_keys(), [TODOS_KEY, NOTES_KEY]);
    }

    #[test]
    fn malformed_blob_is_backed_up_by_first_save() {
        let mut blobs = MemoryBlobStore::new();
        blobs.insert_raw(
            TODOS_KEY,
            r#"[{"id":"t1","text":"x","completed":false,"date":"","projectId":"p"}]"#,
        );
        let mut adapter = PersistenceAdapter::new(blobs);
        let loaded = adapter.load();
        assert_eq!(loaded.todos, BlobStatus::Malformed);

        adapter.save(&loaded.snapshot).unwrap();
        let backup = adapter.blob_store().get_blob("todos.malformed").unwrap().unwrap();
        assert!(String::from_utf8(backup).unwrap().contains(r#""date":"""#));
        assert_eq!(
            adapter.blob_store().get_blob(TODOS_KEY).unwrap().as_deref(),
            Some(&b"[]"[..])
        );
        assert_eq!(adapter.blob_store().len(), 4);
    }
}
