//! Core of the project board: projects, dated todos and per-project notes
//! kept in memory and mirrored to a local SQLite blob store.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigOverrides};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{ActiveNote, Note, NoteSave};
pub use model::project::Project;
pub use model::snapshot::Snapshot;
pub use model::todo::Todo;
pub use model::RecordId;
pub use repo::blob_repo::{BlobStore, MemoryBlobStore, RepoError, RepoResult, SqliteBlobStore};
pub use service::board_session::{BoardSession, BoardView, Committed, Selection, SessionError};
pub use service::clock::{Clock, FixedClock, SystemClock};
pub use service::persistence::{
    BlobStatus, LoadedBoard, PersistError, PersistResult, PersistenceAdapter,
};
pub use service::record_store::{CascadeReport, RecordStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
