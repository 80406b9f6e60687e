//! Record shapes for the project board.
//!
//! # Responsibility
//! - Define the three persisted record types and their wire field names.
//! - Provide constructors that mint fresh ids.
//!
//! # Invariants
//! - `Todo::project_id` and `Note::project_id` reference a `Project::id`.
//! - ids are unique within their own collection only.

pub mod note;
pub mod project;
pub mod snapshot;
pub mod todo;

use uuid::Uuid;

/// Identifier shared by all record kinds.
///
/// Stored as a plain string so ids minted by older front ends (for example
/// millisecond timestamps) still load.
pub type RecordId = String;

/// Mints a fresh collection-unique id.
pub fn new_record_id() -> RecordId {
    Uuid::new_v4().to_string()
}
