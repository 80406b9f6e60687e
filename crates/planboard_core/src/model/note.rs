//! Note record and the draft/saved distinction surfaced to callers.

use super::{new_record_id, RecordId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Free-form text attached to a project.
///
/// Several notes may share a `project_id`; only the first one is surfaced as
/// the project's active note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: RecordId,
    pub project_id: RecordId,
    pub content: String,
    /// Day of the last save, persisted as `YYYY-MM-DD`.
    pub date: NaiveDate,
}

impl Note {
    /// Creates an empty unsaved note for `project_id`.
    pub fn draft(project_id: impl Into<RecordId>, today: NaiveDate) -> Self {
        Self {
            id: new_record_id(),
            project_id: project_id.into(),
            content: String::new(),
            date: today,
        }
    }
}

/// Note surfaced for a project: either stored or a transient draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveNote<'a> {
    /// First stored note for the project.
    Saved(&'a Note),
    /// Not present in the store until explicitly saved.
    Draft(Note),
}

impl ActiveNote<'_> {
    pub fn note(&self) -> &Note {
        match self {
            Self::Saved(note) => note,
            Self::Draft(note) => note,
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, Self::Draft(_))
    }

    /// Detaches the note from the store borrow.
    pub fn into_owned(self) -> Note {
        match self {
            Self::Saved(note) => note.clone(),
            Self::Draft(note) => note,
        }
    }
}

/// How `RecordStore::save_note` applied an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteSave {
    /// Appended as a new note.
    Inserted,
    /// Replaced an existing note at its original position.
    Replaced,
}
