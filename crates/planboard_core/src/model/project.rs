//! Project record.

use super::{new_record_id, RecordId};
use serde::{Deserialize, Serialize};

/// Root entity owning zero or more todos and notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: RecordId,
    /// Display name. Non-empty once trimmed.
    pub name: String,
    /// Free-form description, may be empty.
    #[serde(default)]
    pub description: String,
}

impl Project {
    /// Creates a project with a generated id.
    ///
    /// The name is trimmed but not validated; callers reject blank names.
    pub fn new(name: &str, description: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            name: name.trim().to_string(),
            description: description.into(),
        }
    }
}
