//! Todo record.

use super::{new_record_id, RecordId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Dated actionable item belonging to exactly one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: RecordId,
    pub text: String,
    pub completed: bool,
    /// Calendar day the todo is scheduled for, persisted as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub project_id: RecordId,
}

impl Todo {
    /// Creates an open todo with a generated id.
    pub fn new(text: impl Into<String>, date: NaiveDate, project_id: impl Into<RecordId>) -> Self {
        Self {
            id: new_record_id(),
            text: text.into(),
            completed: false,
            date,
            project_id: project_id.into(),
        }
    }

    /// Case-insensitive substring match against the todo text.
    ///
    /// `needle_lower` must already be lowercased.
    pub(crate) fn text_contains(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.text.to_lowercase().contains(needle_lower)
    }
}

#[cfg(test)]
mod tests {
    use super::Todo;
    use chrono::NaiveDate;

    #[test]
    fn new_todo_starts_open() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let todo = Todo::new("Fix bug", date, "p1");
        assert!(!todo.completed);
        assert_eq!(todo.project_id, "p1");
    }

    #[test]
    fn text_match_ignores_case() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let todo = Todo::new("Write Release Notes", date, "p1");
        assert!(todo.text_contains("release"));
        assert!(todo.text_contains(""));
        assert!(!todo.text_contains("deploy"));
    }

    #[test]
    fn serializes_with_camel_case_and_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mut todo = Todo::new("Fix bug", date, "p1");
        todo.id = "t1".to_string();
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["projectId"], "p1");
        assert_eq!(json["date"], "2024-01-15");
        assert_eq!(json["completed"], false);
    }
}
