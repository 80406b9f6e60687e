//! Point-in-time copy of all collections.

use super::note::Note;
use super::project::Project;
use super::todo::Todo;

/// Full state handed to persistence after each mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub todos: Vec<Todo>,
    pub notes: Vec<Note>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.todos.is_empty() && self.notes.is_empty()
    }
}
