//! In-memory record store.
//!
//! # Responsibility
//! - Own the project, todo and note collections.
//! - Enforce project ownership and cascade delete.
//! - Answer filtered queries without mutating state.
//!
//! # Invariants
//! - Collections keep insertion order; `save_note` replaces in place.
//! - After `delete_project(id)` no todo or note references `id`.
//! - Deletes and toggles on unknown ids are no-ops, never errors.
//! - Selection is never stored here; queries take it as a parameter.

use crate::model::note::{ActiveNote, Note, NoteSave};
use crate::model::project::Project;
use crate::model::snapshot::Snapshot;
use crate::model::todo::Todo;
use crate::model::RecordId;
use chrono::NaiveDate;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level rejection. Only creation paths can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Referenced owner project does not exist.
    ProjectNotFound(RecordId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
        }
    }
}

impl Error for StoreError {}

/// Number of records removed by one `delete_project` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub projects: usize,
    pub todos: usize,
    pub notes: usize,
}

impl CascadeReport {
    pub fn is_noop(&self) -> bool {
        self.projects == 0 && self.todos == 0 && self.notes == 0
    }
}

/// Authoritative holder of all board records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    projects: Vec<Project>,
    todos: Vec<Todo>,
    notes: Vec<Note>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from persisted collections as-is.
    ///
    /// Orphaned todos/notes in the snapshot are kept; they are unreachable
    /// through project-scoped queries and vanish on the next cascade.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            projects: snapshot.projects,
            todos: snapshot.todos,
            notes: snapshot.notes,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            projects: self.projects.clone(),
            todos: self.todos.clone(),
            notes: self.notes.clone(),
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub fn todo(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// All notes owned by `project_id`, in collection order.
    pub fn notes_for(&self, project_id: &str) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|note| note.project_id == project_id)
            .collect()
    }

    /// Appends a new project. Blank names are the caller's problem.
    pub fn add_project(&mut self, name: &str, description: &str) -> Project {
        let project = Project::new(name, description);
        self.projects.push(project.clone());
        debug!("event=project_add module=store status=ok total={}", self.projects.len());
        project
    }

    /// Removes a project together with its todos and notes.
    ///
    /// All three collections are filtered first and swapped in together.
    pub fn delete_project(&mut self, id: &str) -> CascadeReport {
        let projects: Vec<Project> = self
            .projects
            .iter()
            .filter(|project| project.id != id)
            .cloned()
            .collect();
        let todos: Vec<Todo> = self
            .todos
            .iter()
            .filter(|todo| todo.project_id != id)
            .cloned()
            .collect();
        let notes: Vec<Note> = self
            .notes
            .iter()
            .filter(|note| note.project_id != id)
            .cloned()
            .collect();

        let report = CascadeReport {
            projects: self.projects.len() - projects.len(),
            todos: self.todos.len() - todos.len(),
            notes: self.notes.len() - notes.len(),
        };

        self.projects = projects;
        self.todos = todos;
        self.notes = notes;

        debug!(
            "event=project_delete module=store status=ok projects_removed={} todos_removed={} notes_removed={}",
            report.projects, report.todos, report.notes
        );
        report
    }

    /// Appends an open todo under an existing project.
    pub fn add_todo(&mut self, text: &str, date: NaiveDate, project_id: &str) -> StoreResult<Todo> {
        self.ensure_project(project_id)?;
        let todo = Todo::new(text, date, project_id);
        self.todos.push(todo.clone());
        Ok(todo)
    }

    /// Flips `completed`; returns the new value, or `None` if absent.
    pub fn toggle_todo(&mut self, id: &str) -> Option<bool> {
        let todo = self.todos.iter_mut().find(|todo| todo.id == id)?;
        todo.completed = !todo.completed;
        Some(todo.completed)
    }

    /// Returns whether a todo was removed.
    pub fn delete_todo(&mut self, id: &str) -> bool {
        let before = self.todos.len();
        self.todos.retain(|todo| todo.id != id);
        self.todos.len() != before
    }

    /// Upserts a note by id.
    ///
    /// The note is stored exactly as given; stamping `date` is the caller's
    /// job at save time. Replacing keeps the note's position. The owner
    /// project must exist on both paths.
    pub fn save_note(&mut self, note: Note) -> StoreResult<NoteSave> {
        self.ensure_project(&note.project_id)?;

        if let Some(slot) = self.notes.iter_mut().find(|existing| existing.id == note.id) {
            *slot = note;
            return Ok(NoteSave::Replaced);
        }

        self.notes.push(note);
        Ok(NoteSave::Inserted)
    }

    /// Todos whose text contains `filter_text` ignoring case, optionally
    /// restricted to one project.
    pub fn query_todos(&self, filter_text: &str, project_id: Option<&str>) -> Vec<&Todo> {
        let needle = filter_text.to_lowercase();
        self.todos
            .iter()
            .filter(|todo| project_id.map_or(true, |id| todo.project_id == id))
            .filter(|todo| todo.text_contains(&needle))
            .collect()
    }

    /// Todos of one project scheduled exactly on `date`.
    pub fn query_todos_for_date(&self, project_id: &str, date: NaiveDate) -> Vec<&Todo> {
        self.todos
            .iter()
            .filter(|todo| todo.project_id == project_id && todo.date == date)
            .collect()
    }

    /// First stored note of the project, or an uninserted draft dated `today`.
    pub fn active_note_for(&self, project_id: &str, today: NaiveDate) -> ActiveNote<'_> {
        match self.notes.iter().find(|note| note.project_id == project_id) {
            Some(note) => ActiveNote::Saved(note),
            None => ActiveNote::Draft(Note::draft(project_id, today)),
        }
    }

    fn ensure_project(&self, project_id: &str) -> StoreResult<()> {
        if self.project(project_id).is_none() {
            return Err(StoreError::ProjectNotFound(project_id.to_string()));
        }
        Ok(())
    }
}
