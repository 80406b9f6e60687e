//! Single owner of a record store and its persistence mirror.
//!
//! # Responsibility
//! - Hold presentation state: selected project, filter text, selected date.
//! - Apply input rules before calling the record store.
//! - Mirror every effective mutation to the persistence adapter.
//!
//! # Invariants
//! - In-memory state is authoritative; a failed write only yields a warning.
//! - No-op mutations do not trigger a write.
//! - Deleting the selected project clears the selection.

use crate::model::note::{ActiveNote, Note, NoteSave};
use crate::model::project::Project;
use crate::model::todo::Todo;
use crate::model::RecordId;
use crate::repo::blob_repo::BlobStore;
use crate::service::clock::{Clock, SystemClock};
use crate::service::persistence::{PersistError, PersistenceAdapter};
use crate::service::record_store::{CascadeReport, RecordStore, StoreError};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Named field was empty after trimming.
    BlankInput(&'static str),
    /// Operation requires an active project selection.
    NoProjectSelected,
    /// Selection target does not exist.
    UnknownProject(RecordId),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankInput(field) => write!(f, "{field} must not be blank"),
            Self::NoProjectSelected => write!(f, "select a project first"),
            Self::UnknownProject(id) => write!(f, "unknown project: {id}"),
        }
    }
}

impl Error for SessionError {}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::ProjectNotFound(id) => Self::UnknownProject(id),
        }
    }
}

/// Outcome of a mutation: the value plus any persistence warning.
#[derive(Debug)]
pub struct Committed<T> {
    pub value: T,
    pub warning: Option<PersistError>,
}

impl<T> Committed<T> {
    fn clean(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Presentation state threaded into every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub project_id: Option<RecordId>,
    pub filter_text: String,
    pub date: NaiveDate,
}

/// Everything one render of the board needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub projects: Vec<Project>,
    pub selected_project: Option<Project>,
    pub selected_date: NaiveDate,
    pub filter_text: String,
    /// Todos matching the filter, scoped to the selection when present.
    pub todos: Vec<Todo>,
    /// `todos` further restricted to the selected project and date.
    pub day_todos: Vec<Todo>,
    /// Active note of the selected project; `None` without a selection.
    pub note: Option<Note>,
    pub note_is_draft: bool,
}

/// Store plus persistence plus selection, owned by one front end.
pub struct BoardSession<B: BlobStore, C: Clock = SystemClock> {
    store: RecordStore,
    persistence: PersistenceAdapter<B>,
    clock: C,
    selection: Selection,
    recovered_keys: Vec<&'static str>,
}

impl<B: BlobStore> BoardSession<B, SystemClock> {
    /// Loads the board from `blobs` using the local date.
    pub fn open(blobs: B) -> Self {
        Self::open_with_clock(blobs, SystemClock)
    }
}

impl<B: BlobStore, C: Clock> BoardSession<B, C> {
    /// Loads the board from `blobs`. Bad stored data yields empty collections.
    pub fn open_with_clock(blobs: B, clock: C) -> Self {
        let mut persistence = PersistenceAdapter::new(blobs);
        let loaded = persistence.load();
        let recovered_keys = loaded.recovered_keys();
        if !recovered_keys.is_empty() {
            warn!(
                "event=session_open module=session status=recovered keys={}",
                recovered_keys.join(",")
            );
        }

        let today = clock.today();
        Self {
            store: RecordStore::from_snapshot(loaded.snapshot),
            persistence,
            clock,
            selection: Selection {
                project_id: None,
                filter_text: String::new(),
                date: today,
            },
            recovered_keys,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn persistence(&self) -> &PersistenceAdapter<B> {
        &self.persistence
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Collections reset to empty during the startup load.
    pub fn recovered_keys(&self) -> &[&'static str] {
        &self.recovered_keys
    }

    /// Selects a project, or clears the selection with `None`.
    pub fn select_project(&mut self, project_id: Option<&str>) -> Result<(), SessionError> {
        match project_id {
            Some(id) if self.store.project(id).is_none() => {
                Err(SessionError::UnknownProject(id.to_string()))
            }
            other => {
                self.selection.project_id = other.map(str::to_string);
                Ok(())
            }
        }
    }

    pub fn set_filter(&mut self, filter_text: impl Into<String>) {
        self.selection.filter_text = filter_text.into();
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.selection.date = date;
    }

    pub fn add_project(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<Committed<Project>, SessionError> {
        let name = non_blank(name, "project name")?;
        let project = self.store.add_project(name, description.trim());
        info!("event=project_add module=session status=ok");
        Ok(self.commit(project))
    }

    /// Cascade-deletes a project and clears the selection if it pointed there.
    pub fn delete_project(&mut self, project_id: &str) -> Committed<CascadeReport> {
        let report = self.store.delete_project(project_id);
        if self.selection.project_id.as_deref() == Some(project_id) {
            self.selection.project_id = None;
        }
        if report.is_noop() {
            return Committed::clean(report);
        }
        info!(
            "event=project_delete module=session status=ok todos_removed={} notes_removed={}",
            report.todos, report.notes
        );
        self.commit(report)
    }

    /// Adds a todo to the selected project on the selected date.
    pub fn add_todo(&mut self, text: &str) -> Result<Committed<Todo>, SessionError> {
        let text = non_blank(text, "todo text")?;
        let project_id = self
            .selection
            .project_id
            .clone()
            .ok_or(SessionError::NoProjectSelected)?;
        let todo = self.store.add_todo(text, self.selection.date, &project_id)?;
        Ok(self.commit(todo))
    }

    pub fn toggle_todo(&mut self, todo_id: &str) -> Committed<Option<bool>> {
        match self.store.toggle_todo(todo_id) {
            Some(completed) => self.commit(Some(completed)),
            None => Committed::clean(None),
        }
    }

    pub fn delete_todo(&mut self, todo_id: &str) -> Committed<bool> {
        if self.store.delete_todo(todo_id) {
            self.commit(true)
        } else {
            Committed::clean(false)
        }
    }

    /// Active note of the selected project, if any project is selected.
    pub fn active_note(&self) -> Option<ActiveNote<'_>> {
        let project_id = self.selection.project_id.as_deref()?;
        Some(self.store.active_note_for(project_id, self.clock.today()))
    }

    /// Upserts `note`, stamping its date with today.
    pub fn save_note(&mut self, mut note: Note) -> Result<Committed<NoteSave>, SessionError> {
        note.date = self.clock.today();
        let outcome = self.store.save_note(note)?;
        Ok(self.commit(outcome))
    }

    /// Replaces the selected project's active note content and saves it.
    pub fn save_active_note(&mut self, content: &str) -> Result<Committed<Note>, SessionError> {
        let mut note = self
            .active_note()
            .ok_or(SessionError::NoProjectSelected)?
            .into_owned();
        note.content = content.to_string();
        note.date = self.clock.today();

        self.store.save_note(note.clone())?;
        Ok(self.commit(note))
    }

    pub fn view(&self) -> BoardView {
        let selected = self.selection.project_id.as_deref();
        let todos: Vec<Todo> = self
            .store
            .query_todos(&self.selection.filter_text, selected)
            .into_iter()
            .cloned()
            .collect();
        let day_todos = match selected {
            Some(project_id) => todos
                .iter()
                .filter(|todo| todo.project_id == project_id && todo.date == self.selection.date)
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        let active_note = self.active_note();

        BoardView {
            projects: self.store.projects().to_vec(),
            selected_project: selected.and_then(|id| self.store.project(id)).cloned(),
            selected_date: self.selection.date,
            filter_text: self.selection.filter_text.clone(),
            todos,
            day_todos,
            note_is_draft: active_note.as_ref().is_some_and(|note| note.is_draft()),
            note: active_note.map(ActiveNote::into_owned),
        }
    }

    fn commit<T>(&mut self, value: T) -> Committed<T> {
        let snapshot = self.store.snapshot();
        let warning = self.persistence.save(&snapshot).err();
        if let Some(err) = &warning {
            warn!("event=session_commit module=session status=degraded error={err}");
        }
        Committed { value, warning }
    }
}

fn non_blank<'a>(value: &'a str, field: &'static str) -> Result<&'a str, SessionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SessionError::BlankInput(field));
    }
    Ok(trimmed)
}
