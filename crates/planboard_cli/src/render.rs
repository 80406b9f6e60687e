//! Plain-text rendering of board records.

use planboard_core::{BoardView, Note, Project, Todo};
use std::io::{self, Write};

pub fn project_line(out: &mut impl Write, project: &Project, selected: bool) -> io::Result<()> {
    let marker = if selected { '*' } else { ' ' };
    if project.description.is_empty() {
        writeln!(out, "{marker} {}  {}", project.id, project.name)
    } else {
        writeln!(
            out,
            "{marker} {}  {}  ({})",
            project.id, project.name, project.description
        )
    }
}

pub fn todo_line(out: &mut impl Write, todo: &Todo) -> io::Result<()> {
    let check = if todo.completed { 'x' } else { ' ' };
    writeln!(out, "[{check}] {}  {}  {}", todo.text, todo.date, todo.id)
}

pub fn note_block(out: &mut impl Write, note: &Note, is_draft: bool) -> io::Result<()> {
    if is_draft {
        writeln!(out, "(no saved note yet)")?;
        return Ok(());
    }
    writeln!(out, "saved {}  {}", note.date, note.id)?;
    writeln!(out, "{}", note.content)
}

pub fn board(out: &mut impl Write, view: &BoardView) -> io::Result<()> {
    let selected_id = view.selected_project.as_ref().map(|project| project.id.as_str());

    writeln!(out, "Projects")?;
    for project in &view.projects {
        project_line(out, project, Some(project.id.as_str()) == selected_id)?;
    }

    writeln!(out)?;
    if view.filter_text.is_empty() {
        writeln!(out, "Todos for {}", view.selected_date)?;
    } else {
        writeln!(
            out,
            "Todos for {} matching \"{}\"",
            view.selected_date, view.filter_text
        )?;
    }
    for todo in &view.day_todos {
        todo_line(out, todo)?;
    }

    writeln!(out)?;
    match (&view.selected_project, &view.note) {
        (Some(project), Some(note)) => {
            writeln!(out, "Notes for {}", project.name)?;
            note_block(out, note, view.note_is_draft)
        }
        _ => {
            writeln!(out, "Notes")?;
            writeln!(out, "Select a project to start taking notes")
        }
    }
}
