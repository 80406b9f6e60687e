//! `planboard` command-line front end.
//!
//! Each invocation loads the board, applies one command and exits.

mod render;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::warn;
use planboard_core::db::open_db;
use planboard_core::{
    init_logging, AppConfig, BlobStore, BoardSession, Clock, Committed, ConfigOverrides,
    SqliteBlobStore,
};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "planboard", version)]
#[command(about = "Projects, dated todos and notes on a local board")]
struct Cli {
    /// Directory holding the board database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Manage todos
    Todo {
        #[command(subcommand)]
        action: TodoAction,
    },
    /// Show or save a project's note
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },
    /// Render projects, the day's todos and the active note
    Board {
        #[arg(long)]
        project: Option<String>,
        #[arg(long, default_value = "")]
        filter: String,
        /// Day to show, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Debug, Subcommand)]
enum ProjectAction {
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    List,
    /// Delete a project with all its todos and notes
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
enum TodoAction {
    Add {
        text: String,
        #[arg(long)]
        project: String,
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    List {
        #[arg(long, default_value = "")]
        filter: String,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Toggle { id: String },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
enum NoteAction {
    Show {
        #[arg(long)]
        project: String,
    },
    Save {
        #[arg(long)]
        project: String,
        content: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(ConfigOverrides {
        data_dir: cli.data_dir.clone(),
        log_dir: cli.log_dir.clone(),
        log_level: cli.log_level.clone(),
    });

    config.ensure_data_dir().with_context(|| {
        format!("failed to create data directory `{}`", config.data_dir.display())
    })?;
    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let conn = open_db(config.db_path())
        .with_context(|| format!("failed to open `{}`", config.db_path().display()))?;
    let blobs = SqliteBlobStore::try_new(conn)?;
    let mut session = BoardSession::open(blobs);
    for key in session.recovered_keys() {
        eprintln!("warning: stored {key} could not be read and were reset to empty");
    }

    let stdout = io::stdout();
    run(&mut session, cli.command, &mut stdout.lock())
}

fn run<B: BlobStore, C: Clock>(
    session: &mut BoardSession<B, C>,
    command: Command,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Command::Project { action } => run_project(session, action, out),
        Command::Todo { action } => run_todo(session, action, out),
        Command::Note { action } => run_note(session, action, out),
        Command::Board {
            project,
            filter,
            date,
        } => {
            session.select_project(project.as_deref())?;
            session.set_filter(filter);
            if let Some(date) = date {
                session.set_date(date);
            }
            render::board(out, &session.view())?;
            Ok(())
        }
    }
}

fn run_project<B: BlobStore, C: Clock>(
    session: &mut BoardSession<B, C>,
    action: ProjectAction,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match action {
        ProjectAction::Add { name, description } => {
            let project = settle(session.add_project(&name, &description)?);
            writeln!(out, "{}", project.id)?;
        }
        ProjectAction::List => {
            for project in session.store().projects() {
                render::project_line(out, project, false)?;
            }
        }
        ProjectAction::Delete { id } => {
            let report = settle(session.delete_project(&id));
            if report.is_noop() {
                writeln!(out, "no project {id}")?;
            } else {
                writeln!(
                    out,
                    "deleted project {id} with {} todo(s) and {} note(s)",
                    report.todos, report.notes
                )?;
            }
        }
    }
    Ok(())
}

fn run_todo<B: BlobStore, C: Clock>(
    session: &mut BoardSession<B, C>,
    action: TodoAction,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match action {
        TodoAction::Add {
            text,
            project,
            date,
        } => {
            session.select_project(Some(project.as_str()))?;
            if let Some(date) = date {
                session.set_date(date);
            }
            let todo = settle(session.add_todo(&text)?);
            writeln!(out, "{}", todo.id)?;
        }
        TodoAction::List {
            filter,
            project,
            date,
        } => {
            let todos = session.store().query_todos(&filter, project.as_deref());
            for todo in todos
                .into_iter()
                .filter(|todo| date.map_or(true, |date| todo.date == date))
            {
                render::todo_line(out, todo)?;
            }
        }
        TodoAction::Toggle { id } => match settle(session.toggle_todo(&id)) {
            Some(true) => writeln!(out, "done {id}")?,
            Some(false) => writeln!(out, "reopened {id}")?,
            None => writeln!(out, "no todo {id}")?,
        },
        TodoAction::Delete { id } => {
            if settle(session.delete_todo(&id)) {
                writeln!(out, "deleted todo {id}")?;
            } else {
                writeln!(out, "no todo {id}")?;
            }
        }
    }
    Ok(())
}

fn run_note<B: BlobStore, C: Clock>(
    session: &mut BoardSession<B, C>,
    action: NoteAction,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match action {
        NoteAction::Show { project } => {
            session.select_project(Some(project.as_str()))?;
            if let Some(active) = session.active_note() {
                render::note_block(out, active.note(), active.is_draft())?;
            }
        }
        NoteAction::Save { project, content } => {
            session.select_project(Some(project.as_str()))?;
            let note = settle(session.save_active_note(&content)?);
            writeln!(out, "saved note {} on {}", note.id, note.date)?;
        }
    }
    Ok(())
}

/// Unwraps a commit, reporting a failed write without failing the command.
fn settle<T>(committed: Committed<T>) -> T {
    if let Some(err) = &committed.warning {
        warn!("event=cli_commit module=cli status=degraded");
        eprintln!("warning: change kept in memory but not saved: {err}");
    }
    committed.into_value()
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, Command, NoteAction, ProjectAction, TodoAction};
    use chrono::NaiveDate;
    use clap::Parser;
    use planboard_core::{BoardSession, FixedClock, MemoryBlobStore};

    fn session() -> BoardSession<MemoryBlobStore, FixedClock> {
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        BoardSession::open_with_clock(MemoryBlobStore::new(), FixedClock(today))
    }

    fn exec(session: &mut BoardSession<MemoryBlobStore, FixedClock>, args: &[&str]) -> String {
        let cli = Cli::try_parse_from(std::iter::once("planboard").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        run(session, cli.command, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_todo_add_with_date() {
        let cli = Cli::try_parse_from([
            "planboard",
            "--data-dir",
            "/tmp/board",
            "todo",
            "add",
            "Fix bug",
            "--project",
            "p1",
            "--date",
            "2024-01-15",
        ])
        .unwrap();
        match cli.command {
            Command::Todo {
                action: TodoAction::Add { text, project, date },
            } => {
                assert_eq!(text, "Fix bug");
                assert_eq!(project, "p1");
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_date() {
        let parsed = Cli::try_parse_from(["planboard", "todo", "list", "--date", "15/01/2024"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn parses_note_and_project_actions() {
        let cli = Cli::try_parse_from(["planboard", "note", "save", "--project", "p1", "hello"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Note {
                action: NoteAction::Save { .. }
            }
        ));
        let cli = Cli::try_parse_from(["planboard", "project", "delete", "p1"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Project {
                action: ProjectAction::Delete { .. }
            }
        ));
    }

    #[test]
    fn board_shows_selected_project_day_and_note() {
        let mut session = session();
        let project_id = exec(&mut session, &["project", "add", "Website"])
            .trim()
            .to_string();
        exec(&mut session, &["todo", "add", "Fix bug", "--project", &project_id]);
        exec(
            &mut session,
            &["note", "save", "--project", &project_id, "launch notes"],
        );

        let board = exec(&mut session, &["board", "--project", &project_id]);
        assert!(board.contains(&format!("* {project_id}  Website")));
        assert!(board.contains("Todos for 2024-01-15"));
        assert!(board.contains("[ ] Fix bug"));
        assert!(board.contains("Notes for Website"));
        assert!(board.contains("launch notes"));
    }

    #[test]
    fn project_delete_reports_cascade() {
        let mut session = session();
        let project_id = exec(&mut session, &["project", "add", "Temp"])
            .trim()
            .to_string();
        exec(&mut session, &["todo", "add", "a", "--project", &project_id]);

        let output = exec(&mut session, &["project", "delete", &project_id]);
        assert!(output.contains("with 1 todo(s) and 0 note(s)"));
        assert_eq!(exec(&mut session, &["todo", "list"]), "");
    }
}
