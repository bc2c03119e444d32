//! Command-line front end for NoteKeep.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the durable store.
//! - Translate one invocation into controller commands and print the view.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use notekeep_core::db::open_db;
use notekeep_core::{
    init_logging, parse_timestamp, AppConfig, Command, ConfigOverrides, KvStore, Note, NoteDraft,
    Notebook, Outcome, Priority, SqliteKvStore, StatusFilter, Tab, Timestamp, Todo, TodoDraft,
};
use std::path::{Path, PathBuf};

/// Personal notes and todos, stored locally.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Data directory (default: $NOTEKEEP_DATA_DIR or ~/.notekeep)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Manage notes
    #[command(subcommand)]
    Note(NoteCmd),
    /// Manage todos
    #[command(subcommand)]
    Todo(TodoCmd),
    /// List known categories
    Categories {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Write a JSON backup of all notes and todos
    Export {
        /// Target directory (default: $NOTEKEEP_EXPORT_DIR or <data-dir>/exports)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum NoteCmd {
    Add {
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Replace a note; omitted fields keep their current value
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    Rm {
        id: String,
    },
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "")]
        category: String,
    },
}

#[derive(Subcommand, Debug)]
enum TodoCmd {
    Add {
        text: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Due date, `YYYY-MM-DD` or RFC 3339
        #[arg(long)]
        due: Option<String>,
    },
    /// Replace a todo; omitted fields keep their current value
    Edit {
        id: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        #[arg(long)]
        clear_due: bool,
    },
    Toggle {
        id: String,
    },
    Rm {
        id: String,
    },
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Show active, completed and overdue counts
    Stats,
}

impl Cmd {
    fn name(&self) -> &'static str {
        match self {
            Self::Note(_) => "note",
            Self::Todo(_) => "todo",
            Self::Categories { .. } => "categories",
            Self::Export { .. } => "export",
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Notes,
    Todos,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        data_dir: args.data_dir.map(std::path::absolute).transpose()?,
        log_level: args.log_level,
        export_dir: None,
    };
    let config = AppConfig::resolve(overrides)?;
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "failed to create data directory `{}`",
            config.data_dir.display()
        )
    })?;
    start_logging(config.log_level, &config.log_dir())?;

    info!(
        "event=cli_start module=cli status=ok command={} data_dir={}",
        args.command.name(),
        config.data_dir.display()
    );

    let conn = open_db(config.db_path())?;
    let mut book = Notebook::open(SqliteKvStore::try_new(&conn)?);

    match args.command {
        Cmd::Note(cmd) => run_note(&mut book, cmd),
        Cmd::Todo(cmd) => run_todo(&mut book, cmd),
        Cmd::Categories { kind } => {
            let categories = match kind {
                KindArg::Notes => book.note_categories(),
                KindArg::Todos => book.todo_categories(),
            };
            for category in categories {
                println!("{category}");
            }
            Ok(())
        }
        Cmd::Export { out } => {
            let dir = match out {
                Some(dir) => std::path::absolute(dir)?,
                None => config.export_dir.clone(),
            };
            let path = book.export_snapshot()?.write_to(dir)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn start_logging(level: &str, log_dir: &Path) -> Result<()> {
    init_logging(level, log_dir)
        .with_context(|| format!("failed to start logging in `{}`", log_dir.display()))
}

fn run_note<S: KvStore>(book: &mut Notebook<S>, cmd: NoteCmd) -> Result<()> {
    match cmd {
        NoteCmd::Add {
            title,
            content,
            category,
        } => {
            let outcome = book.apply(Command::CreateNote(NoteDraft::new(title, content, category)))?;
            report(outcome, "note")
        }
        NoteCmd::Edit {
            id,
            title,
            content,
            category,
        } => {
            let Some(current) = book.notes().get(&id) else {
                bail!("note not found: {id}");
            };
            let draft = NoteDraft::new(
                title.unwrap_or_else(|| current.title.clone()),
                content.unwrap_or_else(|| current.content.clone()),
                category.unwrap_or_else(|| current.category.clone()),
            );
            let outcome = book.apply(Command::EditNote { id, draft })?;
            report(outcome, "note")
        }
        NoteCmd::Rm { id } => {
            let outcome = book.apply(Command::DeleteNote(id))?;
            report(outcome, "note")
        }
        NoteCmd::List { search, category } => {
            book.apply(Command::SelectTab(Tab::Notes))?;
            book.apply(Command::SetSearch(search))?;
            book.apply(Command::SelectCategory(category))?;
            for note in book.visible_notes().iter() {
                print_note(note);
            }
            Ok(())
        }
    }
}

fn run_todo<S: KvStore>(book: &mut Notebook<S>, cmd: TodoCmd) -> Result<()> {
    match cmd {
        TodoCmd::Add {
            text,
            category,
            priority,
            due,
        } => {
            let mut draft = TodoDraft::new(text, category, priority);
            draft.due_date = due.as_deref().map(parse_due).transpose()?;
            let outcome = book.apply(Command::CreateTodo(draft))?;
            report(outcome, "todo")
        }
        TodoCmd::Edit {
            id,
            text,
            category,
            priority,
            due,
            clear_due,
        } => {
            let Some(current) = book.todos().get(&id) else {
                bail!("todo not found: {id}");
            };
            let mut draft = TodoDraft::new(
                text.unwrap_or_else(|| current.text.clone()),
                category.unwrap_or_else(|| current.category.clone()),
                priority.unwrap_or(current.priority),
            );
            draft.due_date = match (due, clear_due) {
                (_, true) => None,
                (Some(due), false) => Some(parse_due(&due)?),
                (None, false) => current.due_date,
            };
            let outcome = book.apply(Command::EditTodo { id, draft })?;
            report(outcome, "todo")
        }
        TodoCmd::Toggle { id } => {
            let outcome = book.apply(Command::ToggleTodo(id))?;
            report(outcome, "todo")
        }
        TodoCmd::Rm { id } => {
            let outcome = book.apply(Command::DeleteTodo(id))?;
            report(outcome, "todo")
        }
        TodoCmd::List {
            search,
            category,
            status,
        } => {
            book.apply(Command::SelectTab(Tab::Todos))?;
            book.apply(Command::SetSearch(search))?;
            book.apply(Command::SelectCategory(category))?;
            book.apply(Command::SetStatusFilter(status))?;
            for todo in book.visible_todos().iter() {
                print_todo(todo);
            }
            Ok(())
        }
        TodoCmd::Stats => {
            let counts = book.todo_counts();
            println!("active:    {}", counts.active);
            println!("completed: {}", counts.completed);
            println!("overdue:   {}", counts.overdue);
            Ok(())
        }
    }
}

fn parse_due(text: &str) -> Result<Timestamp> {
    parse_timestamp(text).ok_or_else(|| anyhow!("invalid due date `{text}`; use YYYY-MM-DD"))
}

fn report(outcome: Outcome, kind: &str) -> Result<()> {
    match outcome {
        Outcome::Created { id } => println!("{id}"),
        Outcome::Applied => {}
        Outcome::Unchanged => eprintln!("no {kind} with that id; nothing changed"),
    }
    Ok(())
}

fn print_note(note: &Note) {
    println!(
        "{}  [{}]  {}  (updated {})",
        note.id,
        note.category,
        note.title,
        note.updated_at.format("%Y-%m-%d %H:%M")
    );
}

fn print_todo(todo: &Todo) {
    let mark = if todo.completed { "x" } else { " " };
    let due = todo
        .due_date
        .map(|due| format!("  due {}", due.format("%Y-%m-%d")))
        .unwrap_or_default();
    println!(
        "[{mark}] {}  ({}, {})  {}{due}",
        todo.id, todo.priority, todo.category, todo.text
    );
}
