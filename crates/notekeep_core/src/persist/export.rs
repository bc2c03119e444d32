//! One-shot export of both collections into a single JSON document.

use super::codec::{format_timestamp, NoteRecord, Record, TodoRecord};
use crate::model::note::Note;
use crate::model::now_utc;
use crate::model::todo::Todo;
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

const EXPORT_FILE_PREFIX: &str = "notes-todos-backup-";

#[derive(Debug)]
pub enum ExportError {
    Encode(serde_json::Error),
    Io { path: PathBuf, source: std::io::Error },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode export snapshot: {err}"),
            Self::Io { path, source } => {
                write!(f, "failed to write export `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument {
    notes: Vec<NoteRecord>,
    todos: Vec<TodoRecord>,
    export_date: String,
}

/// Rendered export artifact, ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSnapshot {
    /// `notes-todos-backup-YYYY-MM-DD.json`, dated by `exported_at`.
    pub file_name: String,
    /// Pretty-printed JSON document.
    pub contents: String,
    pub exported_at: DateTime<Utc>,
}

impl ExportSnapshot {
    pub fn as_bytes(&self) -> &[u8] {
        self.contents.as_bytes()
    }

    /// Writes the artifact into `dir` (created if missing) and returns the path.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(&self.file_name);
        fs::write(&path, self.as_bytes()).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        info!(
            "event=export_write module=persist status=ok bytes={} path={}",
            self.contents.len(),
            path.display()
        );
        Ok(path)
    }
}

/// Builds a snapshot stamped with the current time.
pub fn export_snapshot(notes: &[Note], todos: &[Todo]) -> Result<ExportSnapshot, ExportError> {
    export_snapshot_at(notes, todos, now_utc())
}

/// Builds a snapshot stamped with `exported_at`.
pub fn export_snapshot_at(
    notes: &[Note],
    todos: &[Todo],
    exported_at: DateTime<Utc>,
) -> Result<ExportSnapshot, ExportError> {
    let document = ExportDocument {
        notes: notes.iter().map(Note::to_wire).collect(),
        todos: todos.iter().map(Todo::to_wire).collect(),
        export_date: format_timestamp(exported_at),
    };
    let contents = serde_json::to_string_pretty(&document)?;
    Ok(ExportSnapshot {
        file_name: format!(
            "{EXPORT_FILE_PREFIX}{}.json",
            exported_at.format("%Y-%m-%d")
        ),
        contents,
        exported_at,
    })
}
