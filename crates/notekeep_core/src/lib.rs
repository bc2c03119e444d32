//! Core domain logic for NoteKeep, a personal notes-and-todos manager.
//!
//! Layers, bottom-up:
//! - `model`: `Note`/`Todo` records, drafts and validation.
//! - `store`: in-memory collections and derived views.
//! - `persist`: JSON snapshots over a key-value text store, export, ids.
//! - `db`: SQLite bootstrap backing the durable key-value store.
//! - `service`: the `Notebook` controller owning all application state.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod persist;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError, ConfigOverrides};
pub use logging::{init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteDraft};
pub use model::todo::{Priority, Todo, TodoDraft};
pub use model::{Timestamp, ValidationError, DEFAULT_CATEGORY};
pub use persist::codec::{format_timestamp, parse_timestamp};
pub use persist::export::{export_snapshot, ExportError, ExportSnapshot};
pub use persist::id::generate_id;
pub use persist::kv::{KvStore, MemoryKvStore};
pub use persist::sqlite_kv::SqliteKvStore;
pub use persist::{CollectionKind, Persistence, StoreError, StoreResult};
pub use service::notebook::{
    Command, Notebook, NotebookError, NotebookResult, Outcome, Tab, ViewState,
};
pub use store::{Collection, EntityFilter, FilteredView, StatusFilter, TodoCounts};
