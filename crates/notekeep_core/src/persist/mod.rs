//! Persistence adapter over a key-value text store.
//!
//! # Responsibility
//! - Write each collection as one full-replace JSON document per key.
//! - Rebuild collections at startup, recovering to empty on bad data.
//! - Produce the export snapshot and fresh entity ids.
//!
//! # Invariants
//! - `load` never fails: absent keys, unreadable stores and unparsable
//!   documents all yield an empty collection.
//! - `save` never writes partial collections.

use crate::db::DbError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub mod codec;
pub mod export;
pub mod id;
pub mod kv;
pub mod sqlite_kv;

pub use codec::Record;
pub use kv::KvStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Transport or encoding failure in the persistence layer.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Encode(serde_json::Error),
    /// Backing table is absent; the connection skipped migrations.
    SchemaMissing(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode collection: {err}"),
            Self::SchemaMissing(table) => write!(f, "storage table `{table}` is missing"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::SchemaMissing(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Named collection with a stable storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Notes,
    Todos,
}

impl CollectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Todos => "todos",
        }
    }

    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Notes => "notes-todo-app-notes",
            Self::Todos => "notes-todo-app-todos",
        }
    }
}

/// Stateless read/write pair keyed by collection.
pub struct Persistence<S: KvStore> {
    store: S,
}

impl<S: KvStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Serializes the whole collection and replaces its stored document.
    pub fn save<T: Record>(&mut self, entities: &[T]) -> StoreResult<()> {
        let started_at = Instant::now();
        let kind = T::KIND;
        let text = codec::encode(entities)?;

        if let Err(err) = self.store.set(kind.storage_key(), &text) {
            error!(
                "event=collection_save module=persist status=error collection={} duration_ms={} error={err}",
                kind.as_str(),
                started_at.elapsed().as_millis()
            );
            return Err(err);
        }

        info!(
            "event=collection_save module=persist status=ok collection={} count={} bytes={} duration_ms={}",
            kind.as_str(),
            entities.len(),
            text.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Reads the stored collection, recovering to empty on any failure.
    pub fn load<T: Record>(&self) -> Vec<T> {
        let kind = T::KIND;
        let text = match self.store.get(kind.storage_key()) {
            Ok(Some(text)) => text,
            Ok(None) => {
                info!(
                    "event=collection_load module=persist status=empty collection={}",
                    kind.as_str()
                );
                return Vec::new();
            }
            Err(err) => {
                error!(
                    "event=collection_load module=persist status=error collection={} error_code=store_read_failed error={err}",
                    kind.as_str()
                );
                return Vec::new();
            }
        };

        match codec::decode::<T>(&text) {
            Ok(decoded) => {
                info!(
                    "event=collection_load module=persist status=ok collection={} count={} dropped={}",
                    kind.as_str(),
                    decoded.items.len(),
                    decoded.dropped
                );
                decoded.items
            }
            Err(err) => {
                warn!(
                    "event=collection_load module=persist status=discarded collection={} error_code=unparsable error={err}",
                    kind.as_str()
                );
                Vec::new()
            }
        }
    }

    /// Removes the stored document for `kind`.
    pub fn clear(&mut self, kind: CollectionKind) -> StoreResult<()> {
        self.store.remove(kind.storage_key())?;
        info!(
            "event=collection_clear module=persist status=ok collection={}",
            kind.as_str()
        );
        Ok(())
    }
}
