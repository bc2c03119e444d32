//! JSON wire format for persisted collections.
//!
//! # Responsibility
//! - Map `Note`/`Todo` to camelCase JSON records with ISO-8601 dates.
//! - Rebuild records from text, reconstructing every date field.
//!
//! # Invariants
//! - Dates are written as RFC 3339 UTC with millisecond precision.
//! - An optional date without a valid textual form decodes to `None`.
//! - A record missing a required date, or failing `validate()`, is dropped,
//!   never half-built.

use super::CollectionKind;
use crate::model::note::Note;
use crate::model::todo::{Priority, Todo};
use crate::model::{truncate_to_millis, ValidationError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Entity with a persisted wire representation.
pub trait Record: Sized {
    /// Collection this record type is stored under.
    const KIND: CollectionKind;
    type Wire: Serialize + DeserializeOwned;

    fn to_wire(&self) -> Self::Wire;
    /// Rebuilds and validates a stored record.
    fn from_wire(wire: Self::Wire) -> Result<Self, ValidationError>;
}

/// Stored form of a [`Note`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_date_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_date_text")]
    pub updated_at: Option<String>,
}

/// Stored form of a [`Todo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoRecord {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "lenient_date_text")]
    pub created_at: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_date_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<String>,
}

impl Record for Note {
    const KIND: CollectionKind = CollectionKind::Notes;
    type Wire = NoteRecord;

    fn to_wire(&self) -> NoteRecord {
        NoteRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            category: self.category.clone(),
            created_at: Some(format_timestamp(self.created_at)),
            updated_at: Some(format_timestamp(self.updated_at)),
        }
    }

    fn from_wire(wire: NoteRecord) -> Result<Self, ValidationError> {
        let created_at = required_date(wire.created_at.as_deref(), "createdAt")?;
        let updated_at = wire
            .updated_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(created_at);
        let note = Self {
            id: wire.id,
            title: wire.title,
            content: wire.content,
            category: wire.category,
            created_at,
            updated_at: updated_at.max(created_at),
        };
        note.validate()?;
        Ok(note)
    }
}

impl Record for Todo {
    const KIND: CollectionKind = CollectionKind::Todos;
    type Wire = TodoRecord;

    fn to_wire(&self) -> TodoRecord {
        TodoRecord {
            id: self.id.clone(),
            text: self.text.clone(),
            completed: self.completed,
            category: self.category.clone(),
            priority: self.priority,
            created_at: Some(format_timestamp(self.created_at)),
            due_date: self.due_date.map(format_timestamp),
        }
    }

    fn from_wire(wire: TodoRecord) -> Result<Self, ValidationError> {
        let created_at = required_date(wire.created_at.as_deref(), "createdAt")?;
        let todo = Self {
            id: wire.id,
            text: wire.text,
            completed: wire.completed,
            category: wire.category,
            priority: wire.priority,
            created_at,
            due_date: wire.due_date.as_deref().and_then(parse_timestamp),
        };
        todo.validate()?;
        Ok(todo)
    }
}

/// Result of decoding one stored collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    pub items: Vec<T>,
    /// Records skipped because they could not be reconstructed.
    pub dropped: usize,
}

/// Serializes a full collection into one JSON array.
pub fn encode<T: Record>(items: &[T]) -> serde_json::Result<String> {
    let records: Vec<T::Wire> = items.iter().map(T::to_wire).collect();
    serde_json::to_string(&records)
}

/// Parses a stored collection.
///
/// # Errors
/// - Returns the JSON error when the text is not an array. Individual
///   malformed elements are skipped and counted in `dropped`.
pub fn decode<T: Record>(text: &str) -> serde_json::Result<Decoded<T>> {
    let values: Vec<Value> = serde_json::from_str(text)?;
    let total = values.len();
    let mut items = Vec::with_capacity(total);

    for (index, value) in values.into_iter().enumerate() {
        let record = match serde_json::from_value::<T::Wire>(value) {
            Ok(record) => record,
            Err(err) => {
                warn!(
                    "event=record_decode module=persist status=skipped collection={} index={index} error={err}",
                    T::KIND.as_str()
                );
                continue;
            }
        };
        match T::from_wire(record) {
            Ok(item) => items.push(item),
            Err(err) => warn!(
                "event=record_decode module=persist status=skipped collection={} index={index} error={err}",
                T::KIND.as_str()
            ),
        }
    }

    let dropped = total - items.len();
    Ok(Decoded { items, dropped })
}

/// Formats a timestamp the way it is persisted (`2025-03-15T10:00:00.000Z`).
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a persisted or user-entered date.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC) and a
/// calendar date `YYYY-MM-DD` (midnight UTC). Anything else yields `None`.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Some(truncate_to_millis(value.with_timezone(&Utc)));
    }
    if let Ok(value) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(truncate_to_millis(value.and_utc()));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|value| value.and_utc())
}

fn required_date(text: Option<&str>, field: &'static str) -> Result<DateTime<Utc>, ValidationError> {
    text.and_then(parse_timestamp)
        .ok_or(ValidationError::MissingTimestamp(field))
}

/// Accepts any JSON value for a date slot; only strings are kept.
fn lenient_date_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        _ => None,
    })
}
