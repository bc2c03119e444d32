//! Domain model for notes and todos.
//!
//! # Responsibility
//! - Define the `Note` and `Todo` records and their field contracts.
//! - Normalize and validate user drafts before any record is built.
//!
//! # Invariants
//! - Every record is identified by an opaque, immutable string `id`.
//! - Timestamps carry millisecond precision, matching the persisted form.
//! - Required text fields (note title, todo text) are never empty.

use chrono::{DateTime, SubsecRound, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod note;
pub mod todo;

/// UTC instant with millisecond precision.
pub type Timestamp = DateTime<Utc>;

/// Category assigned when a draft leaves the category blank.
pub const DEFAULT_CATEGORY: &str = "General";

/// Rejection raised before a draft or record reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Note title is empty after trimming.
    EmptyTitle,
    /// Todo text is empty after trimming.
    EmptyText,
    /// Note `updated_at` precedes its `created_at`.
    UpdatedBeforeCreated {
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },
    /// Priority outside `low|medium|high`.
    InvalidPriority(String),
    /// Required date field absent or not a recognizable date.
    MissingTimestamp(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title cannot be empty"),
            Self::EmptyText => write!(f, "todo text cannot be empty"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at {updated_at} is earlier than created_at {created_at}"
            ),
            Self::InvalidPriority(value) => write!(
                f,
                "invalid priority `{value}`; expected low|medium|high"
            ),
            Self::MissingTimestamp(field) => {
                write!(f, "`{field}` is missing or not a valid date")
            }
        }
    }
}

impl Error for ValidationError {}

/// Returns the current instant truncated to millisecond precision.
pub fn now_utc() -> DateTime<Utc> {
    truncate_to_millis(Utc::now())
}

/// Drops sub-millisecond precision so values survive the text round trip.
pub fn truncate_to_millis(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(3)
}

pub(crate) fn normalize_category(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}
