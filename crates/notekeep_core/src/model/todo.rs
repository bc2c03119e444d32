//! Todo record, priority and draft.

use super::{normalize_category, truncate_to_millis, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Closed priority scale for todos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ValidationError::InvalidPriority(other.to_string())),
        }
    }
}

/// Priority-tagged to-do item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub category: String,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
}

/// User input for creating or editing a todo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoDraft {
    pub text: String,
    /// Blank means [`super::DEFAULT_CATEGORY`].
    pub category: String,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
}

impl TodoDraft {
    pub fn new(text: impl Into<String>, category: impl Into<String>, priority: Priority) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            priority,
            due_date: None,
        }
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(truncate_to_millis(due_date));
        self
    }

    /// Trims text/category, rejects empty text and drops sub-millisecond
    /// digits from the due date.
    pub fn normalized(&self) -> Result<TodoDraft, ValidationError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        Ok(TodoDraft {
            text: text.to_string(),
            category: normalize_category(&self.category),
            priority: self.priority,
            due_date: self.due_date.map(truncate_to_millis),
        })
    }
}

impl Todo {
    /// Builds a fresh, not yet completed todo.
    pub fn from_draft(
        id: impl Into<String>,
        draft: &TodoDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let draft = draft.normalized()?;
        Ok(Self {
            id: id.into(),
            text: draft.text,
            completed: false,
            category: draft.category,
            priority: draft.priority,
            created_at: truncate_to_millis(now),
            due_date: draft.due_date,
        })
    }

    /// Returns the full replacement record for an edit.
    ///
    /// `id`, `completed` and `created_at` carry over from the current record.
    pub fn revised(&self, draft: &TodoDraft) -> Result<Self, ValidationError> {
        let draft = draft.normalized()?;
        Ok(Self {
            id: self.id.clone(),
            text: draft.text,
            completed: self.completed,
            category: draft.category,
            priority: draft.priority,
            created_at: self.created_at,
            due_date: draft.due_date,
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        Ok(())
    }

    /// Not completed and due strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }
}

#[cfg(test)]
mod tests {
    use super::{Priority, Todo, TodoDraft};
    use crate::model::ValidationError;
    use chrono::{Duration, TimeZone, Timelike, Utc};

    #[test]
    fn priority_parses_closed_set_only() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(
            "urgent".parse::<Priority>().unwrap_err(),
            ValidationError::InvalidPriority("urgent".to_string())
        );
        assert!("HIGH".parse::<Priority>().is_err());
    }

    #[test]
    fn empty_text_is_rejected() {
        let err = TodoDraft::new("   ", "", Priority::Low)
            .normalized()
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyText);
    }

    #[test]
    fn revised_preserves_completion_and_creation() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let mut todo = Todo::from_draft("t1", &TodoDraft::new("a", "x", Priority::Low), now).unwrap();
        todo.completed = true;

        let edited = todo
            .revised(&TodoDraft::new("b", "y", Priority::High))
            .unwrap();
        assert!(edited.completed);
        assert_eq!(edited.created_at, now);
        assert_eq!(edited.priority, Priority::High);
        assert_eq!(edited.text, "b");
    }

    #[test]
    fn overdue_requires_open_todo_with_past_due_date() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let draft = TodoDraft::new("rent", "", Priority::High).with_due_date(now - Duration::days(1));
        let mut todo = Todo::from_draft("t1", &draft, now).unwrap();
        assert!(todo.is_overdue(now));

        todo.completed = true;
        assert!(!todo.is_overdue(now));

        todo.completed = false;
        todo.due_date = Some(now);
        assert!(!todo.is_overdue(now));

        todo.due_date = None;
        assert!(!todo.is_overdue(now));
    }

    #[test]
    fn due_date_is_kept_at_millisecond_precision() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let due = (now + Duration::days(2)).with_nanosecond(123_456_789).unwrap();

        let built = TodoDraft::new("rent", "", Priority::High).with_due_date(due);
        assert_eq!(built.due_date.unwrap().nanosecond(), 123_000_000);

        let mut raw = TodoDraft::new("rent", "", Priority::High);
        raw.due_date = Some(due);
        let todo = Todo::from_draft("t1", &raw, now).unwrap();
        assert_eq!(todo.due_date.unwrap().nanosecond(), 123_000_000);

        let edited = todo.revised(&raw).unwrap();
        assert_eq!(edited.due_date, todo.due_date);
    }

    #[test]
    fn validate_rejects_blank_text() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let mut todo = Todo::from_draft("t1", &TodoDraft::new("a", "", Priority::Low), now).unwrap();
        todo.validate().unwrap();

        todo.text = "  ".to_string();
        assert_eq!(todo.validate(), Err(ValidationError::EmptyText));
    }
}
