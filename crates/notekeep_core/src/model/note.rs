//! Note record and draft.
//!
//! # Invariants
//! - `id` never changes after creation.
//! - `updated_at >= created_at`.

use super::{normalize_category, truncate_to_millis, ValidationError};
use chrono::{DateTime, Utc};

/// Free-text note with a single category label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User input for creating or editing a note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    /// Blank means [`super::DEFAULT_CATEGORY`].
    pub category: String,
}

impl NoteDraft {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category: category.into(),
        }
    }

    /// Trims the title/category and rejects an empty title.
    pub fn normalized(&self) -> Result<NoteDraft, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(NoteDraft {
            title: title.to_string(),
            content: self.content.clone(),
            category: normalize_category(&self.category),
        })
    }
}

impl Note {
    /// Builds a fresh note; both timestamps are set to `now`.
    pub fn from_draft(
        id: impl Into<String>,
        draft: &NoteDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let draft = draft.normalized()?;
        let now = truncate_to_millis(now);
        Ok(Self {
            id: id.into(),
            title: draft.title,
            content: draft.content,
            category: draft.category,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns the full replacement record for an edit.
    ///
    /// Keeps `id` and `created_at`; `updated_at` never moves before creation
    /// even if the clock went backwards.
    pub fn revised(&self, draft: &NoteDraft, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let draft = draft.normalized()?;
        Ok(Self {
            id: self.id.clone(),
            title: draft.title,
            content: draft.content,
            category: draft.category,
            created_at: self.created_at,
            updated_at: truncate_to_millis(now).max(self.created_at),
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.updated_at < self.created_at {
            return Err(ValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteDraft};
    use crate::model::{ValidationError, DEFAULT_CATEGORY};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn from_draft_trims_and_defaults_category() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let note = Note::from_draft("n1", &NoteDraft::new("  Plan  ", "body", ""), now).unwrap();
        assert_eq!(note.title, "Plan");
        assert_eq!(note.category, DEFAULT_CATEGORY);
        assert_eq!(note.created_at, now);
        assert_eq!(note.updated_at, now);
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = NoteDraft::new(" ", "body", "Home").normalized().unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);
    }

    #[test]
    fn revised_keeps_identity_and_clamps_updated_at() {
        let created = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let note = Note::from_draft("n1", &NoteDraft::new("a", "b", "c"), created).unwrap();

        let earlier = created - Duration::hours(1);
        let edited = note
            .revised(&NoteDraft::new("a2", "b2", "c2"), earlier)
            .unwrap();
        assert_eq!(edited.id, "n1");
        assert_eq!(edited.created_at, created);
        assert_eq!(edited.updated_at, created);
        assert_eq!(edited.title, "a2");
        edited.validate().unwrap();
    }

    #[test]
    fn validate_rejects_inverted_timestamps() {
        let created = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let mut note = Note::from_draft("n1", &NoteDraft::new("a", "b", "c"), created).unwrap();
        note.updated_at = created - Duration::seconds(1);
        assert!(matches!(
            note.validate(),
            Err(ValidationError::UpdatedBeforeCreated { .. })
        ));
    }
}
