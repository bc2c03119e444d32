//! Generic ordered collection keyed by entity id.
//!
//! Ordering is newest-created first: `add` inserts at the front and `update`
//! replaces in place.

use super::filter::{EntityFilter, FilteredView};
use crate::model::note::Note;
use crate::model::todo::Todo;
use crate::model::now_utc;
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashSet;

/// Record stored in a [`Collection`].
pub trait Entity: Clone {
    /// Collection label used in log events.
    const LABEL: &'static str;

    fn id(&self) -> &str;
    fn category(&self) -> &str;
    /// Case-insensitive text match; `needle` is already lowercased.
    fn matches_text(&self, needle: &str) -> bool;
    /// Completion flag, or `None` when the entity has no status.
    fn completion(&self) -> Option<bool> {
        None
    }
}

impl Entity for Note {
    const LABEL: &'static str = "notes";

    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn matches_text(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }
}

impl Entity for Todo {
    const LABEL: &'static str = "todos";

    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn matches_text(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle)
    }

    fn completion(&self) -> Option<bool> {
        Some(self.completed)
    }
}

/// Counters derived from todo state at query time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoCounts {
    pub active: usize,
    pub completed: usize,
    pub overdue: usize,
}

/// Ordered set of entities with unique ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection<T: Entity> {
    items: Vec<T>,
}

impl<T: Entity> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from display-ordered items.
    ///
    /// Later duplicates of an id are dropped so the uniqueness invariant
    /// holds for data coming from storage.
    pub fn from_items(items: Vec<T>) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.id().to_string()))
            .collect();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Inserts at the front. Returns `false` when the id already exists.
    pub fn add(&mut self, entity: T) -> bool {
        if self.contains(entity.id()) {
            debug!(
                "event=collection_add module=store status=duplicate collection={} id={}",
                T::LABEL,
                entity.id()
            );
            return false;
        }
        self.items.insert(0, entity);
        true
    }

    /// Replaces the entity with the same id in place. No-op when absent.
    pub fn update(&mut self, entity: T) -> bool {
        match self.items.iter_mut().find(|item| item.id() == entity.id()) {
            Some(slot) => {
                *slot = entity;
                true
            }
            None => {
                debug!(
                    "event=collection_update module=store status=noop collection={} id={}",
                    T::LABEL,
                    entity.id()
                );
                false
            }
        }
    }

    /// Removes the entity with `id`. No-op when absent.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        let removed = self.items.len() != before;
        if !removed {
            debug!(
                "event=collection_delete module=store status=noop collection={} id={id}",
                T::LABEL
            );
        }
        removed
    }

    /// Lazy read-only view over entities matching `filter`.
    pub fn filter<'a>(&'a self, filter: &'a EntityFilter) -> FilteredView<'a, T> {
        FilteredView::new(&self.items, filter)
    }

    /// Distinct category values in first-seen display order.
    pub fn derived_categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .map(Entity::category)
            .filter(|category| seen.insert(*category))
            .map(str::to_string)
            .collect()
    }
}

impl Collection<Todo> {
    /// Flips `completed` for `id`. No-op when absent.
    pub fn toggle_completed(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|todo| todo.id == id) {
            Some(todo) => {
                todo.completed = !todo.completed;
                true
            }
            None => {
                debug!("event=collection_toggle module=store status=noop collection=todos id={id}");
                false
            }
        }
    }

    pub fn counts(&self) -> TodoCounts {
        self.counts_at(now_utc())
    }

    /// Derives counters against an explicit reference instant.
    pub fn counts_at(&self, now: DateTime<Utc>) -> TodoCounts {
        self.items
            .iter()
            .fold(TodoCounts::default(), |mut counts, todo| {
                if todo.completed {
                    counts.completed += 1;
                } else {
                    counts.active += 1;
                }
                if todo.is_overdue(now) {
                    counts.overdue += 1;
                }
                counts
            })
    }
}

impl<'a, T: Entity> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::Collection;
    use crate::model::note::{Note, NoteDraft};
    use crate::model::todo::{Priority, Todo, TodoDraft};
    use chrono::{Duration, TimeZone, Utc};

    fn note(id: &str, title: &str, category: &str) -> Note {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
        Note::from_draft(id, &NoteDraft::new(title, "", category), now).unwrap()
    }

    fn todo(id: &str, text: &str) -> Todo {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
        Todo::from_draft(id, &TodoDraft::new(text, "Work", Priority::Medium), now).unwrap()
    }

    #[test]
    fn add_inserts_newest_first_and_rejects_duplicate_ids() {
        let mut notes = Collection::new();
        assert!(notes.add(note("a", "first", "x")));
        assert!(notes.add(note("b", "second", "x")));
        assert!(!notes.add(note("a", "dup", "x")));

        let ids: Vec<_> = notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(notes.get("a").unwrap().title, "first");
    }

    #[test]
    fn update_replaces_in_place_and_ignores_unknown_ids() {
        let mut notes = Collection::new();
        notes.add(note("a", "first", "x"));
        notes.add(note("b", "second", "x"));

        assert!(notes.update(note("a", "renamed", "y")));
        let ids: Vec<_> = notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(notes.get("a").unwrap().title, "renamed");

        let before = notes.clone();
        assert!(!notes.update(note("zzz", "ghost", "x")));
        assert_eq!(notes, before);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut notes = Collection::new();
        notes.add(note("a", "first", "x"));
        notes.add(note("b", "second", "x"));

        assert!(notes.delete("a"));
        let once = notes.clone();
        assert!(!notes.delete("a"));
        assert_eq!(notes, once);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn from_items_drops_repeated_ids() {
        let notes = Collection::from_items(vec![note("a", "1", "x"), note("a", "2", "x")]);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes.get("a").unwrap().title, "1");
    }

    #[test]
    fn derived_categories_are_distinct_in_first_seen_order() {
        let mut notes = Collection::new();
        notes.add(note("a", "1", "Work"));
        notes.add(note("b", "2", "Home"));
        notes.add(note("c", "3", "Work"));
        assert_eq!(notes.derived_categories(), vec!["Work", "Home"]);
    }

    #[test]
    fn toggle_twice_restores_flag_and_unknown_is_noop() {
        let mut todos = Collection::new();
        todos.add(todo("t", "call"));

        assert!(todos.toggle_completed("t"));
        assert!(todos.get("t").unwrap().completed);
        assert!(todos.toggle_completed("t"));
        assert!(!todos.get("t").unwrap().completed);
        assert!(!todos.toggle_completed("missing"));
    }

    #[test]
    fn counts_are_derived_from_current_state() {
        let now = Utc.with_ymd_and_hms(2025, 5, 2, 8, 0, 0).unwrap();
        let mut todos = Collection::new();
        let mut late = todo("late", "late");
        late.due_date = Some(now - Duration::hours(2));
        todos.add(late);
        todos.add(todo("open", "open"));
        let mut done = todo("done", "done");
        done.completed = true;
        done.due_date = Some(now - Duration::days(3));
        todos.add(done);

        let counts = todos.counts_at(now);
        assert_eq!(counts.active, 2);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.overdue, 1);
    }
}
