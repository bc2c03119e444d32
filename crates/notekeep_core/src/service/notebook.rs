//! Application controller.
//!
//! # Responsibility
//! - Own both collections, the persistence adapter and the view selections.
//! - Validate drafts, stamp ids/timestamps, mutate, then persist.
//!
//! # Invariants
//! - Every applied mutation writes the full mutated collection before the
//!   call returns; no-ops write nothing.
//! - Rejected drafts never touch the collections or storage.
//! - Selecting a tab clears the selected category.

use crate::model::note::{Note, NoteDraft};
use crate::model::now_utc;
use crate::model::todo::{Todo, TodoDraft};
use crate::model::ValidationError;
use crate::persist::export::{export_snapshot, ExportError, ExportSnapshot};
use crate::persist::id::generate_id;
use crate::persist::{KvStore, Persistence, Record, StoreError};
use crate::store::{Collection, Entity, EntityFilter, FilteredView, StatusFilter, TodoCounts};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NotebookResult<T> = Result<T, NotebookError>;

#[derive(Debug)]
pub enum NotebookError {
    /// Draft rejected before reaching the store ("cannot save").
    Validation(ValidationError),
    /// In-memory state changed but the snapshot write failed.
    Storage(StoreError),
    /// A freshly generated id was already taken; nothing was inserted.
    DuplicateId(String),
}

impl Display for NotebookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "cannot save: {err}"),
            Self::Storage(err) => write!(f, "failed to persist: {err}"),
            Self::DuplicateId(id) => write!(f, "id `{id}` is already in use"),
        }
    }
}

impl Error for NotebookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::DuplicateId(_) => None,
        }
    }
}

impl From<ValidationError> for NotebookError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for NotebookError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Notes,
    Todos,
}

/// Transient UI selections. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub tab: Tab,
    pub filter: EntityFilter,
}

/// Explicit request from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateNote(NoteDraft),
    EditNote { id: String, draft: NoteDraft },
    DeleteNote(String),
    CreateTodo(TodoDraft),
    EditTodo { id: String, draft: TodoDraft },
    ToggleTodo(String),
    DeleteTodo(String),
    SelectTab(Tab),
    SetSearch(String),
    SelectCategory(String),
    SetStatusFilter(StatusFilter),
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created { id: String },
    Applied,
    /// Unknown id; nothing changed and nothing was written.
    Unchanged,
}

impl From<bool> for Outcome {
    fn from(changed: bool) -> Self {
        if changed {
            Self::Applied
        } else {
            Self::Unchanged
        }
    }
}

/// Single owner of application state.
pub struct Notebook<S: KvStore> {
    notes: Collection<Note>,
    todos: Collection<Todo>,
    persistence: Persistence<S>,
    view: ViewState,
}

impl<S: KvStore> Notebook<S> {
    /// Loads both collections from `store`; bad or missing data yields empty
    /// collections.
    pub fn open(store: S) -> Self {
        let persistence = Persistence::new(store);
        let notes = Collection::from_items(persistence.load::<Note>());
        let todos = Collection::from_items(persistence.load::<Todo>());
        info!(
            "event=notebook_open module=service status=ok notes={} todos={}",
            notes.len(),
            todos.len()
        );
        Self {
            notes,
            todos,
            persistence,
            view: ViewState::default(),
        }
    }

    pub fn notes(&self) -> &Collection<Note> {
        &self.notes
    }

    pub fn todos(&self) -> &Collection<Todo> {
        &self.todos
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    pub fn into_store(self) -> S {
        self.persistence.into_store()
    }

    /// Dispatches one presentation-layer command.
    pub fn apply(&mut self, command: Command) -> NotebookResult<Outcome> {
        match command {
            Command::CreateNote(draft) => {
                let note = self.create_note(&draft)?;
                Ok(Outcome::Created { id: note.id })
            }
            Command::EditNote { id, draft } => self.edit_note(&id, &draft).map(Outcome::from),
            Command::DeleteNote(id) => self.delete_note(&id).map(Outcome::from),
            Command::CreateTodo(draft) => {
                let todo = self.create_todo(&draft)?;
                Ok(Outcome::Created { id: todo.id })
            }
            Command::EditTodo { id, draft } => self.edit_todo(&id, &draft).map(Outcome::from),
            Command::ToggleTodo(id) => self.toggle_todo(&id).map(Outcome::from),
            Command::DeleteTodo(id) => self.delete_todo(&id).map(Outcome::from),
            Command::SelectTab(tab) => {
                self.select_tab(tab);
                Ok(Outcome::Applied)
            }
            Command::SetSearch(query) => {
                self.set_search(query);
                Ok(Outcome::Applied)
            }
            Command::SelectCategory(category) => {
                self.select_category(category);
                Ok(Outcome::Applied)
            }
            Command::SetStatusFilter(status) => {
                self.set_status_filter(status);
                Ok(Outcome::Applied)
            }
        }
    }

    pub fn create_note(&mut self, draft: &NoteDraft) -> NotebookResult<Note> {
        let id = unused_id(&self.notes, generate_id);
        let note = Note::from_draft(id, draft, now_utc())?;
        insert_new(&mut self.notes, note.clone())?;
        persist(&mut self.persistence, &self.notes)?;
        Ok(note)
    }

    /// Replaces the note `id` with the edited draft. `Ok(false)` when absent.
    pub fn edit_note(&mut self, id: &str, draft: &NoteDraft) -> NotebookResult<bool> {
        let Some(current) = self.notes.get(id) else {
            draft.normalized()?;
            return Ok(false);
        };
        let revised = current.revised(draft, now_utc())?;
        self.notes.update(revised);
        persist(&mut self.persistence, &self.notes)?;
        Ok(true)
    }

    pub fn delete_note(&mut self, id: &str) -> NotebookResult<bool> {
        if !self.notes.delete(id) {
            return Ok(false);
        }
        persist(&mut self.persistence, &self.notes)?;
        Ok(true)
    }

    pub fn create_todo(&mut self, draft: &TodoDraft) -> NotebookResult<Todo> {
        let id = unused_id(&self.todos, generate_id);
        let todo = Todo::from_draft(id, draft, now_utc())?;
        insert_new(&mut self.todos, todo.clone())?;
        persist(&mut self.persistence, &self.todos)?;
        Ok(todo)
    }

    /// Replaces the todo `id` with the edited draft. `Ok(false)` when absent.
    pub fn edit_todo(&mut self, id: &str, draft: &TodoDraft) -> NotebookResult<bool> {
        let Some(current) = self.todos.get(id) else {
            draft.normalized()?;
            return Ok(false);
        };
        let revised = current.revised(draft)?;
        self.todos.update(revised);
        persist(&mut self.persistence, &self.todos)?;
        Ok(true)
    }

    pub fn toggle_todo(&mut self, id: &str) -> NotebookResult<bool> {
        if !self.todos.toggle_completed(id) {
            return Ok(false);
        }
        persist(&mut self.persistence, &self.todos)?;
        Ok(true)
    }

    pub fn delete_todo(&mut self, id: &str) -> NotebookResult<bool> {
        if !self.todos.delete(id) {
            return Ok(false);
        }
        persist(&mut self.persistence, &self.todos)?;
        Ok(true)
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.view.tab = tab;
        self.view.filter.category.clear();
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.view.filter.search = query.into();
    }

    /// Empty string clears the category selection.
    pub fn select_category(&mut self, category: impl Into<String>) {
        self.view.filter.category = category.into();
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.view.filter.status = status;
    }

    /// Notes matching the current search and category.
    pub fn visible_notes(&self) -> FilteredView<'_, Note> {
        self.notes.filter(&self.view.filter)
    }

    /// Todos matching the current search, category and status.
    pub fn visible_todos(&self) -> FilteredView<'_, Todo> {
        self.todos.filter(&self.view.filter)
    }

    pub fn note_categories(&self) -> Vec<String> {
        self.notes.derived_categories()
    }

    pub fn todo_categories(&self) -> Vec<String> {
        self.todos.derived_categories()
    }

    pub fn todo_counts(&self) -> TodoCounts {
        self.todos.counts()
    }

    pub fn export_snapshot(&self) -> Result<ExportSnapshot, ExportError> {
        export_snapshot(self.notes.as_slice(), self.todos.as_slice())
    }
}

/// Draws ids from `next` until one is free in `collection`.
///
/// Loaded data may carry ids minted by another process, so the clock part
/// alone does not rule out a clash.
fn unused_id<T: Entity>(collection: &Collection<T>, mut next: impl FnMut() -> String) -> String {
    loop {
        let id = next();
        if !collection.contains(&id) {
            return id;
        }
        warn!(
            "event=id_collision module=service status=retry collection={} id={id}",
            T::LABEL
        );
    }
}

fn insert_new<T: Entity>(collection: &mut Collection<T>, entity: T) -> NotebookResult<()> {
    let id = entity.id().to_string();
    if collection.add(entity) {
        Ok(())
    } else {
        Err(NotebookError::DuplicateId(id))
    }
}

fn persist<S: KvStore, T: Record + Entity>(
    persistence: &mut Persistence<S>,
    collection: &Collection<T>,
) -> NotebookResult<()> {
    persistence.save(collection.as_slice())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{insert_new, unused_id, NotebookError};
    use crate::model::note::{Note, NoteDraft};
    use crate::store::Collection;
    use chrono::{TimeZone, Utc};

    fn note(id: &str) -> Note {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
        Note::from_draft(id, &NoteDraft::new("t", "", ""), now).unwrap()
    }

    #[test]
    fn unused_id_skips_ids_already_present() {
        let mut notes = Collection::new();
        notes.add(note("taken"));

        let mut candidates = ["taken", "taken", "fresh"].into_iter().map(str::to_string);
        let id = unused_id(&notes, || candidates.next().unwrap());
        assert_eq!(id, "fresh");
    }

    #[test]
    fn insert_new_reports_collision_without_touching_collection() {
        let mut notes = Collection::new();
        notes.add(note("a"));
        let before = notes.clone();

        let err = insert_new(&mut notes, note("a")).unwrap_err();
        assert!(matches!(err, NotebookError::DuplicateId(id) if id == "a"));
        assert_eq!(notes, before);

        insert_new(&mut notes, note("b")).unwrap();
        assert_eq!(notes.len(), 2);
    }
}
