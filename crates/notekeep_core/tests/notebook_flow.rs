use chrono::{Duration, Timelike, Utc};
use notekeep_core::db::open_db;
use notekeep_core::{
    CollectionKind, Command, KvStore, MemoryKvStore, NoteDraft, Notebook, NotebookError, Outcome,
    Priority, SqliteKvStore, StatusFilter, Tab, TodoDraft, ValidationError,
};
use std::collections::HashSet;

fn notebook() -> Notebook<MemoryKvStore> {
    Notebook::open(MemoryKvStore::new())
}

#[test]
fn groceries_note_is_searchable_and_categorized() {
    let mut book = notebook();
    let note = book
        .create_note(&NoteDraft::new("Groceries", "milk, eggs", "Home"))
        .unwrap();
    book.create_note(&NoteDraft::new("Standup", "agenda", "Work"))
        .unwrap();

    assert!(book.note_categories().contains(&"Home".to_string()));

    book.set_search("milk");
    let visible = book.visible_notes().to_vec();
    assert_eq!(visible, vec![note]);
}

#[test]
fn overdue_rent_clears_after_toggle() {
    let mut book = notebook();
    let yesterday = Utc::now() - Duration::days(1);
    let todo = book
        .create_todo(&TodoDraft::new("Pay rent", "Home", Priority::High).with_due_date(yesterday))
        .unwrap();
    assert!(!todo.completed);
    assert_eq!(book.todo_counts().overdue, 1);

    assert!(book.toggle_todo(&todo.id).unwrap());
    let counts = book.todo_counts();
    assert_eq!(counts.overdue, 0);
    assert_eq!(counts.completed, 1);
    assert_eq!(counts.active, 0);
}

#[test]
fn newest_items_come_first() {
    let mut book = notebook();
    let first = book.create_note(&NoteDraft::new("one", "", "")).unwrap();
    let second = book.create_note(&NoteDraft::new("two", "", "")).unwrap();

    let ids: Vec<_> = book.notes().iter().map(|n| n.id.clone()).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[test]
fn created_ids_are_unique() {
    let mut book = notebook();
    let mut ids = HashSet::new();
    for i in 0..50 {
        let note = book
            .create_note(&NoteDraft::new(format!("n{i}"), "", ""))
            .unwrap();
        assert!(ids.insert(note.id));
    }
    assert_eq!(book.notes().len(), 50);
}

#[test]
fn invalid_drafts_are_rejected_without_writes() {
    let mut book = notebook();
    let err = book
        .create_note(&NoteDraft::new("   ", "content", "Home"))
        .unwrap_err();
    assert!(matches!(
        err,
        NotebookError::Validation(ValidationError::EmptyTitle)
    ));
    let err = book
        .create_todo(&TodoDraft::new("", "Home", Priority::Low))
        .unwrap_err();
    assert!(matches!(
        err,
        NotebookError::Validation(ValidationError::EmptyText)
    ));

    assert!(book.notes().is_empty());
    assert!(book.todos().is_empty());
    assert!(book.store().is_empty());
}

#[test]
fn unknown_ids_are_noops_and_write_nothing() {
    let mut book = notebook();
    assert!(!book.delete_note("missing").unwrap());
    assert!(!book.toggle_todo("missing").unwrap());
    assert!(!book
        .edit_todo("missing", &TodoDraft::new("x", "", Priority::Low))
        .unwrap());
    assert!(!book
        .edit_note("missing", &NoteDraft::new("x", "", ""))
        .unwrap());
    assert!(book.notes().is_empty());
    assert!(book.store().is_empty());
}

#[test]
fn edit_keeps_position_and_creation_time() {
    let mut book = notebook();
    let older = book.create_note(&NoteDraft::new("old", "", "A")).unwrap();
    let newer = book.create_note(&NoteDraft::new("new", "", "A")).unwrap();

    assert!(book
        .edit_note(&older.id, &NoteDraft::new("old v2", "more", "B"))
        .unwrap());

    let notes: Vec<_> = book.notes().iter().cloned().collect();
    assert_eq!(notes[0].id, newer.id);
    assert_eq!(notes[1].id, older.id);
    assert_eq!(notes[1].title, "old v2");
    assert_eq!(notes[1].created_at, older.created_at);
    assert!(notes[1].updated_at >= notes[1].created_at);
}

#[test]
fn edit_todo_keeps_completion() {
    let mut book = notebook();
    let todo = book
        .create_todo(&TodoDraft::new("draft", "", Priority::Medium))
        .unwrap();
    book.toggle_todo(&todo.id).unwrap();

    book.edit_todo(&todo.id, &TodoDraft::new("final", "Work", Priority::High))
        .unwrap();
    let edited = book.todos().get(&todo.id).unwrap();
    assert!(edited.completed);
    assert_eq!(edited.text, "final");
    assert_eq!(edited.priority, Priority::High);
}

#[test]
fn delete_twice_equals_once() {
    let mut book = notebook();
    let keep = book.create_todo(&TodoDraft::new("keep", "", Priority::Low)).unwrap();
    let gone = book.create_todo(&TodoDraft::new("gone", "", Priority::Low)).unwrap();

    assert!(book.delete_todo(&gone.id).unwrap());
    assert!(!book.delete_todo(&gone.id).unwrap());
    assert_eq!(book.todos().len(), 1);
    assert!(book.todos().contains(&keep.id));
}

#[test]
fn each_mutation_persists_the_full_collection() {
    let mut book = notebook();
    let todo = book
        .create_todo(&TodoDraft::new("persist me", "", Priority::Low))
        .unwrap();
    book.toggle_todo(&todo.id).unwrap();

    let reopened = Notebook::open(book.into_store());
    let loaded = reopened.todos().get(&todo.id).unwrap();
    assert!(loaded.completed);
    assert_eq!(loaded.created_at, todo.created_at);
}

#[test]
fn reopened_todo_equals_in_memory_record() {
    let mut book = notebook();
    let due = (Utc::now() - Duration::days(1))
        .with_nanosecond(123_456_789)
        .unwrap();
    let mut draft = TodoDraft::new("Pay rent", "Home", Priority::High);
    draft.due_date = Some(due);
    let todo = book.create_todo(&draft).unwrap();

    let reopened = Notebook::open(book.into_store());
    let loaded = reopened.todos().get(&todo.id).unwrap();
    assert_eq!(loaded, &todo);
    assert_eq!(loaded.due_date.unwrap().nanosecond(), 123_000_000);
}

#[test]
fn commands_drive_state_and_view() {
    let mut book = notebook();
    let outcome = book
        .apply(Command::CreateTodo(TodoDraft::new("a", "Work", Priority::Low)))
        .unwrap();
    let Outcome::Created { id } = outcome else {
        panic!("expected created outcome");
    };
    book.apply(Command::CreateTodo(TodoDraft::new("b", "Home", Priority::Low)))
        .unwrap();
    assert_eq!(
        book.apply(Command::ToggleTodo(id.clone())).unwrap(),
        Outcome::Applied
    );
    assert_eq!(
        book.apply(Command::DeleteTodo("nope".to_string())).unwrap(),
        Outcome::Unchanged
    );

    book.apply(Command::SelectTab(Tab::Todos)).unwrap();
    book.apply(Command::SetStatusFilter(StatusFilter::Completed))
        .unwrap();
    let done: Vec<_> = book.visible_todos().iter().map(|t| t.id.clone()).collect();
    assert_eq!(done, vec![id]);

    book.apply(Command::SetStatusFilter(StatusFilter::All)).unwrap();
    book.apply(Command::SelectCategory("Home".to_string())).unwrap();
    assert_eq!(book.visible_todos().count(), 1);

    book.apply(Command::SelectTab(Tab::Notes)).unwrap();
    assert_eq!(book.view().tab, Tab::Notes);
    assert!(book.view().filter.category.is_empty());
}

#[test]
fn corrupted_storage_opens_as_empty_notebook() {
    let mut store = MemoryKvStore::new();
    store
        .set(CollectionKind::Notes.storage_key(), "definitely not json")
        .unwrap();
    let mut book = Notebook::open(store);
    assert!(book.notes().is_empty());

    book.create_note(&NoteDraft::new("fresh", "", "")).unwrap();
    assert_eq!(book.notes().len(), 1);
}

#[test]
fn sqlite_notebook_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notekeep.sqlite3");

    let note_id = {
        let conn = open_db(&path).unwrap();
        let mut book = Notebook::open(SqliteKvStore::try_new(&conn).unwrap());
        let note = book
            .create_note(&NoteDraft::new("Groceries", "milk", "Home"))
            .unwrap();
        note.id
    };

    let conn = open_db(&path).unwrap();
    let book = Notebook::open(SqliteKvStore::try_new(&conn).unwrap());
    let note = book.notes().get(&note_id).unwrap();
    assert_eq!(note.title, "Groceries");
    assert_eq!(book.note_categories(), vec!["Home"]);
}

#[test]
fn export_includes_everything() {
    let mut book = notebook();
    book.create_note(&NoteDraft::new("n", "", "")).unwrap();
    book.create_todo(&TodoDraft::new("t", "", Priority::Medium))
        .unwrap();

    let snapshot = book.export_snapshot().unwrap();
    assert!(snapshot.file_name.starts_with("notes-todos-backup-"));
    assert!(snapshot.file_name.ends_with(".json"));
    let doc: serde_json::Value = serde_json::from_str(&snapshot.contents).unwrap();
    assert_eq!(doc["notes"].as_array().unwrap().len(), 1);
    assert_eq!(doc["todos"].as_array().unwrap().len(), 1);
    assert!(doc["exportDate"].is_string());
}
