use notevault_core::db::open_db_in_memory;
use notevault_core::{
    ManualClock, NoteError, NotePatch, NoteService, NoteServiceError, NoteState, SessionId,
    SqliteNoteRepository,
};
use rusqlite::{params, Connection};

const T0: i64 = 1_700_000_000_000;

fn service(conn: &mut Connection) -> NoteService<SqliteNoteRepository<'_>, ManualClock> {
    let repo = SqliteNoteRepository::try_new(conn).unwrap();
    NoteService::new(repo, ManualClock::new(T0, 10))
}

fn note_error(err: NoteServiceError) -> NoteError {
    err.note_error()
        .unwrap_or_else(|| panic!("expected domain error, got {err}"))
}

#[test]
fn trash_restore_cycle_keeps_deleted_pair_consistent() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let owner = SessionId::generate();
    let created = service.create_note(&owner, Some("Note"), Some("x")).unwrap();

    let trashed = service.move_to_trash(created.id, &owner).unwrap();
    assert_eq!(trashed.state(), NoteState::Trashed);
    assert!(trashed.deleted_at.is_some());
    assert_eq!(trashed.edited_at, created.edited_at);

    let restored = service.restore_from_trash(created.id, &owner).unwrap();
    assert_eq!(restored.state(), NoteState::Active);
    assert_eq!(restored.deleted_at, None);
    assert_eq!(restored.edited_at, created.edited_at);
}

#[test]
fn trashing_twice_reports_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let owner = SessionId::generate();
    let created = service.create_note(&owner, Some("Note"), None).unwrap();

    service.move_to_trash(created.id, &owner).unwrap();
    let err = service.move_to_trash(created.id, &owner).unwrap_err();
    assert_eq!(note_error(err), NoteError::NoteNotFound);
}

#[test]
fn active_note_cannot_be_purged_or_restored() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let owner = SessionId::generate();
    let created = service.create_note(&owner, Some("Note"), None).unwrap();

    let purge = service.delete_permanently(created.id, &owner).unwrap_err();
    assert_eq!(note_error(purge), NoteError::NoteNotInTrash);
    let restore = service.restore_from_trash(created.id, &owner).unwrap_err();
    assert_eq!(note_error(restore), NoteError::NoteNotInTrash);

    assert!(service.get_note(created.id, &owner).is_ok());
}

#[test]
fn trashed_note_is_hidden_from_edits_and_history() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let owner = SessionId::generate();
    let created = service.create_note(&owner, Some("Note"), None).unwrap();
    service.move_to_trash(created.id, &owner).unwrap();

    let patch = NotePatch {
        title: Some("Edited".to_string()),
        ..NotePatch::default()
    };
    let update = service.update_note(created.id, &owner, patch).unwrap_err();
    assert_eq!(note_error(update), NoteError::NoteNotFound);
    let undo = service.undo_note(created.id, &owner).unwrap_err();
    assert_eq!(note_error(undo), NoteError::NoteNotFound);
    let history = service.get_history(created.id, &owner).unwrap_err();
    assert_eq!(note_error(history), NoteError::NoteNotFound);
}

#[test]
fn history_survives_trash_and_restore() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let owner = SessionId::generate();
    let created = service.create_note(&owner, Some("A"), None).unwrap();
    let patch = NotePatch {
        title: Some("B".to_string()),
        ..NotePatch::default()
    };
    service.update_note(created.id, &owner, patch).unwrap();
    service.undo_note(created.id, &owner).unwrap();
    let before = service.get_history(created.id, &owner).unwrap();

    service.move_to_trash(created.id, &owner).unwrap();
    service.restore_from_trash(created.id, &owner).unwrap();

    assert_eq!(service.get_history(created.id, &owner).unwrap(), before);
}

#[test]
fn purge_removes_note_and_history_rows() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = SessionId::generate();
    let note_id = {
        let mut service = service(&mut conn);
        let created = service.create_note(&owner, Some("A"), None).unwrap();
        let patch = NotePatch {
            title: Some("B".to_string()),
            ..NotePatch::default()
        };
        service.update_note(created.id, &owner, patch).unwrap();
        service.move_to_trash(created.id, &owner).unwrap();
        service.delete_permanently(created.id, &owner).unwrap();

        let again = service.delete_permanently(created.id, &owner).unwrap_err();
        assert_eq!(note_error(again), NoteError::NoteNotInTrash);
        created.id
    };

    let history_rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM note_history WHERE note_uuid = ?1;",
            params![note_id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(history_rows, 0);
}

#[test]
fn lifecycle_is_scoped_to_owner() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let owner = SessionId::generate();
    let stranger = SessionId::generate();
    let created = service.create_note(&owner, Some("Note"), None).unwrap();

    let trash = service.move_to_trash(created.id, &stranger).unwrap_err();
    assert_eq!(note_error(trash), NoteError::NoteNotFound);

    service.move_to_trash(created.id, &owner).unwrap();
    let restore = service.restore_from_trash(created.id, &stranger).unwrap_err();
    assert_eq!(note_error(restore), NoteError::NoteNotInTrash);
    let purge = service.delete_permanently(created.id, &stranger).unwrap_err();
    assert_eq!(note_error(purge), NoteError::NoteNotInTrash);
}

#[test]
fn listings_split_active_and_trash_with_pagination() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let owner = SessionId::generate();
    let other = SessionId::generate();

    let mut ids = Vec::new();
    for index in 0..12 {
        ids.push(
            service
                .create_note(&owner, Some(format!("Note {index}").as_str()), None)
                .unwrap()
                .id,
        );
    }
    service.create_note(&other, Some("Not mine"), None).unwrap();
    service.move_to_trash(ids[0], &owner).unwrap();
    service.move_to_trash(ids[1], &owner).unwrap();

    let first_page = service.list_active(&owner, None, 0).unwrap();
    assert_eq!(first_page.applied_limit, 10);
    assert_eq!(first_page.total, 10);
    assert_eq!(first_page.items.len(), 10);
    // Newest first.
    assert_eq!(first_page.items[0].id, ids[11]);

    let second_page = service.list_active(&owner, Some(4), 8).unwrap();
    assert_eq!(second_page.items.len(), 2);

    let trash = service.list_trash(&owner, Some(500), 0).unwrap();
    assert_eq!(trash.applied_limit, 50);
    assert_eq!(trash.total, 2);
    // Most recently trashed first.
    assert_eq!(trash.items[0].id, ids[1]);
    assert!(trash.items.iter().all(|note| note.is_deleted));
}

#[test]
fn restored_note_cannot_be_purged_or_restored_again() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let owner = SessionId::generate();
    let created = service.create_note(&owner, Some("Note"), None).unwrap();
    service.move_to_trash(created.id, &owner).unwrap();
    service.restore_from_trash(created.id, &owner).unwrap();

    let purge = service.delete_permanently(created.id, &owner).unwrap_err();
    assert_eq!(note_error(purge), NoteError::NoteNotInTrash);
    let restore = service.restore_from_trash(created.id, &owner).unwrap_err();
    assert_eq!(note_error(restore), NoteError::NoteNotInTrash);

    let stored = service.get_note(created.id, &owner).unwrap();
    assert_eq!(stored.state(), NoteState::Active);
}
