//! Soft-delete lifecycle: Active <-> Trashed -> purged.
//!
//! # Invariants
//! - `deleted_at` is set exactly when entering Trashed and cleared on restore.
//! - History stacks and `edited_at` are never touched.
//! - Only a Trashed note may be permanently deleted.

use crate::history::NoteError;
use crate::model::note::{Note, NoteState};

/// Active -> Trashed.
pub fn move_to_trash(note: &Note, now: i64) -> Result<Note, NoteError> {
    if note.state() != NoteState::Active {
        return Err(NoteError::NoteNotFound);
    }
    let mut next = note.clone();
    next.is_deleted = true;
    next.deleted_at = Some(now);
    Ok(next)
}

/// Trashed -> Active.
pub fn restore(note: &Note) -> Result<Note, NoteError> {
    if note.state() != NoteState::Trashed {
        return Err(NoteError::NoteNotInTrash);
    }
    let mut next = note.clone();
    next.is_deleted = false;
    next.deleted_at = None;
    Ok(next)
}

/// Checks that `note` sits in the trash and may be purged.
pub fn ensure_permanently_deletable(note: &Note) -> Result<(), NoteError> {
    match note.state() {
        NoteState::Trashed => Ok(()),
        NoteState::Active => Err(NoteError::NoteNotInTrash),
    }
}

#[cfg(test)]
mod tests {
    use super::{ensure_permanently_deletable, move_to_trash, restore};
    use crate::history::engine::{apply_update, NoteUpdate};
    use crate::history::NoteError;
    use crate::model::note::{Note, NoteState};
    use crate::session::SessionId;

    #[test]
    fn trash_then_restore_keeps_deleted_pair_consistent() {
        let note = Note::new(SessionId::generate(), "T", "C", 10);
        let trashed = move_to_trash(&note, 20).expect("active note can be trashed");
        assert_eq!(trashed.state(), NoteState::Trashed);
        assert_eq!(trashed.deleted_at, Some(20));
        assert!(trashed.deletion_is_consistent());

        let restored = restore(&trashed).expect("trashed note can be restored");
        assert_eq!(restored.state(), NoteState::Active);
        assert_eq!(restored.deleted_at, None);
        assert!(restored.deletion_is_consistent());
    }

    #[test]
    fn trashing_twice_is_not_found() {
        let note = Note::new(SessionId::generate(), "T", "C", 10);
        let trashed = move_to_trash(&note, 20).expect("first trash succeeds");
        assert_eq!(move_to_trash(&trashed, 30), Err(NoteError::NoteNotFound));
    }

    #[test]
    fn restore_and_purge_require_trash() {
        let note = Note::new(SessionId::generate(), "T", "C", 10);
        assert_eq!(restore(&note), Err(NoteError::NoteNotInTrash));
        assert_eq!(
            ensure_permanently_deletable(&note),
            Err(NoteError::NoteNotInTrash)
        );
    }

    #[test]
    fn transitions_leave_history_and_edit_token_alone() {
        let note = Note::new(SessionId::generate(), "T", "C", 10);
        let edited = apply_update(&note, &NoteUpdate::title("T2"), 15).note;

        let trashed = move_to_trash(&edited, 20).expect("trash");
        let restored = restore(&trashed).expect("restore");
        assert_eq!(restored.edited_at, 15);
        assert_eq!(restored.versions, edited.versions);
        assert_eq!(restored.redo_stack, edited.redo_stack);
    }
}
