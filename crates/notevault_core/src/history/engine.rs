//! Pure undo/redo history engine.
//!
//! # Responsibility
//! - Turn an edit into a new note state plus version snapshots.
//! - Move state between the undo (`versions`) and redo stacks.
//!
//! # Invariants
//! - Inputs are never mutated; every transition returns a new `Note`.
//! - No-op edits leave stacks and `edited_at` untouched.
//! - A real edit clears the redo stack; undo/redo never clear either stack.
//! - `is_deleted`/`deleted_at` are never touched here.
//! - Every transition strictly advances `edited_at`, even when the clock
//!   repeats or steps backwards.

use crate::history::NoteError;
use crate::model::note::Note;

/// Field-level edit. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NoteUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: None,
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(content.into()),
        }
    }

    pub fn both(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
        }
    }
}

/// Result of `apply_update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub modified: bool,
    pub note: Note,
}

/// Returns whether `update` would change the note's title or content.
pub fn has_real_changes(current: &Note, update: &NoteUpdate) -> bool {
    let title_changed = update
        .title
        .as_deref()
        .is_some_and(|title| title != current.title);
    let content_changed = update
        .content
        .as_deref()
        .is_some_and(|content| content != current.content);
    title_changed || content_changed
}

/// Next `edited_at` value: `now`, or one past `previous` when the clock
/// has not moved forward.
pub fn next_edit_token(previous: i64, now: i64) -> i64 {
    now.max(previous.saturating_add(1))
}

/// Applies an edit, recording the pre-edit state on the undo stack.
///
/// The first edit of a note records the pre-edit state twice, so the
/// creation state stays reachable through two undos.
pub fn apply_update(note: &Note, update: &NoteUpdate, now: i64) -> Applied {
    if !has_real_changes(note, update) {
        return Applied {
            modified: false,
            note: note.clone(),
        };
    }

    let mut next = note.clone();
    let before = note.snapshot(now);
    if next.versions.is_empty() {
        next.versions.push(before.clone());
    }
    next.versions.push(before);

    if let Some(title) = update.title.as_ref() {
        next.title = title.clone();
    }
    if let Some(content) = update.content.as_ref() {
        next.content = content.clone();
    }

    next.redo_stack.clear();
    next.edited_at = next_edit_token(note.edited_at, now);

    Applied {
        modified: true,
        note: next,
    }
}

/// Restores the newest undo snapshot, saving current state for redo.
pub fn undo(note: &Note, now: i64) -> Result<Note, NoteError> {
    if note.versions.is_empty() {
        return Err(NoteError::NoHistory);
    }

    let mut next = note.clone();
    next.redo_stack.push(note.snapshot(now));
    let restored = next.versions.pop().ok_or(NoteError::NoHistory)?;
    next.title = restored.title;
    next.content = restored.content;
    next.edited_at = next_edit_token(note.edited_at, now);
    Ok(next)
}

/// Re-applies the newest redo snapshot, saving current state for undo.
pub fn redo(note: &Note, now: i64) -> Result<Note, NoteError> {
    if note.redo_stack.is_empty() {
        return Err(NoteError::NoRedo);
    }

    let mut next = note.clone();
    next.versions.push(note.snapshot(now));
    let restored = next.redo_stack.pop().ok_or(NoteError::NoRedo)?;
    next.title = restored.title;
    next.content = restored.content;
    next.edited_at = next_edit_token(note.edited_at, now);
    Ok(next)
}
