//! Note version/history rules.
//!
//! # Responsibility
//! - Pure state transitions for edits, undo and redo (`engine`).
//! - Optimistic edit-token comparison (`concurrency`).
//! - Soft-delete state machine (`lifecycle`).
//! - The closed set of domain outcomes surfaced to callers (`NoteError`).
//!
//! # Invariants
//! - Nothing in this module performs I/O or reads the wall clock; callers
//!   pass `now` explicitly.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod concurrency;
pub mod engine;
pub mod lifecycle;

/// Named, recoverable outcomes of note operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteError {
    /// Note absent, owned by another session, or not active.
    NoteNotFound,
    /// Note absent, owned by another session, or not trashed.
    NoteNotInTrash,
    /// Client edit token is stale.
    Conflict,
    /// Undo requested with an empty undo stack.
    NoHistory,
    /// Redo requested with an empty redo stack.
    NoRedo,
}

impl NoteError {
    /// Stable wire code.
    pub fn code(self) -> &'static str {
        match self {
            Self::NoteNotFound => "NOTE_NOT_FOUND",
            Self::NoteNotInTrash => "NOTE_NOT_IN_TRASH",
            Self::Conflict => "CONFLICT",
            Self::NoHistory => "NO_HISTORY",
            Self::NoRedo => "NO_REDO",
        }
    }

    /// Suggested HTTP status for a transport layer.
    pub fn status_hint(self) -> u16 {
        match self {
            Self::NoteNotFound | Self::NoteNotInTrash => 404,
            Self::Conflict => 409,
            Self::NoHistory | Self::NoRedo => 400,
        }
    }
}

impl Display for NoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::NoteNotFound => "note not found",
            Self::NoteNotInTrash => "note not found in trash",
            Self::Conflict => "note was modified by another session",
            Self::NoHistory => "no history available to undo",
            Self::NoRedo => "no actions available to redo",
        };
        f.write_str(message)
    }
}

impl Error for NoteError {}
