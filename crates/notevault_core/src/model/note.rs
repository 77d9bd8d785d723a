//! Note aggregate model.
//!
//! # Responsibility
//! - Define the versioned note record mutated by history and lifecycle
//!   transitions.
//! - Expose lifecycle state derived from the soft-delete pair.
//!
//! # Invariants
//! - `id` and `owner` never change after creation.
//! - `deleted_at.is_some()` iff `is_deleted`.
//! - `edited_at` is the optimistic concurrency token.

use crate::model::snapshot::{HistoryStack, Snapshot};
use crate::session::SessionId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a note.
pub type NoteId = Uuid;

/// Lifecycle state derived from `is_deleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteState {
    Active,
    Trashed,
}

/// Versioned note aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    /// Owning session; every query is scoped by it.
    pub owner: SessionId,
    pub title: String,
    pub content: String,
    pub is_deleted: bool,
    /// Unix epoch milliseconds. Set only while trashed.
    pub deleted_at: Option<i64>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds of the last title/content mutation.
    pub edited_at: i64,
    /// Undo stack.
    pub versions: HistoryStack,
    pub redo_stack: HistoryStack,
}

impl Note {
    /// Creates an active note with a generated id and empty history.
    pub fn new(
        owner: SessionId,
        title: impl Into<String>,
        content: impl Into<String>,
        now: i64,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), owner, title, content, now)
    }

    /// Creates an active note with a caller-provided id.
    pub fn with_id(
        id: NoteId,
        owner: SessionId,
        title: impl Into<String>,
        content: impl Into<String>,
        now: i64,
    ) -> Self {
        Self {
            id,
            owner,
            title: title.into(),
            content: content.into(),
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            edited_at: now,
            versions: HistoryStack::new(),
            redo_stack: HistoryStack::new(),
        }
    }

    pub fn state(&self) -> NoteState {
        if self.is_deleted {
            NoteState::Trashed
        } else {
            NoteState::Active
        }
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    /// Captures current title/content as a snapshot stamped with `now`.
    pub fn snapshot(&self, now: i64) -> Snapshot {
        Snapshot::new(self.title.clone(), self.content.clone(), now)
    }

    /// Returns whether the soft-delete pair is consistent.
    pub fn deletion_is_consistent(&self) -> bool {
        self.is_deleted == self.deleted_at.is_some()
    }
}

/// Read-only history view returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteHistory {
    pub versions: Vec<Snapshot>,
    pub redo_stack: Vec<Snapshot>,
}

impl From<&Note> for NoteHistory {
    fn from(note: &Note) -> Self {
        Self {
            versions: note.versions.to_vec(),
            redo_stack: note.redo_stack.to_vec(),
        }
    }
}
