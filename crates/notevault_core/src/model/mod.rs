//! Domain model for versioned notes.
//!
//! # Responsibility
//! - Define the note aggregate and its history snapshots.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId` and owned by one session.
//! - Deletion is a soft-delete flag until the note is purged from trash.
//! - History stacks are bounded by `MAX_HISTORY`.

pub mod note;
pub mod snapshot;
