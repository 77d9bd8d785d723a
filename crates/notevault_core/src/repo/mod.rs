//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the persistence contract the note service depends on.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Every repository API takes the owning session and filters by it.
//! - Lost-update races surface as `RepoError::Conflict`, never as silent
//!   overwrites.

pub mod note_repo;
