//! Core domain logic for NoteVault.
//! This crate is the single source of truth for note history invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod history;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CoreConfig;
pub use history::concurrency::{check_edit_token, InvalidEditToken, LastKnownUpdate};
pub use history::engine::{
    apply_update, has_real_changes, next_edit_token, redo, undo, Applied, NoteUpdate,
};
pub use history::NoteError;
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::note::{Note, NoteHistory, NoteId, NoteState};
pub use model::snapshot::{HistoryStack, Snapshot, MAX_HISTORY};
pub use repo::note_repo::{
    NoteListQuery, NoteRepository, RepoError, RepoResult, SqliteNoteRepository, WriteGuard,
};
pub use service::note_service::{NoteService, NoteServiceError, NotesPage, ServiceResult};
pub use service::validation::{NewNote, NotePatch, ValidationError};
pub use session::{
    ResolvedSession, SessionCookie, SessionId, SessionProvider, UuidSessionProvider,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
