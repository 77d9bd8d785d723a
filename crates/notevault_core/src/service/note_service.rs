//! Note use-case service.
//!
//! # Responsibility
//! - Orchestrate load -> guard -> transform -> persist for every note
//!   operation.
//! - Apply sanitization/validation before the history engine sees input.
//! - Translate persistence outcomes into the closed `NoteError` set.
//!
//! # Invariants
//! - Every lookup is scoped by the caller's session.
//! - No-op edits persist nothing and never raise `Conflict`.
//! - Writes are conditional on the loaded edit state, so a racing writer
//!   surfaces as `Conflict` instead of a lost update.
//! - Logs carry ids and a session prefix only, never note text.

use crate::clock::Clock;
use crate::history::concurrency::check_edit_token;
use crate::history::engine::{self, has_real_changes};
use crate::history::{lifecycle, NoteError};
use crate::model::note::{Note, NoteHistory, NoteId};
use crate::repo::note_repo::{
    normalize_note_limit, NoteListQuery, NoteRepository, RepoError, WriteGuard,
};
use crate::service::validation::{
    sanitize_create, sanitize_patch, validate_create, validate_patch, NotePatch, ValidationError,
};
use crate::session::SessionId;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Expected domain outcome.
    Note(NoteError),
    /// Input rejected before reaching the domain.
    Validation(ValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl NoteServiceError {
    /// Stable code for transport mapping.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Note(err) => err.code(),
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Repo(_) | Self::InconsistentState(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the domain outcome, if this is one.
    pub fn note_error(&self) -> Option<NoteError> {
        match self {
            Self::Note(err) => Some(*err),
            _ => None,
        }
    }
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Note(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Note(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Conflict(_) => Self::Note(NoteError::Conflict),
            other => Self::Repo(other),
        }
    }
}

impl From<NoteError> for NoteServiceError {
    fn from(value: NoteError) -> Self {
        Self::Note(value)
    }
}

impl From<ValidationError> for NoteServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type ServiceResult<T> = Result<T, NoteServiceError>;

/// One page of a note listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesPage {
    pub items: Vec<Note>,
    /// Total matching notes for the session, ignoring pagination.
    pub total: u64,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
    pub offset: u32,
}

/// Note service over injected repository and clock collaborators.
pub struct NoteService<R: NoteRepository, C: Clock> {
    repo: R,
    clock: C,
}

impl<R: NoteRepository, C: Clock> NoteService<R, C> {
    pub fn new(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Creates an active note with empty history.
    pub fn create_note(
        &mut self,
        owner: &SessionId,
        title: Option<&str>,
        content: Option<&str>,
    ) -> ServiceResult<Note> {
        let input = sanitize_create(title, content);
        validate_create(&input)?;

        let note = Note::new(owner.clone(), input.title, input.content, self.clock.now_ms());
        self.repo.create_note(&note)?;
        info!(
            "event=note_create module=service status=ok note_id={} session={}",
            note.id,
            owner.log_prefix()
        );

        self.repo
            .find_active_by_id(note.id, owner)?
            .ok_or(NoteServiceError::InconsistentState(
                "created note not found in read-back",
            ))
    }

    /// Loads one active note.
    pub fn get_note(&self, id: NoteId, owner: &SessionId) -> ServiceResult<Note> {
        self.load_active(id, owner)
    }

    /// Lists active notes, newest first.
    pub fn list_active(
        &self,
        owner: &SessionId,
        limit: Option<u32>,
        offset: u32,
    ) -> ServiceResult<NotesPage> {
        self.list(owner, false, limit, offset)
    }

    /// Lists trashed notes, most recently trashed first.
    pub fn list_trash(
        &self,
        owner: &SessionId,
        limit: Option<u32>,
        offset: u32,
    ) -> ServiceResult<NotesPage> {
        self.list(owner, true, limit, offset)
    }

    /// Edits title and/or content, recording history.
    ///
    /// The edit token in `patch` is only checked when the edit would change
    /// something; a no-op returns the stored note as is.
    pub fn update_note(
        &mut self,
        id: NoteId,
        owner: &SessionId,
        patch: NotePatch,
    ) -> ServiceResult<Note> {
        let patch = sanitize_patch(patch);
        validate_patch(&patch)?;

        let note = self.load_active(id, owner)?;
        let update = patch.to_update();
        if !has_real_changes(&note, &update) {
            debug!("event=note_update module=service status=noop note_id={id}");
            return Ok(note);
        }

        if let Err(err) = check_edit_token(patch.last_known_update, note.edited_at) {
            warn!(
                "event=note_update module=service status=conflict note_id={id} session={}",
                owner.log_prefix()
            );
            return Err(err.into());
        }

        let applied = engine::apply_update(&note, &update, self.clock.now_ms());
        self.persist(&note, applied.note, "note_update")
    }

    /// Reverts to the newest undo snapshot.
    pub fn undo_note(&mut self, id: NoteId, owner: &SessionId) -> ServiceResult<Note> {
        let note = self.load_active(id, owner)?;
        let next = engine::undo(&note, self.clock.now_ms())?;
        self.persist(&note, next, "note_undo")
    }

    /// Re-applies the newest redo snapshot.
    pub fn redo_note(&mut self, id: NoteId, owner: &SessionId) -> ServiceResult<Note> {
        let note = self.load_active(id, owner)?;
        let next = engine::redo(&note, self.clock.now_ms())?;
        self.persist(&note, next, "note_redo")
    }

    /// Returns both history stacks without modifying the note.
    pub fn get_history(&self, id: NoteId, owner: &SessionId) -> ServiceResult<NoteHistory> {
        let note = self.load_active(id, owner)?;
        Ok(NoteHistory::from(&note))
    }

    /// Soft-deletes an active note.
    pub fn move_to_trash(&mut self, id: NoteId, owner: &SessionId) -> ServiceResult<Note> {
        let note = self.load_active(id, owner)?;
        let next = lifecycle::move_to_trash(&note, self.clock.now_ms())?;
        self.persist(&note, next, "note_trash")
    }

    /// Brings a trashed note back to the active list.
    pub fn restore_from_trash(&mut self, id: NoteId, owner: &SessionId) -> ServiceResult<Note> {
        let note = self.load_owned(id, owner)?;
        let next = lifecycle::restore(&note)?;
        self.persist(&note, next, "note_restore")
    }

    /// Purges a trashed note and its history.
    pub fn delete_permanently(&mut self, id: NoteId, owner: &SessionId) -> ServiceResult<()> {
        let note = self.load_owned(id, owner)?;
        lifecycle::ensure_permanently_deletable(&note)?;
        if !self.repo.delete_permanently(id, owner)? {
            // Restored or purged by a concurrent request after the load.
            return Err(NoteError::NoteNotInTrash.into());
        }
        info!(
            "event=note_purge module=service status=ok note_id={id} session={}",
            owner.log_prefix()
        );
        Ok(())
    }

    fn load_active(&self, id: NoteId, owner: &SessionId) -> ServiceResult<Note> {
        self.repo.find_active_by_id(id, owner)?.ok_or_else(|| {
            warn!(
                "event=note_lookup module=service status=not_found note_id={id} session={}",
                owner.log_prefix()
            );
            NoteServiceError::Note(NoteError::NoteNotFound)
        })
    }

    /// Loads the note in either state; trash-only operations report a
    /// missing note as not in trash.
    fn load_owned(&self, id: NoteId, owner: &SessionId) -> ServiceResult<Note> {
        if let Some(note) = self.repo.find_deleted_by_id(id, owner)? {
            return Ok(note);
        }
        self.repo
            .find_active_by_id(id, owner)?
            .ok_or(NoteServiceError::Note(NoteError::NoteNotInTrash))
    }

    fn persist(&mut self, loaded: &Note, next: Note, event: &'static str) -> ServiceResult<Note> {
        match self.repo.save_note(&next, WriteGuard::of(loaded)) {
            Ok(()) => {
                info!(
                    "event={event} module=service status=ok note_id={} versions={} redo={}",
                    next.id,
                    next.versions.len(),
                    next.redo_stack.len()
                );
                Ok(next)
            }
            Err(err) => {
                warn!(
                    "event={event} module=service status=error note_id={} error={err}",
                    next.id
                );
                Err(err.into())
            }
        }
    }

    fn list(
        &self,
        owner: &SessionId,
        deleted: bool,
        limit: Option<u32>,
        offset: u32,
    ) -> ServiceResult<NotesPage> {
        let applied_limit = normalize_note_limit(limit);
        let query = NoteListQuery {
            deleted,
            limit: Some(applied_limit),
            offset,
        };
        let items = self.repo.list_notes(owner, &query)?;
        let total = self.repo.count_notes(owner, deleted)?;
        Ok(NotesPage {
            items,
            total,
            applied_limit,
            offset,
        })
    }
}
