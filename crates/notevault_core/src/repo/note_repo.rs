//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist note rows and their undo/redo snapshots.
//! - Scope every read and write by owning session.
//! - Make each note write a compare-and-swap on the loaded edit state.
//!
//! # Invariants
//! - A query never returns a note owned by another session.
//! - `save_note` updates only when `(edited_at, is_deleted)` still match the
//!   caller's loaded values; otherwise it fails with `Conflict` and leaves
//!   history rows untouched.
//! - History rows are replaced as a whole set in the same transaction as
//!   the note row.
//! - `delete_permanently` only removes trashed rows.

use crate::db::DbError;
use crate::model::note::{Note, NoteId};
use crate::model::snapshot::{HistoryStack, Snapshot};
use crate::session::SessionId;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTES_DEFAULT_LIMIT: u32 = 10;
const NOTES_LIMIT_MAX: u32 = 50;

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    owner_session,
    title,
    content,
    is_deleted,
    deleted_at,
    created_at,
    edited_at
FROM notes";

const STACK_UNDO: &str = "undo";
const STACK_REDO: &str = "redo";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for note storage.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Conditional write matched no row: the note changed since it was loaded.
    Conflict(NoteId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Conflict(id) => write!(f, "note changed since it was loaded: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Edit state a write expects to still be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteGuard {
    pub edited_at: i64,
    pub is_deleted: bool,
}

impl WriteGuard {
    /// Guard matching the state `note` was loaded with.
    pub fn of(note: &Note) -> Self {
        Self {
            edited_at: note.edited_at,
            is_deleted: note.is_deleted,
        }
    }
}

/// Query options for note list use-cases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteListQuery {
    /// `false` lists active notes, `true` lists the trash.
    pub deleted: bool,
    /// Maximum rows to return. Defaults to 10 and clamps to 50.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

/// Persistence contract consumed by the note service.
pub trait NoteRepository {
    /// Inserts a new note with its history.
    fn create_note(&mut self, note: &Note) -> RepoResult<()>;
    /// Loads an active note owned by `owner`.
    fn find_active_by_id(&self, id: NoteId, owner: &SessionId) -> RepoResult<Option<Note>>;
    /// Loads a trashed note owned by `owner`.
    fn find_deleted_by_id(&self, id: NoteId, owner: &SessionId) -> RepoResult<Option<Note>>;
    /// Persists `note` if the stored row still matches `expected`.
    fn save_note(&mut self, note: &Note, expected: WriteGuard) -> RepoResult<()>;
    /// Removes a trashed note. Returns whether a row was removed.
    fn delete_permanently(&mut self, id: NoteId, owner: &SessionId) -> RepoResult<bool>;
    /// Lists active or trashed notes owned by `owner`.
    fn list_notes(&self, owner: &SessionId, query: &NoteListQuery) -> RepoResult<Vec<Note>>;
    /// Counts active or trashed notes owned by `owner`.
    fn count_notes(&self, owner: &SessionId, deleted: bool) -> RepoResult<u64>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_note_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn find_by_id(
        &self,
        id: NoteId,
        owner: &SessionId,
        deleted: bool,
    ) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE uuid = ?1
               AND owner_session = ?2
               AND is_deleted = ?3;"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), owner.as_str(), bool_to_int(deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(self.conn, row)?));
        }
        Ok(None)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&mut self, note: &Note) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO notes (
                uuid,
                owner_session,
                title,
                content,
                is_deleted,
                deleted_at,
                created_at,
                edited_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                note.id.to_string(),
                note.owner.as_str(),
                note.title.as_str(),
                note.content.as_str(),
                bool_to_int(note.is_deleted),
                note.deleted_at,
                note.created_at,
                note.edited_at,
            ],
        )?;
        replace_history_in_tx(&tx, note)?;
        tx.commit()?;
        Ok(())
    }

    fn find_active_by_id(&self, id: NoteId, owner: &SessionId) -> RepoResult<Option<Note>> {
        self.find_by_id(id, owner, false)
    }

    fn find_deleted_by_id(&self, id: NoteId, owner: &SessionId) -> RepoResult<Option<Note>> {
        self.find_by_id(id, owner, true)
    }

    fn save_note(&mut self, note: &Note, expected: WriteGuard) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE notes
             SET
                title = ?1,
                content = ?2,
                is_deleted = ?3,
                deleted_at = ?4,
                edited_at = ?5
             WHERE uuid = ?6
               AND owner_session = ?7
               AND edited_at = ?8
               AND is_deleted = ?9;",
            params![
                note.title.as_str(),
                note.content.as_str(),
                bool_to_int(note.is_deleted),
                note.deleted_at,
                note.edited_at,
                note.id.to_string(),
                note.owner.as_str(),
                expected.edited_at,
                bool_to_int(expected.is_deleted),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::Conflict(note.id));
        }

        replace_history_in_tx(&tx, note)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_permanently(&mut self, id: NoteId, owner: &SessionId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM notes
             WHERE uuid = ?1
               AND owner_session = ?2
               AND is_deleted = 1;",
            params![id.to_string(), owner.as_str()],
        )?;
        Ok(changed > 0)
    }

    fn list_notes(&self, owner: &SessionId, query: &NoteListQuery) -> RepoResult<Vec<Note>> {
        let order_by = if query.deleted {
            "deleted_at DESC, uuid ASC"
        } else {
            "created_at DESC, uuid ASC"
        };
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE owner_session = ?1
               AND is_deleted = ?2
             ORDER BY {order_by}
             LIMIT ?3 OFFSET ?4;"
        ))?;

        let limit = normalize_note_limit(query.limit);
        let mut rows = stmt.query(params![
            owner.as_str(),
            bool_to_int(query.deleted),
            i64::from(limit),
            i64::from(query.offset),
        ])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(self.conn, row)?);
        }
        Ok(notes)
    }

    fn count_notes(&self, owner: &SessionId, deleted: bool) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM notes
             WHERE owner_session = ?1
               AND is_deleted = ?2;",
            params![owner.as_str(), bool_to_int(deleted)],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative note count `{count}`")))
    }
}

/// Normalizes list limit according to notes contract.
pub fn normalize_note_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => NOTES_DEFAULT_LIMIT,
        Some(value) if value > NOTES_LIMIT_MAX => NOTES_LIMIT_MAX,
        Some(value) => value,
    }
}

fn replace_history_in_tx(tx: &Transaction<'_>, note: &Note) -> RepoResult<()> {
    let note_uuid = note.id.to_string();
    tx.execute(
        "DELETE FROM note_history WHERE note_uuid = ?1;",
        [note_uuid.as_str()],
    )?;

    let mut insert = tx.prepare(
        "INSERT INTO note_history (
            note_uuid,
            stack,
            position,
            title,
            content,
            captured_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
    )?;
    for (stack_name, stack) in [(STACK_UNDO, &note.versions), (STACK_REDO, &note.redo_stack)] {
        for (position, snapshot) in stack.iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|_| RepoError::InvalidData("history position overflow".to_string()))?;
            insert.execute(params![
                note_uuid.as_str(),
                stack_name,
                position,
                snapshot.title.as_str(),
                snapshot.content.as_str(),
                snapshot.captured_at,
            ])?;
        }
    }
    Ok(())
}

fn load_history(conn: &Connection, note_uuid: &str, stack_name: &str) -> RepoResult<HistoryStack> {
    let mut stmt = conn.prepare(
        "SELECT title, content, captured_at
         FROM note_history
         WHERE note_uuid = ?1
           AND stack = ?2
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query(params![note_uuid, stack_name])?;
    let mut stack = HistoryStack::new();
    while let Some(row) = rows.next()? {
        stack.push(Snapshot::new(
            row.get::<_, String>("title")?,
            row.get::<_, String>("content")?,
            row.get::<_, i64>("captured_at")?,
        ));
    }
    Ok(stack)
}

fn parse_note_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in notes.uuid"))
    })?;

    let owner_text: String = row.get("owner_session")?;
    let owner = SessionId::parse(&owner_text)
        .map_err(|err| RepoError::InvalidData(format!("{err} in notes.owner_session")))?;

    let is_deleted = match row.get::<_, i64>("is_deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_deleted value `{other}` in notes.is_deleted"
            )));
        }
    };

    let note = Note {
        id,
        owner,
        title: row.get("title")?,
        content: row.get("content")?,
        is_deleted,
        deleted_at: row.get("deleted_at")?,
        created_at: row.get("created_at")?,
        edited_at: row.get("edited_at")?,
        versions: load_history(conn, &uuid_text, STACK_UNDO)?,
        redo_stack: load_history(conn, &uuid_text, STACK_REDO)?,
    };

    if !note.deletion_is_consistent() {
        return Err(RepoError::InvalidData(format!(
            "note {uuid_text} has is_deleted={is_deleted} but deleted_at={:?}",
            note.deleted_at
        )));
    }
    Ok(note)
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn ensure_note_connection_ready(conn: &Connection) -> RepoResult<()> {
    const REQUIRED: &[(&str, &[&str])] = &[
        (
            "notes",
            &[
                "uuid",
                "owner_session",
                "title",
                "content",
                "is_deleted",
                "deleted_at",
                "created_at",
                "edited_at",
            ],
        ),
        (
            "note_history",
            &["note_uuid", "stack", "position", "title", "content", "captured_at"],
        ),
    ];

    for &(table, columns) in REQUIRED {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
