//! Input sanitization and validation for note writes.
//!
//! # Responsibility
//! - Trim raw client input before it reaches the history engine.
//! - Enforce title/content length limits and the title character whitelist.
//!
//! # Invariants
//! - Validation reports every failing rule, not only the first.
//! - Lengths are counted in Unicode scalar values.
//! - Sanitized values are what `has_real_changes` compares, so trimming
//!   happens here and nowhere else.

use crate::history::concurrency::LastKnownUpdate;
use crate::history::engine::NoteUpdate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const TITLE_MAX_CHARS: usize = 100;
pub const CONTENT_MAX_CHARS: usize = 10_000;
pub const DEFAULT_TITLE: &str = "New note";

// Letters, digits, plain space and a fixed punctuation set. Tabs, newlines
// and markup angle brackets are rejected.
static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[\p{L}\p{N} \-.,!?'"()&*+/=\[\]{}@#$%^~`|\\:;«»„“”…–—]{1,100}$"#)
        .expect("valid title regex")
});

/// Sanitized input for note creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
}

/// Sanitized input for note edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Client's last observed `edited_at`, when it wants conflict detection.
    pub last_known_update: Option<LastKnownUpdate>,
}

impl NotePatch {
    /// Field changes only, as consumed by the history engine.
    pub fn to_update(&self) -> NoteUpdate {
        NoteUpdate {
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }
}

/// Input rejected at the validation boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub details: Vec<String>,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed: {}", self.details.join("; "))
    }
}

impl Error for ValidationError {}

/// Trims create input and fills defaults for missing fields.
pub fn sanitize_create(title: Option<&str>, content: Option<&str>) -> NewNote {
    let title = title.map(str::trim).unwrap_or_default();
    NewNote {
        title: if title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title.to_string()
        },
        content: content.map(str::trim).unwrap_or_default().to_string(),
    }
}

/// Trims present fields of an edit.
pub fn sanitize_patch(patch: NotePatch) -> NotePatch {
    NotePatch {
        title: patch.title.map(|value| value.trim().to_string()),
        content: patch.content.map(|value| value.trim().to_string()),
        last_known_update: patch.last_known_update,
    }
}

pub fn validate_create(input: &NewNote) -> Result<(), ValidationError> {
    let mut details = Vec::new();
    check_title(&input.title, &mut details);
    check_content(&input.content, &mut details);
    finish(details)
}

pub fn validate_patch(patch: &NotePatch) -> Result<(), ValidationError> {
    let mut details = Vec::new();
    if patch.title.is_none() && patch.content.is_none() {
        details.push("at least title or content must be provided".to_string());
    }
    if let Some(title) = patch.title.as_deref() {
        check_title(title, &mut details);
    }
    if let Some(content) = patch.content.as_deref() {
        check_content(content, &mut details);
    }
    finish(details)
}

fn check_title(title: &str, details: &mut Vec<String>) {
    if title.trim().is_empty() {
        details.push("title cannot be empty".to_string());
    } else if title.chars().count() > TITLE_MAX_CHARS {
        details.push(format!("title cannot exceed {TITLE_MAX_CHARS} characters"));
    } else if !TITLE_RE.is_match(title.trim()) {
        details.push("title contains invalid characters".to_string());
    }
}

fn check_content(content: &str, details: &mut Vec<String>) {
    if content.chars().count() > CONTENT_MAX_CHARS {
        details.push(format!("content cannot exceed {CONTENT_MAX_CHARS} characters"));
    }
}

fn finish(details: Vec<String>) -> Result<(), ValidationError> {
    if details.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { details })
    }
}
