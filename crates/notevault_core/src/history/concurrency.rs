//! Optimistic edit-token check.
//!
//! # Responsibility
//! - Detect lost updates by comparing a client's last known `edited_at`
//!   against the stored one.
//! - Normalize client tokens to canonical epoch milliseconds.
//!
//! # Invariants
//! - A missing token never fails (last write wins).
//! - The check provides detection only; mutual exclusion is the
//!   persistence layer's conditional write.

use crate::history::NoteError;
use chrono::DateTime;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Client-supplied concurrency token, normalized to epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LastKnownUpdate(i64);

/// Token input that is neither integer millis nor RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEditToken(pub String);

impl Display for InvalidEditToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid lastKnownUpdate value: `{}`", self.0)
    }
}

impl Error for InvalidEditToken {}

impl LastKnownUpdate {
    pub fn from_millis(epoch_ms: i64) -> Self {
        Self(epoch_ms)
    }

    /// Parses `1700000000000` or `2023-11-14T22:13:20.000Z` style input.
    ///
    /// RFC 3339 offsets are normalized, so `+01:00` and `Z` forms of the
    /// same instant compare equal.
    pub fn parse(value: &str) -> Result<Self, InvalidEditToken> {
        let trimmed = value.trim();
        if let Ok(epoch_ms) = trimmed.parse::<i64>() {
            return Ok(Self(epoch_ms));
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|instant| Self(instant.timestamp_millis()))
            .map_err(|_| InvalidEditToken(value.to_string()))
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }
}

/// Fails with `Conflict` when `last_known` is present and stale.
pub fn check_edit_token(
    last_known: Option<LastKnownUpdate>,
    current_edited_at: i64,
) -> Result<(), NoteError> {
    match last_known {
        Some(token) if token.as_millis() != current_edited_at => Err(NoteError::Conflict),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{check_edit_token, LastKnownUpdate};
    use crate::history::NoteError;

    #[test]
    fn absent_token_always_passes() {
        assert_eq!(check_edit_token(None, 123), Ok(()));
    }

    #[test]
    fn matching_token_passes_and_stale_token_conflicts() {
        let token = LastKnownUpdate::from_millis(1_000);
        assert_eq!(check_edit_token(Some(token), 1_000), Ok(()));
        assert_eq!(check_edit_token(Some(token), 1_001), Err(NoteError::Conflict));
    }

    #[test]
    fn parse_accepts_millis_and_rfc3339() {
        let millis = LastKnownUpdate::parse("1700000000000").expect("millis should parse");
        let utc = LastKnownUpdate::parse("2023-11-14T22:13:20.000Z").expect("rfc3339 should parse");
        let offset =
            LastKnownUpdate::parse("2023-11-14T23:13:20+01:00").expect("offset should parse");
        assert_eq!(millis, utc);
        assert_eq!(utc, offset);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(LastKnownUpdate::parse("yesterday").is_err());
    }
}
