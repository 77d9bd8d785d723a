//! Anonymous per-browser session identity.
//!
//! # Responsibility
//! - Model the opaque owner identifier that scopes every note query.
//! - Issue a fresh identifier when a request carries none.
//! - Describe the long-lived cookie that persists the identifier client-side.
//!
//! # Invariants
//! - A `SessionId` is non-empty, at most 128 chars, `[A-Za-z0-9-]` only.
//! - Generated identifiers are random UUID v4 values.
//! - Malformed cookie values are replaced, never trusted.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const SESSION_ID_MAX_CHARS: usize = 128;
const SESSION_LOG_PREFIX_CHARS: usize = 8;

/// Cookie name carrying the session id.
pub const SESSION_COOKIE_NAME: &str = "sessionId";
/// Ten years, in seconds.
pub const SESSION_COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 365 * 10;

/// Opaque session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

/// Rejected session identifier input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSessionId(pub String);

impl Display for InvalidSessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid session id: `{}`", self.0)
    }
}

impl Error for InvalidSessionId {}

impl SessionId {
    /// Generates a new random session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parses an externally supplied identifier.
    pub fn parse(value: &str) -> Result<Self, InvalidSessionId> {
        let trimmed = value.trim();
        let valid = !trimmed.is_empty()
            && trimmed.chars().count() <= SESSION_ID_MAX_CHARS
            && trimmed
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-');
        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(InvalidSessionId(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form safe to put in logs.
    pub fn log_prefix(&self) -> String {
        let prefix: String = self.0.chars().take(SESSION_LOG_PREFIX_CHARS).collect();
        format!("{prefix}...")
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session resolved for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    pub id: SessionId,
    /// `true` when the id was newly issued and must be sent back as a cookie.
    pub issued: bool,
}

/// Resolves the owning session of an incoming request.
pub trait SessionProvider {
    /// Returns the session carried by `cookie_value`, or issues a new one.
    fn resolve(&self, cookie_value: Option<&str>) -> ResolvedSession;
}

/// Session provider issuing random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSessionProvider;

impl SessionProvider for UuidSessionProvider {
    fn resolve(&self, cookie_value: Option<&str>) -> ResolvedSession {
        if let Some(value) = cookie_value {
            match SessionId::parse(value) {
                Ok(id) => return ResolvedSession { id, issued: false },
                Err(err) => {
                    log::warn!("event=session_resolve module=session status=rejected error={err}");
                }
            }
        }

        let id = SessionId::generate();
        log::debug!(
            "event=session_issue module=session status=ok session={}",
            id.log_prefix()
        );
        ResolvedSession { id, issued: true }
    }
}

/// Attributes of the cookie persisting a session id client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub value: SessionId,
    pub max_age_secs: u64,
    pub http_only: bool,
    pub secure: bool,
}

impl SessionCookie {
    /// Long-lived, httpOnly, SameSite=Lax cookie for `id`.
    pub fn for_session(id: SessionId, secure: bool) -> Self {
        Self {
            value: id,
            max_age_secs: SESSION_COOKIE_MAX_AGE_SECS,
            http_only: true,
            secure,
        }
    }

    /// Renders a `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let mut header = format!(
            "{SESSION_COOKIE_NAME}={}; Path=/; Max-Age={}; SameSite=Lax",
            self.value, self.max_age_secs
        );
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }
}
