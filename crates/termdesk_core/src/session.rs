//! Per-session anti-forgery token.
//!
//! # Invariants
//! - Tokens are non-empty visible ASCII so they are always valid header values.
//! - Comparison does not short-circuit on the first differing byte.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use uuid::Uuid;

/// Header carrying the anti-forgery token on every request.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Anti-forgery token shared by one client session and its endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Generates a fresh random token for a new session.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wraps an externally issued token (for example from page metadata or config).
    pub fn new(value: impl Into<String>) -> Result<Self, CsrfTokenError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CsrfTokenError::Empty);
        }
        if !trimmed.bytes().all(|byte| byte.is_ascii_graphic()) {
            return Err(CsrfTokenError::InvalidCharacters);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks a presented header value against this token.
    pub fn verify(&self, presented: Option<&str>) -> bool {
        let Some(presented) = presented else {
            return false;
        };
        let expected = self.0.as_bytes();
        let presented = presented.trim().as_bytes();
        if expected.len() != presented.len() {
            return false;
        }
        expected
            .iter()
            .zip(presented)
            .fold(0u8, |diff, (left, right)| diff | (left ^ right))
            == 0
    }
}

impl Debug for CsrfToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("CsrfToken(<redacted>)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfTokenError {
    Empty,
    InvalidCharacters,
}

impl Display for CsrfTokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "csrf token must not be empty"),
            Self::InvalidCharacters => {
                write!(f, "csrf token must contain only visible ASCII characters")
            }
        }
    }
}

impl Error for CsrfTokenError {}
