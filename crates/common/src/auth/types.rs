//! OAuth token types and structures
//!
//! Implicit-grant tokens carry no refresh token and no introspectable
//! metadata; the only validity check the application performs is comparing
//! the current wall clock against the expiry computed when the token was
//! granted.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Durable storage entry holding the access token value.
pub const ACCESS_TOKEN_STORAGE_KEY: &str = "google_access_token";

/// Durable storage entry holding the expiry as epoch milliseconds.
pub const TOKEN_EXPIRY_STORAGE_KEY: &str = "google_token_expiry";

/// Current wall clock as epoch milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// A cached access token with its computed wall-clock expiry.
///
/// A token is usable iff `now < expires_at_ms`; no signature or
/// introspection check is performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub expires_at_ms: i64,
}

impl TokenSet {
    #[must_use]
    pub fn new(access_token: impl Into<String>, expires_at_ms: i64) -> Self {
        Self { access_token: access_token.into(), expires_at_ms }
    }

    /// Build a `TokenSet` from a fresh grant, computing the absolute expiry
    /// from the provider's relative `expires_in` (seconds).
    #[must_use]
    pub fn from_grant(grant: &TokenGrant, now_ms: i64) -> Self {
        Self {
            access_token: grant.access_token.clone(),
            expires_at_ms: now_ms + grant.expires_in * 1000,
        }
    }

    /// Whether the token can still be used at the given instant.
    #[must_use]
    pub fn is_usable(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms
    }
}

/// The raw outcome of a successful consent flow, as returned by the
/// provider: a bearer token plus its lifetime in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: i64,
}

/// Error type for consent flow outcomes
#[derive(Debug, Clone)]
pub enum ConsentError {
    /// The user cancelled or the provider reported `access_denied`.
    Declined(String),

    /// The flow infrastructure or the provider failed before a grant could
    /// be produced (timeout, malformed redirect, browser failure).
    Provider(String),
}

impl fmt::Display for ConsentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declined(msg) => write!(f, "consent declined: {msg}"),
            Self::Provider(msg) => write!(f, "consent flow failed: {msg}"),
        }
    }
}

impl std::error::Error for ConsentError {}
