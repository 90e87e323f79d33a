//! Traits for consent and token storage operations
//!
//! These traits enable dependency injection and testing by abstracting the
//! two external dependencies of the token lifecycle: the platform's
//! interactive consent surface and the client-side key/value storage that
//! caches the token across sessions.

use async_trait::async_trait;

use super::types::{ConsentError, TokenGrant};

/// Trait for the platform's interactive consent surface
///
/// A call corresponds to exactly one consent prompt shown to the user.
/// Implementations must not retry on their own: a declined or failed prompt
/// is reported as-is and the caller decides whether to ask again.
#[async_trait]
pub trait ConsentFlow: Send + Sync {
    /// Run one interactive consent round and return the granted token.
    ///
    /// # Errors
    /// Returns `ConsentError::Declined` when the user cancels (or the
    /// provider reports `access_denied`), `ConsentError::Provider` for any
    /// other flow failure.
    async fn request_access_token(&self) -> Result<TokenGrant, ConsentError>;
}

/// Trait for client-side key/value storage
///
/// Abstracts the durable cache so the token manager can run against an
/// in-memory map in tests and a file-backed store in production. Values are
/// plain strings; callers own any encoding.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key has never been written.
    ///
    /// # Errors
    /// Returns a message when the underlying storage cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, String>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    /// Returns a message when the underlying storage cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), String>;

    /// Delete a key; deleting an absent key is not an error.
    ///
    /// # Errors
    /// Returns a message when the underlying storage cannot be written.
    async fn remove(&self, key: &str) -> Result<(), String>;
}
