//! OAuth token lifecycle
//!
//! The implicit-grant flow hands the client a short-lived access token with
//! no refresh token, so the lifecycle here is: cache the token with its
//! computed wall-clock expiry, reuse it silently while valid, and fall back
//! to a fresh interactive consent when it has expired. Refresh is lazy (on
//! next use); the manager never refreshes ahead of expiry.

pub mod token_manager;
pub mod traits;
pub mod types;

pub use token_manager::{TokenManager, TokenManagerError};
pub use traits::{ConsentFlow, KeyValueStore};
pub use types::{now_ms, ConsentError, TokenGrant, TokenSet};
pub use types::{ACCESS_TOKEN_STORAGE_KEY, TOKEN_EXPIRY_STORAGE_KEY};
