//! Token manager with lazy interactive reacquisition
//!
//! Owns the OAuth token lifecycle:
//! - Silent reuse of the cached token while `now < expires_at`
//! - Interactive reacquisition through a [`ConsentFlow`] when it expired
//! - Persistence of the token and its expiry in a [`KeyValueStore`]
//! - A single-slot pending-request register so overlapping callers never
//!   open more than one consent prompt
//!
//! The register is deliberately one element deep, last caller wins: when a
//! second caller needs a token while a consent flow is already running, it
//! replaces the registered continuation and the earlier waiter resolves
//! with [`TokenManagerError::Superseded`]. This models the upstream
//! behavior of rebinding the consent callback to the latest requester; the
//! race is accepted and observable, not silently fixed. A superseded caller
//! that retries immediately after a successful grant hits the cache.

use std::sync::Arc;

use tokio::sync::{oneshot, Mutex, RwLock};
use tracing::{debug, info, warn};

use super::traits::{ConsentFlow, KeyValueStore};
use super::types::{
    now_ms, ConsentError, TokenSet, ACCESS_TOKEN_STORAGE_KEY, TOKEN_EXPIRY_STORAGE_KEY,
};

/// Error type for token manager operations
#[derive(Debug)]
pub enum TokenManagerError {
    /// The user declined consent or the provider rejected the request
    Denied(String),

    /// This caller's continuation was replaced by a later caller before the
    /// in-flight consent flow finished (accepted last-caller-wins race)
    Superseded,

    /// The key/value storage backing the token cache failed
    Store(String),
}

impl std::fmt::Display for TokenManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Denied(msg) => write!(f, "authorization denied: {msg}"),
            Self::Superseded => {
                write!(f, "token request superseded by a later caller")
            }
            Self::Store(msg) => write!(f, "token storage error: {msg}"),
        }
    }
}

impl std::error::Error for TokenManagerError {}

impl From<ConsentError> for TokenManagerError {
    fn from(err: ConsentError) -> Self {
        Self::Denied(err.to_string())
    }
}

type PendingSender = oneshot::Sender<Result<TokenSet, TokenManagerError>>;

/// One-slot acquisition register shared by overlapping callers.
struct AcquisitionState {
    pending: Option<PendingSender>,
    flow_in_flight: bool,
}

/// Token manager owning the cached token and the consent register
///
/// The cache is read-check-then-write without a surrounding transaction;
/// the only serialization is the single in-flight consent guard. Two
/// callers can both observe an expired token before either acquires; the
/// register then makes sure only one prompt opens.
pub struct TokenManager<F: ConsentFlow + 'static, S: KeyValueStore + 'static> {
    consent: Arc<F>,
    store: Arc<S>,
    cached: RwLock<Option<TokenSet>>,
    state: Mutex<AcquisitionState>,
}

impl<F: ConsentFlow + 'static, S: KeyValueStore + 'static> TokenManager<F, S> {
    /// Create a new token manager
    ///
    /// # Arguments
    /// * `consent` - Interactive consent surface
    /// * `store` - Durable key/value storage for the token cache
    #[must_use]
    pub fn new(consent: F, store: Arc<S>) -> Self {
        Self {
            consent: Arc::new(consent),
            store,
            cached: RwLock::new(None),
            state: Mutex::new(AcquisitionState { pending: None, flow_in_flight: false }),
        }
    }

    /// Load a previously stored token into the in-memory cache.
    ///
    /// Should be called on startup. Returns `true` when a stored token was
    /// found. A missing or garbled entry is not an error, it just means
    /// the next use goes through interactive acquisition.
    ///
    /// # Errors
    /// Returns `TokenManagerError::Store` only when storage itself fails.
    pub async fn initialize(&self) -> Result<bool, TokenManagerError> {
        let access_token =
            self.store.get(ACCESS_TOKEN_STORAGE_KEY).await.map_err(TokenManagerError::Store)?;
        let expiry =
            self.store.get(TOKEN_EXPIRY_STORAGE_KEY).await.map_err(TokenManagerError::Store)?;

        match (access_token, expiry) {
            (Some(token), Some(expiry)) => match expiry.parse::<i64>() {
                Ok(expires_at_ms) => {
                    *self.cached.write().await = Some(TokenSet::new(token, expires_at_ms));
                    info!("token manager initialized with stored token");
                    Ok(true)
                }
                Err(_) => {
                    warn!("stored token expiry is not a number, ignoring stored token");
                    Ok(false)
                }
            },
            _ => {
                debug!("no stored token found");
                Ok(false)
            }
        }
    }

    /// Get a usable access token, reacquiring interactively when needed.
    ///
    /// Silent reuse is checked first on every call; the manager never
    /// refreshes ahead of expiry.
    ///
    /// # Errors
    /// Returns `Denied` when consent fails, `Superseded` when a later
    /// caller stole the continuation, `Store` when persistence fails.
    pub async fn get_valid_token(&self) -> Result<String, TokenManagerError> {
        if let Some(tokens) = self.cached_valid().await {
            debug!("reusing cached access token");
            return Ok(tokens.access_token);
        }

        self.acquire_interactive().await.map(|tokens| tokens.access_token)
    }

    /// Run (or join) an interactive acquisition cycle.
    ///
    /// Registers this caller's continuation in the single pending slot,
    /// replacing any earlier one, and opens a consent prompt only when no
    /// flow is already in flight. On grant the token is persisted and
    /// cached before the registered continuation resolves; on denial the
    /// registered continuation fails and no retry is scheduled.
    ///
    /// # Errors
    /// See [`Self::get_valid_token`].
    pub async fn acquire_interactive(&self) -> Result<TokenSet, TokenManagerError> {
        let (rx, run_flow) = {
            let mut state = self.state.lock().await;
            let (tx, rx) = oneshot::channel();
            if state.pending.replace(tx).is_some() {
                debug!("pending token continuation replaced (last caller wins)");
            }
            let run_flow = !state.flow_in_flight;
            state.flow_in_flight = true;
            (rx, run_flow)
        };

        if run_flow {
            info!("starting interactive consent flow");
            let outcome = match self.consent.request_access_token().await {
                Ok(grant) => {
                    let tokens = TokenSet::from_grant(&grant, now_ms());
                    match self.store_tokens(tokens.clone()).await {
                        Ok(()) => Ok(tokens),
                        Err(err) => Err(err),
                    }
                }
                Err(err) => {
                    warn!(error = %err, "interactive consent failed");
                    Err(TokenManagerError::from(err))
                }
            };

            let mut state = self.state.lock().await;
            state.flow_in_flight = false;
            if let Some(tx) = state.pending.take() {
                // Receiver may itself have been superseded and dropped.
                let _ = tx.send(outcome);
            }
        }

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(TokenManagerError::Superseded),
        }
    }

    /// Persist tokens and update the in-memory cache.
    ///
    /// # Errors
    /// Returns `TokenManagerError::Store` when either entry cannot be
    /// written.
    pub async fn store_tokens(&self, tokens: TokenSet) -> Result<(), TokenManagerError> {
        self.store
            .set(ACCESS_TOKEN_STORAGE_KEY, &tokens.access_token)
            .await
            .map_err(TokenManagerError::Store)?;
        self.store
            .set(TOKEN_EXPIRY_STORAGE_KEY, &tokens.expires_at_ms.to_string())
            .await
            .map_err(TokenManagerError::Store)?;

        *self.cached.write().await = Some(tokens);

        debug!("tokens stored");
        Ok(())
    }

    /// Drop the cached token from memory and storage (logout).
    ///
    /// # Errors
    /// Returns `TokenManagerError::Store` when storage deletion fails.
    pub async fn clear_tokens(&self) -> Result<(), TokenManagerError> {
        self.store.remove(ACCESS_TOKEN_STORAGE_KEY).await.map_err(TokenManagerError::Store)?;
        self.store.remove(TOKEN_EXPIRY_STORAGE_KEY).await.map_err(TokenManagerError::Store)?;

        *self.cached.write().await = None;

        info!("tokens cleared");
        Ok(())
    }

    /// Current cached token set, valid or not (primarily for tests).
    pub async fn get_tokens(&self) -> Option<TokenSet> {
        self.cached.read().await.clone()
    }

    async fn cached_valid(&self) -> Option<TokenSet> {
        let cached = self.cached.read().await;
        cached.as_ref().filter(|tokens| tokens.is_usable(now_ms())).cloned()
    }
}
