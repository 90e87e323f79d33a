//! Mock implementations of common traits
//!
//! Provides in-memory doubles for the token lifecycle trait seams. They are
//! used by this crate's unit tests and by the infrastructure crate's
//! integration tests, so they live in the library rather than behind
//! `#[cfg(test)]`.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::auth::{ConsentError, ConsentFlow, KeyValueStore, TokenGrant};

/// In-memory [`KeyValueStore`] backed by a shared map.
///
/// Clones share the same underlying map, so a test can keep a handle for
/// assertions while the store is owned by the code under test.
#[derive(Debug, Default, Clone)]
pub struct MemoryKeyValueStore {
    data: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored entries for assertions.
    #[must_use]
    pub fn entries(&self) -> HashMap<String, String> {
        self.data.lock().unwrap().clone()
    }

    /// Make every subsequent write fail, to exercise storage error paths.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), String> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err("simulated write failure".to_string());
        }
        self.data.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), String> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err("simulated write failure".to_string());
        }
        self.data.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Shared prompt counter handed out by [`MockConsentFlow::prompt_counter`].
#[derive(Debug, Clone)]
pub struct PromptCounter(Arc<AtomicUsize>);

impl PromptCounter {
    /// Number of consent prompts opened so far.
    #[must_use]
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scripted [`ConsentFlow`] double.
///
/// Outcomes are queued with [`grant`](Self::grant) / [`deny`](Self::deny)
/// and consumed in order, one per prompt. A gated flow pauses each prompt
/// between the `started` notification and the `release` signal so tests can
/// interleave a second caller while consent is "on screen".
pub struct MockConsentFlow {
    outcomes: Mutex<VecDeque<Result<TokenGrant, ConsentError>>>,
    prompts: Arc<AtomicUsize>,
    started: Arc<Notify>,
    release: Arc<Notify>,
    gated: bool,
}

impl MockConsentFlow {
    #[must_use]
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            prompts: Arc::new(AtomicUsize::new(0)),
            started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            gated: false,
        }
    }

    /// Queue a successful grant.
    #[must_use]
    pub fn grant(self, access_token: &str, expires_in: i64) -> Self {
        self.outcomes.lock().unwrap().push_back(Ok(TokenGrant {
            access_token: access_token.to_string(),
            expires_in,
        }));
        self
    }

    /// Queue a user-side denial.
    #[must_use]
    pub fn deny(self, reason: &str) -> Self {
        self.outcomes.lock().unwrap().push_back(Err(ConsentError::Declined(reason.to_string())));
        self
    }

    /// Make each prompt wait for [`release`](Self::release) after signaling
    /// [`started`](Self::started).
    #[must_use]
    pub fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    #[must_use]
    pub fn prompt_counter(&self) -> PromptCounter {
        PromptCounter(self.prompts.clone())
    }

    /// Notified when a prompt opens.
    #[must_use]
    pub fn started(&self) -> Arc<Notify> {
        self.started.clone()
    }

    /// Signal to let a gated prompt finish.
    #[must_use]
    pub fn release(&self) -> Arc<Notify> {
        self.release.clone()
    }
}

impl Default for MockConsentFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConsentFlow for MockConsentFlow {
    async fn request_access_token(&self) -> Result<TokenGrant, ConsentError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();

        if self.gated {
            self.release.notified().await;
        }

        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ConsentError::Provider("no scripted outcome".to_string())))
    }
}
