//! Calendar sync dispatcher
//!
//! Drives one create-event call per deadline, with an independent
//! `SyncStatus` per `(record id, index)` key. Sends for different keys may
//! interleave freely and there is no ordering guarantee between their
//! completions; one deadline's failure never alters another deadline's
//! in-flight status. There is no cancellation and no background retry: a
//! failed send simply lands in `Error` and the user re-triggers it.

use std::sync::Arc;

use dashmap::DashMap;
use echodue_common::auth::{ConsentFlow, KeyValueStore, TokenManager};
use echodue_domain::constants::PRIMARY_CALENDAR_ID;
use echodue_domain::{CanonicalDeadline, EchoDueError, Result, SyncKey, SyncStatus};
use tracing::{debug, info, warn};

use super::oauth::map_token_manager_error;
use super::providers::CalendarProviderTrait;
use super::types::CalendarEventPayload;

/// Calendar sync dispatcher
pub struct CalendarSyncDispatcher<F: ConsentFlow + 'static, S: KeyValueStore + 'static> {
    token_manager: Arc<TokenManager<F, S>>,
    provider: Arc<dyn CalendarProviderTrait>,
    statuses: DashMap<SyncKey, SyncStatus>,
    time_zone: String,
}

impl<F: ConsentFlow + 'static, S: KeyValueStore + 'static> CalendarSyncDispatcher<F, S> {
    /// Create a dispatcher with an explicit time zone label.
    #[must_use]
    pub fn new(
        token_manager: Arc<TokenManager<F, S>>,
        provider: Arc<dyn CalendarProviderTrait>,
        time_zone: impl Into<String>,
    ) -> Self {
        Self { token_manager, provider, statuses: DashMap::new(), time_zone: time_zone.into() }
    }

    /// Create a dispatcher using the caller's resolved IANA time zone,
    /// falling back to UTC when the platform cannot report one.
    #[must_use]
    pub fn with_local_time_zone(
        token_manager: Arc<TokenManager<F, S>>,
        provider: Arc<dyn CalendarProviderTrait>,
    ) -> Self {
        let time_zone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
        Self::new(token_manager, provider, time_zone)
    }

    /// Send one deadline to the calendar.
    ///
    /// Status transitions `Sending → Success | Error` for this key only.
    /// A deadline with no resolved date is rejected before any token work
    /// with a `Validation` error, distinct from network/auth failures.
    ///
    /// # Errors
    /// `Validation` for an unresolved date, `AuthDenied` when consent
    /// fails, `Network`/`Provider` for transport and provider failures.
    pub async fn send(&self, key: SyncKey, deadline: &CanonicalDeadline) -> Result<String> {
        self.statuses.insert(key.clone(), SyncStatus::Sending);

        if !deadline.is_resolved() {
            let err = EchoDueError::Validation(format!(
                "deadline \"{}\" has no resolved date",
                deadline.subject
            ));
            self.statuses.insert(key, SyncStatus::Error(err.to_string()));
            return Err(err);
        }

        match self.try_send(deadline).await {
            Ok(confirmation) => {
                info!(key = %key, subject = %deadline.subject, "deadline synced to calendar");
                self.statuses.insert(key, SyncStatus::Success);
                Ok(confirmation)
            }
            Err(err) => {
                warn!(key = %key, error = %err, "calendar sync failed");
                self.statuses.insert(key, SyncStatus::Error(err.to_string()));
                Err(err)
            }
        }
    }

    async fn try_send(&self, deadline: &CanonicalDeadline) -> Result<String> {
        let access_token =
            self.token_manager.get_valid_token().await.map_err(map_token_manager_error)?;

        let payload = CalendarEventPayload::for_deadline(deadline, &self.time_zone)?;
        let created =
            self.provider.create_event(&access_token, PRIMARY_CALENDAR_ID, &payload).await?;

        debug!(event_id = %created.id, "calendar event created");

        Ok(format!("Task \"{}\" added to Google Calendar!", deadline.subject))
    }

    /// Current status for a key; keys never sent report `Idle`.
    #[must_use]
    pub fn status(&self, key: &SyncKey) -> SyncStatus {
        self.statuses.get(key).map(|entry| entry.value().clone()).unwrap_or(SyncStatus::Idle)
    }

    /// Snapshot of every non-idle status, for display.
    #[must_use]
    pub fn statuses(&self) -> Vec<(SyncKey, SyncStatus)> {
        self.statuses.iter().map(|entry| (entry.key().clone(), entry.value().clone())).collect()
    }

    /// The time zone label attached to outgoing events.
    #[must_use]
    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }
}
