//! Calendar provider trait and factory
//!
//! Defines the common interface for calendar providers and the factory
//! function.

use async_trait::async_trait;
use echodue_domain::{EchoDueError, Result};

use super::super::types::{CalendarEventPayload, CreatedEvent};
use crate::errors::InfraError;

/// Trait for calendar provider operations
#[async_trait]
pub trait CalendarProviderTrait: Send + Sync {
    /// Create one event on the given calendar.
    ///
    /// There is no idempotency key: sending the same payload twice creates
    /// two events.
    async fn create_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &CalendarEventPayload,
    ) -> Result<CreatedEvent>;
}

/// Create a calendar provider instance by name
pub fn create_provider(provider: &str) -> Result<Box<dyn CalendarProviderTrait>> {
    match provider {
        "google" => Ok(Box::new(super::google::GoogleCalendarProvider::new())),
        _ => Err(InfraError(EchoDueError::InvalidInput(format!("unknown provider: {provider}")))
            .into()),
    }
}
