//! Google Calendar provider implementation

use async_trait::async_trait;
use echodue_domain::{EchoDueError, Result};
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::super::types::{CalendarEventPayload, CreatedEvent};
use super::traits::CalendarProviderTrait;
use crate::errors::InfraError;

const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar provider
pub struct GoogleCalendarProvider {
    base_url: String,
    client: Client,
}

impl GoogleCalendarProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(GOOGLE_CALENDAR_API_BASE)
    }

    /// Provider pointed at a different API base (used by tests).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), client: Client::new() }
    }
}

impl Default for GoogleCalendarProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CalendarProviderTrait for GoogleCalendarProvider {
    async fn create_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &CalendarEventPayload,
    ) -> Result<CreatedEvent> {
        let url = format!("{}/calendars/{}/events", self.base_url, calendar_id);

        debug!(calendar_id, summary = %event.summary, "creating calendar event");

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await
            .map_err(|e| {
                InfraError(EchoDueError::Network(format!("Google API request failed: {e}")))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            let message = extract_google_error(&error_text);

            if status == StatusCode::UNAUTHORIZED {
                return Err(InfraError(EchoDueError::AuthDenied(format!(
                    "Google API rejected the access token: {message}"
                )))
                .into());
            }

            return Err(InfraError(EchoDueError::Provider(format!(
                "Google API error ({status}): {message}"
            )))
            .into());
        }

        let created: CreatedEvent = response.json().await.map_err(|e| {
            InfraError(EchoDueError::Provider(format!("Failed to parse Google response: {e}")))
        })?;

        Ok(created)
    }
}

/// Pull the human-readable message out of Google's error envelope, falling
/// back to the raw body.
fn extract_google_error(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
