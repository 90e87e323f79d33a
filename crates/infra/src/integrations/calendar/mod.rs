//! Google Calendar integration
//!
//! Shared types for event payloads, the provider API surface, the
//! implicit-grant consent flow, and the per-deadline sync dispatcher.

pub mod dispatch;
pub mod oauth;
pub mod providers;
pub mod types;

pub use dispatch::CalendarSyncDispatcher;
pub use oauth::{map_token_manager_error, CalendarOAuthSettings, ImplicitGrantBrowserFlow};
pub use providers::{create_provider, CalendarProviderTrait, GoogleCalendarProvider};
pub use types::{CalendarEventPayload, CreatedEvent, EventDateTime, EventReminder, EventReminders};
