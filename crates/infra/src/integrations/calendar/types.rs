//! Calendar event payload types
//!
//! The structs mirror the Google Calendar v3 wire shape (camelCase). Event
//! payloads are built on demand from a canonical deadline, sent, and
//! discarded. No local copy is retained after dispatch.

use chrono::{Duration, NaiveDate, NaiveTime, SecondsFormat};
use echodue_domain::constants::{
    DEFAULT_EVENT_DESCRIPTION, EVENT_DURATION_MINUTES, EVENT_REMINDER_METHOD,
    EVENT_REMINDER_MINUTES,
};
use echodue_domain::{CanonicalDeadline, EchoDueError, Result};
use serde::{Deserialize, Serialize};

/// Event start/end as an instant plus the caller's zone label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReminder {
    pub method: String,
    pub minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReminders {
    pub use_default: bool,
    pub overrides: Vec<EventReminder>,
}

/// Create-event request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventPayload {
    pub summary: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub reminders: EventReminders,
}

impl CalendarEventPayload {
    /// Build the event payload for one canonical deadline.
    ///
    /// Start is the deadline date at midnight UTC; end is always exactly 60
    /// minutes later; both carry the caller's resolved zone label; default
    /// reminders are disabled in favor of a single 10-minute popup.
    ///
    /// # Errors
    /// Returns `Validation` when the deadline's date is not a canonical
    /// calendar date (including the empty unresolved case).
    pub fn for_deadline(deadline: &CanonicalDeadline, time_zone: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(&deadline.date, "%Y-%m-%d").map_err(|_| {
            EchoDueError::Validation(format!(
                "deadline \"{}\" has no usable date (got '{}')",
                deadline.subject, deadline.date
            ))
        })?;

        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::minutes(EVENT_DURATION_MINUTES);

        Ok(Self {
            summary: deadline.subject.clone(),
            description: DEFAULT_EVENT_DESCRIPTION.to_string(),
            start: EventDateTime {
                date_time: start.to_rfc3339_opts(SecondsFormat::Millis, true),
                time_zone: time_zone.to_string(),
            },
            end: EventDateTime {
                date_time: end.to_rfc3339_opts(SecondsFormat::Millis, true),
                time_zone: time_zone.to_string(),
            },
            reminders: EventReminders {
                use_default: false,
                overrides: vec![EventReminder {
                    method: EVENT_REMINDER_METHOD.to_string(),
                    minutes: EVENT_REMINDER_MINUTES,
                }],
            },
        })
    }
}

/// Response subset returned by the create-event endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
    #[serde(default, rename = "htmlLink")]
    pub html_link: Option<String>,
}
