//! Domain types and models
//!
//! The deadline pipeline works on three shapes: `RawDeadline` as returned by
//! the extraction service, `CanonicalDeadline` after the normalization pass,
//! and `TranscriptRecord` as persisted per user. Sync progress is tracked
//! per deadline with `SyncKey`/`SyncStatus`.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A deadline as received from the extraction service.
///
/// `date` is free-form: an ISO date, a relative weekday expression
/// ("next Friday"), or one of several natural absolute formats
/// ("3rd of June 2025", "3-6-2025", "3/6/2025", "3rd of June").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeadline {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub subject: String,
}

/// A deadline after the normalization pass.
///
/// `date` is either canonical `yyyy-MM-dd` or the empty string when neither
/// resolver strategy could make sense of the raw expression. Unresolved
/// entries are kept so the user can correct them by hand; they are never
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalDeadline {
    pub date: String,
    pub subject: String,
}

impl CanonicalDeadline {
    /// Whether the normalization pass produced a usable calendar date.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.date.is_empty()
    }
}

/// A persisted transcript record owned by a single user.
///
/// The id is generated once when the record is first saved and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub id: String,
    pub transcript: String,
    pub summary: String,
    pub deadlines: Vec<CanonicalDeadline>,
}

impl TranscriptRecord {
    /// Create a record with a freshly generated id.
    #[must_use]
    pub fn new(transcript: String, summary: String, deadlines: Vec<CanonicalDeadline>) -> Self {
        Self { id: Uuid::new_v4().to_string(), transcript, summary, deadlines }
    }
}

/// Wire shape of the extraction service response.
///
/// Every field is defaulted: the service omits sections it could not
/// produce and the caller treats those as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionOutput {
    #[serde(default)]
    pub timestamped_text: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub deadlines: Vec<RawDeadline>,
}

/// Composite identity of a deadline within a record.
///
/// Deadlines carry no identity of their own, so sync state is keyed by
/// `(record id, index within the record's deadline list)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncKey {
    pub record_id: String,
    pub index: usize,
}

impl SyncKey {
    #[must_use]
    pub fn new(record_id: impl Into<String>, index: usize) -> Self {
        Self { record_id: record_id.into(), index }
    }
}

impl fmt::Display for SyncKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.record_id, self.index)
    }
}

/// Per-deadline sync progress.
///
/// Transitions are `Idle → Sending → Success | Error`; each key's status is
/// fully independent of every other key's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SyncStatus {
    Idle,
    Sending,
    Success,
    Error(String),
}

impl SyncStatus {
    /// Whether a send is currently in flight for this key.
    #[must_use]
    pub fn is_sending(&self) -> bool {
        matches!(self, Self::Sending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_deadline_deserializes_from_extraction_json() {
        let json = r#"{"date": "next Friday", "subject": "Essay draft"}"#;
        let deadline: RawDeadline = serde_json::from_str(json).unwrap();

        assert_eq!(deadline.date, "next Friday");
        assert_eq!(deadline.subject, "Essay draft");
    }

    #[test]
    fn test_extraction_output_defaults_missing_fields() {
        let output: ExtractionOutput = serde_json::from_str("{}").unwrap();

        assert!(output.timestamped_text.is_empty());
        assert!(output.summary.is_empty());
        assert!(output.deadlines.is_empty());
    }

    #[test]
    fn test_record_ids_are_unique() {
        let a = TranscriptRecord::new(String::new(), String::new(), vec![]);
        let b = TranscriptRecord::new(String::new(), String::new(), vec![]);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_sync_key_display_matches_composite_form() {
        let key = SyncKey::new("rec-42", 3);
        assert_eq!(key.to_string(), "rec-42-3");
    }

    #[test]
    fn test_sync_status_serde_tagging() {
        let status = SyncStatus::Error("network down".to_string());
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["state"], "error");
        assert_eq!(json["detail"], "network down");
    }
}
