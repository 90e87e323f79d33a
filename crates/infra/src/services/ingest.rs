//! Transcript ingest service
//!
//! Orchestrates the upload path: extraction service call, deadline
//! normalization, and record persistence. The record id is generated here,
//! once, at first save. Processing alone produces an identity-less draft
//! the user can still edit.

use std::sync::Arc;

use chrono::NaiveDate;
use echodue_core::{normalize_deadlines, RecordStore};
use echodue_domain::{CanonicalDeadline, EchoDueError, Result, TranscriptRecord};
use tracing::{info, instrument};

use crate::integrations::extraction::ExtractionClient;

/// Processed upload before it has been saved (no identity yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedTranscript {
    pub transcript: String,
    pub summary: String,
    pub deadlines: Vec<CanonicalDeadline>,
}

/// Service driving the upload → normalize → save path.
pub struct TranscriptIngestService {
    extraction: ExtractionClient,
    store: Arc<dyn RecordStore>,
}

impl TranscriptIngestService {
    #[must_use]
    pub fn new(extraction: ExtractionClient, store: Arc<dyn RecordStore>) -> Self {
        Self { extraction, store }
    }

    /// Run an audio asset through extraction and normalize its deadlines
    /// against the given reference date.
    ///
    /// # Errors
    /// Propagates extraction client failures; normalization itself cannot
    /// fail (unresolvable dates surface as empty fields).
    #[instrument(skip(self, bearer_token, bytes), fields(file_name))]
    pub async fn process_audio(
        &self,
        bearer_token: &str,
        file_name: &str,
        bytes: Vec<u8>,
        reference: NaiveDate,
    ) -> Result<ProcessedTranscript> {
        let output = self.extraction.process_audio(bearer_token, file_name, bytes).await?;
        let deadlines = normalize_deadlines(&output.deadlines, reference);

        info!(deadline_count = deadlines.len(), "audio processed");

        Ok(ProcessedTranscript {
            transcript: output.timestamped_text,
            summary: output.summary,
            deadlines,
        })
    }

    /// Save a (possibly edited) draft as a new record.
    ///
    /// Generates the record id; every deadline subject must be non-empty.
    ///
    /// # Errors
    /// `Validation` when a deadline subject is empty; storage errors from
    /// the record store.
    pub async fn save_new(
        &self,
        user_id: &str,
        draft: ProcessedTranscript,
    ) -> Result<TranscriptRecord> {
        if draft.deadlines.iter().any(|d| d.subject.trim().is_empty()) {
            return Err(EchoDueError::Validation(
                "deadline subjects must not be empty".to_string(),
            ));
        }

        let record = TranscriptRecord::new(draft.transcript, draft.summary, draft.deadlines);
        self.store.upsert(user_id, &record).await?;

        info!(record_id = %record.id, "record saved");
        Ok(record)
    }
}
