//! In-memory record store
//!
//! Implements the `RecordStore` port against a concurrent map keyed by
//! `(user id, record id)`. Writes merge the record's content fields; ids
//! are never reused or rewritten.

use async_trait::async_trait;
use dashmap::DashMap;
use echodue_core::RecordStore;
use echodue_domain::{Result, TranscriptRecord};

/// [`RecordStore`] backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: DashMap<(String, String), TranscriptRecord>,
}

impl InMemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn upsert(&self, user_id: &str, record: &TranscriptRecord) -> Result<()> {
        self.records.insert((user_id.to_string(), record.id.clone()), record.clone());
        Ok(())
    }

    async fn get(&self, user_id: &str, record_id: &str) -> Result<Option<TranscriptRecord>> {
        Ok(self
            .records
            .get(&(user_id.to_string(), record_id.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn list(&self, user_id: &str) -> Result<Vec<TranscriptRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echodue_domain::CanonicalDeadline;

    fn record(transcript: &str) -> TranscriptRecord {
        TranscriptRecord::new(
            transcript.to_string(),
            "summary".to_string(),
            vec![CanonicalDeadline { date: "2025-06-03".to_string(), subject: "Essay".to_string() }],
        )
    }

    #[tokio::test]
    async fn test_upsert_then_get_roundtrip() {
        let store = InMemoryRecordStore::new();
        let rec = record("hello");

        store.upsert("user-1", &rec).await.unwrap();

        let fetched = store.get("user-1", &rec.id).await.unwrap().unwrap();
        assert_eq!(fetched, rec);
    }

    #[tokio::test]
    async fn test_upsert_merges_content_and_keeps_id() {
        let store = InMemoryRecordStore::new();
        let mut rec = record("first");
        store.upsert("user-1", &rec).await.unwrap();

        rec.transcript = "edited".to_string();
        store.upsert("user-1", &rec).await.unwrap();

        let fetched = store.get("user-1", &rec.id).await.unwrap().unwrap();
        assert_eq!(fetched.transcript, "edited");
        assert_eq!(store.list("user-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_records_are_scoped_to_their_owner() {
        let store = InMemoryRecordStore::new();
        let rec = record("mine");
        store.upsert("user-1", &rec).await.unwrap();

        assert!(store.get("user-2", &rec.id).await.unwrap().is_none());
        assert!(store.list("user-2").await.unwrap().is_empty());
    }
}
