//! Port interfaces implemented by the infrastructure layer.

use async_trait::async_trait;
use echodue_domain::{Result, TranscriptRecord};

/// Trait for the per-user transcript record collection.
///
/// The backing store is an external collaborator; implementations merge on
/// write (`transcript`, `summary`, `deadlines`) and never reuse record ids.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or merge a record into the user's collection.
    async fn upsert(&self, user_id: &str, record: &TranscriptRecord) -> Result<()>;

    /// Fetch a single record, `None` when it does not exist.
    async fn get(&self, user_id: &str, record_id: &str) -> Result<Option<TranscriptRecord>>;

    /// All records owned by the user.
    async fn list(&self, user_id: &str) -> Result<Vec<TranscriptRecord>>;
}
