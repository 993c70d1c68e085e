use async_trait::async_trait;

use crate::error::Result;
use crate::models::{EntityRecord, StoredRecord};

/// Destination for extracted records.
///
/// The pipeline treats every error from a sink as non-fatal: the record is
/// still returned to the caller and the failure is reported alongside it.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persist one record with the text it was extracted from. Returns the
    /// new record id.
    async fn store(&self, record: &EntityRecord, raw_text: &str) -> Result<String>;

    async fn get(&self, id: &str) -> Result<Option<StoredRecord>>;

    /// Most recent records first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<StoredRecord>>;

    async fn count(&self) -> Result<u64>;

    /// Cheap reachability check for health reporting.
    async fn ping(&self) -> Result<()>;

    /// Push pending writes to a remote primary, if there is one.
    async fn sync(&self) -> Result<()> {
        Ok(())
    }
}
