use async_trait::async_trait;
use chrono::Utc;
use nanoid::nanoid;

use crate::db::connection::Database;
use crate::db::repository::PrescriptionRepository;
use crate::db::traits::RecordSink;
use crate::error::Result;
use crate::models::{EntityRecord, StoredRecord};

/// [`RecordSink`] over a libsql database.
pub struct LibSqlRecordStore {
    db: Database,
}

impl LibSqlRecordStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordSink for LibSqlRecordStore {
    async fn store(&self, record: &EntityRecord, raw_text: &str) -> Result<String> {
        let stored = StoredRecord {
            id: nanoid!(),
            record: record.clone(),
            raw_text: raw_text.to_string(),
            created_at: Utc::now(),
        };

        let conn = self.db.connect()?;
        PrescriptionRepository::create(&conn, &stored).await?;

        tracing::debug!(id = %stored.id, drugs = record.drug_name.len(), "Stored prescription record");
        Ok(stored.id)
    }

    async fn get(&self, id: &str) -> Result<Option<StoredRecord>> {
        let conn = self.db.connect()?;
        PrescriptionRepository::get_by_id(&conn, id).await
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<StoredRecord>> {
        let conn = self.db.connect()?;
        PrescriptionRepository::list_recent(&conn, limit).await
    }

    async fn count(&self) -> Result<u64> {
        let conn = self.db.connect()?;
        PrescriptionRepository::count(&conn).await
    }

    async fn ping(&self) -> Result<()> {
        let conn = self.db.connect()?;
        conn.query("SELECT 1", ()).await?;
        Ok(())
    }

    /// No-op for local databases.
    async fn sync(&self) -> Result<()> {
        self.db.sync().await
    }
}
