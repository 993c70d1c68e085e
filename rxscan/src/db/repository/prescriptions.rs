use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::{EntityRecord, StoredRecord};

pub struct PrescriptionRepository;

impl PrescriptionRepository {
    pub async fn create(conn: &Connection, stored: &StoredRecord) -> Result<()> {
        let record = &stored.record;
        conn.execute(
            r#"
            INSERT INTO prescription_records (
                id, patient_name, doctor_name, drug_name, quantity, raw_text, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                stored.id.clone(),
                serde_json::to_string(&record.patient_name)?,
                serde_json::to_string(&record.doctor_name)?,
                serde_json::to_string(&record.drug_name)?,
                serde_json::to_string(&record.quantity)?,
                stored.raw_text.clone(),
                stored.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<StoredRecord>> {
        let mut rows = conn
            .query(
                "SELECT id, patient_name, doctor_name, drug_name, quantity, raw_text, created_at
                 FROM prescription_records WHERE id = ?1",
                params![id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_record(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list_recent(conn: &Connection, limit: u32) -> Result<Vec<StoredRecord>> {
        let mut rows = conn
            .query(
                "SELECT id, patient_name, doctor_name, drug_name, quantity, raw_text, created_at
                 FROM prescription_records ORDER BY created_at DESC, id DESC LIMIT ?1",
                params![limit],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_record(&row)?);
        }
        Ok(results)
    }

    pub async fn count(conn: &Connection) -> Result<u64> {
        let mut rows = conn
            .query("SELECT COUNT(*) FROM prescription_records", ())
            .await?;

        match rows.next().await? {
            Some(row) => Ok(row.get::<i64>(0)?.max(0) as u64),
            None => Ok(0),
        }
    }

    fn row_to_record(row: &libsql::Row) -> Result<StoredRecord> {
        Ok(StoredRecord {
            id: row.get(0)?,
            record: EntityRecord {
                patient_name: serde_json::from_str(&row.get::<String>(1)?)?,
                doctor_name: serde_json::from_str(&row.get::<String>(2)?)?,
                drug_name: serde_json::from_str(&row.get::<String>(3)?)?,
                quantity: serde_json::from_str(&row.get::<String>(4)?)?,
            },
            raw_text: row.get(5)?,
            created_at: DateTime::parse_from_rfc3339(&row.get::<String>(6)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    async fn setup_test_db() -> Connection {
        let conn = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .unwrap()
            .connect()
            .unwrap();
        schema::init_schema(&conn).await.unwrap();
        conn
    }

    fn stored(id: &str, drugs: &[&str], created_at: DateTime<Utc>) -> StoredRecord {
        StoredRecord {
            id: id.to_string(),
            record: EntityRecord {
                patient_name: vec!["Jane Doe".to_string()],
                doctor_name: vec![],
                drug_name: drugs.iter().map(|d| d.to_string()).collect(),
                quantity: vec!["10".to_string(), "5".to_string()],
            },
            raw_text: "PATIENT (F) / 30Y Jane Doe".to_string(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let conn = setup_test_db().await;
        let now = DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = stored("rx1", &["Paracetamol", "Dolo 650"], now);

        PrescriptionRepository::create(&conn, &record).await.unwrap();
        let fetched = PrescriptionRepository::get_by_id(&conn, "rx1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fetched, record);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let conn = setup_test_db().await;
        assert!(PrescriptionRepository::get_by_id(&conn, "nope")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_recent_newest_first_with_limit() {
        let conn = setup_test_db().await;
        let base = Utc::now();
        for (i, id) in ["a", "b", "c"].iter().enumerate() {
            let record = stored(id, &["Ibuprofen"], base + Duration::seconds(i as i64));
            PrescriptionRepository::create(&conn, &record).await.unwrap();
        }

        let recent = PrescriptionRepository::list_recent(&conn, 2).await.unwrap();
        let ids: Vec<&str> = recent.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
        assert_eq!(PrescriptionRepository::count(&conn).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_error() {
        let conn = setup_test_db().await;
        let record = stored("dup", &[], Utc::now());
        PrescriptionRepository::create(&conn, &record).await.unwrap();
        assert!(PrescriptionRepository::create(&conn, &record).await.is_err());
    }
}
