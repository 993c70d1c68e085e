use libsql::Connection;

use crate::error::Result;

/// Entity fields are stored as JSON arrays so that empty and multi-valued
/// fields round-trip unchanged.
pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS prescription_records (
            id TEXT PRIMARY KEY,
            patient_name TEXT NOT NULL DEFAULT '[]',
            doctor_name TEXT NOT NULL DEFAULT '[]',
            drug_name TEXT NOT NULL DEFAULT '[]',
            quantity TEXT NOT NULL DEFAULT '[]',
            raw_text TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_prescription_records_created_at
            ON prescription_records(created_at);
        "#,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use libsql::Builder;

    #[tokio::test]
    async fn test_prescription_records_columns() {
        let db = Builder::new_local(":memory:").build().await.unwrap();
        let conn = db.connect().unwrap();

        init_schema(&conn).await.unwrap();

        let mut rows = conn
            .query(
                "SELECT name, dflt_value FROM pragma_table_info('prescription_records') ORDER BY cid",
                (),
            )
            .await
            .unwrap();

        let mut columns = Vec::new();
        while let Some(row) = rows.next().await.unwrap() {
            let name: String = row.get(0).unwrap();
            let default: Option<String> = row.get(1).unwrap();
            columns.push((name, default));
        }

        let names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "id",
                "patient_name",
                "doctor_name",
                "drug_name",
                "quantity",
                "raw_text",
                "created_at"
            ]
        );
        assert_eq!(columns[3].1.as_deref(), Some("'[]'"));
    }

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let db = Builder::new_local(":memory:").build().await.unwrap();
        let conn = db.connect().unwrap();

        init_schema(&conn).await.unwrap();
        init_schema(&conn).await.unwrap();
    }
}
