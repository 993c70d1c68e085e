use libsql::{Builder, Connection};
use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::error::Result;

use super::schema;

/// Shared handle to the record database.
///
/// `url` selects the flavour: `libsql://` or `https://` for a remote
/// database (an embedded replica when `local_path` is set), `:memory:`, or a
/// local file path with an optional `file:` prefix.
#[derive(Clone)]
pub struct Database {
    db: Arc<libsql::Database>,
    busy_timeout_ms: u64,
    journal_mode: &'static str,
    synchronous: &'static str,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let db = if is_remote_url(&config.url) {
            let token = config.auth_token.clone().unwrap_or_default();
            match &config.local_path {
                Some(local_path) => {
                    Builder::new_remote_replica(local_path, config.url.clone(), token)
                        .build()
                        .await?
                }
                None => Builder::new_remote(config.url.clone(), token).build().await?,
            }
        } else {
            let path = config.url.strip_prefix("file:").unwrap_or(&config.url);
            Builder::new_local(path).build().await?
        };

        let database = Self {
            db: Arc::new(db),
            busy_timeout_ms: config.busy_timeout_ms,
            journal_mode: normalize_journal_mode(&config.journal_mode),
            synchronous: normalize_synchronous(&config.synchronous),
        };
        database.configure().await?;

        let conn = database.connect()?;
        schema::init_schema(&conn).await?;

        tracing::info!(url = %redact_url(&config.url), "Record database ready");
        Ok(database)
    }

    pub fn connect(&self) -> Result<Connection> {
        Ok(self.db.connect()?)
    }

    /// Pragmas are best effort; remote databases reject some of them.
    async fn configure(&self) -> Result<()> {
        let conn = self.connect()?;
        let pragmas = [
            ("busy_timeout", self.busy_timeout_ms.to_string()),
            ("journal_mode", self.journal_mode.to_string()),
            ("synchronous", self.synchronous.to_string()),
        ];

        for (pragma, value) in pragmas {
            if let Err(error) = conn
                .execute_batch(&format!("PRAGMA {pragma} = {value}"))
                .await
            {
                tracing::warn!(pragma, value = %value, error = %error, "Failed to set SQLite pragma");
            }
        }

        Ok(())
    }

    pub async fn sync(&self) -> Result<()> {
        if let Ok(sync) = self.db.sync().await {
            tracing::debug!("Database synced: {:?}", sync);
        }
        Ok(())
    }
}

fn is_remote_url(url: &str) -> bool {
    url.starts_with("libsql://") || url.starts_with("https://")
}

/// Strip query parameters (which may carry tokens) before logging.
fn redact_url(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

fn normalize_journal_mode(value: &str) -> &'static str {
    match value.trim().to_uppercase().as_str() {
        "DELETE" => "DELETE",
        "TRUNCATE" => "TRUNCATE",
        "PERSIST" => "PERSIST",
        "MEMORY" => "MEMORY",
        "OFF" => "OFF",
        _ => "WAL",
    }
}

fn normalize_synchronous(value: &str) -> &'static str {
    match value.trim().to_uppercase().as_str() {
        "OFF" => "OFF",
        "FULL" => "FULL",
        "EXTRA" => "EXTRA",
        _ => "NORMAL",
    }
}
