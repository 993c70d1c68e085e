use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub ocr: OcrConfig,
    pub extraction: ExtractionConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
    pub busy_timeout_ms: u64,
    /// How often an embedded replica pushes to its primary. 0 disables.
    pub sync_interval_secs: u64,
    /// SQLite `journal_mode` pragma, normalized when the database opens.
    pub journal_mode: String,
    pub synchronous: String,
}

impl DatabaseConfig {
    /// Local or remote database at `url` with default pragmas.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: None,
            local_path: None,
            busy_timeout_ms: 5000,
            sync_interval_secs: 60,
            journal_mode: "WAL".to_string(),
            synchronous: "NORMAL".to_string(),
        }
    }
}

/// Persistence of extracted records. When disabled the pipeline never
/// touches the database.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub languages: String,
    pub timeout_secs: u64,
    pub max_image_dimension: u32,
    /// Global binarization threshold on a 0-255 scale. Pixels at or above
    /// the threshold become white.
    pub binarize_threshold: u8,
    pub max_upload_bytes: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model: "local/tesseract".to_string(),
            api_key: None,
            base_url: None,
            languages: "eng".to_string(),
            timeout_secs: 60,
            max_image_dimension: 4096,
            binarize_threshold: DEFAULT_BINARIZE_THRESHOLD,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

pub const DEFAULT_BINARIZE_THRESHOLD: u8 = 150;

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Newline-delimited file whose entries are appended to the built-in
    /// drug vocabulary.
    pub vocabulary_extra_path: Option<String>,
    pub name_finder_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// CSV export of the storefront's medicine table.
    pub path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("RXSCAN_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("RXSCAN_PORT", 3000),
                api_keys: env::var("RXSCAN_API_KEYS")
                    .map(|keys| {
                        keys.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:rxscan.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
                busy_timeout_ms: parse_env_or("DATABASE_BUSY_TIMEOUT_MS", 5000),
                sync_interval_secs: parse_env_or("DATABASE_SYNC_INTERVAL_SECS", 60),
                journal_mode: env::var("DATABASE_JOURNAL_MODE")
                    .unwrap_or_else(|_| "WAL".to_string()),
                synchronous: env::var("DATABASE_SYNCHRONOUS")
                    .unwrap_or_else(|_| "NORMAL".to_string()),
            },
            storage: StorageConfig {
                enabled: parse_env_or("STORAGE_ENABLED", true),
            },
            ocr: OcrConfig {
                model: env::var("OCR_MODEL").unwrap_or_else(|_| "local/tesseract".to_string()),
                api_key: env::var("OCR_API_KEY").ok(),
                base_url: env::var("OCR_BASE_URL").ok(),
                languages: env::var("OCR_LANGUAGES").unwrap_or_else(|_| "eng".to_string()),
                timeout_secs: parse_env_or("OCR_TIMEOUT", 60),
                max_image_dimension: parse_env_or("OCR_MAX_DIMENSION", 4096),
                binarize_threshold: parse_env_or(
                    "OCR_BINARIZE_THRESHOLD",
                    DEFAULT_BINARIZE_THRESHOLD,
                ),
                max_upload_bytes: parse_env_or("OCR_MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            },
            extraction: ExtractionConfig {
                vocabulary_extra_path: env_non_empty("VOCABULARY_EXTRA_PATH"),
                name_finder_enabled: parse_env_or("NAME_FINDER_ENABLED", true),
            },
            catalog: CatalogConfig {
                path: env_non_empty("CATALOG_PATH"),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known OCR providers. Anything else is treated as a local engine.
pub const KNOWN_OCR_PROVIDERS: &[&str] = &["local", "openai"];

/// Parse an OCR model name into (provider, model) tuple.
pub fn parse_ocr_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_OCR_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("local", model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_ocr_config_defaults() {
        std::env::remove_var("OCR_MODEL");
        std::env::remove_var("OCR_BINARIZE_THRESHOLD");
        std::env::remove_var("OCR_TIMEOUT");

        let config = Config::default();
        assert_eq!(config.ocr.model, "local/tesseract");
        assert_eq!(config.ocr.binarize_threshold, 150);
        assert_eq!(config.ocr.timeout_secs, 60);
        assert_eq!(config.ocr.max_image_dimension, 4096);
    }

    #[test]
    #[serial]
    fn test_binarize_threshold_from_env() {
        std::env::set_var("OCR_BINARIZE_THRESHOLD", "128");
        let config = Config::default();
        assert_eq!(config.ocr.binarize_threshold, 128);

        std::env::remove_var("OCR_BINARIZE_THRESHOLD");
    }

    #[test]
    #[serial]
    fn test_invalid_binarize_threshold_falls_back_to_default() {
        std::env::set_var("OCR_BINARIZE_THRESHOLD", "300");
        let config = Config::default();
        assert_eq!(config.ocr.binarize_threshold, DEFAULT_BINARIZE_THRESHOLD);

        std::env::remove_var("OCR_BINARIZE_THRESHOLD");
    }

    #[test]
    #[serial]
    fn test_api_keys_split_and_trimmed() {
        std::env::set_var("RXSCAN_API_KEYS", "alpha, beta ,,gamma");
        let config = Config::default();
        assert_eq!(config.server.api_keys, vec!["alpha", "beta", "gamma"]);

        std::env::remove_var("RXSCAN_API_KEYS");
    }

    #[test]
    #[serial]
    fn test_empty_catalog_path_is_none() {
        std::env::set_var("CATALOG_PATH", "  ");
        let config = Config::default();
        assert!(config.catalog.path.is_none());

        std::env::remove_var("CATALOG_PATH");
    }

    #[test]
    #[serial]
    fn test_parse_env_or_valid_value() {
        std::env::set_var("RXSCAN_TEST_PARSE_VALUE", "42");
        let value: u32 = parse_env_or("RXSCAN_TEST_PARSE_VALUE", 7);
        assert_eq!(value, 42);
        std::env::remove_var("RXSCAN_TEST_PARSE_VALUE");
    }

    #[test]
    #[serial]
    fn test_database_defaults() {
        std::env::remove_var("DATABASE_SYNC_INTERVAL_SECS");
        std::env::remove_var("DATABASE_JOURNAL_MODE");

        let config = Config::default();
        assert_eq!(config.database.sync_interval_secs, 60);
        assert_eq!(config.database.journal_mode, "WAL");
        assert_eq!(config.database.busy_timeout_ms, 5000);
    }

    #[test]
    fn test_parse_ocr_provider_model() {
        assert_eq!(parse_ocr_provider_model("openai/gpt-4o"), ("openai", "gpt-4o"));
        assert_eq!(
            parse_ocr_provider_model("local/tesseract"),
            ("local", "tesseract")
        );
        assert_eq!(parse_ocr_provider_model("tesseract"), ("local", "tesseract"));
        assert_eq!(
            parse_ocr_provider_model("mystery/engine"),
            ("local", "mystery/engine")
        );
    }
}
