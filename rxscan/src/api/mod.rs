mod extractors;
mod routes;
mod state;
pub mod v1;

pub use routes::create_router;
pub use state::AppState;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::config::{
        CatalogConfig, Config, DatabaseConfig, ExtractionConfig, OcrConfig, ServerConfig,
        StorageConfig,
    };
    use crate::db::{Database, LibSqlRecordStore};
    use crate::extraction::{CapitalizedNameFinder, DrugVocabulary, EntityExtractor};
    use crate::ocr::OcrProvider;
    use crate::pipeline::PrescriptionPipeline;

    use super::AppState;

    fn test_config(api_keys: Vec<String>, storage_enabled: bool) -> Config {
        let db_path = std::env::temp_dir().join(format!("rxscan-test-{}.db", nanoid::nanoid!()));
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                api_keys,
            },
            database: DatabaseConfig::for_url(db_path.to_string_lossy()),
            storage: StorageConfig {
                enabled: storage_enabled,
            },
            ocr: OcrConfig::default(),
            extraction: ExtractionConfig {
                vocabulary_extra_path: None,
                name_finder_enabled: true,
            },
            catalog: CatalogConfig { path: None },
        }
    }

    fn test_pipeline(config: &Config) -> PrescriptionPipeline {
        let vocabulary = DrugVocabulary::default();
        let extractor = EntityExtractor::new(vocabulary.clone())
            .with_name_finder(Arc::new(CapitalizedNameFinder::new(vocabulary)));
        let ocr = OcrProvider::unavailable("disabled in tests", &config.ocr);

        PrescriptionPipeline::new(Arc::new(ocr), Arc::new(extractor), config.ocr.clone())
    }

    /// State backed by a fresh on-disk database and an OCR engine that is
    /// always unavailable.
    pub async fn test_state(api_keys: Vec<String>) -> AppState {
        let config = test_config(api_keys, true);
        let db = Database::new(&config.database).await.unwrap();
        let pipeline = test_pipeline(&config).with_sink(Arc::new(LibSqlRecordStore::new(db)));

        AppState::new(config, pipeline)
    }

    pub async fn test_state_without_storage(api_keys: Vec<String>) -> AppState {
        let config = test_config(api_keys, false);
        let pipeline = test_pipeline(&config);

        AppState::new(config, pipeline)
    }
}
