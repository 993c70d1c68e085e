//! Prescription scanning pipeline.
//!
//! One call runs image bytes through preprocessing, OCR, entity extraction,
//! and the optional catalog and storage steps, strictly in that order. Only
//! a malformed image aborts a scan; OCR and storage failures are reported in
//! the returned [`PrescriptionScan`] instead.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::{CatalogMatcher, DrugCatalog};
use crate::config::{Config, OcrConfig};
use crate::db::{Database, LibSqlRecordStore, RecordSink};
use crate::error::{Result, RxError};
use crate::extraction::{CapitalizedNameFinder, DrugVocabulary, EntityExtractor};
use crate::models::{EntityRecord, OcrStatus, PrescriptionScan, RawText, StorageStatus};
use crate::ocr::{preprocess_image, OcrProvider, TextRecognizer};

/// Per-call switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Persist the record when a sink is configured.
    pub store: bool,
}

impl ScanOptions {
    pub fn stored() -> Self {
        Self { store: true }
    }
}

#[derive(Clone)]
pub struct PrescriptionPipeline {
    recognizer: Arc<dyn TextRecognizer>,
    extractor: Arc<EntityExtractor>,
    sink: Option<Arc<dyn RecordSink>>,
    catalog: Option<Arc<dyn CatalogMatcher>>,
    ocr_config: OcrConfig,
}

impl PrescriptionPipeline {
    pub fn new(
        recognizer: Arc<dyn TextRecognizer>,
        extractor: Arc<EntityExtractor>,
        ocr_config: OcrConfig,
    ) -> Self {
        Self {
            recognizer,
            extractor,
            sink: None,
            catalog: None,
            ocr_config,
        }
    }

    /// Wire every stage from configuration.
    ///
    /// An OCR engine that cannot start degrades to "unavailable". A missing
    /// vocabulary extension, catalog file, or unreachable database is an
    /// error.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let recognizer = OcrProvider::new(&config.ocr)?;
        if let Some(reason) = recognizer.unavailable_reason() {
            warn!(reason, "Scans will return empty records until OCR is available");
        }

        let vocabulary = match &config.extraction.vocabulary_extra_path {
            Some(path) => DrugVocabulary::with_extra_file(path)?,
            None => DrugVocabulary::default(),
        };
        let mut extractor = EntityExtractor::new(vocabulary.clone());
        if config.extraction.name_finder_enabled {
            extractor = extractor.with_name_finder(Arc::new(CapitalizedNameFinder::new(vocabulary)));
        }

        let mut pipeline = Self::new(
            Arc::new(recognizer),
            Arc::new(extractor),
            config.ocr.clone(),
        );

        if config.storage.enabled {
            let db = Database::new(&config.database).await?;
            pipeline = pipeline.with_sink(Arc::new(LibSqlRecordStore::new(db)));
        }

        if let Some(path) = &config.catalog.path {
            pipeline = pipeline.with_catalog(Arc::new(DrugCatalog::from_path(path)?));
        }

        info!(
            ocr = pipeline.recognizer.engine_name(),
            vocabulary = pipeline.extractor.vocabulary().len(),
            storage = pipeline.sink.is_some(),
            catalog = pipeline.catalog.is_some(),
            "Prescription pipeline ready"
        );
        Ok(pipeline)
    }

    pub fn with_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogMatcher>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn recognizer(&self) -> &dyn TextRecognizer {
        self.recognizer.as_ref()
    }

    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    pub fn sink(&self) -> Option<&Arc<dyn RecordSink>> {
        self.sink.as_ref()
    }

    pub fn has_catalog(&self) -> bool {
        self.catalog.is_some()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.ocr_config.max_upload_bytes
    }

    /// Scan a prescription image.
    ///
    /// Fails only when the input is empty, too large, or cannot be decoded
    /// as an image. Any OCR failure yields an empty record with
    /// [`OcrStatus::Failed`].
    pub async fn scan(&self, image_bytes: &[u8], options: ScanOptions) -> Result<PrescriptionScan> {
        if image_bytes.is_empty() {
            return Err(RxError::Validation("Image is empty".to_string()));
        }
        let max = self.ocr_config.max_upload_bytes;
        if image_bytes.len() > max {
            return Err(RxError::Validation(format!(
                "Image is {} bytes, maximum is {max}",
                image_bytes.len()
            )));
        }

        let image = preprocess_image(image_bytes, &self.ocr_config)?;
        let (width, height) = image.dimensions();
        debug!(width, height, "Preprocessed prescription image");

        let (raw_text, ocr) = match self.recognizer.recognize(&image).await {
            Ok(text) if text.is_empty() => (text, OcrStatus::Empty),
            Ok(text) => (text, OcrStatus::Recognized),
            Err(failure) => {
                warn!(
                    engine = self.recognizer.engine_name(),
                    error = %failure,
                    "OCR failed, extracting from empty text"
                );
                (
                    RawText::empty(),
                    OcrStatus::Failed {
                        reason: failure.to_string(),
                    },
                )
            }
        };

        Ok(self.complete(raw_text, ocr, options).await)
    }

    /// Run the post-OCR stages on text that was recognized elsewhere.
    pub async fn scan_text(&self, text: &str, options: ScanOptions) -> PrescriptionScan {
        self.complete(RawText::from(text), OcrStatus::Skipped, options)
            .await
    }

    async fn complete(
        &self,
        raw_text: RawText,
        ocr: OcrStatus,
        options: ScanOptions,
    ) -> PrescriptionScan {
        let record = self.extractor.extract(&raw_text);
        let person_names = self.extractor.find_person_names(&raw_text);

        let catalog_matches = match &self.catalog {
            Some(catalog) if !record.drug_name.is_empty() => {
                catalog.match_drugs(&record.drug_name)
            }
            _ => Vec::new(),
        };

        let storage = if options.store {
            self.store(&record, raw_text.as_str()).await
        } else {
            StorageStatus::Skipped
        };

        info!(
            ocr = ?ocr,
            drugs = record.drug_name.len(),
            quantities = record.quantity.len(),
            stored = matches!(storage, StorageStatus::Stored { .. }),
            "Prescription scan complete"
        );

        PrescriptionScan {
            record,
            raw_text: raw_text.into_string(),
            ocr,
            person_names,
            catalog_matches,
            storage,
        }
    }

    async fn store(&self, record: &EntityRecord, raw_text: &str) -> StorageStatus {
        let Some(sink) = &self.sink else {
            debug!("Storage requested but no record sink is configured");
            return StorageStatus::Skipped;
        };

        match sink.store(record, raw_text).await {
            Ok(id) => StorageStatus::Stored { id },
            Err(e) => {
                warn!(error = %e, "Failed to store prescription record");
                StorageStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
