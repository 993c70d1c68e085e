use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{EntityRecord, RawText};

use super::names::NameFinder;
use super::rules;
use super::DrugVocabulary;

/// Rule-based prescription entity extractor.
///
/// Stateless apart from the injected vocabulary and optional name finder,
/// so one instance can be shared across concurrent requests.
pub struct EntityExtractor {
    vocabulary: DrugVocabulary,
    name_finder: Option<Arc<dyn NameFinder>>,
}

impl EntityExtractor {
    pub fn new(vocabulary: DrugVocabulary) -> Self {
        Self {
            vocabulary,
            name_finder: None,
        }
    }

    pub fn with_name_finder(mut self, finder: Arc<dyn NameFinder>) -> Self {
        self.name_finder = Some(finder);
        self
    }

    pub fn vocabulary(&self) -> &DrugVocabulary {
        &self.vocabulary
    }

    pub fn has_name_finder(&self) -> bool {
        self.name_finder.is_some()
    }

    /// Extract the four entity fields. Never fails; empty text gives an
    /// empty record.
    pub fn extract(&self, text: &RawText) -> EntityRecord {
        let text = text.as_str();
        if text.trim().is_empty() {
            return EntityRecord::default();
        }

        let record = EntityRecord {
            patient_name: rules::patient_names(text),
            doctor_name: rules::doctor_names(text),
            drug_name: self.vocabulary.find_in(text),
            quantity: rules::quantities(text),
        };

        debug!(
            patients = record.patient_name.len(),
            doctors = record.doctor_name.len(),
            drugs = record.drug_name.len(),
            quantities = record.quantity.len(),
            "Extracted prescription entities"
        );

        record
    }

    /// Person names from the configured name finder.
    ///
    /// Finder errors are logged and yield no names.
    pub fn find_person_names(&self, text: &RawText) -> Vec<String> {
        let Some(finder) = &self.name_finder else {
            return Vec::new();
        };
        if text.is_empty() {
            return Vec::new();
        }

        match finder.find_person_names(text.as_str()) {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "Name finder failed, continuing without person names");
                Vec::new()
            }
        }
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new(DrugVocabulary::default())
    }
}
