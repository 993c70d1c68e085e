//! Drug catalog lookup.
//!
//! Extracted drug names are matched against a medicine catalog exported as
//! CSV (`medicine_id,name,stock,expiry,price`). Extra columns are ignored.

use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::models::{CatalogEntry, CatalogMatch};

/// Looks up extracted drug names in an inventory.
pub trait CatalogMatcher: Send + Sync {
    /// One match per drug, in input order. A drug with no catalog entry
    /// still yields a match with empty `entries`.
    fn match_drugs(&self, drugs: &[String]) -> Vec<CatalogMatch>;
}

/// In-memory catalog loaded from CSV.
#[derive(Debug, Clone, Default)]
pub struct DrugCatalog {
    entries: Vec<CatalogEntry>,
}

impl DrugCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            entries = catalog.len(),
            "Loaded drug catalog"
        );
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let entries = csv_reader
            .deserialize::<CatalogEntry>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entries whose name contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Vec<CatalogEntry> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

impl CatalogMatcher for DrugCatalog {
    fn match_drugs(&self, drugs: &[String]) -> Vec<CatalogMatch> {
        drugs
            .iter()
            .map(|drug| CatalogMatch {
                drug_name: drug.clone(),
                entries: self.search(drug),
            })
            .collect()
    }
}
