use serde::{Deserialize, Serialize};

/// One row of the storefront's medicine table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub medicine_id: i64,
    pub name: String,
    pub stock: i64,
    #[serde(default, alias = "expiry_date")]
    pub expiry: Option<String>,
    pub price: f64,
}

/// Catalog entries that correspond to one extracted drug name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMatch {
    pub drug_name: String,
    pub entries: Vec<CatalogEntry>,
}

impl CatalogMatch {
    pub fn in_stock(&self) -> bool {
        self.entries.iter().any(|entry| entry.stock > 0)
    }
}
