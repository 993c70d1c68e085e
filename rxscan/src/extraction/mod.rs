//! Entity extraction from recognized prescription text.
//!
//! Four independent passes fill an [`EntityRecord`](crate::models::EntityRecord):
//! - patient and doctor names from the `PATIENT (M) / 45Y` and `Dr.` markers
//! - drug names by whole-word lookup in a [`DrugVocabulary`]
//! - quantities from every `Tot:` marker
//!
//! An optional [`NameFinder`] runs alongside and reports person names
//! separately.

mod extractor;
mod names;
mod rules;
mod vocabulary;

pub use extractor::EntityExtractor;
pub use names::{CapitalizedNameFinder, NameFinder};
pub use rules::{doctor_names, patient_names, quantities};
pub use vocabulary::{DrugVocabulary, DEFAULT_DRUGS};
