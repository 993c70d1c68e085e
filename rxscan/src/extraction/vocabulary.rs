use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;

use crate::error::Result;

/// Drug names recognized out of the box, in match order.
pub const DEFAULT_DRUGS: &[&str] = &[
    "Paracetamol",
    "Ibuprofen",
    "Amoxicillin",
    "Lisinopril",
    "Metformin",
    "Atorvastatin",
    "Omeprazole",
    "Levothyroxine",
    "Amlodipine",
    "Simvastatin",
    "Losartan",
    "Metoprolol",
    "Albuterol",
    "Gabapentin",
    "Hydrochlorothiazide",
    "Sertraline",
    "Prednisone",
    "Tramadol",
    "Citalopram",
    "Warfarin",
    "Methamphetamine",
    "Dolo 650",
];

#[derive(Debug)]
struct VocabularyEntry {
    name: String,
    pattern: Regex,
}

/// Fixed, ordered set of canonical drug names.
///
/// Built once and shared read-only; cloning only bumps a reference count.
/// Entries are matched case-insensitively as whole words and reported in
/// their declared case and order.
#[derive(Debug, Clone)]
pub struct DrugVocabulary {
    entries: Arc<[VocabularyEntry]>,
}

impl Default for DrugVocabulary {
    fn default() -> Self {
        Self::from_names(DEFAULT_DRUGS.iter().copied())
    }
}

impl DrugVocabulary {
    /// Build a vocabulary from names in declaration order.
    ///
    /// Blank entries and case-insensitive repeats are skipped with a warning
    /// so that a bad entry never reaches extraction.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for raw in names {
            let name = raw.as_ref().trim();
            if name.is_empty() {
                tracing::warn!("Skipping blank drug vocabulary entry");
                continue;
            }
            if !seen.insert(name.to_lowercase()) {
                tracing::warn!(drug = name, "Skipping duplicate drug vocabulary entry");
                continue;
            }
            match whole_word_pattern(name) {
                Ok(pattern) => entries.push(VocabularyEntry {
                    name: name.to_string(),
                    pattern,
                }),
                Err(e) => {
                    tracing::warn!(drug = name, error = %e, "Skipping invalid drug vocabulary entry");
                }
            }
        }

        Self {
            entries: entries.into(),
        }
    }

    /// Defaults followed by `extra`, keeping the defaults' positions.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = DEFAULT_DRUGS
            .iter()
            .map(|name| name.to_string())
            .chain(extra.into_iter().map(|name| name.as_ref().to_string()))
            .collect();
        Self::from_names(names)
    }

    /// Defaults extended with a newline-delimited file. Blank lines and lines
    /// starting with `#` are ignored.
    pub fn with_extra_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let extra: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();

        tracing::info!(
            path = %path.display(),
            extra_entries = extra.len(),
            "Loaded drug vocabulary extension"
        );
        Ok(Self::with_extra(extra))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Case-insensitive membership, using the same folding as deduplication.
    pub fn contains(&self, name: &str) -> bool {
        let needle = name.trim().to_lowercase();
        self.entries
            .iter()
            .any(|entry| entry.name.to_lowercase() == needle)
    }

    /// Every entry found anywhere in `text`, in vocabulary order.
    pub fn find_in(&self, text: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.pattern.is_match(text))
            .map(|entry| entry.name.clone())
            .collect()
    }
}

/// Case-insensitive pattern for `name` that cannot match inside a longer word.
///
/// A `\b` anchor only makes sense next to a word character, so an entry that
/// starts or ends with punctuation is anchored on its other side only.
fn whole_word_pattern(name: &str) -> std::result::Result<Regex, regex::Error> {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let leading = if name.chars().next().is_some_and(is_word) {
        r"\b"
    } else {
        ""
    };
    let trailing = if name.chars().last().is_some_and(is_word) {
        r"\b"
    } else {
        ""
    };
    Regex::new(&format!("(?i){leading}{}{trailing}", regex::escape(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary_order() {
        let vocabulary = DrugVocabulary::default();
        let names: Vec<&str> = vocabulary.names().collect();
        assert_eq!(names, DEFAULT_DRUGS);
    }

    #[test]
    fn test_case_insensitive_match_reports_canonical_case() {
        let vocabulary = DrugVocabulary::default();
        assert_eq!(vocabulary.find_in("take ibuprofen twice"), vec!["Ibuprofen"]);
        assert_eq!(vocabulary.find_in("IBUPROFEN 400"), vec!["Ibuprofen"]);
    }

    #[test]
    fn test_no_match_inside_larger_word() {
        let vocabulary = DrugVocabulary::default();
        assert!(vocabulary.find_in("Ibuprofenol 200mg").is_empty());
        assert!(vocabulary.find_in("preParacetamol").is_empty());
    }

    #[test]
    fn test_punctuation_counts_as_boundary() {
        let vocabulary = DrugVocabulary::default();
        assert_eq!(
            vocabulary.find_in("1) Paracetamol-500, (Ibuprofen)"),
            vec!["Paracetamol", "Ibuprofen"]
        );
    }

    #[test]
    fn test_results_follow_vocabulary_order_not_text_order() {
        let vocabulary = DrugVocabulary::default();
        assert_eq!(
            vocabulary.find_in("Warfarin 5mg\nMetformin 500mg\nParacetamol"),
            vec!["Paracetamol", "Metformin", "Warfarin"]
        );
    }

    #[test]
    fn test_repeated_mentions_reported_once() {
        let vocabulary = DrugVocabulary::default();
        assert_eq!(
            vocabulary.find_in("Paracetamol ... paracetamol ... PARACETAMOL"),
            vec!["Paracetamol"]
        );
    }

    #[test]
    fn test_multi_word_entry() {
        let vocabulary = DrugVocabulary::default();
        assert_eq!(vocabulary.find_in("Tab. dolo 650 x 10"), vec!["Dolo 650"]);
        assert!(vocabulary.find_in("Dolo 6500").is_empty());
    }

    #[test]
    fn test_blank_and_duplicate_entries_skipped() {
        let vocabulary = DrugVocabulary::from_names(["Aspirin", "  ", "aspirin", "Cetirizine"]);
        let names: Vec<&str> = vocabulary.names().collect();
        assert_eq!(names, vec!["Aspirin", "Cetirizine"]);
    }

    #[test]
    fn test_non_ascii_entry_lookup_agrees_with_matching() {
        let vocabulary = DrugVocabulary::from_names(["Ésomeprazole", "ésomeprazole"]);
        assert_eq!(vocabulary.len(), 1);
        assert_eq!(
            vocabulary.find_in("ÉSOMEPRAZOLE 20mg Tot: 14"),
            vec!["Ésomeprazole"]
        );
        assert!(vocabulary.contains("ésomeprazole"));
        assert!(vocabulary.contains("ÉSOMEPRAZOLE"));
        assert!(!vocabulary.contains("esomeprazole"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let vocabulary = DrugVocabulary::from_names(["Vitamin B12+", "C.O.Q"]);
        assert_eq!(vocabulary.find_in("Vitamin B12+ daily"), vec!["Vitamin B12+"]);
        assert!(vocabulary.find_in("Vitamin B12").is_empty());
        assert!(vocabulary.find_in("CxOxQ").is_empty());
    }

    #[test]
    fn test_with_extra_appends_after_defaults() {
        let vocabulary = DrugVocabulary::with_extra(["Cetirizine", "paracetamol"]);
        assert_eq!(vocabulary.len(), DEFAULT_DRUGS.len() + 1);
        assert_eq!(vocabulary.names().last(), Some("Cetirizine"));
    }

    #[test]
    fn test_with_extra_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drugs.txt");
        std::fs::write(&path, "# local additions\nCetirizine\n\n  Azithromycin  \n").unwrap();

        let vocabulary = DrugVocabulary::with_extra_file(&path).unwrap();
        assert!(vocabulary.contains("azithromycin"));
        assert!(vocabulary.contains("Cetirizine"));
        assert!(!vocabulary.contains("# local additions"));
    }

    #[test]
    fn test_with_extra_file_missing_is_error() {
        assert!(DrugVocabulary::with_extra_file("/nonexistent/rxscan/drugs.txt").is_err());
    }

    #[test]
    fn test_empty_vocabulary_matches_nothing() {
        let vocabulary = DrugVocabulary::from_names(Vec::<String>::new());
        assert!(vocabulary.is_empty());
        assert!(vocabulary.find_in("Paracetamol").is_empty());
    }
}
