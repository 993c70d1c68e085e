use std::collections::HashSet;

use crate::error::Result;

use super::DrugVocabulary;

/// Person-name recognition over free text.
///
/// Implementations may be statistical or rule based. Output is a list of
/// candidate names in text order and is kept apart from the rule-based
/// entity record.
pub trait NameFinder: Send + Sync {
    fn find_person_names(&self, text: &str) -> Result<Vec<String>>;
}

/// Words that appear capitalized on prescriptions but are never part of a name.
const MARKER_WORDS: &[&str] = &[
    "PATIENT", "Patient", "Dr", "Tot", "Total", "Tab", "Tabs", "Cap", "Caps", "Syp", "Inj",
    "Rx", "Sig", "Date", "Age", "Sex", "Name", "Hospital", "Clinic", "Daily", "Morning",
    "Night", "Before", "After", "Food",
];

/// Heuristic finder: runs of two or three capitalized words on one line.
///
/// Runs that touch a marker word or a vocabulary drug are discarded.
pub struct CapitalizedNameFinder {
    vocabulary: DrugVocabulary,
}

impl CapitalizedNameFinder {
    pub fn new(vocabulary: DrugVocabulary) -> Self {
        Self { vocabulary }
    }

    fn is_name_word(word: &str) -> bool {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) if first.is_uppercase() => {
                let rest: Vec<char> = chars.collect();
                !rest.is_empty()
                    && rest.iter().all(|c| c.is_alphabetic())
                    && rest.iter().any(|c| c.is_lowercase())
            }
            _ => false,
        }
    }

    fn is_excluded(&self, word: &str) -> bool {
        MARKER_WORDS.contains(&word) || self.vocabulary.contains(word)
    }

    fn flush(&self, run: &mut Vec<&str>, seen: &mut HashSet<String>, names: &mut Vec<String>) {
        if (2..=3).contains(&run.len()) && !run.iter().any(|word| self.is_excluded(word)) {
            let name = run.join(" ");
            if seen.insert(name.clone()) {
                names.push(name);
            }
        }
        run.clear();
    }
}

impl NameFinder for CapitalizedNameFinder {
    fn find_person_names(&self, text: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();

        for line in text.lines() {
            let mut run: Vec<&str> = Vec::new();
            for token in line.split_whitespace() {
                let word = token.trim_matches(|c: char| !c.is_alphanumeric());
                // Trailing punctuation ends the run after this word.
                let closes_run = token.ends_with([',', ';', ':', '.']);

                if Self::is_name_word(word) {
                    run.push(word);
                    if closes_run {
                        self.flush(&mut run, &mut seen, &mut names);
                    }
                } else {
                    self.flush(&mut run, &mut seen, &mut names);
                }
            }
            self.flush(&mut run, &mut seen, &mut names);
        }

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finder() -> CapitalizedNameFinder {
        CapitalizedNameFinder::new(DrugVocabulary::default())
    }

    #[test]
    fn test_finds_two_word_names() {
        let names = finder()
            .find_person_names("PATIENT (F) / 30Y Jane Doe\nDr. Singh")
            .unwrap();
        assert_eq!(names, vec!["Jane Doe"]);
    }

    #[test]
    fn test_finds_three_word_names() {
        let names = finder()
            .find_person_names("Referred by Anil Kumar Sharma today")
            .unwrap();
        assert_eq!(names, vec!["Anil Kumar Sharma"]);
    }

    #[test]
    fn test_single_capitalized_word_is_not_a_name() {
        assert!(finder().find_person_names("Paracetamol 500mg").unwrap().is_empty());
        assert!(finder().find_person_names("Singh").unwrap().is_empty());
    }

    #[test]
    fn test_long_capitalized_runs_rejected() {
        let names = finder()
            .find_person_names("City General Teaching Hospital Annex")
            .unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn test_runs_with_drugs_or_markers_rejected() {
        let names = finder()
            .find_person_names("Tab Paracetamol\nMorning Dose\nJane Doe")
            .unwrap();
        assert_eq!(names, vec!["Jane Doe"]);
    }

    #[test]
    fn test_all_caps_words_are_not_names() {
        assert!(finder().find_person_names("JOHN SMITH").unwrap().is_empty());
    }

    #[test]
    fn test_runs_do_not_cross_lines() {
        assert!(finder().find_person_names("Jane\nDoe").unwrap().is_empty());
    }

    #[test]
    fn test_punctuation_splits_runs() {
        let names = finder()
            .find_person_names("Jane Doe, Ravi Shankar")
            .unwrap();
        assert_eq!(names, vec!["Jane Doe", "Ravi Shankar"]);
    }

    #[test]
    fn test_duplicates_reported_once_in_text_order() {
        let names = finder()
            .find_person_names("Jane Doe\nRavi Shankar\nJane Doe")
            .unwrap();
        assert_eq!(names, vec!["Jane Doe", "Ravi Shankar"]);
    }
}
