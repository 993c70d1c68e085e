//! Pattern rules for the marker-based prescription fields.
//!
//! Each rule is a pure function of the text. Name rules only look at the
//! first match; the quantity rule collects every occurrence.

use std::sync::LazyLock;

use regex::Regex;

/// `PATIENT (M) / 45Y John Smith` - group 2 is the trailing free text on the line.
static PATIENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PATIENT\s*\([MF]\)\s*/\s*(\d+Y)\s*(.*)").unwrap());

/// `Dr. Patel`, `Dr.Singh` - a single alphabetic run.
static DOCTOR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Dr\.\s*([A-Za-z]+)").unwrap());

/// `Tot: 10`
static QUANTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Tot:\s*(\d+)").unwrap());

/// Patient name candidates. At most one, taken from the first `PATIENT` marker.
///
/// The whitespace after the age may span a line break, so a name that OCR
/// pushed onto the next line is still picked up. The candidate itself ends
/// at the end of its line. A marker with nothing after it is dropped rather
/// than reported as an empty name.
pub fn patient_names(text: &str) -> Vec<String> {
    PATIENT_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
        .into_iter()
        .collect()
}

/// Doctor name candidates. At most one: the alphabetic run after the first `Dr.`.
pub fn doctor_names(text: &str) -> Vec<String> {
    DOCTOR_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .into_iter()
        .collect()
}

/// Every `Tot:` quantity, in text order.
pub fn quantities(text: &str) -> Vec<String> {
    QUANTITY_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}
