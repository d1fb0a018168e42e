// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Cleans issue records before label encoding.
//
// Cleaning steps (applied in order):
//   1. Replace every line break (\r\n, \r, \n) with one space
//   2. Trim leading/trailing whitespace
//   3. Drop rows whose cleaned text was already seen
//
// Deduplication runs on the *cleaned* text so that two rows
// differing only in a stray newline or trailing space count as
// the same report. The first occurrence in file order is kept.
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

use std::collections::HashSet;

use crate::data::DataError;
use crate::domain::issue::{IssueRecord, LabeledExample};
use crate::domain::label_encoder::LabelEncoder;

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Normalise a single text value.
    pub fn clean(&self, text: &str) -> String {
        // Collapse CRLF first so it becomes one space, not two
        text.replace("\r\n", " ")
            .replace(['\r', '\n'], " ")
            .trim()
            .to_string()
    }

    /// Clean every record and drop later duplicates of the same text.
    pub fn clean_all(&self, records: Vec<IssueRecord>) -> Vec<IssueRecord> {
        let before   = records.len();
        let mut seen = HashSet::with_capacity(records.len());

        let cleaned: Vec<IssueRecord> = records
            .into_iter()
            .filter_map(|r| {
                let text = self.clean(&r.text);
                // insert() returns false when the text is already present
                seen.insert(text.clone())
                    .then(|| IssueRecord { text, code: r.code })
            })
            .collect();

        tracing::debug!(
            "Preprocessing kept {} of {} rows ({} duplicates dropped)",
            cleaned.len(),
            before,
            before - cleaned.len()
        );
        cleaned
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Rename (text, code) → (text, label) and replace each code with its
/// class id. Row ids are assigned in order, starting at 0.
pub fn encode_records(
    records: &[IssueRecord],
    encoder: &LabelEncoder,
) -> Result<Vec<LabeledExample>, DataError> {
    records
        .iter()
        .enumerate()
        .map(|(id, r)| Ok(LabeledExample::new(id, r.text.clone(), encoder.encode(&r.code)?)))
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newlines_become_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("line one\nline two"), "line one line two");
        assert_eq!(p.clean("windows\r\nending"), "windows ending");
        assert_eq!(p.clean("old\rmac"), "old mac");
    }

    #[test]
    fn test_trims_edges() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("  hello world \n"), "hello world");
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(""), "");
    }

    #[test]
    fn test_keeps_first_duplicate() {
        let p = Preprocessor::new();
        let records = vec![
            IssueRecord::new("same text", "A"),
            IssueRecord::new("other", "B"),
            IssueRecord::new("same text", "C"),
        ];
        let out = p.clean_all(records);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], IssueRecord::new("same text", "A"));
        assert_eq!(out[1], IssueRecord::new("other", "B"));
    }

    #[test]
    fn test_duplicates_after_cleaning_are_dropped() {
        let p = Preprocessor::new();
        let records = vec![
            IssueRecord::new("crash\non save", "A"),
            IssueRecord::new("crash on save  ", "B"),
        ];
        let out = p.clean_all(records);
        assert_eq!(out, vec![IssueRecord::new("crash on save", "A")]);
    }

    #[test]
    fn test_output_has_no_newlines_or_edge_whitespace() {
        let p = Preprocessor::new();
        let records = vec![
            IssueRecord::new("\n lead", "A"),
            IssueRecord::new("trail \r\n", "A"),
            IssueRecord::new("mid\n\nbreak", "B"),
        ];
        for r in p.clean_all(records) {
            assert!(!r.text.contains('\n') && !r.text.contains('\r'));
            assert_eq!(r.text, r.text.trim());
        }
    }

    #[test]
    fn test_encode_records_assigns_ids_in_order() {
        let records = vec![IssueRecord::new("a", "y"), IssueRecord::new("b", "x")];
        let enc     = LabelEncoder::fit(records.iter().map(|r| r.code.as_str()));
        let out     = encode_records(&records, &enc).unwrap();
        assert_eq!(out[0], LabeledExample::new(0, "a", 1));
        assert_eq!(out[1], LabeledExample::new(1, "b", 0));
    }
}
