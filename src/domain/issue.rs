// ============================================================
// Layer 3 — Issue Domain Types
// ============================================================
// An issue report moves through two shapes:
//
//   IssueRecord     → the raw (text, code) pair read from the CSV
//   LabeledExample  → the cleaned text plus an integer class id
//
// LabeledExample also carries `id`, the row's position in the
// cleaned dataset. Partitions are compared on this id, so two
// rows with different text can never be confused.

use serde::{Deserialize, Serialize};

/// One row of the input CSV, restricted to the two columns we use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Free-text content of the issue report
    pub text: String,

    /// Categorical code as written in the CSV
    pub code: String,
}

impl IssueRecord {
    pub fn new(text: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: code.into(),
        }
    }
}

/// A cleaned, label-encoded example ready for splitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    /// Row identity: index in the cleaned dataset
    pub id: usize,

    pub text: String,

    /// Class index in `[0, num_classes)`
    pub label: usize,
}

impl LabeledExample {
    pub fn new(id: usize, text: impl Into<String>, label: usize) -> Self {
        Self {
            id,
            text: text.into(),
            label,
        }
    }
}

/// Anything that exposes a class index. Lets the splitter and the
/// weight calculator work on both labelled and tokenised examples.
pub trait Labeled {
    fn label(&self) -> usize;
}

impl Labeled for LabeledExample {
    fn label(&self) -> usize {
        self.label
    }
}

impl Labeled for usize {
    fn label(&self) -> usize {
        *self
    }
}
