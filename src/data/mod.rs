// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw CSV to GPU-ready tensor batches.
//
//   CSV file
//       │
//       ▼
//   CsvIssueLoader    → reads the text / label columns
//       │
//       ▼
//   Preprocessor      → newline + trim cleanup, drops duplicate texts
//       │
//       ▼
//   LabelEncoder      → string codes to class ids (domain layer)
//       │
//       ▼
//   Splitter          → seeded stratified train / val / test
//       │
//       ▼
//   ClassWeights      → inverse-frequency weights from train only
//       │
//       ▼
//   IssueTokenizer    → token ids + attention mask, truncated
//       │
//       ▼
//   IssueDataset      → tokenised samples behind Burn's Dataset trait
//       │
//       ▼
//   ClassificationBatcher → pads each batch to its longest sequence
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

use thiserror::Error;

/// Reads issue records from a CSV file
pub mod loader;

/// Cleans text and removes duplicate rows
pub mod preprocessor;

/// Stratified train / validation / test splitting
pub mod splitter;

/// Per-class loss weights
pub mod class_weights;

/// Owns the tokenizer and encodes labelled examples
pub mod tokenize;

/// Implements Burn's Dataset trait for tokenised issues
pub mod dataset;

/// Implements Burn's Batcher trait (padding collator)
pub mod batcher;

/// Failures in the data stages. All of them are fatal for a run.
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("column '{0}' not found in CSV header")]
    MissingColumn(String),

    #[error("class {class} has {count} member(s); stratified splitting needs at least 2")]
    InsufficientClassMembers { class: usize, count: usize },

    #[error("{side} split would hold {size} row(s), fewer than the {classes} classes")]
    SplitTooSmall {
        side:    &'static str,
        size:    usize,
        classes: usize,
    },

    #[error("split fraction {0} must lie strictly between 0 and 1")]
    InvalidFraction(f64),

    #[error("class {class} ('{name}') has no training examples; its weight is undefined")]
    MissingClass { class: usize, name: String },

    #[error("label '{0}' is not known to the label encoder")]
    UnknownLabel(String),

    #[error("label {label} is outside the {num_classes} encoded classes")]
    LabelOutOfRange { label: usize, num_classes: usize },

    #[error("class weights were computed for classes {weights:?} but the label encoder has {encoder:?}")]
    ClassOrderMismatch {
        weights: Vec<String>,
        encoder: Vec<String>,
    },

    #[error("dataset has {found} classes but the model is configured for {expected}")]
    ClassCountMismatch { expected: usize, found: usize },
}
