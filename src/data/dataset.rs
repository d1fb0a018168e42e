use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One tokenised issue, truncated but not yet padded.
/// Padding happens per batch in `ClassificationBatcher`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizedIssue {
    pub id:             usize,
    pub label:          usize,
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
}

impl TokenizedIssue {
    pub fn seq_len(&self) -> usize {
        self.input_ids.len()
    }
}

pub struct IssueDataset {
    samples: Vec<TokenizedIssue>,
}

impl IssueDataset {
    pub fn new(samples: Vec<TokenizedIssue>) -> Self { Self { samples } }
}

impl Dataset<TokenizedIssue> for IssueDataset {
    fn get(&self, index: usize) -> Option<TokenizedIssue> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
