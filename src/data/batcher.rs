// ============================================================
// Layer 4 — Padding Collator
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<TokenizedIssue>
// into tensors for the classifier.
//
// Samples arrive truncated but unpadded, each with its own
// length. Burn's `generate_padding_mask` pads every sequence to
// the longest one *in this batch* (capped at max_seq_len) and
// returns a boolean mask where `true` marks a padding position.
//
//   Input:  N samples of lengths l_1 .. l_N
//   Output: input_ids [N, max(l_i)], mask_pad [N, max(l_i)], labels [N]
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    nn::attention::generate_padding_mask,
    prelude::*,
};

use crate::data::dataset::TokenizedIssue;

/// A padded batch ready for the forward pass.
#[derive(Debug, Clone)]
pub struct ClassificationBatch<B: Backend> {
    /// Token ids - shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// Padding mask - shape: [batch_size, seq_len], true = padding
    pub mask_pad: Tensor<B, 2, Bool>,

    /// Class ids - shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct ClassificationBatcher<B: Backend> {
    pub device:      B::Device,
    pub pad_id:      usize,
    pub max_seq_len: usize,
}

impl<B: Backend> ClassificationBatcher<B> {
    pub fn new(device: B::Device, pad_id: usize, max_seq_len: usize) -> Self {
        Self { device, pad_id, max_seq_len }
    }
}

impl<B: Backend> Batcher<TokenizedIssue, ClassificationBatch<B>> for ClassificationBatcher<B> {
    fn batch(&self, items: Vec<TokenizedIssue>) -> ClassificationBatch<B> {
        let labels: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        let tokens_list: Vec<Vec<usize>> = items
            .into_iter()
            .map(|s| s.input_ids.into_iter().map(|id| id as usize).collect())
            .collect();

        let mask = generate_padding_mask(
            self.pad_id,
            tokens_list,
            Some(self.max_seq_len),
            &self.device,
        );

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        ClassificationBatch {
            input_ids: mask.tensor,
            mask_pad:  mask.mask,
            labels,
        }
    }
}
