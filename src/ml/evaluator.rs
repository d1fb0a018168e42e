// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Runs a trained classifier over tokenised samples and returns
// the predicted class per sample, in input order.

use anyhow::Result;
use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::{batcher::ClassificationBatcher, dataset::TokenizedIssue};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{IssueClassifier, IssueClassifierConfig};

pub struct Evaluator<B: Backend> {
    model:   IssueClassifier<B>,
    batcher: ClassificationBatcher<B>,
}

impl<B: Backend> Evaluator<B> {
    pub fn new(model: IssueClassifier<B>, device: B::Device, pad_id: usize, max_seq_len: usize) -> Self {
        Self {
            model,
            batcher: ClassificationBatcher::new(device, pad_id, max_seq_len),
        }
    }

    /// Rebuild the model from its saved config and load the latest weights.
    pub fn from_checkpoint(
        ckpt:   &CheckpointManager,
        device: B::Device,
        pad_id: usize,
    ) -> Result<Self> {
        let model_cfg: IssueClassifierConfig = ckpt.load_model_config()?;
        let model = ckpt.load_model(model_cfg.init::<B>(&device), &device)?;
        tracing::info!("Model loaded from checkpoint");
        Ok(Self::new(model, device, pad_id, model_cfg.max_seq_len))
    }

    pub fn num_classes(&self) -> usize {
        self.model.num_classes()
    }

    /// Predicted class ids, one per sample, same order as `samples`.
    pub fn predict(&self, samples: &[TokenizedIssue], batch_size: usize) -> Result<Vec<usize>> {
        let mut predictions = Vec::with_capacity(samples.len());

        for chunk in samples.chunks(batch_size.max(1)) {
            let batch  = self.batcher.batch(chunk.to_vec());
            let logits = self.model.forward(batch.input_ids, batch.mask_pad);

            let ids: Vec<i64> = logits
                .argmax(1)
                .flatten::<1>(0, 1)
                .into_data()
                .convert::<i64>()
                .to_vec()
                .map_err(|e| anyhow::anyhow!("Cannot read predictions: {e:?}"))?;
            predictions.extend(ids.into_iter().map(|id| id as usize));
        }

        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    fn sample(ids: &[u32]) -> TokenizedIssue {
        TokenizedIssue {
            id: 0,
            label: 0,
            input_ids: ids.to_vec(),
            attention_mask: vec![1; ids.len()],
        }
    }

    #[test]
    fn test_one_prediction_per_sample_in_range() {
        let device = Default::default();
        let model  = IssueClassifierConfig::new(20, 8, 16, 2, 1, 32, 3, 0.0).init::<NdArray>(&device);
        let eval   = Evaluator::new(model, device, 0, 8);

        let samples: Vec<TokenizedIssue> = (1..8).map(|i| sample(&[i, i + 1])).collect();
        let preds = eval.predict(&samples, 3).unwrap();

        assert_eq!(preds.len(), samples.len());
        assert!(preds.iter().all(|&p| p < 3));
        assert_eq!(eval.num_classes(), 3);
    }

    #[test]
    fn test_batch_size_does_not_change_predictions() {
        let device = Default::default();
        let model  = IssueClassifierConfig::new(20, 8, 16, 2, 1, 32, 3, 0.0).init::<NdArray>(&device);
        let eval   = Evaluator::new(model, device, 0, 8);

        let samples: Vec<TokenizedIssue> = (1..10).map(|i| sample(&[i, 2, 3])).collect();
        assert_eq!(eval.predict(&samples, 1).unwrap(), eval.predict(&samples, 4).unwrap());
    }
}
