// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Scores the latest checkpoint on the test partition:
//
//   Step 1: Load train_config.json + labels.json   (Layer 6 - infra)
//   Step 2: Reload and re-split the CSV            (pipeline.rs)
//   Step 3: Check the label encoding still matches
//   Step 4: Tokenise the test partition            (Layer 4 - data)
//   Step 5: Predict with the latest checkpoint     (Layer 5 - ml)
//   Step 6: Print the classification report       (Layer 6 - infra)
//
// The split is deterministic in (data, seed), so step 2 yields
// the same test rows that were held out during training.

use std::path::PathBuf;

use anyhow::{bail, Result};
use burn::prelude::Backend;

use crate::application::pipeline::{load_labeled_dataset, LabeledDataset};
use crate::data::{splitter::split_partitions, tokenize::IssueTokenizer, DataError};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::ClassificationReport,
    tokenizer_store::TokenizerStore,
};
use crate::ml::evaluator::Evaluator;

pub struct EvaluateUseCase {
    output_dir: PathBuf,
}

impl EvaluateUseCase {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    pub fn execute<B: Backend>(&self, device: B::Device) -> Result<ClassificationReport> {
        if !self.output_dir.is_dir() {
            bail!(
                "Output directory '{}' not found. Have you run 'train' first?",
                self.output_dir.display()
            );
        }

        // ── Step 1: Saved run ─────────────────────────────────────────────────
        let ckpt        = CheckpointManager::new(&self.output_dir)?;
        let cfg         = ckpt.load_config()?;
        let saved_label = ckpt.load_labels()?;

        // ── Step 2 + 3: Same data, same split ─────────────────────────────────
        let LabeledDataset { encoder, examples, .. } = load_labeled_dataset(&cfg)?;
        if encoder != saved_label {
            bail!(
                "Labels in '{}' are {:?} but the checkpoint was trained on {:?}",
                cfg.data_path,
                encoder.classes(),
                saved_label.classes()
            );
        }
        let partitions = split_partitions(examples, cfg.test_fraction, cfg.val_fraction, cfg.seed)?;

        // ── Step 4: Tokenise ──────────────────────────────────────────────────
        let tokenizer = IssueTokenizer::new(TokenizerStore::new(&cfg.tokenizer_path).load()?, cfg.max_seq_len)?;
        let test      = tokenizer.tokenize(&partitions.test)?;

        // ── Step 5: Predict ───────────────────────────────────────────────────
        let evaluator = Evaluator::<B>::from_checkpoint(&ckpt, device, tokenizer.pad_id() as usize)?;
        if evaluator.num_classes() != encoder.len() {
            return Err(DataError::ClassCountMismatch {
                expected: evaluator.num_classes(),
                found:    encoder.len(),
            }
            .into());
        }

        let y_pred = evaluator.predict(&test, cfg.eval_batch_size)?;
        let y_true: Vec<usize> = test.iter().map(|t| t.label).collect();

        // ── Step 6: Report ────────────────────────────────────────────────────
        let report = ClassificationReport::from_predictions(&y_true, &y_pred, encoder.classes());
        println!("\n{report}");
        tracing::info!("Test accuracy: {:.2}%", report.accuracy * 100.0);

        Ok(report)
    }
}
