// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and AdamW.
//
// Key Burn insight:
//   - Training runs on B (an AutodiffBackend) for gradients
//   - model.valid() returns the model on B::InnerBackend
//   - The validation batcher must also use B::InnerBackend
//   - argmax(1) returns [batch,1] so we flatten before .equal()
//
// The loss is always the class-weighted cross-entropy, for both
// the gradient step and the validation loss.
//
// Reference: Burn Book §5, Loshchilov & Hutter (2019) AdamW

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ClassificationBatcher, dataset::IssueDataset, DataError};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::loss::WeightedCrossEntropy;
use crate::ml::model::IssueClassifier;

/// Tokenised train and validation sets plus the collator's pad id.
pub struct TrainingData {
    pub train:      IssueDataset,
    pub validation: IssueDataset,
    pub pad_id:     usize,
}

pub fn run_training<B: AutodiffBackend>(
    cfg:     &TrainConfig,
    model:   IssueClassifier<B>,
    loss_fn: &WeightedCrossEntropy,
    data:    TrainingData,
    ckpt:    &CheckpointManager,
    metrics: &MetricsLogger,
    device:  B::Device,
) -> Result<Vec<EpochMetrics>> {
    if model.num_classes() != loss_fn.num_classes() {
        return Err(DataError::ClassCountMismatch {
            expected: model.num_classes(),
            found:    loss_fn.num_classes(),
        }
        .into());
    }

    let mut model = model;

    let mut optim = AdamWConfig::new()
        .with_weight_decay(cfg.weight_decay as f32)
        .init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = ClassificationBatcher::<B>::new(device.clone(), data.pad_id, cfg.max_seq_len);
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.train_batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(data.train);

    // ── Validation data loader (InnerBackend, no autodiff) ────────────────────
    let val_batcher = ClassificationBatcher::<B::InnerBackend>::new(device.clone(), data.pad_id, cfg.max_seq_len);
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.eval_batch_size)
        .num_workers(1)
        .build(data.validation);

    let mut history = Vec::with_capacity(cfg.epochs);
    let mut best_val_loss = f64::INFINITY;

    for epoch in 1..=cfg.epochs {
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let logits = model.forward(batch.input_ids, batch.mask_pad);
            let loss   = loss_fn.forward(logits, batch.labels);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        // dropout disabled for deterministic evaluation
        let model_valid = model.valid();

        let mut val_loss_sum  = 0.0f64;
        let mut val_batches   = 0usize;
        let mut correct       = 0usize;
        let mut total_samples = 0usize;

        for batch in val_loader.iter() {
            let logits = model_valid.forward(batch.input_ids, batch.mask_pad);

            val_loss_sum += loss_fn
                .forward(logits.clone(), batch.labels.clone())
                .into_scalar()
                .elem::<f64>();
            val_batches += 1;

            total_samples += batch.labels.dims()[0];
            let hits: i64 = logits
                .argmax(1)
                .flatten::<1>(0, 1)
                .equal(batch.labels)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();
            correct += hits as usize;
        }

        let avg_val_loss = if val_batches   > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };
        let val_accuracy = if total_samples > 0 { correct as f64 / total_samples as f64 } else { 0.0 };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}%",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss, val_accuracy * 100.0,
        );

        let m = EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, val_accuracy);
        metrics.log(&m)?;
        if m.is_improvement(best_val_loss) {
            tracing::info!("New best val_loss={:.4} at epoch {}", avg_val_loss, epoch);
            best_val_loss = avg_val_loss;
        }
        history.push(m);

        ckpt.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
    }

    tracing::info!("Training complete! Metrics in '{}'", metrics.csv_path().display());
    Ok(history)
}
