// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load, clean, split, weigh  (pipeline.rs)
//   Step 2: Load / build tokenizer     (Layer 6 - infra)
//   Step 3: Tokenise partitions        (Layer 4 - data)
//   Step 4: Save config + labels       (Layer 6 - infra)
//   Step 5: Build model + loss         (Layer 5 - ml)
//   Step 6: Run training loop          (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use std::path::Path;

use anyhow::Result;
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use crate::application::pipeline::{prepare, PreparedData};
use crate::data::{dataset::IssueDataset, tokenize::IssueTokenizer};
use crate::domain::issue::LabeledExample;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
    tokenizer_store::TokenizerStore,
};
use crate::ml::{
    loss::WeightedCrossEntropy,
    model::IssueClassifierConfig,
    trainer::{run_training, TrainingData},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All settings of a run. Saved as train_config.json next to the
// checkpoints so `evaluate` can rebuild the same test partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:      String,
    pub output_dir:     String,
    pub text_column:    String,
    pub label_column:   String,
    pub tokenizer_path: String,

    /// Burn record of a pretrained `TextEncoder`
    pub pretrained_encoder: Option<String>,

    pub num_classes:      usize,
    pub max_seq_len:      usize,
    pub learning_rate:    f64,
    pub train_batch_size: usize,
    pub eval_batch_size:  usize,
    pub epochs:           usize,
    pub weight_decay:     f64,
    pub seed:             u64,
    pub test_fraction:    f64,
    pub val_fraction:     f64,

    pub d_model:    usize,
    pub num_heads:  usize,
    pub num_layers: usize,
    pub d_ff:       usize,
    pub dropout:    f64,

    /// Vocabulary cap when a word-level tokenizer has to be built
    pub vocab_size: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:          "../data/dataInfoTypes.csv".to_string(),
            output_dir:         "./results".to_string(),
            text_column:        "Text Content".to_string(),
            label_column:       "Code".to_string(),
            tokenizer_path:     "bert-base-uncased/tokenizer.json".to_string(),
            pretrained_encoder: None,
            num_classes:        13,
            max_seq_len:        512,
            learning_rate:      2e-5,
            train_batch_size:   16,
            eval_batch_size:    16,
            epochs:             10,
            weight_decay:       0.01,
            seed:               10,
            test_fraction:      0.1,
            val_fraction:       0.05,
            d_model:            256,
            num_heads:          8,
            num_layers:         6,
            d_ff:               1024,
            dropout:            0.1,
            vocab_size:         30522,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute<B: AutodiffBackend>(&self, device: B::Device) -> Result<Vec<EpochMetrics>> {
        let cfg = &self.config;

        // ── Step 1: Data preparation ──────────────────────────────────────────
        let PreparedData { encoder, partitions, weights } = prepare(cfg)?;
        println!("\nClass weights:");
        for (name, w) in weights.classes().iter().zip(weights.as_slice()) {
            println!("  {:<24} {:.4}", name, w);
        }

        let ckpt = CheckpointManager::new(&cfg.output_dir)?;

        // ── Step 2: Tokenizer ─────────────────────────────────────────────────
        let (tokenizer, tokenizer_path) = resolve_tokenizer(cfg, &ckpt, &partitions.train)?;
        let tokenizer = IssueTokenizer::new(tokenizer, cfg.max_seq_len)?;

        // ── Step 3: Tokenise ──────────────────────────────────────────────────
        let train = tokenizer.tokenize(&partitions.train)?;
        let validation = tokenizer.tokenize(&partitions.validation)?;
        tracing::info!(
            "Tokenised {} train and {} validation samples",
            train.len(),
            validation.len()
        );
        let truncated = train.iter().filter(|t| t.seq_len() >= cfg.max_seq_len).count();
        if truncated > 0 {
            tracing::debug!("{} training texts truncated to {} tokens", truncated, cfg.max_seq_len);
        }

        // ── Step 4: Persist what evaluation needs ─────────────────────────────
        let model_cfg = IssueClassifierConfig::new(
            tokenizer.vocab_size(),
            cfg.max_seq_len,
            cfg.d_model,
            cfg.num_heads,
            cfg.num_layers,
            cfg.d_ff,
            cfg.num_classes,
            cfg.dropout,
        );
        let saved_cfg = TrainConfig { tokenizer_path, ..cfg.clone() };
        ckpt.save_config(&saved_cfg)?;
        ckpt.save_labels(&encoder)?;
        ckpt.save_model_config(&model_cfg)?;

        // ── Step 5: Model and weighted loss ───────────────────────────────────
        let mut model = model_cfg.init::<B>(&device);
        if let Some(path) = &cfg.pretrained_encoder {
            model = model.with_pretrained_encoder(Path::new(path), &device)?;
        }
        let loss_fn = WeightedCrossEntropy::new(&weights, &encoder)?;

        // ── Step 6: Training loop (Layer 5) ───────────────────────────────────
        let data = TrainingData {
            train:      IssueDataset::new(train),
            validation: IssueDataset::new(validation),
            pad_id:     tokenizer.pad_id() as usize,
        };
        let metrics = MetricsLogger::new(ckpt.dir())?;
        run_training(cfg, model, &loss_fn, data, &ckpt, &metrics, device)
    }
}

/// Load the configured tokenizer, or fall back to a word-level one built
/// from the training partition and stored in the output directory.
///
/// Returns the tokenizer and the path it was read from.
fn resolve_tokenizer(
    cfg:   &TrainConfig,
    ckpt:  &CheckpointManager,
    train: &[LabeledExample],
) -> Result<(Tokenizer, String)> {
    let configured = TokenizerStore::new(&cfg.tokenizer_path);
    if configured.exists() {
        return Ok((configured.load()?, cfg.tokenizer_path.clone()));
    }

    tracing::warn!(
        "Tokenizer '{}' not found; using a word-level tokenizer built from the training partition",
        cfg.tokenizer_path
    );
    let fallback = TokenizerStore::new(ckpt.dir().join("tokenizer.json"));
    let texts: Vec<&str> = train.iter().map(|e| e.text.as_str()).collect();
    let tokenizer = fallback.load_or_build(&texts, cfg.vocab_size)?;
    Ok((tokenizer, fallback.path().display().to_string()))
}
