// ============================================================
// Layer 2 — Shared Data Preparation
// ============================================================
// Stages 1–3 of every command:
//
//   Step 1: Load the CSV              (Layer 4 - data)
//   Step 2: Clean + dedupe            (Layer 4 - data)
//   Step 3: Fit the label encoder     (Layer 3 - domain)
//   Step 4: Stratified split          (Layer 4 - data)
//   Step 5: Class weights (train)     (Layer 4 - data)
//
// `train` and `inspect` run all five steps; `evaluate` re-runs
// steps 1–4 with the saved seed to regenerate the test partition.

use anyhow::Result;
use std::collections::BTreeMap;

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    class_weights::ClassWeights,
    loader::CsvIssueLoader,
    preprocessor::{encode_records, Preprocessor},
    splitter::{split_partitions, Partitions},
    DataError,
};
use crate::domain::{
    issue::{IssueRecord, LabeledExample},
    label_encoder::LabelEncoder,
    traits::RecordSource,
};

/// Row and class counts of the CSV as read, before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub rows: usize,
    /// (code, count), most frequent first, ties alphabetical
    pub class_counts: Vec<(String, usize)>,
}

impl DatasetStats {
    pub fn from_records(records: &[IssueRecord]) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for r in records {
            *counts.entry(r.code.as_str()).or_default() += 1;
        }

        let mut class_counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(code, n)| (code.to_string(), n))
            .collect();
        // BTreeMap order is alphabetical; a stable sort keeps it for ties
        class_counts.sort_by(|a, b| b.1.cmp(&a.1));

        Self { rows: records.len(), class_counts }
    }

    /// Print the statistics to stdout.
    pub fn print(&self) {
        let names: Vec<&str> = self.class_counts.iter().map(|(c, _)| c.as_str()).collect();
        println!("Total {} Classes", self.class_counts.len());
        println!("{:?}", names);
        println!("Total {} sentences\n", self.rows);

        println!("--------------Class Distribution----------");
        for (code, n) in &self.class_counts {
            println!("{:<24} {}", code, n);
        }
    }
}

/// The cleaned, label-encoded dataset.
pub struct LabeledDataset {
    pub stats:    DatasetStats,
    pub encoder:  LabelEncoder,
    pub examples: Vec<LabeledExample>,
}

/// Everything `train` needs before tokenisation.
pub struct PreparedData {
    pub encoder:    LabelEncoder,
    pub partitions: Partitions,
    pub weights:    ClassWeights,
}

/// Steps 1–3: load, clean and label-encode the configured CSV.
///
/// Fails if the number of distinct labels differs from `cfg.num_classes`.
pub fn load_labeled_dataset(cfg: &TrainConfig) -> Result<LabeledDataset> {
    let loader = CsvIssueLoader::new(&cfg.data_path, &cfg.text_column, &cfg.label_column);
    tracing::info!("Reading issue reports from '{}'", loader.path().display());
    let raw    = loader.load_all()?;
    let stats  = DatasetStats::from_records(&raw);

    let cleaned = Preprocessor::new().clean_all(raw);
    tracing::info!("{} rows after cleaning", cleaned.len());

    let encoder = LabelEncoder::fit(cleaned.iter().map(|r| r.code.as_str()));
    if encoder.len() != cfg.num_classes {
        return Err(DataError::ClassCountMismatch {
            expected: cfg.num_classes,
            found:    encoder.len(),
        }
        .into());
    }

    let examples = encode_records(&cleaned, &encoder)?;
    Ok(LabeledDataset { stats, encoder, examples })
}

/// Steps 1–5, printing dataset statistics along the way.
pub fn prepare(cfg: &TrainConfig) -> Result<PreparedData> {
    let LabeledDataset { stats, encoder, examples } = load_labeled_dataset(cfg)?;
    stats.print();
    println!("\n------Final Columns on dataset---------");
    println!("{{\"text\", \"label\"}}");

    let partitions = split_partitions(examples, cfg.test_fraction, cfg.val_fraction, cfg.seed)?;
    tracing::info!(
        "Split: {} train, {} validation, {} test",
        partitions.train.len(),
        partitions.validation.len(),
        partitions.test.len()
    );

    let weights = ClassWeights::compute(&partitions.train, &encoder)?;
    Ok(PreparedData { encoder, partitions, weights })
}

// ─── Test Fixtures ────────────────────────────────────────────────────────────

/// Write a 3-class CSV (10 distinct texts per class plus duplicates and
/// multi-line cells) and return a small config pointing at it.
#[cfg(test)]
pub(crate) fn fixture_config(dir: &std::path::Path) -> TrainConfig {
    let mut csv = String::from("Id,Text Content,Code,Reporter\n");
    let topics = [
        ("Bug",  "crash null pointer stack trace"),
        ("Docs", "readme typo missing guide"),
        ("UI",   "button color layout dark theme"),
    ];
    let mut row = 0;
    for (code, words) in topics {
        for i in 0..10 {
            row += 1;
            if i == 0 {
                // Multi-line cell becomes a single line after cleaning
                csv.push_str(&format!("{row},\"{words}\nsecond line {i}\",{code},alice\n"));
            } else {
                csv.push_str(&format!("{row},{words} case {i},{code},bob\n"));
            }
        }
        // Duplicate text, dropped by the preprocessor
        row += 1;
        csv.push_str(&format!("{row},  {words} case 1 ,{code},carol\n"));
    }

    let data_path = dir.join("issues.csv");
    std::fs::write(&data_path, csv).unwrap();

    TrainConfig {
        data_path:        data_path.display().to_string(),
        output_dir:       dir.join("results").display().to_string(),
        tokenizer_path:   dir.join("no-such-tokenizer.json").display().to_string(),
        num_classes:      3,
        max_seq_len:      16,
        learning_rate:    1e-3,
        train_batch_size: 4,
        eval_batch_size:  4,
        epochs:           1,
        test_fraction:    0.2,
        val_fraction:     0.2,
        d_model:          16,
        num_heads:        2,
        num_layers:       1,
        d_ff:             32,
        dropout:          0.0,
        vocab_size:       200,
        ..TrainConfig::default()
    }
}
