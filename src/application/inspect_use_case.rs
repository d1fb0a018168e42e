// ============================================================
// Layer 2 — InspectUseCase
// ============================================================
// Runs data preparation only (load, clean, split, weigh) and
// prints what training would see. Nothing is written to disk.

use anyhow::Result;

use crate::application::pipeline::{prepare, PreparedData};
use crate::application::train_use_case::TrainConfig;
use crate::data::splitter::Partitions;

pub struct InspectUseCase {
    config: TrainConfig,
}

impl InspectUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<PreparedData> {
        let prepared = prepare(&self.config)?;
        let names    = prepared.encoder.classes();

        println!("\n------Partitions---------");
        println!("{:<24} {:>7} {:>11} {:>6}", "class", "train", "validation", "test");
        for (class, name) in names.iter().enumerate() {
            let [train, val, test] = class_counts(&prepared.partitions, class);
            println!("{:<24} {:>7} {:>11} {:>6}", name, train, val, test);
        }
        println!(
            "{:<24} {:>7} {:>11} {:>6}",
            "total",
            prepared.partitions.train.len(),
            prepared.partitions.validation.len(),
            prepared.partitions.test.len()
        );

        println!("\n------Class Weights ({} classes)---------", prepared.weights.len());
        for (name, w) in prepared.weights.classes().iter().zip(prepared.weights.as_slice()) {
            println!("{:<24} {:.6}", name, w);
        }

        Ok(prepared)
    }
}

/// Rows of `class` in train, validation and test.
fn class_counts(p: &Partitions, class: usize) -> [usize; 3] {
    [&p.train, &p.validation, &p.test].map(|part| part.iter().filter(|e| e.label == class).count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::fixture_config;

    #[test]
    fn test_inspect_leaves_output_dir_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = fixture_config(dir.path());

        let prepared = InspectUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(prepared.partitions.total(), 30);
        assert!(!std::path::Path::new(&cfg.output_dir).exists());
    }

    #[test]
    fn test_class_counts_cover_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let prepared = prepare(&fixture_config(dir.path())).unwrap();

        let per_class: usize = (0..3)
            .map(|c| class_counts(&prepared.partitions, c).iter().sum::<usize>())
            .sum();
        assert_eq!(per_class, 30);
        assert_eq!(class_counts(&prepared.partitions, 0)[2], 2);
    }
}
