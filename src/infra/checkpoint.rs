// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores everything needed to reuse a trained model.
//
// File layout under the output directory:
//   results/
//     model_epoch_1.mpk      ← weights after epoch 1
//     model_epoch_2.mpk      ← weights after epoch 2
//     ...
//     latest_epoch.json      ← number of the latest saved epoch
//     train_config.json      ← run configuration (seed, paths, ...)
//     model_config.json      ← exact architecture incl. vocab size
//     labels.json            ← class names in class-id order
//
// Weights go through Burn's CompactRecorder (MessagePack, half
// precision). Loading fails if the architecture doesn't match,
// which is why the model config is saved alongside.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::CompactRecorder,
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::label_encoder::LabelEncoder;
use crate::ml::model::{IssueClassifier, IssueClassifierConfig};

/// Manages saving and loading of model checkpoints.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a manager for `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write {dir}/model_epoch_{epoch}.mpk and update latest_epoch.json.
    pub fn save_model<B: Backend>(&self, model: &IssueClassifier<B>, epoch: usize) -> Result<()> {
        // The recorder adds the file extension
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        model
            .clone()
            .save_file(path.clone(), &CompactRecorder::new())
            .map_err(|e| {
                anyhow::anyhow!("Failed to save checkpoint to '{}': {e:?}", path.display())
            })?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the weights of the latest saved epoch into `model`.
    pub fn load_model<B: Backend>(
        &self,
        model:  IssueClassifier<B>,
        device: &B::Device,
    ) -> Result<IssueClassifier<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        model
            .load_file(path.clone(), &CompactRecorder::new(), device)
            .map_err(|e| {
                anyhow::anyhow!(
                    "Cannot load checkpoint '{}': {e:?}. Have you trained the model first?",
                    path.display()
                )
            })
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json("train_config.json", cfg)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        self.read_json("train_config.json")
    }

    pub fn save_model_config(&self, cfg: &IssueClassifierConfig) -> Result<()> {
        let path = self.dir.join("model_config.json");
        cfg.save(&path)
            .with_context(|| format!("Cannot write model config to '{}'", path.display()))
    }

    pub fn load_model_config(&self) -> Result<IssueClassifierConfig> {
        let path = self.dir.join("model_config.json");
        IssueClassifierConfig::load(&path).map_err(|e| {
            anyhow::anyhow!("Cannot read model config from '{}': {e:?}", path.display())
        })
    }

    pub fn save_labels(&self, encoder: &LabelEncoder) -> Result<()> {
        self.write_json("labels.json", encoder)
    }

    pub fn load_labels(&self) -> Result<LabelEncoder> {
        self.read_json("labels.json")
    }

    /// Read latest_epoch.json and return the epoch number.
    /// Returns an error if training hasn't been run yet.
    pub fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");
        let s = fs::read_to_string(&path)
            .with_context(|| {
                format!("Cannot find '{}'. Have you run 'train' first?", path.display())
            })?;
        Ok(serde_json::from_str::<usize>(&s)?)
    }

    fn write_json<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!("Cannot read '{}'. Make sure you have run 'train' first.", path.display())
            })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed JSON in '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    fn tiny_config() -> IssueClassifierConfig {
        IssueClassifierConfig::new(12, 6, 8, 2, 1, 16, 3, 0.0)
    }

    #[test]
    fn test_latest_epoch_tracks_last_save() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path().join("out")).unwrap();
        let device = Default::default();
        let model  = tiny_config().init::<NdArray>(&device);

        assert!(ckpt.latest_epoch().is_err());
        ckpt.save_model(&model, 1).unwrap();
        ckpt.save_model(&model, 2).unwrap();
        assert_eq!(ckpt.latest_epoch().unwrap(), 2);

        let restored = ckpt.load_model(tiny_config().init::<NdArray>(&device), &device).unwrap();
        assert_eq!(restored.num_classes(), 3);
    }

    #[test]
    fn test_json_artifacts_round_trip() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();

        let enc = LabelEncoder::fit(["b", "a"]);
        ckpt.save_labels(&enc).unwrap();
        assert_eq!(ckpt.load_labels().unwrap(), enc);

        let cfg = TrainConfig { seed: 99, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        assert_eq!(ckpt.load_config().unwrap().seed, 99);

        ckpt.save_model_config(&tiny_config()).unwrap();
        assert_eq!(ckpt.load_model_config().unwrap().num_classes, 3);
    }

    #[test]
    fn test_loading_before_training_fails() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        assert!(ckpt.load_config().is_err());
        assert!(ckpt.load_labels().is_err());
    }
}
