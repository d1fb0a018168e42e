// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `inspect` and
// `evaluate`, and all their configurable flags.
//
// Every default here equals the matching TrainConfig default.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fine-tune the classifier with class-weighted loss
    Train(TrainArgs),

    /// Print dataset statistics, partition sizes and class weights
    Inspect(InspectArgs),

    /// Print the classification report of a trained model on the test partition
    Evaluate(EvaluateArgs),
}

/// Where the data comes from and how it is split.
/// Shared by `train` and `inspect`.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// CSV file with the labelled issue reports
    #[arg(long, default_value = "../data/dataInfoTypes.csv")]
    pub data_path: String,

    #[arg(long, default_value = "Text Content")]
    pub text_column: String,

    #[arg(long, default_value = "Code")]
    pub label_column: String,

    /// Expected number of distinct labels in the data
    #[arg(long, default_value_t = 13)]
    pub num_classes: usize,

    /// Seed for the stratified split and batch shuffling
    #[arg(long, default_value_t = 10)]
    pub seed: u64,

    /// Fraction of all rows held out for testing
    #[arg(long, default_value_t = 0.1)]
    pub test_fraction: f64,

    /// Fraction of the remaining rows held out for validation
    #[arg(long, default_value_t = 0.05)]
    pub val_fraction: f64,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Directory for checkpoints, metrics and saved config
    #[arg(long, default_value = "./results")]
    pub output_dir: String,

    /// HuggingFace tokenizer.json; a word-level one is built if missing
    #[arg(long, default_value = "bert-base-uncased/tokenizer.json")]
    pub tokenizer_path: String,

    /// Burn record of a pretrained encoder to start from
    #[arg(long)]
    pub pretrained_encoder: Option<String>,

    /// Longer inputs are truncated to this many tokens
    #[arg(long, default_value_t = 512)]
    pub max_seq_len: usize,

    #[arg(long, default_value_t = 2e-5)]
    pub learning_rate: f64,

    #[arg(long, default_value_t = 16)]
    pub train_batch_size: usize,

    #[arg(long, default_value_t = 16)]
    pub eval_batch_size: usize,

    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// AdamW decoupled weight decay
    #[arg(long, default_value_t = 0.01)]
    pub weight_decay: f64,

    /// Hidden dimension of the transformer
    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    /// d_model must be divisible by num_heads
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    #[arg(long, default_value_t = 6)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Vocabulary cap for a built word-level tokenizer
    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:          a.data.data_path,
            output_dir:         a.output_dir,
            text_column:        a.data.text_column,
            label_column:       a.data.label_column,
            tokenizer_path:     a.tokenizer_path,
            pretrained_encoder: a.pretrained_encoder,
            num_classes:        a.data.num_classes,
            max_seq_len:        a.max_seq_len,
            learning_rate:      a.learning_rate,
            train_batch_size:   a.train_batch_size,
            eval_batch_size:    a.eval_batch_size,
            epochs:             a.epochs,
            weight_decay:       a.weight_decay,
            seed:               a.data.seed,
            test_fraction:      a.data.test_fraction,
            val_fraction:       a.data.val_fraction,
            d_model:            a.d_model,
            num_heads:          a.num_heads,
            num_layers:         a.num_layers,
            d_ff:               a.d_ff,
            dropout:            a.dropout,
            vocab_size:         a.vocab_size,
        }
    }
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

impl From<InspectArgs> for TrainConfig {
    fn from(a: InspectArgs) -> Self {
        TrainConfig {
            data_path:     a.data.data_path,
            text_column:   a.data.text_column,
            label_column:  a.data.label_column,
            num_classes:   a.data.num_classes,
            seed:          a.data.seed,
            test_fraction: a.data.test_fraction,
            val_fraction:  a.data.val_fraction,
            ..TrainConfig::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory written by a previous `train` run
    #[arg(long, default_value = "./results")]
    pub output_dir: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["infotype-classifier", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        assert_eq!(TrainConfig::from(args), TrainConfig::default());
    }

    #[test]
    fn test_train_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "infotype-classifier", "train",
            "--data-path", "issues.csv",
            "--epochs", "3",
            "--seed", "7",
            "--pretrained-encoder", "encoder",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg = TrainConfig::from(args);

        assert_eq!(cfg.data_path, "issues.csv");
        assert_eq!(cfg.epochs, 3);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.pretrained_encoder.as_deref(), Some("encoder"));
    }

    #[test]
    fn test_evaluate_output_dir() {
        let cli = Cli::try_parse_from(["infotype-classifier", "evaluate", "--output-dir", "runs/a"]).unwrap();
        let Commands::Evaluate(args) = cli.command else { panic!("expected evaluate") };
        assert_eq!(args.output_dir, "runs/a");
    }
}
