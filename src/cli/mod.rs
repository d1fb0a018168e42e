// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses command line arguments with `clap` and delegates all
// work to Layer 2 (application).
//
//   1. `train`    - fine-tunes the classifier and saves checkpoints
//   2. `inspect`  - prints statistics and class weights only
//   3. `evaluate` - reports test-partition metrics of a checkpoint
//
// Training runs on the WGPU backend with autodiff; evaluation
// runs on plain WGPU.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use burn::backend::{wgpu::WgpuDevice, Autodiff, Wgpu};
use clap::Parser;
use commands::{Commands, EvaluateArgs, InspectArgs, TrainArgs};

type TrainBackend = Autodiff<Wgpu>;
type EvalBackend  = Wgpu;

#[derive(Parser, Debug)]
#[command(
    name = "infotype-classifier",
    version = "0.1.0",
    about = "Fine-tune a transformer to classify issue reports by information type."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Inspect(args)  => run_inspect(args),
            Commands::Evaluate(args) => run_evaluate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on '{}'", args.data.data_path);
    let output_dir = args.output_dir.clone();

    let history = TrainUseCase::new(args.into()).execute::<TrainBackend>(WgpuDevice::default())?;

    if let Some(last) = history.last() {
        println!(
            "Training complete. Final val_loss={:.4}, val_acc={:.1}%. Checkpoints in '{}'.",
            last.val_loss,
            last.val_accuracy * 100.0,
            output_dir
        );
    }
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    InspectUseCase::new(args.into()).execute()?;
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    EvaluateUseCase::new(&args.output_dir).execute::<EvalBackend>(WgpuDevice::default())?;
    Ok(())
}
