// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `generate` — writes a labeled synthetic roster CSV
//   2. `train`    — fits the forest and saves model + metrics
//   3. `predict`  — scores one student and prints the result
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, GenerateArgs, PredictArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "earlywarn",
    version = "0.1.0",
    about = "Student academic-risk early warning: generate data, train, predict."
)]
pub struct Cli {
    /// The subcommand to run (generate, train or predict)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    /// The handlers carry no state, so matching consumes `self`
    /// and each arm owns its args outright.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Generate(args) => Self::run_generate(args),
            Commands::Train(args)    => Self::run_train(args),
            Commands::Predict(args)  => Self::run_predict(args),
        }
    }

    /// Handles the `generate` subcommand.
    fn run_generate(args: GenerateArgs) -> Result<()> {
        use crate::application::generate_use_case::GenerateUseCase;

        let out = args.out.clone();
        let count = args.count;

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = GenerateUseCase::new(args.into());
        let seed = use_case.execute()?;

        println!("Wrote {count} records to {out} (seed {seed}).");
        Ok(())
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on dataset: {}", args.data);

        let use_case = TrainUseCase::new(args.into());
        let metrics = use_case.execute()?;

        println!("Training complete. Artifacts saved.");
        println!("  accuracy:  {:.4}", metrics.accuracy);
        println!("  precision: {:.4}", metrics.precision);
        println!("  recall:    {:.4}", metrics.recall);
        println!("  f1_score:  {:.4}", metrics.f1_score);
        Ok(())
    }

    /// Handles the `predict` subcommand.
    /// Builds the scorer once, scores one student, prints the result.
    fn run_predict(args: PredictArgs) -> Result<()> {
        use crate::application::predict_use_case::PredictUseCase;
        use crate::domain::features::StudentFeatures;

        let features = StudentFeatures::new(
            args.gpa,
            args.attendance,
            args.assignments,
            args.income_bracket,
            args.parent_education,
        )?;

        let use_case = PredictUseCase::new(&args.artifacts_dir, args.seed);
        if use_case.is_fallback() {
            println!("(no trained model found — using rule-based fallback)");
        }

        let prediction = use_case.predict(&features)?;
        println!("Risk level:  {}", prediction.risk_level);
        println!("Probability: {:.4}", prediction.probability);
        println!("Contributions:");
        for (feature, weight) in &prediction.feature_contributions {
            println!("  {feature}: {weight:.4}");
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // run() consumes the Cli and moves the args out of it; this
    // drives a full parse → dispatch → use case pass to keep that
    // ownership handoff exercised
    #[test]
    fn test_run_dispatches_generate() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("roster.csv");
        let out_arg = out.to_string_lossy();
        let cli = Cli::parse_from([
            "earlywarn",
            "generate",
            "--out",
            out_arg.as_ref(),
            "--count",
            "10",
            "--seed",
            "42",
        ]);

        cli.run().unwrap();
        assert!(out.exists());
    }

    #[test]
    fn test_run_dispatches_predict_without_artifacts() {
        let dir = tempdir().unwrap();
        let dir_arg = dir.path().to_string_lossy();
        let cli = Cli::parse_from([
            "earlywarn",
            "predict",
            "--gpa",
            "3.2",
            "--attendance",
            "0.9",
            "--assignments",
            "15",
            "--artifacts-dir",
            dir_arg.as_ref(),
        ]);

        // No model trained — the fallback path must still succeed
        cli.run().unwrap();
    }
}
