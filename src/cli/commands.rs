// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `generate`, `train` and
// `predict`, and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::generate_use_case::GenerateConfig;
use crate::application::train_use_case::TrainConfig;

/// The three top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a labeled synthetic student roster as CSV
    Generate(GenerateArgs),

    /// Train the risk model on a labeled CSV and save artifacts
    Train(TrainArgs),

    /// Score one student with the trained model (or fallback)
    Predict(PredictArgs),
}

/// All arguments for the `generate` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Output CSV path
    #[arg(long, default_value = "data/students.csv")]
    pub out: String,

    /// Number of student records to generate
    #[arg(long, default_value_t = 1000)]
    pub count: usize,

    /// RNG seed; omit for a random roster each run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Emit the binary at-risk variant (features + 0/1 label)
    /// instead of the three-tier roster
    #[arg(long, default_value_t = false)]
    pub binary: bool,

    /// Std-dev of the Gaussian noise on the binary risk deficit
    #[arg(long, default_value_t = 0.1)]
    pub noise_std: f64,
}

/// Convert CLI GenerateArgs into the application-layer config.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<GenerateArgs> for GenerateConfig {
    fn from(a: GenerateArgs) -> Self {
        GenerateConfig {
            out_path:  a.out,
            count:     a.count,
            seed:      a.seed,
            binary:    a.binary,
            noise_std: a.noise_std,
        }
    }
}

/// All arguments for the `train` command
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Labeled CSV to train on (three-tier or binary header)
    #[arg(long, default_value = "data/students.csv")]
    pub data: String,

    /// Directory for model.json and metrics.json
    #[arg(long, default_value = "artifacts")]
    pub artifacts_dir: String,

    /// Fraction of records held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    pub n_trees: usize,

    /// Maximum tree depth; omit to grow to purity
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Seed governing the split and the forest's randomness
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:     a.data,
            artifacts_dir: a.artifacts_dir,
            test_fraction: a.test_fraction,
            n_trees:       a.n_trees,
            max_depth:     a.max_depth,
            seed:          a.seed,
        }
    }
}

/// All arguments for the `predict` command — the five features
/// of one student, plus where to find the trained artifact
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Grade point average, 0.0 to 4.0
    #[arg(long)]
    pub gpa: f64,

    /// Attendance rate, 0.0 to 1.0
    #[arg(long)]
    pub attendance: f64,

    /// Assignments completed, 0 to 20
    #[arg(long)]
    pub assignments: u32,

    /// Household income bracket, 1 to 4
    #[arg(long, default_value_t = 2)]
    pub income_bracket: u8,

    /// Parent education level, 1 to 4
    #[arg(long, default_value_t = 2)]
    pub parent_education: u8,

    /// Directory where training saved its artifacts
    #[arg(long, default_value = "artifacts")]
    pub artifacts_dir: String,

    /// Seed for the fallback scorer's jitter
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
