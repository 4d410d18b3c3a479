// ============================================================
// Layer 2 — GenerateUseCase
// ============================================================
// Produces a labeled synthetic roster and writes it to CSV:
//
//   Step 1: Sample correlated features    (Layer 4 - data)
//   Step 2: Label with the risk rule      (Layer 4 - data)
//   Step 3: Write the CSV file            (Layer 4 - data)
//
// Two dataset variants share this workflow: the three-tier
// roster (Low/Medium/High, student_id + name columns) and the
// binary at-risk variant (features + 0/1 label only).
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::dataset::write_csv;
use crate::data::generator::Generator;
use crate::domain::record::LabelSchema;

// ─── Generation Configuration ────────────────────────────────────────────────
// Serialisable so a run can be recorded alongside its output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Where the CSV lands
    pub out_path: String,

    /// Number of student rows to generate
    pub count: usize,

    /// Seed for reproducible rosters; None draws one from the OS
    pub seed: Option<u64>,

    /// Emit the binary at-risk variant instead of three tiers
    pub binary: bool,

    /// Gaussian noise on the binary risk deficit (ignored for
    /// the three-tier variant)
    pub noise_std: f64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            out_path:  "data/students.csv".to_string(),
            count:     1000,
            seed:      None,
            binary:    false,
            noise_std: 0.1,
        }
    }
}

// ─── GenerateUseCase ─────────────────────────────────────────────────────────
pub struct GenerateUseCase {
    config: GenerateConfig,
}

impl GenerateUseCase {
    pub fn new(config: GenerateConfig) -> Self {
        Self { config }
    }

    /// Generate the roster and write it out. Returns the seed
    /// actually used so callers can report it for reruns.
    pub fn execute(&self) -> Result<u64> {
        let cfg = &self.config;

        // ── Step 1+2: Sample and label ────────────────────────────────────────
        let generator = Generator::new(cfg.seed);
        let (rows, schema) = if cfg.binary {
            (
                generator.generate_binary(cfg.count, cfg.noise_std),
                LabelSchema::Binary,
            )
        } else {
            (generator.generate(cfg.count), LabelSchema::ThreeTier)
        };
        tracing::info!(
            "Generated {} records (seed {}, {:?} schema)",
            rows.len(),
            generator.seed(),
            schema
        );

        // ── Step 3: Write CSV ─────────────────────────────────────────────────
        let path = Path::new(&cfg.out_path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Cannot create '{}'", parent.display()))?;
            }
        }
        write_csv(path, &rows, schema)?;
        tracing::info!("Wrote dataset to '{}'", path.display());

        Ok(generator.seed())
    }
}
