// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Read the labeled CSV          (Layer 4 - data)
//   Step 2: Split / fit / evaluate        (Layer 5 - ml)
//   Step 3: Persist the model artifact    (Layer 6 - infra)
//   Step 4: Persist the metrics record    (Layer 6 - infra)
//
// The two artifacts are published together or not at all: each
// individual write is atomic, and if the metrics write fails
// after the model landed, the model is rolled back so serving
// never observes a half-published training run.
//
// Reference: Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::dataset::read_csv;
use crate::infra::metrics::{MetricsStore, TrainingMetrics};
use crate::infra::model_store::ModelStore;
use crate::ml::trainer::{train, TrainOptions};

// ─── Training Configuration ──────────────────────────────────────────────────
// All knobs for a training run. Serialisable so it can be saved
// to disk and reloaded to reproduce a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:     String,
    pub artifacts_dir: String,
    pub test_fraction: f64,
    pub n_trees:       usize,
    pub max_depth:     Option<usize>,
    pub seed:          u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:     "data/students.csv".to_string(),
            artifacts_dir: "artifacts".to_string(),
            test_fraction: 0.2,
            n_trees:       100,
            max_depth:     None,
            seed:          42,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs dataset → model → artifacts.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end and return
    /// the evaluation metrics for reporting.
    pub fn execute(&self) -> Result<TrainingMetrics> {
        let cfg = &self.config;

        // ── Step 1: Read the labeled dataset ──────────────────────────────────
        // The header row decides which label schema this run uses
        tracing::info!("Reading dataset from '{}'", cfg.data_path);
        let (schema, records) = read_csv(Path::new(&cfg.data_path))
            .with_context(|| format!("Cannot load dataset '{}'", cfg.data_path))?;
        tracing::info!("Loaded {} records ({:?} schema)", records.len(), schema);

        // ── Step 2: Split, fit, evaluate ──────────────────────────────────────
        let opts = TrainOptions {
            test_fraction: cfg.test_fraction,
            seed:          cfg.seed,
            max_depth:     cfg.max_depth,
            n_trees:       cfg.n_trees,
        };
        let (model, metrics) = train(&records, schema, &opts)?;

        // ── Step 3: Publish the model artifact ────────────────────────────────
        let model_store = ModelStore::new(&cfg.artifacts_dir);
        model_store.save(&model)?;

        // ── Step 4: Publish the metrics record ────────────────────────────────
        // If this fails the model write is undone, keeping the
        // artifact directory consistent
        let metrics_store = MetricsStore::new(&cfg.artifacts_dir);
        if let Err(e) = metrics_store.save(&metrics) {
            tracing::error!("Metrics write failed, rolling back model: {e}");
            model_store.remove()?;
            return Err(e);
        }

        Ok(metrics)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::generate_use_case::{GenerateConfig, GenerateUseCase};
    use tempfile::tempdir;

    fn quick_config(data_path: &Path, artifacts_dir: &Path) -> TrainConfig {
        TrainConfig {
            data_path:     data_path.to_string_lossy().into_owned(),
            artifacts_dir: artifacts_dir.to_string_lossy().into_owned(),
            n_trees:       20,
            max_depth:     Some(8),
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_execute_publishes_model_and_metrics() {
        let dir  = tempdir().unwrap();
        let data = dir.path().join("students.csv");
        GenerateUseCase::new(GenerateConfig {
            out_path: data.to_string_lossy().into_owned(),
            count:    300,
            seed:     Some(42),
            ..GenerateConfig::default()
        })
        .execute()
        .unwrap();

        let artifacts = dir.path().join("artifacts");
        let metrics = TrainUseCase::new(quick_config(&data, &artifacts))
            .execute()
            .unwrap();

        assert!((0.0..=1.0).contains(&metrics.accuracy));
        assert!(artifacts.join("model.json").exists());
        assert!(artifacts.join("metrics.json").exists());

        let stored = MetricsStore::new(&artifacts).load().unwrap();
        assert_eq!(stored, metrics);
    }

    #[test]
    fn test_missing_dataset_fails() {
        let dir = tempdir().unwrap();
        let cfg = quick_config(&dir.path().join("absent.csv"), dir.path());
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }
}
