// ============================================================
// Layer 6 — Metrics Record and Store
// ============================================================
// One TrainingMetrics record is produced per training run and
// persisted as metrics.json next to the model artifact. It is
// read by monitoring/reporting collaborators — never by the
// Scorer.
//
// Example metrics.json:
//   {
//     "accuracy": 0.93,
//     "precision": 0.9241,
//     "recall": 0.93,
//     "f1_score": 0.9262,
//     "last_trained": "2026-08-26T09:14:02.118Z"
//   }
//
// A retrain overwrites the file wholesale — records are never
// merged. The write goes through a temp file and rename so a
// crash mid-write cannot leave a truncated record behind.
//
// Reference: Rust Book §9 (Error Handling), §12 (File I/O)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Evaluation results of one training run. All four scores are
/// fractions in [0, 1]; precision/recall/f1 are label-frequency
/// weighted aggregates, so 2-class and 3-class runs produce the
/// same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Fraction of exact label matches on the test partition
    pub accuracy: f64,

    /// Weighted-average precision across classes
    pub precision: f64,

    /// Weighted-average recall across classes
    pub recall: f64,

    /// Weighted-average F1 across classes
    pub f1_score: f64,

    /// ISO-8601 timestamp of when the run finished
    pub last_trained: String,
}

/// Persists TrainingMetrics as a small JSON file.
pub struct MetricsStore {
    path: PathBuf,
}

impl MetricsStore {
    /// `dir` is the artifact directory shared with the model
    /// store; the file inside it is always `metrics.json`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { path: dir.into().join("metrics.json") }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Overwrite the metrics record atomically.
    pub fn save(&self, metrics: &TrainingMetrics) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).ok();
        }
        let json = serde_json::to_string_pretty(metrics)?;

        // Write to a sibling temp file, then rename into place
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Cannot write '{}'", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Cannot move metrics into '{}'", self.path.display()))?;

        tracing::debug!("Saved metrics to '{}'", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<TrainingMetrics> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read '{}'", self.path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}
