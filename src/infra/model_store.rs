// ============================================================
// Layer 6 — Model Store
// ============================================================
// Saves and restores the trained forest as one JSON artifact.
//
// File layout:
//   artifacts/
//     model.json     ← the serialized RiskModel (trees, schema,
//                      feature importances — self-describing)
//     metrics.json   ← written by MetricsStore, same directory
//
// Saving is atomic: the artifact is written to a temp file and
// renamed into place, so training either publishes a complete
// valid model or leaves the previous one untouched.
//
// Loading returns the typed RiskError::Deserialization on any
// missing/corrupt/incompatible artifact; the Scorer absorbs
// that error and degrades to its rule-based fallback.
//
// Reference: Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::domain::errors::RiskError;
use crate::ml::forest::RiskModel;

pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Create a store rooted at `dir`, creating the directory if
    /// it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Well-known path of the model artifact.
    pub fn model_path(&self) -> PathBuf {
        self.dir.join("model.json")
    }

    pub fn exists(&self) -> bool {
        self.model_path().exists()
    }

    /// Serialize and atomically publish the model.
    pub fn save(&self, model: &RiskModel) -> Result<()> {
        let path = self.model_path();
        let json = serde_json::to_string(model)
            .context("Cannot serialize model artifact")?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Cannot write '{}'", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Cannot move model into '{}'", path.display()))?;

        tracing::info!(
            "Saved model ({} trees) to '{}'",
            model.tree_count(),
            path.display()
        );
        Ok(())
    }

    /// Load the artifact. Any failure — unreadable file, corrupt
    /// JSON, incompatible shape — comes back as the one typed
    /// Deserialization error so callers can fall back uniformly.
    pub fn load(&self) -> Result<RiskModel, RiskError> {
        let path = self.model_path();
        let json = fs::read_to_string(&path).map_err(|e| {
            RiskError::Deserialization(format!("cannot read '{}': {e}", path.display()))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            RiskError::Deserialization(format!("cannot parse '{}': {e}", path.display()))
        })
    }

    /// Remove a published artifact, if any. Used to roll back
    /// when the paired metrics write fails after the model write
    /// succeeded.
    pub fn remove(&self) -> Result<()> {
        let path = self.model_path();
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Cannot remove '{}'", path.display()))?;
        }
        Ok(())
    }
}
