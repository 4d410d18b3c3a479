// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// The serving-side workflow: build a scorer once from the
// artifact directory, then score individual students.
//
//   Step 1: Load model or fall back       (Layer 5 - ml)
//   Step 2: Validate + score features     (Layer 5 - ml)
//
// Construction never fails — a missing or corrupt artifact is
// logged and the rule-based fallback takes over, so scoring is
// always available.
//
// Reference: Rust Book §10 (Traits)

use crate::domain::errors::RiskError;
use crate::domain::features::StudentFeatures;
use crate::domain::prediction::Prediction;
use crate::domain::traits::RiskScorer;
use crate::infra::model_store::ModelStore;
use crate::ml::scorer::{Jitter, Scorer};

/// Fallback jitter amplitude used outside tests. Small enough
/// that a rule score near a threshold stays in its tier most of
/// the time.
const FALLBACK_JITTER_AMPLITUDE: f64 = 0.1;

pub struct PredictUseCase {
    scorer: Scorer,
}

impl PredictUseCase {
    /// Build the scorer from the artifact directory. Decided
    /// once here; every later `predict` call reuses the result.
    pub fn new(artifacts_dir: &str, seed: u64) -> Self {
        let store  = ModelStore::new(artifacts_dir);
        let jitter = Jitter::uniform(FALLBACK_JITTER_AMPLITUDE, seed);
        Self { scorer: Scorer::load(&store, jitter) }
    }

    /// Wrap an already-built scorer (tests, embedding callers).
    pub fn with_scorer(scorer: Scorer) -> Self {
        Self { scorer }
    }

    pub fn is_fallback(&self) -> bool {
        self.scorer.is_fallback()
    }

    /// Score one student. Out-of-domain features come back as
    /// the typed InvalidFeature error.
    pub fn predict(&self, features: &StudentFeatures) -> Result<Prediction, RiskError> {
        self.scorer.score(features)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::RiskLevel;
    use tempfile::tempdir;

    #[test]
    fn test_empty_artifacts_dir_serves_fallback() {
        let dir = tempdir().unwrap();
        let uc  = PredictUseCase::new(&dir.path().to_string_lossy(), 42);
        assert!(uc.is_fallback());

        let features = StudentFeatures::new(1.2, 0.3, 2, 1, 1).unwrap();
        let p = uc.predict(&features).unwrap();
        assert_eq!(p.risk_level, RiskLevel::High);
    }

    // Full pipeline: generate → train → serve from the artifacts
    #[test]
    fn test_full_pipeline_serves_model_mode() {
        use crate::application::generate_use_case::{GenerateConfig, GenerateUseCase};
        use crate::application::train_use_case::{TrainConfig, TrainUseCase};

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
        TrainUseCase::new(TrainConfig {
            data_path:     data.to_string_lossy().into_owned(),
            artifacts_dir: artifacts.to_string_lossy().into_owned(),
            n_trees:       20,
            max_depth:     Some(8),
            ..TrainConfig::default()
        })
        .execute()
        .unwrap();

        let uc = PredictUseCase::new(&artifacts.to_string_lossy(), 42);
        assert!(!uc.is_fallback());

        let features = StudentFeatures::new(3.6, 0.95, 19, 3, 3).unwrap();
        let p = uc.predict(&features).unwrap();
        assert!((0.0..=1.0).contains(&p.probability));
        assert_eq!(p.risk_level, RiskLevel::from_probability(p.probability));
        assert_eq!(p.feature_contributions.len(), 5);
    }

    #[test]
    fn test_invalid_features_surface_typed_error() {
        let uc = PredictUseCase::with_scorer(Scorer::fallback(Jitter::disabled()));
        let bad = StudentFeatures {
            gpa: 3.0,
            attendance_rate: 2.0,
            assignments_completed: 10,
            household_income_bracket: 2,
            parent_education_level: 2,
        };
        assert!(matches!(
            uc.predict(&bad),
            Err(RiskError::InvalidFeature { name: "attendance_rate", .. })
        ));
    }
}
