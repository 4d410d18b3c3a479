// ============================================================
// Layer 5 — Scorer
// ============================================================
// The one interface the (excluded) API layer calls: five
// features in, a Prediction out.
//
// Two variants, chosen once when the scorer is constructed:
//
//   Scorer::Model    — a persisted forest deserialized cleanly;
//                      probability comes from the ensemble and
//                      contributions are its global feature
//                      importances (a model-wide approximation,
//                      not per-prediction attribution)
//
//   Scorer::Fallback — no artifact, or a corrupt one; applies
//                      the same deterministic rule score the
//                      generator labels with, plus bounded
//                      jitter to mimic model uncertainty, and
//                      reports the placeholder contribution
//                      {"Fallback": 1.0}
//
// A failed model load is an observability event, not an error:
// Scorer::load logs a warning and degrades — the caller never
// sees a Deserialization failure from scoring. Bad input does
// fail: out-of-domain features surface InvalidFeature
// immediately.
//
// The jitter RNG is injected, seeded, and sits behind a Mutex so
// score() stays &self and one scorer can serve many callers.

use std::collections::BTreeMap;
use std::sync::Mutex;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::data::generator::rule_based_score;
use crate::domain::errors::RiskError;
use crate::domain::features::{StudentFeatures, FEATURE_NAMES};
use crate::domain::prediction::Prediction;
use crate::domain::record::RiskLevel;
use crate::domain::traits::RiskScorer;
use crate::infra::model_store::ModelStore;
use crate::ml::forest::RiskModel;

// ─── Jitter ───────────────────────────────────────────────────────────────────

/// Injected randomness for the fallback scorer. Production uses
/// a small uniform jitter so identical inputs don't return a
/// suspiciously constant probability; tests use `disabled()` for
/// exact determinism.
pub struct Jitter {
    amplitude: f64,
    rng:       Option<Mutex<ChaCha8Rng>>,
}

impl Jitter {
    /// No jitter at all — draw() always returns 0.0.
    pub fn disabled() -> Self {
        Self { amplitude: 0.0, rng: None }
    }

    /// Uniform draws over [0, amplitude] from a seeded stream.
    pub fn uniform(amplitude: f64, seed: u64) -> Self {
        Self {
            amplitude,
            rng: Some(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
        }
    }

    fn draw(&self) -> f64 {
        match &self.rng {
            Some(lock) if self.amplitude > 0.0 => lock
                .lock()
                .map(|mut rng| rng.gen_range(0.0..=self.amplitude))
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

// ─── Scorer ───────────────────────────────────────────────────────────────────

/// Model-backed or heuristic scorer, decided at construction —
/// never a nullable model checked on every call.
pub enum Scorer {
    Model(ModelScorer),
    Fallback(FallbackScorer),
}

pub struct ModelScorer {
    model: RiskModel,
}

pub struct FallbackScorer {
    jitter: Jitter,
}

impl Scorer {
    /// Build a scorer from the artifact directory. Happens once
    /// at startup; the result is reused for every call and never
    /// hot-reloaded.
    pub fn load(store: &ModelStore, jitter: Jitter) -> Self {
        if !store.exists() {
            tracing::warn!(
                "No model artifact at '{}' — using rule-based fallback",
                store.model_path().display()
            );
            return Self::fallback(jitter);
        }
        match store.load() {
            Ok(model) => {
                tracing::info!("Model loaded ({} trees)", model.tree_count());
                Self::from_model(model)
            }
            Err(e) => {
                tracing::warn!("Model load failed ({e}) — using rule-based fallback");
                Self::fallback(jitter)
            }
        }
    }

    pub fn from_model(model: RiskModel) -> Self {
        Scorer::Model(ModelScorer { model })
    }

    pub fn fallback(jitter: Jitter) -> Self {
        Scorer::Fallback(FallbackScorer { jitter })
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Scorer::Fallback(_))
    }
}

impl RiskScorer for Scorer {
    fn score(&self, features: &StudentFeatures) -> Result<Prediction, RiskError> {
        match self {
            Scorer::Model(inner)    => inner.score(features),
            Scorer::Fallback(inner) => inner.score(features),
        }
    }
}

impl RiskScorer for ModelScorer {
    fn score(&self, features: &StudentFeatures) -> Result<Prediction, RiskError> {
        features.validate()?;

        let probability = self.model.predict_probability(features);
        let feature_contributions: BTreeMap<String, f64> = FEATURE_NAMES
            .iter()
            .zip(self.model.feature_importances())
            .map(|(name, weight)| (name.to_string(), *weight))
            .collect();

        Ok(Prediction {
            risk_level: RiskLevel::from_probability(probability),
            probability,
            feature_contributions,
        })
    }
}

impl RiskScorer for FallbackScorer {
    fn score(&self, features: &StudentFeatures) -> Result<Prediction, RiskError> {
        features.validate()?;

        let probability =
            (rule_based_score(features) + self.jitter.draw()).clamp(0.0, 1.0);

        // No real attribution exists without a model
        let feature_contributions =
            BTreeMap::from([("Fallback".to_string(), 1.0)]);

        Ok(Prediction {
            risk_level: RiskLevel::from_probability(probability),
            probability,
            feature_contributions,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generator::Generator;
    use crate::domain::record::{LabelSchema, LabeledRecord};
    use crate::ml::forest::ForestConfig;
    use tempfile::tempdir;

    fn fitted_model() -> RiskModel {
        let records: Vec<LabeledRecord> = Generator::new(Some(42))
            .generate(300)
            .into_iter()
            .map(|r| r.record)
            .collect();
        let cfg = ForestConfig { n_trees: 25, max_depth: Some(8), ..Default::default() };
        RiskModel::fit(&records, LabelSchema::ThreeTier, &cfg)
    }

    #[test]
    fn test_fallback_high_risk_scenario() {
        let scorer   = Scorer::fallback(Jitter::disabled());
        let features = StudentFeatures::new(1.5, 0.4, 3, 1, 1).unwrap();
        let p = scorer.score(&features).unwrap();

        // 0.4 + 0.3 + 0.2 = 0.9
        assert!((p.probability - 0.9).abs() < 1e-12);
        assert_eq!(p.risk_level, RiskLevel::High);
        assert_eq!(p.feature_contributions.get("Fallback"), Some(&1.0));
    }

    #[test]
    fn test_fallback_low_risk_scenario() {
        let scorer   = Scorer::fallback(Jitter::disabled());
        let features = StudentFeatures::new(3.8, 0.95, 19, 4, 4).unwrap();
        let p = scorer.score(&features).unwrap();

        assert_eq!(p.probability, 0.0);
        assert_eq!(p.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_fallback_without_jitter_is_idempotent() {
        let scorer   = Scorer::fallback(Jitter::disabled());
        let features = StudentFeatures::new(2.4, 0.7, 12, 2, 2).unwrap();
        let first  = scorer.score(&features).unwrap();
        let second = scorer.score(&features).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fallback_jitter_is_bounded() {
        let scorer   = Scorer::fallback(Jitter::uniform(0.1, 7));
        let features = StudentFeatures::new(2.4, 0.7, 12, 2, 2).unwrap();
        let base = rule_based_score(&features);

        for _ in 0..50 {
            let p = scorer.score(&features).unwrap().probability;
            assert!(p >= base && p <= (base + 0.1).min(1.0));
        }
    }

    #[test]
    fn test_model_mode_contributions_are_importances() {
        let model  = fitted_model();
        let scorer = Scorer::from_model(model);
        let features = StudentFeatures::new(2.8, 0.85, 14, 3, 2).unwrap();
        let p = scorer.score(&features).unwrap();

        assert_eq!(p.feature_contributions.len(), FEATURE_NAMES.len());
        for name in FEATURE_NAMES {
            assert!(p.feature_contributions.contains_key(name));
        }
        let sum: f64 = p.feature_contributions.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_model_mode_level_matches_thresholds() {
        let scorer = Scorer::from_model(fitted_model());
        for row in Generator::new(Some(9)).generate(50) {
            let p = scorer.score(&row.record.features).unwrap();
            assert!((0.0..=1.0).contains(&p.probability));
            assert_eq!(p.risk_level, RiskLevel::from_probability(p.probability));
        }
    }

    #[test]
    fn test_invalid_features_rejected_in_both_modes() {
        let bad = StudentFeatures {
            gpa: 9.0,
            attendance_rate: 0.9,
            assignments_completed: 10,
            household_income_bracket: 2,
            parent_education_level: 2,
        };

        let fallback = Scorer::fallback(Jitter::disabled());
        assert!(matches!(
            fallback.score(&bad),
            Err(RiskError::InvalidFeature { name: "gpa", .. })
        ));

        let model = Scorer::from_model(fitted_model());
        assert!(matches!(
            model.score(&bad),
            Err(RiskError::InvalidFeature { name: "gpa", .. })
        ));
    }

    #[test]
    fn test_missing_artifact_degrades_to_fallback() {
        let dir   = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("nothing"));
        let scorer = Scorer::load(&store, Jitter::disabled());
        assert!(scorer.is_fallback());
    }

    #[test]
    fn test_corrupt_artifact_degrades_to_fallback() {
        let dir   = tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        std::fs::write(store.model_path(), "not a model").unwrap();

        let scorer = Scorer::load(&store, Jitter::disabled());
        assert!(scorer.is_fallback());

        // And it still scores
        let features = StudentFeatures::new(3.0, 0.9, 16, 3, 3).unwrap();
        assert!(scorer.score(&features).is_ok());
    }

    #[test]
    fn test_intact_artifact_loads_model_mode() {
        let dir   = tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        store.save(&fitted_model()).unwrap();

        let scorer = Scorer::load(&store, Jitter::disabled());
        assert!(!scorer.is_fallback());
    }
}
