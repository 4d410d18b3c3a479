// ============================================================
// Layer 5 — Trainer
// ============================================================
// Turns a labeled dataset into a fitted forest plus a metrics
// record:
//
//   1. Seeded shuffle + train/test split   (Layer 4 - data)
//   2. Guard against degenerate inputs
//   3. Fit the 100-tree forest             (forest.rs)
//   4. Evaluate on the held-out partition
//
// Evaluation is classification-standard: accuracy is the exact
// match fraction; precision/recall/F1 are computed per class and
// aggregated weighted by true-label frequency, which collapses
// the 2-class and 3-class cases into the same four scalars.
//
// train() is pure beyond its return value — persisting the model
// and metrics is the calling use case's responsibility, so a
// failed run can never leave a partial artifact behind.

use chrono::Utc;

use crate::data::splitter::split_train_test;
use crate::domain::errors::RiskError;
use crate::domain::record::{LabelSchema, LabeledRecord};
use crate::infra::metrics::TrainingMetrics;
use crate::ml::forest::{ForestConfig, RiskModel};

/// Knobs for one training run.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Fraction of records held out for evaluation
    pub test_fraction: f64,

    /// Seed governing the split and the forest's randomness
    pub seed: u64,

    /// Optional per-tree depth bound (None = grow to purity)
    pub max_depth: Option<usize>,

    /// Ensemble size
    pub n_trees: usize,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed:          42,
            max_depth:     None,
            n_trees:       100,
        }
    }
}

/// Fit a forest and evaluate it. Fails with `EmptyDataset` on
/// zero records and `DegenerateLabels` when the train partition
/// holds fewer than two distinct classes.
pub fn train(
    records: &[LabeledRecord],
    schema:  LabelSchema,
    opts:    &TrainOptions,
) -> Result<(RiskModel, TrainingMetrics), RiskError> {
    if records.is_empty() {
        return Err(RiskError::EmptyDataset);
    }

    // ── Split ─────────────────────────────────────────────────────────────────
    let (train_set, test_set) =
        split_train_test(records.to_vec(), opts.test_fraction, opts.seed);

    let distinct: std::collections::BTreeSet<usize> =
        train_set.iter().map(|r| r.label).collect();
    if distinct.len() < 2 {
        return Err(RiskError::DegenerateLabels);
    }

    // ── Fit ───────────────────────────────────────────────────────────────────
    let cfg = ForestConfig {
        n_trees:           opts.n_trees,
        max_depth:         opts.max_depth,
        min_samples_split: 2,
        seed:              opts.seed,
    };
    tracing::info!(
        "Fitting {} trees on {} records ({:?} schema)",
        cfg.n_trees,
        train_set.len(),
        schema
    );
    let model = RiskModel::fit(&train_set, schema, &cfg);

    // ── Evaluate ──────────────────────────────────────────────────────────────
    // A test_fraction of 0 leaves nothing held out; fall back to
    // scoring the train partition rather than dividing by zero
    let eval_set: &[LabeledRecord] = if test_set.is_empty() {
        tracing::warn!("Empty test partition — evaluating on training data");
        &train_set
    } else {
        &test_set
    };

    let truths: Vec<usize> = eval_set.iter().map(|r| r.label).collect();
    let preds: Vec<usize> = eval_set
        .iter()
        .map(|r| model.predict_class(&r.features.as_array()))
        .collect();

    let accuracy = truths
        .iter()
        .zip(&preds)
        .filter(|(t, p)| t == p)
        .count() as f64
        / truths.len() as f64;
    let (precision, recall, f1_score) =
        weighted_prf(&truths, &preds, schema.class_count());

    let metrics = TrainingMetrics {
        accuracy,
        precision,
        recall,
        f1_score,
        last_trained: Utc::now().to_rfc3339(),
    };
    tracing::info!(
        "Evaluation: accuracy={:.4} precision={:.4} recall={:.4} f1={:.4}",
        metrics.accuracy,
        metrics.precision,
        metrics.recall,
        metrics.f1_score,
    );

    Ok((model, metrics))
}

/// Per-class precision/recall/F1, aggregated with true-label
/// frequency weights into three scalars. Classes absent from the
/// truth vector carry zero weight; undefined ratios (empty
/// denominators) count as zero, never NaN.
fn weighted_prf(truths: &[usize], preds: &[usize], n_classes: usize) -> (f64, f64, f64) {
    let total = truths.len() as f64;
    let mut precision = 0.0;
    let mut recall    = 0.0;
    let mut f1        = 0.0;

    for class in 0..n_classes {
        let tp = truths
            .iter()
            .zip(preds)
            .filter(|(t, p)| **t == class && **p == class)
            .count() as f64;
        let predicted = preds.iter().filter(|&&p| p == class).count() as f64;
        let support   = truths.iter().filter(|&&t| t == class).count() as f64;

        let p = if predicted > 0.0 { tp / predicted } else { 0.0 };
        let r = if support > 0.0 { tp / support } else { 0.0 };
        let f = if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };

        let weight = support / total;
        precision += weight * p;
        recall    += weight * r;
        f1        += weight * f;
    }

    (precision, recall, f1)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generator::Generator;
    use crate::domain::features::StudentFeatures;

    fn quick_opts() -> TrainOptions {
        TrainOptions {
            n_trees: 25,
            max_depth: Some(8),
            ..TrainOptions::default()
        }
    }

    fn roster(n: usize) -> Vec<LabeledRecord> {
        Generator::new(Some(42))
            .generate(n)
            .into_iter()
            .map(|r| r.record)
            .collect()
    }

    #[test]
    fn test_empty_dataset_fails() {
        let err = train(&[], LabelSchema::ThreeTier, &quick_opts()).unwrap_err();
        assert!(matches!(err, RiskError::EmptyDataset));
    }

    #[test]
    fn test_single_class_fails() {
        let features = StudentFeatures::new(3.5, 0.95, 18, 3, 3).unwrap();
        let records = vec![LabeledRecord { features, label: 0 }; 40];
        let err = train(&records, LabelSchema::ThreeTier, &quick_opts()).unwrap_err();
        assert!(matches!(err, RiskError::DegenerateLabels));
    }

    #[test]
    fn test_metrics_stay_in_unit_interval() {
        let (_, m) = train(&roster(300), LabelSchema::ThreeTier, &quick_opts()).unwrap();
        for value in [m.accuracy, m.precision, m.recall, m.f1_score] {
            assert!((0.0..=1.0).contains(&value), "metric {value} out of range");
        }
    }

    #[test]
    fn test_learns_deterministic_rule_labels() {
        // Rule labels are a noiseless function of the features,
        // so the forest should recover them well on held-out data
        let (_, m) = train(&roster(500), LabelSchema::ThreeTier, &quick_opts()).unwrap();
        assert!(m.accuracy > 0.7, "accuracy {} unexpectedly low", m.accuracy);
    }

    #[test]
    fn test_same_seed_reproduces_scores() {
        let records = roster(300);
        let (_, a) = train(&records, LabelSchema::ThreeTier, &quick_opts()).unwrap();
        let (_, b) = train(&records, LabelSchema::ThreeTier, &quick_opts()).unwrap();
        assert_eq!(a.accuracy, b.accuracy);
        assert_eq!(a.f1_score, b.f1_score);
    }

    #[test]
    fn test_binary_records_train_uniformly() {
        let records: Vec<LabeledRecord> = Generator::new(Some(42))
            .generate_binary(400, 0.1)
            .into_iter()
            .map(|r| r.record)
            .collect();
        let (model, m) = train(&records, LabelSchema::Binary, &quick_opts()).unwrap();
        assert_eq!(model.schema(), LabelSchema::Binary);
        assert!((0.0..=1.0).contains(&m.f1_score));
    }

    #[test]
    fn test_weighted_prf_perfect_predictions() {
        let truths = vec![0, 1, 2, 1, 0];
        let (p, r, f) = weighted_prf(&truths, &truths, 3);
        assert!((p - 1.0).abs() < 1e-12);
        assert!((r - 1.0).abs() < 1e-12);
        assert!((f - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_prf_all_wrong_is_zero() {
        let truths = vec![0, 0, 1, 1];
        let preds  = vec![1, 1, 0, 0];
        let (p, r, f) = weighted_prf(&truths, &preds, 2);
        assert_eq!((p, r, f), (0.0, 0.0, 0.0));
    }
}
