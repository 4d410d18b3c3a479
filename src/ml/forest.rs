// ============================================================
// Layer 5 — Random Forest
// ============================================================
// A serializable ensemble of CART decision trees:
//
//   - bootstrap sampling per tree (bagging)
//   - Gini impurity split criterion
//   - sqrt(feature_count) random candidate features per split
//   - leaves store class distributions, not single votes
//   - feature importance = mean decrease in Gini impurity
//
// The ensemble collapses class votes into one continuous risk
// probability via the schema's risk-mass mapping (Low 0.0,
// Medium 0.5, High 1.0 — or binary 0.0 / 1.0), so a model
// trained on either label alphabet exposes the same
// predict_probability interface.
//
// Determinism: each tree owns a ChaCha8Rng seeded from the base
// seed plus the tree index, so fitting is reproducible.
//
// A RiskModel is created once by the trainer, serialized by the
// model store, and loaded read-only by the scorer — it is never
// mutated after fit() returns.
//
// Reference: Breiman (2001) Random Forests
//            rand crate documentation

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::domain::features::{StudentFeatures, FEATURE_COUNT};
use crate::domain::record::{LabelSchema, LabeledRecord};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Hyperparameters for fitting a forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the ensemble
    pub n_trees: usize,

    /// Depth bound per tree; None grows until leaves are pure.
    /// Bounding depth curbs overfitting to injected label noise
    /// at the cost of apparent accuracy.
    pub max_depth: Option<usize>,

    /// Minimum samples a node needs before a split is attempted
    pub min_samples_split: usize,

    /// Base seed for bootstrap sampling and feature selection
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees:           100,
            max_depth:         None,
            min_samples_split: 2,
            seed:              42,
        }
    }
}

// ─── Tree representation ──────────────────────────────────────────────────────

/// One node in the arena-allocated tree. Child links are indices
/// into the owning tree's node vector; the root is index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    /// Terminal node holding the class distribution of the
    /// training samples that reached it
    Leaf { distribution: Vec<f64> },

    /// Binary split: x[feature] <= threshold goes left
    Split {
        feature:   usize,
        threshold: f64,
        left:      usize,
        right:     usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Walk the tree and return the leaf distribution for `x`.
    fn distribution(&self, x: &[f64; FEATURE_COUNT]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { distribution } => return distribution,
                Node::Split { feature, threshold, left, right } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

// ─── RiskModel ────────────────────────────────────────────────────────────────

/// The trained, persistable ensemble. Self-describing: it knows
/// which label schema it was fit on and carries its normalized
/// feature-importance vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskModel {
    schema:              LabelSchema,
    trees:               Vec<DecisionTree>,
    feature_importances: [f64; FEATURE_COUNT],
}

impl RiskModel {
    /// Fit a forest over the given records.
    pub fn fit(records: &[LabeledRecord], schema: LabelSchema, cfg: &ForestConfig) -> Self {
        let xs: Vec<[f64; FEATURE_COUNT]> =
            records.iter().map(|r| r.features.as_array()).collect();
        let ys: Vec<usize> = records.iter().map(|r| r.label).collect();

        let mut trees = Vec::with_capacity(cfg.n_trees);
        let mut importances = [0.0; FEATURE_COUNT];

        for t in 0..cfg.n_trees {
            // Per-tree rng derived from base seed + tree index
            let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed.wrapping_add(t as u64));

            // Bootstrap: n draws with replacement
            let n = xs.len();
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

            let mut builder = TreeBuilder {
                xs:        &xs,
                ys:        &ys,
                n_classes: schema.class_count(),
                n_total:   sample.len(),
                cfg,
                rng,
                nodes:        Vec::new(),
                importances: [0.0; FEATURE_COUNT],
            };
            builder.build(sample, 0);

            for (acc, imp) in importances.iter_mut().zip(builder.importances) {
                *acc += imp;
            }
            trees.push(DecisionTree { nodes: builder.nodes });
        }

        Self {
            schema,
            trees,
            feature_importances: normalize(importances),
        }
    }

    /// Averaged class distribution over all trees.
    pub fn predict_distribution(&self, x: &[f64; FEATURE_COUNT]) -> Vec<f64> {
        let n_classes = self.schema.class_count();
        let mut dist = vec![0.0; n_classes];
        for tree in &self.trees {
            for (d, p) in dist.iter_mut().zip(tree.distribution(x)) {
                *d += p;
            }
        }
        let n_trees = self.trees.len().max(1) as f64;
        for d in &mut dist {
            *d /= n_trees;
        }
        dist
    }

    /// Continuous risk probability in [0, 1]: the expectation of
    /// each class's risk mass under the ensemble distribution.
    pub fn predict_probability(&self, features: &StudentFeatures) -> f64 {
        let dist = self.predict_distribution(&features.as_array());
        dist.iter()
            .enumerate()
            .map(|(class, p)| p * self.schema.risk_mass(class))
            .sum::<f64>()
            .clamp(0.0, 1.0)
    }

    /// Most probable class id (ties break toward the lower id).
    pub fn predict_class(&self, x: &[f64; FEATURE_COUNT]) -> usize {
        let dist = self.predict_distribution(x);
        let mut best = 0;
        for (class, p) in dist.iter().enumerate() {
            if *p > dist[best] {
                best = class;
            }
        }
        best
    }

    /// Normalized mean-decrease-in-impurity vector, schema order,
    /// summing to 1.0.
    pub fn feature_importances(&self) -> &[f64; FEATURE_COUNT] {
        &self.feature_importances
    }

    pub fn schema(&self) -> LabelSchema {
        self.schema
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

fn normalize(mut v: [f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
    let sum: f64 = v.iter().sum();
    if sum > 0.0 {
        for x in &mut v {
            *x /= sum;
        }
    } else {
        // No split ever happened (degenerate bootstrap) —
        // fall back to a uniform vector so the invariant holds
        v = [1.0 / FEATURE_COUNT as f64; FEATURE_COUNT];
    }
    v
}

// ─── Tree building ────────────────────────────────────────────────────────────

struct TreeBuilder<'a> {
    xs:          &'a [[f64; FEATURE_COUNT]],
    ys:          &'a [usize],
    n_classes:   usize,
    n_total:     usize,
    cfg:         &'a ForestConfig,
    rng:         ChaCha8Rng,
    nodes:       Vec<Node>,
    importances: [f64; FEATURE_COUNT],
}

struct BestSplit {
    feature:   usize,
    threshold: f64,
    gain:      f64,
}

impl TreeBuilder<'_> {
    /// Recursively build the subtree for `indices`; returns the
    /// arena index of the created node.
    fn build(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let counts = self.class_counts(&indices);
        let impurity = gini(&counts, indices.len());

        let depth_exhausted = self.cfg.max_depth.is_some_and(|d| depth >= d);
        if impurity == 0.0
            || indices.len() < self.cfg.min_samples_split
            || depth_exhausted
        {
            return self.push_leaf(&counts, indices.len());
        }

        let Some(split) = self.best_split(&indices, impurity) else {
            // All candidate features constant on this node
            return self.push_leaf(&counts, indices.len());
        };

        // Importance: impurity decrease weighted by how much of
        // the bootstrap sample flows through this node
        self.importances[split.feature] +=
            indices.len() as f64 / self.n_total as f64 * split.gain;

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.xs[i][split.feature] <= split.threshold);

        // Reserve the slot so children land after their parent
        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf { distribution: Vec::new() });

        let left  = self.build(left_idx, depth + 1);
        let right = self.build(right_idx, depth + 1);
        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    fn push_leaf(&mut self, counts: &[usize], n: usize) -> usize {
        let n = n.max(1) as f64;
        let distribution = counts.iter().map(|&c| c as f64 / n).collect();
        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf { distribution });
        node_id
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[self.ys[i]] += 1;
        }
        counts
    }

    /// Best Gini-gain split over a random subset of features.
    /// Candidate thresholds are midpoints between consecutive
    /// distinct values, evaluated with a single sorted sweep.
    fn best_split(&mut self, indices: &[usize], parent_impurity: f64) -> Option<BestSplit> {
        // sqrt(5) rounds down to 2 candidate features per split
        let m = (FEATURE_COUNT as f64).sqrt() as usize;
        let candidates = rand::seq::index::sample(&mut self.rng, FEATURE_COUNT, m);

        let n = indices.len();
        let mut best: Option<BestSplit> = None;

        for feature in candidates {
            // Sort this node's samples by the candidate feature
            let mut order: Vec<usize> = indices.to_vec();
            order.sort_by(|&a, &b| {
                self.xs[a][feature]
                    .partial_cmp(&self.xs[b][feature])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut left_counts  = vec![0usize; self.n_classes];
            let mut right_counts = self.class_counts(indices);

            // Sweep: move one sample at a time from right to left
            // and evaluate the boundary between distinct values
            for k in 1..n {
                let prev = order[k - 1];
                left_counts[self.ys[prev]] += 1;
                right_counts[self.ys[prev]] -= 1;

                let lo = self.xs[prev][feature];
                let hi = self.xs[order[k]][feature];
                if hi <= lo {
                    continue;
                }

                let weighted = (k as f64 / n as f64) * gini(&left_counts, k)
                    + ((n - k) as f64 / n as f64) * gini(&right_counts, n - k);
                let gain = parent_impurity - weighted;

                if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (lo + hi) / 2.0,
                        gain,
                    });
                }
            }
        }
        best
    }
}

/// Gini impurity: 1 − Σ p².
fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generator::Generator;
    use crate::domain::record::RiskLevel;

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_trees: 25,
            max_depth: Some(8),
            ..ForestConfig::default()
        }
    }

    fn three_tier_records() -> Vec<LabeledRecord> {
        Generator::new(Some(42))
            .generate(300)
            .into_iter()
            .map(|r| r.record)
            .collect()
    }

    #[test]
    fn test_fit_is_deterministic() {
        let records = three_tier_records();
        let cfg = small_config();
        let a = RiskModel::fit(&records, LabelSchema::ThreeTier, &cfg);
        let b = RiskModel::fit(&records, LabelSchema::ThreeTier, &cfg);

        let probe = records[0].features;
        assert_eq!(a.predict_probability(&probe), b.predict_probability(&probe));
        assert_eq!(a.feature_importances(), b.feature_importances());
    }

    #[test]
    fn test_importances_sum_to_one() {
        let model =
            RiskModel::fit(&three_tier_records(), LabelSchema::ThreeTier, &small_config());
        let sum: f64 = model.feature_importances().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "importances summed to {sum}");
        assert!(model.feature_importances().iter().all(|&w| w >= 0.0));
    }

    #[test]
    fn test_probability_stays_in_unit_interval() {
        let records = three_tier_records();
        let model = RiskModel::fit(&records, LabelSchema::ThreeTier, &small_config());
        for r in &records {
            let p = model.predict_probability(&r.features);
            assert!((0.0..=1.0).contains(&p), "probability {p} out of range");
        }
    }

    #[test]
    fn test_learns_the_rule_extremes() {
        // A forest fit on the rule-labeled roster must at least
        // separate the obvious extremes of the rule
        let model =
            RiskModel::fit(&three_tier_records(), LabelSchema::ThreeTier, &small_config());

        let failing = StudentFeatures::new(1.5, 0.55, 3, 1, 1).unwrap();
        let thriving = StudentFeatures::new(3.9, 0.98, 20, 4, 4).unwrap();
        assert!(model.predict_probability(&failing) > model.predict_probability(&thriving));

        let x = thriving.as_array();
        assert_eq!(model.predict_class(&x), usize::from(RiskLevel::Low));
    }

    #[test]
    fn test_binary_schema_probability_is_class_one_mass() {
        let records: Vec<LabeledRecord> = Generator::new(Some(42))
            .generate_binary(300, 0.05)
            .into_iter()
            .map(|r| r.record)
            .collect();
        let model = RiskModel::fit(&records, LabelSchema::Binary, &small_config());

        for r in records.iter().take(20) {
            let dist = model.predict_distribution(&r.features.as_array());
            let p = model.predict_probability(&r.features);
            assert!((p - dist[1]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_constant_features_yield_uniform_importances() {
        let features = StudentFeatures::new(3.0, 0.9, 15, 2, 2).unwrap();
        let records: Vec<LabeledRecord> = (0..20)
            .map(|i| LabeledRecord { features, label: i % 2 })
            .collect();
        let model = RiskModel::fit(&records, LabelSchema::Binary, &small_config());

        // Nothing to split on → every tree is a single leaf and
        // the importance vector falls back to uniform
        for &w in model.feature_importances() {
            assert!((w - 0.2).abs() < 1e-12);
        }
    }
}
