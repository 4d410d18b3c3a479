// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// By programming against traits instead of concrete types, the
// layer that handles scoring requests can be handed any scorer —
// the real model-backed one, the rule-based fallback, or a test
// double with canned answers.
//
// Implementations:
//   - ml::scorer::Scorer → model-backed or heuristic, chosen
//     once at construction
//   - test doubles in callers' test code
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::domain::errors::RiskError;
use crate::domain::features::StudentFeatures;
use crate::domain::prediction::Prediction;

/// Any component that can turn a feature vector into a risk
/// prediction. Scoring is a pure read: implementations must not
/// mutate model state per call.
pub trait RiskScorer {
    /// Score one student. Fails only on out-of-domain input.
    fn score(&self, features: &StudentFeatures) -> Result<Prediction, RiskError>;
}
