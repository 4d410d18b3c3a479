// ============================================================
// Layer 3 — Prediction Domain Type
// ============================================================
// The result of one scoring call. Ephemeral — produced per call,
// handed back to the caller, never stored by the pipeline.
//
// feature_contributions is a BTreeMap so serialized output has a
// stable key order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::record::RiskLevel;

/// One scored student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Discrete risk tier derived from `probability` via the
    /// canonical 0.4 / 0.7 thresholds
    pub risk_level: RiskLevel,

    /// Continuous risk probability in [0, 1]
    pub probability: f64,

    /// Feature name → attribution weight.
    /// Model mode: the model's global feature importances — a
    /// model-wide approximation, not per-prediction attribution.
    /// Fallback mode: the placeholder {"Fallback": 1.0}.
    pub feature_contributions: BTreeMap<String, f64>,
}
