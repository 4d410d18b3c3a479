// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Every failure the pipeline can produce, as one typed enum.
//
// Propagation policy:
//   - InvalidFeature surfaces to the caller immediately —
//     bad input is the caller's problem.
//   - Deserialization is absorbed by the Scorer at load time
//     (it degrades to the rule-based fallback) and is never
//     returned from a scoring call.
//   - EmptyDataset / DegenerateLabels abort a training run
//     before any artifact is written.
//
// The application and CLI layers wrap these with anyhow for
// human-readable context; tests match on the variants directly.
//
// Reference: Rust Book §9 (Error Handling)

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskError {
    /// A feature value fell outside its declared domain.
    /// Rejected before any scoring happens.
    #[error("feature '{name}' out of range: got {value}, expected {expected}")]
    InvalidFeature {
        name:     &'static str,
        value:    f64,
        expected: &'static str,
    },

    /// The trainer was handed zero records.
    #[error("cannot train on an empty dataset")]
    EmptyDataset,

    /// The training partition holds fewer than 2 distinct labels,
    /// so a classifier cannot be fit.
    #[error("training partition has fewer than 2 distinct labels")]
    DegenerateLabels,

    /// The model artifact is missing, corrupt, or incompatible.
    #[error("cannot deserialize model artifact: {0}")]
    Deserialization(String),

    /// A dataset CSV did not match the documented column layout.
    #[error("dataset format error: {0}")]
    DatasetFormat(String),
}
