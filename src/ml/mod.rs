// ============================================================
// Layer 5 — Machine Learning Layer
// ============================================================
// Everything that fits, evaluates, or applies a model:
//
//   forest.rs  — the random-forest classifier itself (trees,
//                Gini splits, feature importances)
//   trainer.rs — orchestrates split → fit → evaluate and emits
//                the TrainingMetrics record
//   scorer.rs  — the serving-side interface; model mode when an
//                artifact loads, rule-based fallback otherwise
//
// Rules for this layer:
//   - No file I/O (stores live in Layer 6 - infra)
//   - No CLI or printing (that's Layer 1)
//   - Deterministic under a fixed seed
//
// Reference: Rust Book §10 (Generics and Traits)

/// Random forest model: trees, fitting, importances
pub mod forest;

/// Train/evaluate pipeline producing model + metrics
pub mod trainer;

/// Model-or-fallback scoring interface
pub mod scorer;
