// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence concerns that don't belong in any
// business layer:
//
//   model_store.rs — atomic save/load of the model artifact
//                    (model.json); failures come back as the
//                    typed Deserialization error
//
//   metrics.rs     — the TrainingMetrics record and its
//                    metrics.json store, read by monitoring
//                    collaborators
//
// Keeping them here means the ml layer stays focused on fitting
// and scoring, and a future swap (file → object storage) only
// touches this layer.
//
// Reference: Rust Book §7 (Modules)

/// Model artifact saving and loading
pub mod model_store;

/// Training metrics record and JSON store
pub mod metrics;
