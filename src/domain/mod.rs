// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, enums, and traits defining what the system
// talks about: feature vectors, labels, predictions, errors.
//
// Rules for this layer:
//   - NO file I/O
//   - NO randomness
//   - NO ML algorithm code
//
// Think of this layer as the "dictionary" of the system —
// it defines what things ARE, not how they work.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// The five-feature input schema, validated
pub mod features;

// Risk levels, label schemas, labeled records
pub mod record;

// The per-call scoring result
pub mod prediction;

// The typed error taxonomy
pub mod errors;

// Core abstractions (traits) that other layers implement
pub mod traits;
