// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between "no data" and "records ready to train on":
//
//   Generator         → synthetic labeled roster (pure, seeded)
//       │
//       ▼
//   dataset (CSV)     → write roster to disk / read it back
//       │
//       ▼
//   Splitter          → seeded shuffle into train/test sets
//
// Each module is responsible for exactly one step, so each is
// independently testable.

/// Seeded synthetic roster generation (both label variants)
pub mod generator;

/// Dataset CSV reading and writing
pub mod dataset;

/// Seeded shuffling and train/test splitting
pub mod splitter;
