// ============================================================
// Layer 3 — Labels and Labeled Records
// ============================================================
// The label side of the data model:
//
//   RiskLevel     — the three-tier output category
//   LabelSchema   — which label alphabet a dataset/model uses
//                   (three-tier Low/Medium/High, or binary at_risk)
//   LabeledRecord — features + class id, the trainer's input
//   StudentRow    — LabeledRecord + student_id + name, the CSV
//                   row shape produced by the generator
//
// Labels are stored as small class ids so the trainer and the
// metrics code treat the 2-class and 3-class cases uniformly.
//
// The canonical probability thresholds live here. Every tiering
// decision in the pipeline (generator labels, model output, the
// rule-based fallback) goes through the same 0.4/0.7 pair.
//
// Reference: Rust Book §6 (Enums and Pattern Matching)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::RiskError;
use crate::domain::features::StudentFeatures;

/// Probability above which a student is rated Medium risk.
pub const MEDIUM_THRESHOLD: f64 = 0.4;

/// Probability above which a student is rated High risk.
pub const HIGH_THRESHOLD: f64 = 0.7;

// ─── RiskLevel ────────────────────────────────────────────────────────────────

/// Discretized academic-risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Map a continuous risk probability onto the three tiers:
    /// p > 0.7 → High, p > 0.4 → Medium, else Low.
    pub fn from_probability(p: f64) -> Self {
        if p > HIGH_THRESHOLD {
            RiskLevel::High
        } else if p > MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low    => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High   => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low"    => Ok(RiskLevel::Low),
            "Medium" => Ok(RiskLevel::Medium),
            "High"   => Ok(RiskLevel::High),
            other => Err(RiskError::DatasetFormat(format!(
                "unknown risk level '{other}'"
            ))),
        }
    }
}

// ─── LabelSchema ──────────────────────────────────────────────────────────────

/// The label alphabet a dataset was generated with and a model
/// was trained on. Stored inside the model artifact so a loaded
/// model knows how to turn class votes into a risk probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelSchema {
    /// Low = 0, Medium = 1, High = 2
    ThreeTier,
    /// not at risk = 0, at risk = 1
    Binary,
}

impl LabelSchema {
    pub fn class_count(&self) -> usize {
        match self {
            LabelSchema::ThreeTier => 3,
            LabelSchema::Binary    => 2,
        }
    }

    /// Human-readable name of a class id under this schema.
    pub fn class_name(&self, class: usize) -> &'static str {
        match (self, class) {
            (LabelSchema::ThreeTier, 0) => "Low",
            (LabelSchema::ThreeTier, 1) => "Medium",
            (LabelSchema::ThreeTier, 2) => "High",
            (LabelSchema::Binary, 0)    => "0",
            (LabelSchema::Binary, 1)    => "1",
            _ => "?",
        }
    }

    /// How much risk mass a class carries when class votes are
    /// collapsed into one continuous probability:
    /// Low 0.0, Medium 0.5, High 1.0 / binary 0.0, 1.0.
    pub fn risk_mass(&self, class: usize) -> f64 {
        match (self, class) {
            (LabelSchema::ThreeTier, 1) => 0.5,
            (LabelSchema::ThreeTier, 2) => 1.0,
            (LabelSchema::Binary, 1)    => 1.0,
            _ => 0.0,
        }
    }
}

/// Class id of a RiskLevel under the three-tier schema.
impl From<RiskLevel> for usize {
    fn from(level: RiskLevel) -> usize {
        match level {
            RiskLevel::Low    => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High   => 2,
        }
    }
}

// ─── LabeledRecord ────────────────────────────────────────────────────────────

/// One training example: a feature vector plus its ground-truth
/// class id under some LabelSchema. The schema travels alongside
/// the records (on the dataset, not on every row).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub features: StudentFeatures,
    pub label:    usize,
}

// ─── StudentRow ───────────────────────────────────────────────────────────────

/// A generated roster row as written to the dataset CSV:
/// synthetic id and name for traceability, plus the labeled
/// features. The trainer drops id and name before fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRow {
    pub student_id: String,
    pub name:       String,
    pub record:     LabeledRecord,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundaries() {
        // Thresholds are strict: exactly 0.4 is still Low,
        // exactly 0.7 is still Medium.
        assert_eq!(RiskLevel::from_probability(0.0),  RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.4),  RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.41), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.7),  RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.71), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(1.0),  RiskLevel::High);
    }

    #[test]
    fn test_level_round_trips_through_str() {
        for level in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
            assert_eq!(level.as_str().parse::<RiskLevel>().unwrap(), level);
        }
        assert!("Severe".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn test_risk_mass_endpoints() {
        assert_eq!(LabelSchema::ThreeTier.risk_mass(0), 0.0);
        assert_eq!(LabelSchema::ThreeTier.risk_mass(1), 0.5);
        assert_eq!(LabelSchema::ThreeTier.risk_mass(2), 1.0);
        assert_eq!(LabelSchema::Binary.risk_mass(0), 0.0);
        assert_eq!(LabelSchema::Binary.risk_mass(1), 1.0);
    }
}
