// ============================================================
// Layer 3 — StudentFeatures Domain Type
// ============================================================
// The five-feature input every component of the pipeline works
// with. The field order below IS the feature schema — the
// generator, the forest, and the scorer all index features by
// this order, and FEATURE_NAMES must stay in sync with it.
//
// Immutable once constructed: the validating constructor is the
// only supported way in, and nothing mutates a value after that.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

use crate::domain::errors::RiskError;

/// Number of features in the schema.
pub const FEATURE_COUNT: usize = 5;

/// Feature names in schema order. Load-bearing: the dataset CSV
/// header, the importance vector, and the contribution mapping
/// all use these names in this order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "gpa",
    "attendance_rate",
    "assignments_completed",
    "household_income_bracket",
    "parent_education_level",
];

/// One student's feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudentFeatures {
    /// Grade point average on a 0.0–4.0 scale
    pub gpa: f64,

    /// Fraction of classes attended, 0.0–1.0
    pub attendance_rate: f64,

    /// Assignments handed in out of a fixed 20
    pub assignments_completed: u32,

    /// Household income bracket, 1 (low) to 4 (high)
    pub household_income_bracket: u8,

    /// Highest parental education, 1 (high school) to 4 (PhD)
    pub parent_education_level: u8,
}

impl StudentFeatures {
    /// Build a feature vector, rejecting any out-of-domain value
    /// with `RiskError::InvalidFeature`.
    pub fn new(
        gpa:                      f64,
        attendance_rate:          f64,
        assignments_completed:    u32,
        household_income_bracket: u8,
        parent_education_level:   u8,
    ) -> Result<Self, RiskError> {
        let features = Self {
            gpa,
            attendance_rate,
            assignments_completed,
            household_income_bracket,
            parent_education_level,
        };
        features.validate()?;
        Ok(features)
    }

    /// Check every feature against its declared domain.
    /// Called by the constructor and again by the Scorer, so a
    /// value built with a struct literal still cannot sneak an
    /// out-of-domain feature into a prediction.
    pub fn validate(&self) -> Result<(), RiskError> {
        if !self.gpa.is_finite() || !(0.0..=4.0).contains(&self.gpa) {
            return Err(RiskError::InvalidFeature {
                name:     "gpa",
                value:    self.gpa,
                expected: "0.0..=4.0",
            });
        }
        if !self.attendance_rate.is_finite()
            || !(0.0..=1.0).contains(&self.attendance_rate)
        {
            return Err(RiskError::InvalidFeature {
                name:     "attendance_rate",
                value:    self.attendance_rate,
                expected: "0.0..=1.0",
            });
        }
        if self.assignments_completed > 20 {
            return Err(RiskError::InvalidFeature {
                name:     "assignments_completed",
                value:    self.assignments_completed as f64,
                expected: "0..=20",
            });
        }
        if !(1..=4).contains(&self.household_income_bracket) {
            return Err(RiskError::InvalidFeature {
                name:     "household_income_bracket",
                value:    self.household_income_bracket as f64,
                expected: "1..=4",
            });
        }
        if !(1..=4).contains(&self.parent_education_level) {
            return Err(RiskError::InvalidFeature {
                name:     "parent_education_level",
                value:    self.parent_education_level as f64,
                expected: "1..=4",
            });
        }
        Ok(())
    }

    /// The feature vector as a plain array in schema order —
    /// the shape the decision trees split on.
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.gpa,
            self.attendance_rate,
            self.assignments_completed as f64,
            self.household_income_bracket as f64,
            self.parent_education_level as f64,
        ]
    }
}
