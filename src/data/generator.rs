// ============================================================
// Layer 4 — Synthetic Data Generator
// ============================================================
// Produces a labeled student roster without touching disk —
// writing the CSV is the caller's concern.
//
// Two labeling variants:
//   - generate()        → three-tier Low/Medium/High labels from
//                         a deterministic rule score
//   - generate_binary() → continuous risk deficit plus Gaussian
//                         noise, thresholded at 0.5 into at_risk
//
// Feature sampling is shared by both variants and deliberately
// correlated: students who attend more tend to earn higher GPAs
// and hand in more assignments, so the labels are learnable. The
// sampled ranges cover every deficit region of the rule score —
// a roster of a few hundred students contains all three tiers.
//
// Determinism: all randomness comes from one ChaCha8Rng seeded
// per call, so the same (seed, n, noise_std) always yields
// byte-identical output. The draw order below is part of that
// contract — reordering the sampling steps changes the output
// for a fixed seed.
//
// Reference: rand crate documentation

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::domain::features::StudentFeatures;
use crate::domain::record::{LabeledRecord, RiskLevel, StudentRow};

/// Weight of a sub-2.0 GPA in the rule-based risk score.
pub const GPA_WEIGHT: f64 = 0.4;
/// Weight of sub-0.75 attendance in the rule-based risk score.
pub const ATTENDANCE_WEIGHT: f64 = 0.3;
/// Weight of fewer than 8 completed assignments.
pub const ASSIGNMENTS_WEIGHT: f64 = 0.2;

/// First-name pool for synthetic roster names.
const FIRST_NAMES: [&str; 35] = [
    "Chinedu", "Adebayo", "Ngozi", "Emeka", "Fatima", "Yusuf", "Chioma",
    "Kelechi", "Tunde", "Zainab", "Olumide", "Ify", "Musa", "Ada", "Funke",
    "Chika", "Bisi", "Sola", "Ibrahim", "Amina", "Uche", "Nneka", "Segun",
    "Folake", "Kemi", "Bola", "Dapo", "Tari", "Efe", "Ogechi", "Amara",
    "Obinna", "Jide", "Simi", "Femi",
];

/// Last-name pool for synthetic roster names.
const LAST_NAMES: [&str; 32] = [
    "Okeke", "Adeyemi", "Okonkwo", "Bello", "Abubakar", "Eze", "Okafor",
    "Williams", "Johnson", "Mensah", "Sowore", "Balogun", "Ojo", "Aliyu",
    "Mustapha", "Nwachukwu", "Umar", "Hassan", "Garba", "Danjuma", "Lawal",
    "Ayinla", "Akinwumi", "Ogundipe", "Nwosu", "Oni", "Adeleke", "Bankole",
    "Fashola", "Tinubu", "Sanusi", "Dangote",
];

/// Deterministic roster generator. Holds only the seed; every
/// generate call builds a fresh RNG from it, so repeated calls
/// on the same generator yield identical rosters.
pub struct Generator {
    seed: u64,
}

impl Generator {
    /// Create a generator. `None` picks a fresh random seed
    /// (logged, so a run can still be reproduced afterwards).
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        tracing::debug!("Generator seeded with {seed}");
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate `n` students with three-tier rule-based labels.
    pub fn generate(&self, n: usize) -> Vec<StudentRow> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        (0..n)
            .map(|i| {
                let (id, name, features) = sample_student(&mut rng, i);
                let level = rule_based_level(&features);
                StudentRow {
                    student_id: id,
                    name,
                    record: LabeledRecord {
                        features,
                        label: usize::from(level),
                    },
                }
            })
            .collect()
    }

    /// Generate `n` students with noise-injected binary labels.
    /// A lower `noise_std` yields a more separable dataset and
    /// thus higher apparent accuracy after training.
    pub fn generate_binary(&self, n: usize, noise_std: f64) -> Vec<StudentRow> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        (0..n)
            .map(|i| {
                let (id, name, features) = sample_student(&mut rng, i);
                let deficit = risk_deficit(&features) + gaussian(&mut rng, noise_std);
                StudentRow {
                    student_id: id,
                    name,
                    record: LabeledRecord {
                        features,
                        label: usize::from(deficit > 0.5),
                    },
                }
            })
            .collect()
    }
}

/// Sample one student's id, name, and correlated feature vector.
fn sample_student(rng: &mut ChaCha8Rng, index: usize) -> (String, String, StudentFeatures) {
    let student_id = format!("S{:03}", index + 1);
    let first      = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
    let last       = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];

    // Attendance drives everything else: uniform over [0.4, 1.0].
    // The low end reaches under both the 0.75 attendance deficit
    // and (through the assignment count) the 8-assignment deficit.
    let attendance_rate = round2(rng.gen_range(0.4..=1.0));

    // GPA tracks attendance in three bands; the low band dips
    // below the 2.0 deficit line so failing GPAs actually occur
    let gpa: f64 = round2(if attendance_rate > 0.9 {
        rng.gen_range(2.5..=4.0)
    } else if attendance_rate > 0.7 {
        rng.gen_range(1.8..=3.5)
    } else {
        rng.gen_range(1.0..=2.8)
    });

    // Assignments track attendance (truncated) with bounded
    // integer jitter; the weakest attenders drop below 8
    let assignments = ((attendance_rate * 20.0) as i64 + rng.gen_range(-2..=2))
        .clamp(0, 20) as u32;

    let income    = rng.gen_range(1..=4u8);
    let education = rng.gen_range(1..=4u8);

    let features = StudentFeatures {
        gpa,
        attendance_rate,
        assignments_completed:    assignments,
        household_income_bracket: income,
        parent_education_level:   education,
    };
    (student_id, format!("{first} {last}"), features)
}

/// The deterministic rule score behind the three-tier labels:
/// each deficit contributes its fixed weight, clamped to [0, 1].
/// The fallback scorer applies this same formula at prediction
/// time.
pub fn rule_based_score(features: &StudentFeatures) -> f64 {
    let mut score = 0.0;
    if features.gpa < 2.0 {
        score += GPA_WEIGHT;
    }
    if features.attendance_rate < 0.75 {
        score += ATTENDANCE_WEIGHT;
    }
    if features.assignments_completed < 8 {
        score += ASSIGNMENTS_WEIGHT;
    }
    score.clamp(0.0, 1.0)
}

/// Rule score mapped through the canonical 0.4 / 0.7 thresholds.
pub fn rule_based_level(features: &StudentFeatures) -> RiskLevel {
    RiskLevel::from_probability(rule_based_score(features))
}

/// Normalized linear deficit used by the binary variant:
/// 0.4 · GPA gap + 0.3 · attendance gap + 0.3 · assignment gap,
/// each gap scaled to [0, 1].
fn risk_deficit(features: &StudentFeatures) -> f64 {
    (4.0 - features.gpa) / 3.0 * 0.4
        + (1.0 - features.attendance_rate) / 0.5 * 0.3
        + (20.0 - features.assignments_completed as f64) / 20.0 * 0.3
}

/// One draw of N(0, std) via the Box-Muller transform.
/// `std = 0` disables the noise entirely.
fn gaussian(rng: &mut ChaCha8Rng, std: f64) -> f64 {
    if std <= 0.0 {
        return 0.0;
    }
    // 1 - gen::<f64>() keeps u1 in (0, 1] so ln(u1) is finite
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let r     = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * std::f64::consts::PI * u2;
    r * theta.cos() * std
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
