// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Randomly shuffles records and splits them into two sets:
//   - Training set: used to fit the forest
//   - Test set:     used to measure performance on unseen data
//
// Why shuffle before splitting?
//   Generated rosters are ordered (by student id), and a caller
//   may pass a file sorted by risk level. Shuffling ensures both
//   partitions hold a representative mix.
//
// The shuffle is driven by a caller-supplied seed rather than
// thread_rng, so a split is reproducible: the same seed and the
// same input always yield the same partitions. Stratification is
// not attempted; label proportions are only approximately
// preserved.
//
// Uses Fisher-Yates via rand::seq::SliceRandom.
//
// Reference: rand crate documentation

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Shuffle `records` with the given seed and split off the last
/// `test_fraction` of them as the test set.
///
/// # Returns
/// A tuple (train_records, test_records)
pub fn split_train_test<T>(
    mut records:   Vec<T>,
    test_fraction: f64,
    seed:          u64,
) -> (Vec<T>, Vec<T>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    // Fisher-Yates — every permutation equally likely
    records.shuffle(&mut rng);

    let total    = records.len();
    let split_at = ((total as f64) * (1.0 - test_fraction.clamp(0.0, 1.0)))
        .round() as usize;
    let split_at = split_at.min(total);

    // split_off(n) removes elements [n..] and returns them
    let test = records.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} train, {} test",
        records.len(),
        test.len(),
    );

    (records, test)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, test)     = split_train_test(items, 0.2, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(),  20);
    }

    #[test]
    fn test_all_items_preserved() {
        // No items should be lost in the split
        let items: Vec<usize> = (0..50).collect();
        let (mut train, test) = split_train_test(items, 0.3, 7);
        train.extend(test);
        train.sort_unstable();
        assert_eq!(train, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let items: Vec<usize> = (0..64).collect();
        let a = split_train_test(items.clone(), 0.2, 99);
        let b = split_train_test(items, 0.2, 99);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_order() {
        let items: Vec<usize> = (0..64).collect();
        let (a, _) = split_train_test(items.clone(), 0.2, 1);
        let (b, _) = split_train_test(items, 0.2, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, test)     = split_train_test(items, 0.2, 42);
        assert!(train.is_empty());
        assert!(test.is_empty());
    }

    #[test]
    fn test_zero_test_fraction_keeps_everything() {
        let items: Vec<usize> = (0..10).collect();
        let (train, test)     = split_train_test(items, 0.0, 42);
        assert_eq!(train.len(), 10);
        assert!(test.is_empty());
    }
}
