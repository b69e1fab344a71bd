// crates/stylescope-probe/src/split.rs
//
// Seeded stratified train/test split.
//
// The test set gets ceil(fraction * n) samples, clamped so every class can
// keep at least one sample on each side. Per-class shares are assigned by
// largest remainder; within a class, indices are shuffled before the cut.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Row indices for each side of a split, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Group row indices by label, in ascending label order.
pub fn class_indices(y: &[i64]) -> BTreeMap<i64, Vec<usize>> {
    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, label) in y.iter().enumerate() {
        groups.entry(*label).or_default().push(i);
    }
    groups
}

/// Total test size for `n` samples over `classes` classes.
pub fn test_size(n: usize, classes: usize, fraction: f64) -> usize {
    let raw = (fraction * n as f64).ceil() as usize;
    let upper = n.saturating_sub(classes);
    raw.max(classes).min(upper)
}

/// Per-class test counts, each within `[1, count - 1]`, summing to `total`.
///
/// Callers guarantee every count is at least 2 and
/// `counts.len() <= total <= sum(counts) - counts.len()`.
fn allocate(counts: &[usize], total: usize) -> Vec<usize> {
    let n: usize = counts.iter().sum();
    let mut alloc = Vec::with_capacity(counts.len());
    let mut remainders = Vec::with_capacity(counts.len());
    for &count in counts {
        let ideal = total as f64 * count as f64 / n as f64;
        let floor = (ideal.floor() as usize).clamp(1, count - 1);
        alloc.push(floor);
        remainders.push(ideal - floor as f64);
    }

    // Largest remainder first when adding, smallest first when removing.
    // Ties go to the lower label.
    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| remainders[b].total_cmp(&remainders[a]).then(a.cmp(&b)));

    let mut assigned: usize = alloc.iter().sum();
    while assigned < total {
        let Some(&i) = order.iter().find(|&&i| alloc[i] < counts[i] - 1) else {
            break;
        };
        alloc[i] += 1;
        remainders[i] -= 1.0;
        assigned += 1;
        order.sort_by(|&a, &b| remainders[b].total_cmp(&remainders[a]).then(a.cmp(&b)));
    }
    while assigned > total {
        let Some(&i) = order.iter().rev().find(|&&i| alloc[i] > 1) else {
            break;
        };
        alloc[i] -= 1;
        remainders[i] += 1.0;
        assigned -= 1;
        order.sort_by(|&a, &b| remainders[b].total_cmp(&remainders[a]).then(a.cmp(&b)));
    }
    alloc
}

/// Split `y` into stratified train and test index sets.
///
/// Expects labels already validated: at least two classes, each with at
/// least two samples.
pub fn stratified_split(y: &[i64], test_fraction: f64, seed: u64) -> Split {
    let groups = class_indices(y);
    let counts: Vec<usize> = groups.values().map(Vec::len).collect();
    let total = test_size(y.len(), groups.len(), test_fraction);
    let alloc = allocate(&counts, total);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(y.len() - total);
    let mut test = Vec::with_capacity(total);
    for (mut indices, take) in groups.into_values().zip(alloc) {
        indices.shuffle(&mut rng);
        test.extend_from_slice(&indices[..take]);
        train.extend_from_slice(&indices[take..]);
    }
    train.sort_unstable();
    test.sort_unstable();

    Split { train, test }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels_of(y: &[i64], idx: &[usize]) -> BTreeMap<i64, usize> {
        let mut out = BTreeMap::new();
        for &i in idx {
            *out.entry(y[i]).or_insert(0) += 1;
        }
        out
    }

    #[test]
    fn test_size_clamps_to_class_count() {
        assert_eq!(test_size(100, 2, 0.2), 20);
        assert_eq!(test_size(4, 2, 0.2), 2);
        assert_eq!(test_size(11, 2, 0.2), 3);
        assert_eq!(test_size(6, 3, 0.2), 3);
    }

    #[test]
    fn test_balanced_split_is_proportional() {
        let y: Vec<i64> = (0..20).map(|i| i % 2).collect();
        let split = stratified_split(&y, 0.2, 0);
        assert_eq!(split.test.len(), 4);
        assert_eq!(split.train.len(), 16);
        let per_class = labels_of(&y, &split.test);
        assert_eq!(per_class[&0], 2);
        assert_eq!(per_class[&1], 2);
    }

    #[test]
    fn test_every_class_on_both_sides() {
        // Heavily imbalanced: 2 of label 7, 18 of label 3.
        let mut y = vec![3i64; 18];
        y.extend([7, 7]);
        let split = stratified_split(&y, 0.2, 0);
        let test = labels_of(&y, &split.test);
        let train = labels_of(&y, &split.train);
        assert_eq!(test.get(&7), Some(&1));
        assert_eq!(train.get(&7), Some(&1));
        assert_eq!(split.test.len(), 4);
    }

    #[test]
    fn test_split_partitions_indices() {
        let y: Vec<i64> = (0..17).map(|i| i % 3).collect();
        let split = stratified_split(&y, 0.2, 0);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..17).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_deterministic() {
        let y: Vec<i64> = (0..30).map(|i| i % 3).collect();
        assert_eq!(stratified_split(&y, 0.2, 0), stratified_split(&y, 0.2, 0));
    }
}
