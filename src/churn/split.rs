use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

/// Row indices of a train/test partition, each ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified shuffle split.
///
/// The test set holds `ceil(test_fraction * n)` rows. Each class gets its
/// proportional share rounded down, and the rows left over go to the classes
/// with the largest remainders. Rows are drawn per class from a shuffle seeded
/// with `seed`, so the same input always yields the same split.
pub fn stratified_split(labels: &[u8], test_fraction: f64, seed: u64) -> Split {
    let n = labels.len();
    let n_test = ((n as f64) * test_fraction).ceil() as usize;

    let mut by_class: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(idx);
    }

    let quotas = allocate(&by_class, n, n_test);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n - n_test.min(n));
    let mut test = Vec::with_capacity(n_test);

    for ((_, mut rows), quota) in by_class.into_iter().zip(quotas) {
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..quota]);
        train.extend_from_slice(&rows[quota..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Split { train, test }
}

fn allocate(by_class: &BTreeMap<u8, Vec<usize>>, n: usize, n_test: usize) -> Vec<usize> {
    if n == 0 {
        return vec![0; by_class.len()];
    }
    let ideal: Vec<f64> = by_class
        .values()
        .map(|rows| n_test as f64 * rows.len() as f64 / n as f64)
        .collect();
    let mut quotas: Vec<usize> = ideal.iter().map(|x| x.floor() as usize).collect();

    let mut by_remainder: Vec<usize> = (0..ideal.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = ideal[a] - ideal[a].floor();
        let rb = ideal[b] - ideal[b].floor();
        rb.total_cmp(&ra)
    });

    let mut left = n_test.saturating_sub(quotas.iter().sum());
    let sizes: Vec<usize> = by_class.values().map(Vec::len).collect();
    for class in by_remainder.into_iter().cycle().take(ideal.len() * 2) {
        if left == 0 {
            break;
        }
        if quotas[class] < sizes[class] {
            quotas[class] += 1;
            left -= 1;
        }
    }
    quotas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(zeros: usize, ones: usize) -> Vec<u8> {
        let mut labels = vec![0u8; zeros];
        labels.extend(vec![1u8; ones]);
        labels
    }

    #[test]
    fn test_share_is_a_quarter_rounded_up() {
        let split = stratified_split(&labels(70, 31), 0.25, 42);
        assert_eq!(split.test.len(), 26);
        assert_eq!(split.train.len(), 75);
    }

    #[test]
    fn class_proportions_are_preserved() {
        let y = labels(60, 20);
        let split = stratified_split(&y, 0.25, 42);
        let test_ones = split.test.iter().filter(|&&i| y[i] == 1).count();
        let train_ones = split.train.iter().filter(|&&i| y[i] == 1).count();
        assert_eq!(test_ones, 5);
        assert_eq!(train_ones, 15);
    }

    #[test]
    fn partitions_every_row_exactly_once() {
        let y = labels(33, 17);
        let split = stratified_split(&y, 0.25, 42);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let y = labels(40, 40);
        assert_eq!(stratified_split(&y, 0.25, 42), stratified_split(&y, 0.25, 42));
        assert_ne!(stratified_split(&y, 0.25, 42), stratified_split(&y, 0.25, 7));
    }

    #[test]
    fn empty_input_gives_empty_split() {
        let split = stratified_split(&[], 0.25, 42);
        assert!(split.train.is_empty() && split.test.is_empty());
    }
}
