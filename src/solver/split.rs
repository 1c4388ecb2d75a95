//! Shuffled train/test row split for held-out diagnostics.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of a shuffled split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Splits `0..n` into a training part and `ceil(test_fraction * n)` test rows.
///
/// With `seed = None` the shuffle draws from system entropy. A split that
/// would leave no training rows trains on everything and tests on nothing.
pub fn train_test_split(n: usize, test_fraction: f64, seed: Option<u64>) -> TrainTestSplit {
    let mut rows: Vec<usize> = (0..n).collect();
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    rows.shuffle(&mut rng);

    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test >= n {
        return TrainTestSplit { train: rows, test: Vec::new() };
    }
    let test = rows.split_off(n - n_test);
    TrainTestSplit { train: rows, test }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10, 8, 2)]
    #[case(11, 8, 3)]
    #[case(4, 3, 1)]
    #[case(1, 1, 0)]
    fn test_split_sizes(#[case] n: usize, #[case] train: usize, #[case] test: usize) {
        let split = train_test_split(n, 0.2, Some(7));
        assert_eq!(split.train.len(), train);
        assert_eq!(split.test.len(), test);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn test_seed_makes_split_reproducible() {
        assert_eq!(train_test_split(50, 0.2, Some(42)), train_test_split(50, 0.2, Some(42)));
    }
}
