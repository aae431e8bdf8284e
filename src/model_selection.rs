//! Train/test splitting

use crate::core::{Result, SVMError};

/// Ordered, disjoint training and test partitions
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train_features: Vec<Vec<f64>>,
    pub test_features: Vec<Vec<f64>>,
    pub train_labels: Vec<usize>,
    pub test_labels: Vec<usize>,
}

impl TrainTestSplit {
    pub fn n_train(&self) -> usize {
        self.train_labels.len()
    }

    pub fn n_test(&self) -> usize {
        self.test_labels.len()
    }
}

/// Sizes of the (train, test) sides for `n_samples` and `test_size`
///
/// The test side gets `ceil(n_samples * test_size)` samples.
pub fn split_sizes(n_samples: usize, test_size: f64) -> Result<(usize, usize)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(SVMError::InvalidArgument(format!(
            "test_size must be between 0 and 1, got {test_size}"
        )));
    }

    let n_test = (n_samples as f64 * test_size).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);

    if n_test == 0 || n_train == 0 {
        return Err(SVMError::InvalidArgument(format!(
            "Split would result in empty train or test set (n_train={n_train}, n_test={n_test})"
        )));
    }

    Ok((n_train, n_test))
}

/// Split features and labels by index order, without shuffling
///
/// The first `n_train` samples form the training set and the rest the test
/// set, so repeated calls always produce the same partition.
pub fn train_test_split(
    features: &[Vec<f64>],
    labels: &[usize],
    test_size: f64,
) -> Result<TrainTestSplit> {
    if features.len() != labels.len() {
        return Err(SVMError::InvalidArgument(format!(
            "features and labels must have same number of samples, got {} and {}",
            features.len(),
            labels.len()
        )));
    }

    let (n_train, _) = split_sizes(features.len(), test_size)?;

    Ok(TrainTestSplit {
        train_features: features[..n_train].to_vec(),
        test_features: features[n_train..].to_vec(),
        train_labels: labels[..n_train].to_vec(),
        test_labels: labels[n_train..].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> (Vec<Vec<f64>>, Vec<usize>) {
        let features = (0..n).map(|i| vec![i as f64, 2.0 * i as f64]).collect();
        let labels = (0..n).map(|i| i % 3).collect();
        (features, labels)
    }

    #[test]
    fn test_split_sizes_canonical_digits() {
        assert_eq!(split_sizes(1797, 0.5).unwrap(), (898, 899));
        assert_eq!(split_sizes(10, 0.2).unwrap(), (8, 2));
        assert_eq!(split_sizes(10, 0.25).unwrap(), (7, 3));
    }

    #[test]
    fn test_train_test_split_preserves_order() {
        let (features, labels) = dataset(10);
        let split = train_test_split(&features, &labels, 0.25).expect("Split should succeed");

        assert_eq!(split.n_train(), 7);
        assert_eq!(split.n_test(), 3);
        assert_eq!(split.train_features, features[..7].to_vec());
        assert_eq!(split.test_features, features[7..].to_vec());
        assert_eq!(split.train_labels, labels[..7].to_vec());
        assert_eq!(split.test_labels, vec![7 % 3, 8 % 3, 9 % 3]);
    }

    #[test]
    fn test_train_test_split_is_deterministic() {
        let (features, labels) = dataset(25);
        let first = train_test_split(&features, &labels, 0.5).unwrap();
        let second = train_test_split(&features, &labels, 0.5).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.n_train() + first.n_test(), 25);
    }

    #[test]
    fn test_train_test_split_invalid_fraction() {
        let (features, labels) = dataset(10);
        for test_size in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                train_test_split(&features, &labels, test_size),
                Err(SVMError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_train_test_split_length_mismatch() {
        let (features, labels) = dataset(10);
        assert!(matches!(
            train_test_split(&features, &labels[..9], 0.5),
            Err(SVMError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_train_test_split_too_small() {
        let (features, labels) = dataset(1);
        assert!(train_test_split(&features, &labels, 0.5).is_err());
        assert!(train_test_split(&[], &[], 0.5).is_err());
    }
}
