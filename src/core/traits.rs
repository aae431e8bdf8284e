//! Core traits for the SVM engine

use crate::core::{Prediction, Sample};

/// Labelled image collection with index access
pub trait Dataset: Send + Sync {
    /// Number of samples in the dataset
    fn len(&self) -> usize;

    /// Number of features once flattened
    fn dim(&self) -> usize;

    /// Flattened features of sample `i`
    ///
    /// # Panics
    /// Panics if index >= len()
    fn features(&self, i: usize) -> Vec<f64>;

    /// Class label of sample `i`
    fn label(&self, i: usize) -> usize;

    /// All labels in sample order
    fn labels(&self) -> Vec<usize> {
        (0..self.len()).map(|i| self.label(i)).collect()
    }

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trained binary SVM model
pub trait SVMModel: Send + Sync {
    /// Predict a single sample
    fn predict(&self, sample: &Sample) -> Prediction;

    /// Get the number of support vectors
    fn n_support_vectors(&self) -> usize;

    /// Get the bias term
    fn bias(&self) -> f64;
}
