//! High-level support vector classifier
//!
//! `SVC` takes dense feature rows and integer class labels, trains an
//! RBF-kernel one-vs-one model and predicts labels for new rows.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use digit_svc::api::SVC;
//! use digit_svc::data::load_digits;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let digits = load_digits()?;
//! let features = digits.flattened();
//!
//! let mut clf = SVC::new(0.001).with_c(1.0);
//! clf.fit(&features, digits.targets())?;
//! let predicted = clf.predict(&features[..10])?;
//! println!("{predicted:?}");
//! # Ok(())
//! # }
//! ```

use crate::core::{OptimizerConfig, Result, SVMError, SparseVector};
use crate::kernel::RBFKernel;
use crate::multiclass::OneVsOneModel;
use crate::optimizer::SVMOptimizer;
use log::info;
use std::sync::Arc;

/// RBF-kernel C-support vector classifier with builder-style configuration
pub struct SVC {
    gamma: f64,
    config: OptimizerConfig,
    fitted: Option<FittedState>,
}

struct FittedState {
    model: OneVsOneModel<RBFKernel>,
    n_features: usize,
}

impl SVC {
    /// Create an unfitted classifier with the given kernel coefficient
    pub fn new(gamma: f64) -> Self {
        Self {
            gamma,
            config: OptimizerConfig::default(),
            fitted: None,
        }
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set convergence tolerance
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    /// Set maximum number of iterations per binary machine
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set kernel cache size in bytes
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.config.cache_size = cache_size;
        self
    }

    /// Kernel coefficient
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Solver configuration
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Fit the classifier, replacing any previously learned state
    ///
    /// On error the classifier is left unfitted.
    pub fn fit(&mut self, features: &[Vec<f64>], labels: &[usize]) -> Result<()> {
        self.fitted = None;

        if features.len() != labels.len() {
            return Err(SVMError::InvalidArgument(format!(
                "features and labels must have same length, got {} and {}",
                features.len(),
                labels.len()
            )));
        }
        let n_features = match features.first() {
            Some(row) => row.len(),
            None => return Err(SVMError::EmptyDataset),
        };
        if n_features == 0 {
            return Err(SVMError::InvalidArgument(
                "feature vectors must not be empty".to_string(),
            ));
        }
        check_width(features, n_features)?;

        let kernel = RBFKernel::new(self.gamma)?;
        let optimizer = SVMOptimizer::new(Arc::new(kernel), self.config.clone());
        let rows: Vec<SparseVector> = features
            .iter()
            .map(|row| SparseVector::from_dense(row))
            .collect();
        let model = OneVsOneModel::train(&optimizer, &rows, labels)?;

        info!(
            "Fitted SVC on {} samples x {} features: {} classes, {} machines, {} support vectors",
            features.len(),
            n_features,
            model.classes().len(),
            model.machines().len(),
            model.n_support_vectors()
        );

        self.fitted = Some(FittedState { model, n_features });
        Ok(())
    }

    /// Predict one label per row
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<usize>> {
        let fitted = self.fitted.as_ref().ok_or(SVMError::ModelNotTrained)?;
        check_width(features, fitted.n_features)?;

        Ok(features
            .iter()
            .map(|row| fitted.model.predict(&SparseVector::from_dense(row)))
            .collect())
    }

    /// Per-class vote counts for one row, as (class, votes) pairs
    pub fn decision_votes(&self, row: &[f64]) -> Result<Vec<(usize, usize)>> {
        let fitted = self.fitted.as_ref().ok_or(SVMError::ModelNotTrained)?;
        if row.len() != fitted.n_features {
            return Err(SVMError::DimensionMismatch {
                expected: fitted.n_features,
                actual: row.len(),
            });
        }

        let votes = fitted.model.votes(&SparseVector::from_dense(row));
        Ok(fitted
            .model
            .classes()
            .iter()
            .copied()
            .zip(votes)
            .collect())
    }

    /// Whether `fit` has succeeded
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Classes learned during `fit`, empty when unfitted
    pub fn classes(&self) -> &[usize] {
        match &self.fitted {
            Some(fitted) => fitted.model.classes(),
            None => &[],
        }
    }

    /// Feature width seen during `fit`
    pub fn n_features(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.n_features)
    }

    /// Distinct support vectors across all pairwise machines
    pub fn n_support_vectors(&self) -> usize {
        self.fitted
            .as_ref()
            .map_or(0, |f| f.model.n_support_vectors())
    }
}

fn check_width(features: &[Vec<f64>], expected: usize) -> Result<()> {
    match features.iter().find(|row| row.len() != expected) {
        Some(row) => Err(SVMError::DimensionMismatch {
            expected,
            actual: row.len(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_problem() -> (Vec<Vec<f64>>, Vec<usize>) {
        let features = vec![
            vec![0.0, 0.0, 1.0],
            vec![0.2, 0.0, 1.0],
            vec![4.0, 4.0, 0.0],
            vec![4.2, 3.8, 0.0],
            vec![8.0, 0.0, 2.0],
            vec![7.8, 0.2, 2.0],
        ];
        (features, vec![3, 3, 5, 5, 8, 8])
    }

    #[test]
    fn test_svc_builder_pattern() {
        let svc = SVC::new(0.001)
            .with_c(2.0)
            .with_epsilon(0.01)
            .with_max_iterations(5000)
            .with_cache_size(1 << 20);

        assert_eq!(svc.gamma(), 0.001);
        assert_eq!(svc.config().c, 2.0);
        assert_eq!(svc.config().epsilon, 0.01);
        assert_eq!(svc.config().max_iterations, 5000);
        assert_eq!(svc.config().cache_size, 1 << 20);
        assert!(!svc.is_fitted());
    }

    #[test]
    fn test_svc_fit_predict() {
        let (features, labels) = toy_problem();
        let mut svc = SVC::new(0.1);
        svc.fit(&features, &labels).expect("Fit should succeed");

        assert!(svc.is_fitted());
        assert_eq!(svc.classes(), &[3, 5, 8]);
        assert_eq!(svc.n_features(), Some(3));
        assert!(svc.n_support_vectors() > 0);

        let predicted = svc.predict(&features).expect("Predict should succeed");
        assert_eq!(predicted.len(), features.len());
        assert_eq!(predicted, labels);

        let votes = svc.decision_votes(&[4.1, 3.9, 0.0]).expect("Votes");
        assert_eq!(votes.len(), 3);
        assert_eq!(votes[1], (5, 2));
    }

    #[test]
    fn test_svc_predict_before_fit() {
        let svc = SVC::new(0.001);
        assert!(matches!(
            svc.predict(&[vec![1.0]]),
            Err(SVMError::ModelNotTrained)
        ));
        assert!(svc.classes().is_empty());
        assert_eq!(svc.n_support_vectors(), 0);
    }

    #[test]
    fn test_svc_predict_dimension_mismatch() {
        let (features, labels) = toy_problem();
        let mut svc = SVC::new(0.1);
        svc.fit(&features, &labels).unwrap();

        let result = svc.predict(&[vec![1.0, 2.0]]);
        assert!(matches!(
            result,
            Err(SVMError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(svc.decision_votes(&[1.0; 4]).is_err());
    }

    #[test]
    fn test_svc_fit_rejects_bad_input() {
        let (features, labels) = toy_problem();

        let mut svc = SVC::new(0.1);
        assert!(matches!(
            svc.fit(&features, &labels[..4]),
            Err(SVMError::InvalidArgument(_))
        ));
        assert!(matches!(svc.fit(&[], &[]), Err(SVMError::EmptyDataset)));

        let ragged = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(
            svc.fit(&ragged, &[0, 1]),
            Err(SVMError::DimensionMismatch { .. })
        ));

        let mut bad_gamma = SVC::new(-1.0);
        assert!(matches!(
            bad_gamma.fit(&features, &labels),
            Err(SVMError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_svc_failed_refit_clears_model() {
        let (features, labels) = toy_problem();
        let mut svc = SVC::new(0.1);
        svc.fit(&features, &labels).unwrap();
        assert!(svc.is_fitted());

        assert!(svc.fit(&features, &[1; 6]).is_err());
        assert!(!svc.is_fitted());
    }

    #[test]
    fn test_svc_convergence_error_surfaces() {
        let (features, labels) = toy_problem();
        let mut svc = SVC::new(0.1).with_max_iterations(0);

        assert!(matches!(
            svc.fit(&features, &labels),
            Err(SVMError::ConvergenceError { .. })
        ));
    }
}
