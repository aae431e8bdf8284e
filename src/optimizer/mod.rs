//! Binary SVM training
//!
//! Ties a kernel and the SMO solver together and turns the optimization
//! result into a model that keeps only its support vectors.

use crate::core::{OptimizationResult, OptimizerConfig, Prediction, Result, SVMModel, Sample};
use crate::kernel::Kernel;
use crate::solver::SMOSolver;
use std::sync::Arc;

/// Trains binary machines with a shared kernel and configuration
pub struct SVMOptimizer<K: Kernel> {
    kernel: Arc<K>,
    config: OptimizerConfig,
}

impl<K: Kernel> SVMOptimizer<K> {
    /// Create a new SVM optimizer with the given kernel and configuration
    pub fn new(kernel: Arc<K>, config: OptimizerConfig) -> Self {
        Self { kernel, config }
    }

    /// Create a new SVM optimizer with default configuration
    pub fn with_kernel(kernel: K) -> Self {
        Self::new(Arc::new(kernel), OptimizerConfig::default())
    }

    /// Train a binary model on samples labelled +1 / -1
    pub fn train_samples(&self, samples: &[Sample]) -> Result<TrainedSVM<K>> {
        let solver = SMOSolver::new(Arc::clone(&self.kernel), self.config.clone());
        let result = solver.solve(samples)?;

        Ok(TrainedSVM::new(Arc::clone(&self.kernel), samples, result))
    }

    /// Get the optimizer configuration
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Get the kernel
    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

/// A trained binary SVM
pub struct TrainedSVM<K: Kernel> {
    kernel: Arc<K>,
    support_vectors: Vec<Sample>,
    support_norms: Vec<f64>,
    alpha: Vec<f64>,
    bias: f64,
    support_indices: Vec<usize>,
    iterations: usize,
}

impl<K: Kernel> TrainedSVM<K> {
    pub(crate) fn new(
        kernel: Arc<K>,
        training_samples: &[Sample],
        optimization_result: OptimizationResult,
    ) -> Self {
        let support_vectors: Vec<Sample> = optimization_result
            .support_vectors
            .iter()
            .map(|&i| training_samples[i].clone())
            .collect();
        let alpha = optimization_result
            .support_vectors
            .iter()
            .map(|&i| optimization_result.alpha[i])
            .collect();
        let support_norms = support_vectors
            .iter()
            .map(|sv| sv.features.norm_squared())
            .collect();

        Self {
            kernel,
            support_vectors,
            support_norms,
            alpha,
            bias: optimization_result.b,
            support_indices: optimization_result.support_vectors,
            iterations: optimization_result.iterations,
        }
    }

    /// Decision value Σ αᵢyᵢK(xᵢ, x) + b
    pub fn decision_function(&self, sample: &Sample) -> f64 {
        let norm = sample.features.norm_squared();

        self.support_vectors
            .iter()
            .zip(&self.alpha)
            .zip(&self.support_norms)
            .map(|((sv, &alpha), &sv_norm)| {
                alpha
                    * sv.label
                    * self
                        .kernel
                        .compute_with_norms(&sample.features, &sv.features, norm, sv_norm)
            })
            .sum::<f64>()
            + self.bias
    }

    /// Get the support vectors
    pub fn support_vectors(&self) -> &[Sample] {
        &self.support_vectors
    }

    /// Get the alpha values for support vectors
    pub fn alpha_values(&self) -> &[f64] {
        &self.alpha
    }

    /// Get the indices of support vectors in the training set
    pub fn support_vector_indices(&self) -> &[usize] {
        &self.support_indices
    }

    /// Number of SMO iterations the model took to train
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl<K: Kernel> SVMModel for TrainedSVM<K> {
    fn predict(&self, sample: &Sample) -> Prediction {
        let decision_value = self.decision_function(sample);
        let label = if decision_value > 0.0 { 1.0 } else { -1.0 };
        Prediction::new(label, decision_value)
    }

    fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    fn bias(&self) -> f64 {
        self.bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SparseVector;
    use crate::kernel::RBFKernel;

    fn sample(values: &[f64], label: f64) -> Sample {
        Sample::new(SparseVector::from_dense(values), label)
    }

    #[test]
    fn test_svm_optimizer_with_kernel() {
        let optimizer = SVMOptimizer::with_kernel(RBFKernel::new(0.25).unwrap());

        assert_eq!(optimizer.config().c, 1.0);
        assert_eq!(optimizer.config().epsilon, 0.001);
        assert_eq!(optimizer.kernel().gamma(), 0.25);
    }

    #[test]
    fn test_svm_training_simple_case() {
        let optimizer = SVMOptimizer::with_kernel(RBFKernel::new(0.5).unwrap());
        let samples = vec![
            sample(&[2.0], 1.0),
            sample(&[-2.0], -1.0),
            sample(&[1.5], 1.0),
            sample(&[-1.5], -1.0),
        ];

        let model = optimizer
            .train_samples(&samples)
            .expect("Training should succeed");

        assert!(model.n_support_vectors() > 0);
        assert_eq!(model.alpha_values().len(), model.support_vectors().len());
        assert!(model.iterations() > 0);

        for s in &samples {
            assert_eq!(model.predict(s).label, s.label);
        }

        let predictions: Vec<Prediction> = [sample(&[1.0], 1.0), sample(&[-1.0], -1.0)]
            .iter()
            .map(|s| model.predict(s))
            .collect();
        assert_eq!(predictions[0].label, 1.0);
        assert_eq!(predictions[1].label, -1.0);
        assert!(predictions[0].decision_value > predictions[1].decision_value);
    }

    #[test]
    fn test_support_vector_access() {
        let optimizer = SVMOptimizer::with_kernel(RBFKernel::new(0.5).unwrap());
        let samples = vec![
            sample(&[2.0], 1.0),
            sample(&[-2.0], -1.0),
            sample(&[1.0], 1.0),
        ];

        let model = optimizer
            .train_samples(&samples)
            .expect("Training should succeed");

        let indices = model.support_vector_indices();
        assert_eq!(model.support_vectors().len(), indices.len());
        assert!(model.alpha_values().iter().all(|&a| a > 0.0));
        assert!(indices.iter().all(|&i| i < samples.len()));
    }
}
