//! Sequential Minimal Optimization (SMO) solver implementation
//!
//! Solves the C-SVC dual
//!
//! ```text
//! min  ½ αᵀQα − eᵀα    subject to  0 ≤ αᵢ ≤ C,  yᵀα = 0,   Qᵢⱼ = yᵢyⱼK(xᵢ,xⱼ)
//! ```
//!
//! two multipliers at a time. The first variable is the maximal KKT violator,
//! the second is chosen by the second-order gain of the pair, and the
//! gradient `G = Qα − e` is maintained incrementally.

use crate::cache::KernelCache;
use crate::core::{OptimizationResult, OptimizerConfig, Result, SVMError, Sample};
use crate::kernel::Kernel;
use log::trace;
use std::sync::Arc;

/// Stand-in curvature for non positive definite pairs
const TAU: f64 = 1e-12;

/// SMO solver for SVM optimization
pub struct SMOSolver<K: Kernel> {
    kernel: Arc<K>,
    config: OptimizerConfig,
}

/// Kernel access for one problem: samples, their squared norms and the cache
struct KernelRows<'a, K: Kernel> {
    kernel: &'a K,
    samples: &'a [Sample],
    norms: Vec<f64>,
    cache: &'a mut KernelCache,
}

impl<'a, K: Kernel> KernelRows<'a, K> {
    fn new(kernel: &'a K, samples: &'a [Sample], cache: &'a mut KernelCache) -> Self {
        let norms = samples.iter().map(|s| s.features.norm_squared()).collect();
        Self {
            kernel,
            samples,
            norms,
            cache,
        }
    }

    fn value(&mut self, i: usize, j: usize) -> f64 {
        let (kernel, samples, norms) = (self.kernel, self.samples, &self.norms);
        self.cache.get_or_compute(i, j, || {
            kernel.compute_with_norms(
                &samples[i].features,
                &samples[j].features,
                norms[i],
                norms[j],
            )
        })
    }
}

impl<K: Kernel> SMOSolver<K> {
    /// Create a new SMO solver with the given kernel and configuration
    pub fn new(kernel: Arc<K>, config: OptimizerConfig) -> Self {
        Self { kernel, config }
    }

    /// Solver configuration
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Solve the SVM optimization problem
    ///
    /// Labels must be +1 or -1. Fails with `ConvergenceError` if the KKT gap
    /// is still above epsilon after `max_iterations` pair updates.
    pub fn solve(&self, samples: &[Sample]) -> Result<OptimizationResult> {
        let mut cache = KernelCache::for_problem(samples.len(), self.config.cache_size);
        self.solve_with_cache(samples, &mut cache)
    }

    /// Solve the SVM optimization problem with a caller-provided kernel cache
    ///
    /// The cache is keyed by sample index, so it must not be shared between
    /// different sample sets.
    pub fn solve_with_cache(
        &self,
        samples: &[Sample],
        cache: &mut KernelCache,
    ) -> Result<OptimizationResult> {
        self.validate(samples)?;

        let n = samples.len();
        let c = self.config.c;
        let y: Vec<f64> = samples.iter().map(|s| s.label).collect();
        let diag: Vec<f64> = samples
            .iter()
            .map(|s| self.kernel.compute(&s.features, &s.features))
            .collect();
        let mut rows = KernelRows::new(self.kernel.as_ref(), samples, cache);

        let mut alpha = vec![0.0; n];
        // G = Qα − e, with α = 0
        let mut gradient = vec![-1.0; n];
        let mut iterations = 0;

        while let Some((i, j)) = self.select_working_set(&mut rows, &y, &diag, &alpha, &gradient)
        {
            if iterations >= self.config.max_iterations {
                return Err(SVMError::ConvergenceError { iterations });
            }
            iterations += 1;

            let (old_i, old_j) = (alpha[i], alpha[j]);
            let k_ij = rows.value(i, j);
            let mut quad = diag[i] + diag[j] - 2.0 * k_ij;
            if quad <= 0.0 {
                quad = TAU;
            }
            update_pair(i, j, &y, &gradient, quad, c, &mut alpha);

            let delta_i = alpha[i] - old_i;
            let delta_j = alpha[j] - old_j;
            for t in 0..n {
                let k_it = rows.value(i, t);
                let k_jt = rows.value(j, t);
                gradient[t] += y[t] * (y[i] * k_it * delta_i + y[j] * k_jt * delta_j);
            }
        }

        let bias = -calculate_rho(&alpha, &gradient, &y, c);

        let support_vectors: Vec<usize> = alpha
            .iter()
            .enumerate()
            .filter(|(_, &a)| a > 0.0)
            .map(|(i, _)| i)
            .collect();

        // Σα − ½αᵀQα, written via the gradient
        let objective_value = alpha
            .iter()
            .zip(&gradient)
            .map(|(&a, &g)| a * (1.0 - g))
            .sum::<f64>()
            / 2.0;

        trace!(
            "SMO finished: n={n}, iterations={iterations}, support vectors={}, objective={objective_value:.6}, cache hit rate={:.3}",
            support_vectors.len(),
            rows.cache.hit_rate()
        );

        Ok(OptimizationResult {
            alpha,
            b: bias,
            support_vectors,
            iterations,
            objective_value,
        })
    }

    fn validate(&self, samples: &[Sample]) -> Result<()> {
        if samples.is_empty() {
            return Err(SVMError::EmptyDataset);
        }
        if !(self.config.c.is_finite() && self.config.c > 0.0) {
            return Err(SVMError::InvalidArgument(format!(
                "C must be positive, got: {}",
                self.config.c
            )));
        }
        if !(self.config.epsilon.is_finite() && self.config.epsilon > 0.0) {
            return Err(SVMError::InvalidArgument(format!(
                "Epsilon must be positive, got: {}",
                self.config.epsilon
            )));
        }
        for sample in samples {
            if sample.label != 1.0 && sample.label != -1.0 {
                return Err(SVMError::InvalidLabel(sample.label));
            }
        }
        Ok(())
    }

    /// Pick the pair (i, j) to optimize, or `None` once the KKT gap is below epsilon
    ///
    /// i maximizes −yₜGₜ over I_up; j minimizes −b²/a over the I_low candidates
    /// that violate KKT together with i.
    fn select_working_set(
        &self,
        rows: &mut KernelRows<'_, K>,
        y: &[f64],
        diag: &[f64],
        alpha: &[f64],
        gradient: &[f64],
    ) -> Option<(usize, usize)> {
        let c = self.config.c;

        let mut g_max = f64::NEG_INFINITY;
        let mut i_sel = None;
        for t in 0..y.len() {
            if in_up_set(y[t], alpha[t], c) {
                let v = -y[t] * gradient[t];
                if v >= g_max {
                    g_max = v;
                    i_sel = Some(t);
                }
            }
        }
        let i = i_sel?;

        let mut g_max2 = f64::NEG_INFINITY;
        let mut j_sel = None;
        let mut obj_min = f64::INFINITY;
        for t in 0..y.len() {
            if !in_low_set(y[t], alpha[t], c) {
                continue;
            }
            let v = y[t] * gradient[t];
            if v >= g_max2 {
                g_max2 = v;
            }
            let grad_diff = g_max + v;
            if grad_diff > 0.0 {
                let mut quad = diag[i] + diag[t] - 2.0 * rows.value(i, t);
                if quad <= 0.0 {
                    quad = TAU;
                }
                let obj = -(grad_diff * grad_diff) / quad;
                if obj <= obj_min {
                    obj_min = obj;
                    j_sel = Some(t);
                }
            }
        }

        if g_max + g_max2 < self.config.epsilon {
            return None;
        }
        j_sel.map(|j| (i, j))
    }
}

/// αₜ can move in the direction that increases yₜαₜ
fn in_up_set(y: f64, alpha: f64, c: f64) -> bool {
    (y > 0.0 && alpha < c) || (y < 0.0 && alpha > 0.0)
}

/// αₜ can move in the direction that decreases yₜαₜ
fn in_low_set(y: f64, alpha: f64, c: f64) -> bool {
    (y > 0.0 && alpha > 0.0) || (y < 0.0 && alpha < c)
}

/// Analytic two-variable step, clipped to the box [0, C]
fn update_pair(
    i: usize,
    j: usize,
    y: &[f64],
    gradient: &[f64],
    quad: f64,
    c: f64,
    alpha: &mut [f64],
) {
    if y[i] != y[j] {
        let delta = (-gradient[i] - gradient[j]) / quad;
        let diff = alpha[i] - alpha[j];
        alpha[i] += delta;
        alpha[j] += delta;

        if diff > 0.0 {
            if alpha[j] < 0.0 {
                alpha[j] = 0.0;
                alpha[i] = diff;
            }
        } else if alpha[i] < 0.0 {
            alpha[i] = 0.0;
            alpha[j] = -diff;
        }

        if diff > 0.0 {
            if alpha[i] > c {
                alpha[i] = c;
                alpha[j] = c - diff;
            }
        } else if alpha[j] > c {
            alpha[j] = c;
            alpha[i] = c + diff;
        }
    } else {
        let delta = (gradient[i] - gradient[j]) / quad;
        let sum = alpha[i] + alpha[j];
        alpha[i] -= delta;
        alpha[j] += delta;

        if sum > c {
            if alpha[i] > c {
                alpha[i] = c;
                alpha[j] = sum - c;
            }
        } else if alpha[j] < 0.0 {
            alpha[j] = 0.0;
            alpha[i] = sum;
        }

        if sum > c {
            if alpha[j] > c {
                alpha[j] = c;
                alpha[i] = sum - c;
            }
        } else if alpha[i] < 0.0 {
            alpha[i] = 0.0;
            alpha[j] = sum;
        }
    }
}

/// Offset ρ of the decision function f(x) = Σ αᵢyᵢK(xᵢ,x) − ρ
///
/// Averages yᵢGᵢ over free multipliers; without free multipliers it takes the
/// midpoint of the feasible interval (or its finite end).
fn calculate_rho(alpha: &[f64], gradient: &[f64], y: &[f64], c: f64) -> f64 {
    let mut upper = f64::INFINITY;
    let mut lower = f64::NEG_INFINITY;
    let mut free_sum = 0.0;
    let mut free_count = 0usize;

    for t in 0..alpha.len() {
        let yg = y[t] * gradient[t];
        if alpha[t] >= c {
            if y[t] < 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else if alpha[t] <= 0.0 {
            if y[t] > 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else {
            free_sum += yg;
            free_count += 1;
        }
    }

    if free_count > 0 {
        free_sum / free_count as f64
    } else {
        match (upper.is_finite(), lower.is_finite()) {
            (true, true) => (upper + lower) / 2.0,
            (true, false) => upper,
            (false, true) => lower,
            (false, false) => 0.0,
        }
    }
}
