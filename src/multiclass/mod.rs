//! One-vs-one multi-class classification
//!
//! One binary machine is trained for every unordered pair of classes. The
//! lower class of a pair is the positive side. At prediction time every
//! machine casts a vote and the class with the most votes wins; ties go to
//! the smallest class label.

use crate::core::{Result, SVMError, SVMModel, Sample, SparseVector};
use crate::kernel::Kernel;
use crate::optimizer::{SVMOptimizer, TrainedSVM};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// Binary machine separating `positive` (+1) from `negative` (-1)
pub struct PairwiseMachine<K: Kernel> {
    pub positive: usize,
    pub negative: usize,
    /// Position of each pair sample in the full training set
    training_indices: Vec<usize>,
    model: TrainedSVM<K>,
}

impl<K: Kernel> PairwiseMachine<K> {
    /// Class this machine votes for on `x`
    pub fn vote(&self, x: &Sample) -> usize {
        if self.model.predict(x).label > 0.0 {
            self.positive
        } else {
            self.negative
        }
    }

    /// The underlying binary model
    pub fn model(&self) -> &TrainedSVM<K> {
        &self.model
    }

    /// Support vector positions in the full training set
    pub fn support_vector_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.model
            .support_vector_indices()
            .iter()
            .map(|&local| self.training_indices[local])
    }
}

/// Multi-class model built from pairwise binary machines
pub struct OneVsOneModel<K: Kernel> {
    classes: Vec<usize>,
    machines: Vec<PairwiseMachine<K>>,
}

impl<K: Kernel> OneVsOneModel<K> {
    /// Train one machine per class pair
    ///
    /// Needs at least two distinct labels. `features` and `labels` must be the
    /// same length.
    pub fn train(
        optimizer: &SVMOptimizer<K>,
        features: &[SparseVector],
        labels: &[usize],
    ) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(SVMError::InvalidArgument(format!(
                "features and labels must have same length, got {} and {}",
                features.len(),
                labels.len()
            )));
        }
        if features.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, &label) in labels.iter().enumerate() {
            by_class.entry(label).or_default().push(i);
        }
        if by_class.len() < 2 {
            return Err(SVMError::InvalidArgument(format!(
                "need samples of at least two classes, got {}",
                by_class.len()
            )));
        }

        let classes: Vec<usize> = by_class.keys().copied().collect();
        let mut machines = Vec::with_capacity(classes.len() * (classes.len() - 1) / 2);

        for (a, &positive) in classes.iter().enumerate() {
            for &negative in &classes[a + 1..] {
                let training_indices: Vec<usize> = by_class[&positive]
                    .iter()
                    .chain(&by_class[&negative])
                    .copied()
                    .collect();
                let samples: Vec<Sample> = training_indices
                    .iter()
                    .map(|&i| {
                        let label = if labels[i] == positive { 1.0 } else { -1.0 };
                        Sample::new(features[i].clone(), label)
                    })
                    .collect();

                let model = optimizer.train_samples(&samples)?;
                debug!(
                    "machine {positive} vs {negative}: {} samples, {} iterations, {} support vectors",
                    samples.len(),
                    model.iterations(),
                    model.n_support_vectors()
                );

                machines.push(PairwiseMachine {
                    positive,
                    negative,
                    training_indices,
                    model,
                });
            }
        }

        Ok(Self { classes, machines })
    }

    /// Votes per class, aligned with `classes()`
    pub fn votes(&self, x: &SparseVector) -> Vec<usize> {
        let sample = Sample::new(x.clone(), 0.0);
        let mut votes = vec![0usize; self.classes.len()];

        for machine in &self.machines {
            let winner = machine.vote(&sample);
            if let Ok(pos) = self.classes.binary_search(&winner) {
                votes[pos] += 1;
            }
        }

        votes
    }

    /// Class with the most votes, smallest label on ties
    pub fn predict(&self, x: &SparseVector) -> usize {
        let votes = self.votes(x);
        let mut best = 0;
        for (pos, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = pos;
            }
        }
        self.classes[best]
    }

    /// Sorted distinct class labels seen in training
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    /// The pairwise machines, in (positive, negative) lexical order
    pub fn machines(&self) -> &[PairwiseMachine<K>] {
        &self.machines
    }

    /// Number of distinct training samples that are a support vector of any machine
    pub fn n_support_vectors(&self) -> usize {
        self.machines
            .iter()
            .flat_map(|m| m.support_vector_positions())
            .collect::<BTreeSet<_>>()
            .len()
    }
}
