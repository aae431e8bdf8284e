//! Classification metrics
//!
//! Accuracy, confusion matrix, a per-class precision/recall/F1/support report
//! and per-sample comparisons. Every function takes the true labels first and
//! the predicted labels second, aligned by index.

use crate::core::{Result, SVMError};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Metrics for one class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// Number of true instances of the class
    pub support: usize,
}

/// Averaged metrics over all classes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class table plus accuracy, macro and weighted averages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

impl ClassificationReport {
    /// Metrics row for one label
    pub fn class(&self, label: usize) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| c.label == label)
    }

    /// Total number of samples evaluated
    pub fn total_support(&self) -> usize {
        self.macro_avg.support
    }
}

const REPORT_WIDTH: usize = "weighted avg".len();

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self
            .classes
            .iter()
            .map(|c| c.label.to_string().len())
            .max()
            .unwrap_or(0)
            .max(REPORT_WIDTH);

        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>w$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.label, c.precision, c.recall, c.f1_score, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.total_support()
        )?;
        for (name, avg) in [
            ("macro avg", &self.macro_avg),
            ("weighted avg", &self.weighted_avg),
        ] {
            writeln!(
                f,
                "{:>w$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1_score, avg.support
            )?;
        }
        Ok(())
    }
}

/// Predicted and actual label of one test sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SamplePrediction {
    /// Position in the test set
    pub index: usize,
    pub predicted: usize,
    pub actual: usize,
    pub matches: bool,
}

/// Counts of (true label, predicted label) pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    /// Sorted labels indexing rows (true) and columns (predicted)
    pub labels: Vec<usize>,
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Count of samples with true label `actual` predicted as `predicted`
    pub fn count(&self, actual: usize, predicted: usize) -> usize {
        match (
            self.labels.binary_search(&actual),
            self.labels.binary_search(&predicted),
        ) {
            (Ok(row), Ok(col)) => self.counts[row][col],
            _ => 0,
        }
    }

    fn true_positives(&self, pos: usize) -> usize {
        self.counts[pos][pos]
    }

    fn row_sum(&self, pos: usize) -> usize {
        self.counts[pos].iter().sum()
    }

    fn column_sum(&self, pos: usize) -> usize {
        self.counts.iter().map(|row| row[pos]).sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}", "")?;
        for label in &self.labels {
            write!(f, "{label:>5}")?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&self.counts) {
            write!(f, "{label:>5}")?;
            for count in row {
                write!(f, "{count:>5}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn check_lengths(y_true: &[usize], y_pred: &[usize]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(SVMError::InvalidArgument(format!(
            "y_true and y_pred must have same length, got {} and {}",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(SVMError::InvalidArgument(
            "y_true and y_pred must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Fraction of positions where the prediction equals the true label
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let correct = y_true
        .iter()
        .zip(y_pred)
        .filter(|(actual, predicted)| actual == predicted)
        .count();

    Ok(ratio(correct, y_true.len()))
}

/// Confusion matrix over every label present in either sequence
pub fn confusion_matrix(y_true: &[usize], y_pred: &[usize]) -> Result<ConfusionMatrix> {
    check_lengths(y_true, y_pred)?;

    let labels: Vec<usize> = y_true
        .iter()
        .chain(y_pred)
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut counts = vec![vec![0usize; labels.len()]; labels.len()];

    for (actual, predicted) in y_true.iter().zip(y_pred) {
        // both labels were collected above
        if let (Ok(row), Ok(col)) = (labels.binary_search(actual), labels.binary_search(predicted))
        {
            counts[row][col] += 1;
        }
    }

    Ok(ConfusionMatrix { labels, counts })
}

/// Precision, recall, F1 and support per class, with aggregate rows
///
/// Classes with no predicted (or no true) samples get 0.0 for the undefined
/// ratio.
pub fn classification_report(y_true: &[usize], y_pred: &[usize]) -> Result<ClassificationReport> {
    let matrix = confusion_matrix(y_true, y_pred)?;

    let classes: Vec<ClassMetrics> = matrix
        .labels
        .iter()
        .enumerate()
        .map(|(pos, &label)| {
            let tp = matrix.true_positives(pos);
            let support = matrix.row_sum(pos);
            let precision = ratio(tp, matrix.column_sum(pos));
            let recall = ratio(tp, support);
            let f1_score = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };
            ClassMetrics {
                label,
                precision,
                recall,
                f1_score,
                support,
            }
        })
        .collect();

    let total = y_true.len();
    let n_classes = classes.len() as f64;
    let macro_avg = AverageMetrics {
        precision: classes.iter().map(|c| c.precision).sum::<f64>() / n_classes,
        recall: classes.iter().map(|c| c.recall).sum::<f64>() / n_classes,
        f1_score: classes.iter().map(|c| c.f1_score).sum::<f64>() / n_classes,
        support: total,
    };
    let weighted = |metric: fn(&ClassMetrics) -> f64| {
        classes
            .iter()
            .map(|c| metric(c) * c.support as f64)
            .sum::<f64>()
            / total as f64
    };
    let weighted_avg = AverageMetrics {
        precision: weighted(|c| c.precision),
        recall: weighted(|c| c.recall),
        f1_score: weighted(|c| c.f1_score),
        support: total,
    };

    Ok(ClassificationReport {
        accuracy: accuracy(y_true, y_pred)?,
        classes,
        macro_avg,
        weighted_avg,
    })
}

/// The first `min(n, len)` (predicted, actual, matches) comparisons
pub fn sample_predictions(
    y_true: &[usize],
    y_pred: &[usize],
    n: usize,
) -> Result<Vec<SamplePrediction>> {
    check_lengths(y_true, y_pred)?;

    Ok(y_true
        .iter()
        .zip(y_pred)
        .take(n)
        .enumerate()
        .map(|(index, (&actual, &predicted))| SamplePrediction {
            index,
            predicted,
            actual,
            matches: predicted == actual,
        })
        .collect())
}
