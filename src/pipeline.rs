//! End-to-end digit classification run
//!
//! Load the bundled digits, flatten each image, split the samples in order,
//! fit an RBF `SVC` on the first half and evaluate it on the second.

use crate::api::SVC;
use crate::core::Result;
use crate::data::{load_digits, DigitsDataset};
use crate::metrics::{
    accuracy, classification_report, confusion_matrix, sample_predictions, ClassificationReport,
    SamplePrediction,
};
use crate::model_selection::train_test_split;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use std::io::Write;

/// Fraction of samples held out for testing
pub const TEST_SIZE: f64 = 0.5;
/// RBF kernel coefficient
pub const GAMMA: f64 = 0.001;
/// Regularization parameter
pub const C: f64 = 1.0;
/// Number of individual test predictions echoed in the report
pub const SAMPLE_REPORT_COUNT: usize = 10;

/// Everything a run measured
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub n_samples: usize,
    pub image_shape: (usize, usize),
    pub n_train: usize,
    pub n_test: usize,
    pub gamma: f64,
    pub c: f64,
    pub n_support_vectors: usize,
    pub accuracy: f64,
    pub samples: Vec<SamplePrediction>,
    pub report: ClassificationReport,
    #[serde(skip)]
    pub predictions: Vec<usize>,
    #[serde(skip)]
    pub test_labels: Vec<usize>,
}

impl RunSummary {
    /// Write accuracy, sample predictions and the classification report
    pub fn render<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(
            out,
            "Accuracy: {:.4} ({:.2}%)",
            self.accuracy,
            self.accuracy * 100.0
        )?;
        writeln!(out)?;

        writeln!(out, "Sample predictions:")?;
        for sample in &self.samples {
            let mark = if sample.matches { "✅" } else { "❌" };
            writeln!(
                out,
                "Sample {}: Predicted={}, Actual={} {}",
                sample.index + 1,
                sample.predicted,
                sample.actual,
                mark
            )?;
        }
        writeln!(out)?;

        writeln!(out, "Classification report:")?;
        write!(out, "{}", self.report)?;
        writeln!(out)?;
        writeln!(out, "Classification complete.")?;
        Ok(())
    }
}

/// Run on the bundled digits dataset, writing progress lines to `progress`
pub fn run<W: Write>(progress: &mut W) -> Result<RunSummary> {
    writeln!(progress, "Loading digits dataset...")?;
    let digits = load_digits()?;
    run_on_dataset(&digits, progress)
}

/// Run on an already loaded dataset
pub fn run_on_dataset<W: Write>(digits: &DigitsDataset, progress: &mut W) -> Result<RunSummary> {
    let (rows, cols) = digits.image_shape();
    writeln!(
        progress,
        "Loaded {} images of shape {}x{}",
        digits.targets().len(),
        rows,
        cols
    )?;
    debug!("Class distribution: {:?}", digits.class_counts());

    writeln!(progress, "Flattening images into feature vectors...")?;
    let features = digits.flattened();

    let split = train_test_split(&features, digits.targets(), TEST_SIZE)?;
    writeln!(
        progress,
        "Split data: {} training samples, {} test samples",
        split.n_train(),
        split.n_test()
    )?;

    writeln!(progress, "Training SVC (gamma={GAMMA}, C={C})...")?;
    let mut clf = SVC::new(GAMMA).with_c(C);
    clf.fit(&split.train_features, &split.train_labels)?;

    writeln!(progress, "Predicting on test set...")?;
    let predictions = clf.predict(&split.test_features)?;

    let acc = accuracy(&split.test_labels, &predictions)?;
    info!("Test accuracy: {acc:.4}");
    debug!(
        "Confusion matrix:\n{}",
        confusion_matrix(&split.test_labels, &predictions)?
    );

    Ok(RunSummary {
        generated_at: Utc::now(),
        n_samples: digits.targets().len(),
        image_shape: (rows, cols),
        n_train: split.n_train(),
        n_test: split.n_test(),
        gamma: GAMMA,
        c: C,
        n_support_vectors: clf.n_support_vectors(),
        accuracy: acc,
        samples: sample_predictions(&split.test_labels, &predictions, SAMPLE_REPORT_COUNT)?,
        report: classification_report(&split.test_labels, &predictions)?,
        predictions,
        test_labels: split.test_labels,
    })
}
