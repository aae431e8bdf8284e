//! Integration tests for the digit-svc library
//!
//! These run the full load -> flatten -> split -> fit -> evaluate chain on
//! the bundled digits dataset and on small on-disk fixtures.

use digit_svc::data::{flatten_images, load_digits, load_digits_from};
use digit_svc::metrics::{accuracy, classification_report, sample_predictions};
use digit_svc::model_selection::train_test_split;
use digit_svc::pipeline::{self, GAMMA, SAMPLE_REPORT_COUNT, TEST_SIZE};
use digit_svc::{Dataset, SVMError, SVC};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_bundled_dataset_shape() {
    let digits = load_digits().expect("Bundled dataset should load");

    assert_eq!(digits.len(), 1797);
    assert_eq!(digits.image_shape(), (8, 8));
    assert_eq!(digits.dim(), 64);
    assert_eq!(digits.class_counts().len(), 10);

    let flat = flatten_images(digits.images());
    assert_eq!(flat.len(), 1797);
    assert!(flat.iter().all(|row| row.len() == 64));
    assert_eq!(flat[0], digits.images()[0].pixels().to_vec());
}

#[test]
fn test_canonical_split_sizes() {
    let digits = load_digits().unwrap();
    let split = train_test_split(&digits.flattened(), digits.targets(), TEST_SIZE).unwrap();

    assert_eq!(split.n_train(), 898);
    assert_eq!(split.n_test(), 899);
    assert_eq!(split.train_labels[..], digits.targets()[..898]);
    assert_eq!(split.test_labels[..], digits.targets()[898..]);
}

#[test]
fn test_complete_pipeline_accuracy() {
    let mut progress = Vec::new();
    let summary = pipeline::run(&mut progress).expect("Pipeline should succeed");

    assert_eq!(summary.n_samples, 1797);
    assert_eq!((summary.n_train, summary.n_test), (898, 899));
    assert_eq!(summary.predictions.len(), summary.test_labels.len());
    assert!(
        summary.accuracy > 0.90,
        "Accuracy {:.4} should exceed 0.90",
        summary.accuracy
    );
    assert!(summary.accuracy <= 1.0);

    assert_eq!(summary.samples.len(), SAMPLE_REPORT_COUNT);
    for (i, sample) in summary.samples.iter().enumerate() {
        assert_eq!(sample.index, i);
        assert_eq!(sample.predicted, summary.predictions[i]);
        assert_eq!(sample.actual, summary.test_labels[i]);
        assert_eq!(sample.matches, sample.predicted == sample.actual);
    }

    let labels: Vec<usize> = summary.report.classes.iter().map(|c| c.label).collect();
    assert_eq!(labels, (0..10).collect::<Vec<_>>());
    assert_eq!(summary.report.total_support(), 899);
    assert_eq!(
        summary.report.classes.iter().map(|c| c.support).sum::<usize>(),
        899
    );
    assert!((summary.report.accuracy - summary.accuracy).abs() < 1e-12);

    let mut rendered = Vec::new();
    summary.render(&mut rendered).unwrap();
    let rendered = String::from_utf8(rendered).unwrap();
    assert!(rendered.contains("Sample 1: Predicted="));
    assert!(rendered.contains("Sample 10: Predicted="));
    assert!(!rendered.contains("Sample 0:"));
    assert!(!rendered.contains("Sample 11:"));

    let progress = String::from_utf8(progress).unwrap();
    assert!(progress.contains("1797 images of shape 8x8"));
    assert!(progress.contains("898 training samples, 899 test samples"));
}

#[test]
fn test_training_is_deterministic() {
    let digits = load_digits().unwrap();
    let features = digits.flattened();
    let split = train_test_split(&features, digits.targets(), TEST_SIZE).unwrap();
    let subset = &split.test_features[..100];

    let mut first = SVC::new(GAMMA);
    first.fit(&split.train_features, &split.train_labels).unwrap();
    let mut second = SVC::new(GAMMA);
    second.fit(&split.train_features, &split.train_labels).unwrap();

    assert_eq!(first.predict(subset).unwrap(), second.predict(subset).unwrap());
    assert_eq!(first.n_support_vectors(), second.n_support_vectors());
}

#[test]
fn test_workflow_from_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "# two classes of 2x2 images").unwrap();
    for _ in 0..5 {
        writeln!(file, "12,12,0,0,4").unwrap();
        writeln!(file, "0,0,12,12,7").unwrap();
        writeln!(file, "12,0,12,0,9").unwrap();
    }
    file.flush().unwrap();

    let digits = load_digits_from(file.path()).expect("Fixture should load");
    assert_eq!(digits.len(), 15);

    let split = train_test_split(&digits.flattened(), digits.targets(), 0.4).unwrap();
    assert_eq!((split.n_train(), split.n_test()), (9, 6));

    let mut clf = SVC::new(0.01);
    clf.fit(&split.train_features, &split.train_labels).unwrap();
    assert_eq!(clf.classes(), &[4, 7, 9]);

    let predicted = clf.predict(&split.test_features).unwrap();
    assert_eq!(accuracy(&split.test_labels, &predicted).unwrap(), 1.0);

    let report = classification_report(&split.test_labels, &predicted).unwrap();
    assert!(report.classes.iter().all(|c| c.f1_score == 1.0));

    let samples = sample_predictions(&split.test_labels, &predicted, 10).unwrap();
    assert_eq!(samples.len(), 6);
    assert!(samples.iter().all(|s| s.matches));
}

#[test]
fn test_missing_dataset_file() {
    let result = load_digits_from("/nonexistent/digits.csv");
    assert!(matches!(result, Err(SVMError::ResourceNotFound(_))));
}

#[test]
fn test_predict_with_wrong_width_after_pipeline_fit() {
    let digits = load_digits().unwrap();
    let features = digits.flattened();

    let mut clf = SVC::new(GAMMA);
    clf.fit(&features[..200], &digits.targets()[..200]).unwrap();

    let result = clf.predict(&[vec![0.0; 63]]);
    assert!(matches!(
        result,
        Err(SVMError::DimensionMismatch {
            expected: 64,
            actual: 63
        })
    ));
}
