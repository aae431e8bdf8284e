//! Demo comparing kernel coefficients on the digits dataset

use digit_svc::data::load_digits;
use digit_svc::metrics::accuracy;
use digit_svc::model_selection::train_test_split;
use digit_svc::SVC;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Digits SVC Demo ===");

    let digits = load_digits()?;
    let split = train_test_split(&digits.flattened(), digits.targets(), 0.5)?;
    println!(
        "Training on {} images, testing on {}",
        split.n_train(),
        split.n_test()
    );

    // gamma=0.1 overfits 0..16 intensities badly
    for gamma in [0.0001, 0.001, 0.01, 0.1] {
        let mut clf = SVC::new(gamma).with_c(1.0);
        clf.fit(&split.train_features, &split.train_labels)?;
        let predicted = clf.predict(&split.test_features)?;

        println!(
            "gamma={gamma:<7} support vectors={:>4}  accuracy={:.2}%",
            clf.n_support_vectors(),
            accuracy(&split.test_labels, &predicted)? * 100.0
        );
    }

    // Votes for the first test image
    let mut clf = SVC::new(0.001);
    clf.fit(&split.train_features, &split.train_labels)?;
    let votes = clf.decision_votes(&split.test_features[0])?;
    println!("\nVotes for first test image (actual {}):", split.test_labels[0]);
    for (class, count) in votes {
        println!("  {class}: {count}");
    }

    Ok(())
}
