//! Handwritten digit classification with a kernel support vector machine
//!
//! An SMO solver trains binary RBF-kernel machines, combined one-vs-one into
//! a multiclass classifier and evaluated on the 8x8 digits dataset.

pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod kernel;
pub mod metrics;
pub mod model_selection;
pub mod multiclass;
pub mod optimizer;
pub mod pipeline;
pub mod solver;

// Re-export main types for convenience
pub use crate::api::SVC;
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{Result, SVMError};
pub use crate::data::{flatten_images, load_digits, DigitImage, DigitsDataset};
pub use crate::kernel::{Kernel, RBFKernel};
pub use crate::metrics::{accuracy, classification_report, sample_predictions};
pub use crate::model_selection::{train_test_split, TrainTestSplit};
pub use crate::multiclass::OneVsOneModel;
pub use crate::optimizer::{SVMOptimizer, TrainedSVM};
pub use crate::pipeline::RunSummary;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
