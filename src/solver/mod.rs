//! SVM solver implementations
//!
//! Sequential Minimal Optimization for the binary C-SVC dual problem.

pub mod smo;

pub use self::smo::*;
