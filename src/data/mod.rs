//! Dataset loading and feature extraction

pub mod digits;

pub use self::digits::*;
