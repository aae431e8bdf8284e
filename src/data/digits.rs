//! Optical recognition of handwritten digits
//!
//! 1797 grayscale 8x8 bitmaps of the digits 0-9 with intensities 0..16, from
//! the UCI "Optical Recognition of Handwritten Digits" collection. The data
//! is compiled into the crate from `data/digits.csv`; each line holds the 64
//! pixels in row-major order followed by the class label.

use crate::core::{Dataset, Result, SVMError};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

/// Bundled dataset in CSV form
pub const DIGITS_CSV: &str = include_str!("../../data/digits.csv");

/// A grayscale image stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct DigitImage {
    rows: usize,
    cols: usize,
    pixels: Vec<f64>,
}

impl DigitImage {
    /// Create an image; `pixels` must hold exactly `rows * cols` values
    pub fn new(rows: usize, cols: usize, pixels: Vec<f64>) -> Result<Self> {
        if pixels.len() != rows * cols {
            return Err(SVMError::InvalidDataset(format!(
                "image of shape ({rows}, {cols}) needs {} pixels, got {}",
                rows * cols,
                pixels.len()
            )));
        }
        Ok(Self { rows, cols, pixels })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Intensity at (row, col)
    ///
    /// # Panics
    /// Panics if the position is outside the image
    pub fn pixel(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols, "pixel out of bounds");
        self.pixels[row * self.cols + col]
    }

    /// Row-major pixel buffer
    pub fn pixels(&self) -> &[f64] {
        &self.pixels
    }

    /// Feature vector of length rows * cols
    pub fn flatten(&self) -> Vec<f64> {
        self.pixels.clone()
    }
}

/// Labelled digit images, immutable once loaded
#[derive(Debug, Clone)]
pub struct DigitsDataset {
    images: Vec<DigitImage>,
    targets: Vec<usize>,
}

impl DigitsDataset {
    /// Load a dataset from a CSV file
    ///
    /// Fails with `ResourceNotFound` when the file does not exist.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SVMError::ResourceNotFound(path.display().to_string()),
            _ => SVMError::IoError(e),
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse `pixel,...,pixel,label` lines
    ///
    /// Blank lines and `#` comments are skipped. The pixel count must be a
    /// perfect square and identical on every line.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut images = Vec::new();
        let mut targets = Vec::new();
        let mut side = None;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (pixels, label) = parse_data_line(line, line_no + 1)?;
            let line_side = match side {
                Some(s) => s,
                None => {
                    let s = square_side(pixels.len()).ok_or_else(|| {
                        SVMError::InvalidDataset(format!(
                            "line {}: {} pixels do not form a square image",
                            line_no + 1,
                            pixels.len()
                        ))
                    })?;
                    side = Some(s);
                    s
                }
            };
            if pixels.len() != line_side * line_side {
                return Err(SVMError::InvalidDataset(format!(
                    "line {}: expected {} pixels, got {}",
                    line_no + 1,
                    line_side * line_side,
                    pixels.len()
                )));
            }

            images.push(DigitImage::new(line_side, line_side, pixels)?);
            targets.push(label);
        }

        if images.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        Ok(Self { images, targets })
    }

    pub fn images(&self) -> &[DigitImage] {
        &self.images
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    /// Shape shared by every image
    pub fn image_shape(&self) -> (usize, usize) {
        self.images[0].shape()
    }

    /// All images flattened, in sample order
    pub fn flattened(&self) -> Vec<Vec<f64>> {
        flatten_images(&self.images)
    }

    /// Number of samples per class
    pub fn class_counts(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for &target in &self.targets {
            *counts.entry(target).or_insert(0) += 1;
        }
        counts
    }
}

impl Dataset for DigitsDataset {
    fn len(&self) -> usize {
        self.images.len()
    }

    fn dim(&self) -> usize {
        let (rows, cols) = self.image_shape();
        rows * cols
    }

    fn features(&self, i: usize) -> Vec<f64> {
        self.images[i].flatten()
    }

    fn label(&self, i: usize) -> usize {
        self.targets[i]
    }

    fn labels(&self) -> Vec<usize> {
        self.targets.clone()
    }
}

/// Load the bundled digits dataset
pub fn load_digits() -> Result<DigitsDataset> {
    DigitsDataset::from_reader(DIGITS_CSV.as_bytes())
}

/// Load a digits dataset in the bundled format from disk
pub fn load_digits_from<P: AsRef<Path>>(path: P) -> Result<DigitsDataset> {
    DigitsDataset::from_file(path)
}

/// Flatten N images of shape (H, W) into N vectors of length H*W, order preserved
pub fn flatten_images(images: &[DigitImage]) -> Vec<Vec<f64>> {
    images.iter().map(DigitImage::flatten).collect()
}

fn parse_data_line(line: &str, line_no: usize) -> Result<(Vec<f64>, usize)> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let Some((label_str, pixel_fields)) = fields.split_last() else {
        return Err(SVMError::ParseError(format!("line {line_no}: empty")));
    };
    if pixel_fields.is_empty() {
        return Err(SVMError::ParseError(format!(
            "line {line_no}: too few fields: {line}"
        )));
    }

    let label = label_str.parse::<usize>().map_err(|_| {
        SVMError::ParseError(format!("line {line_no}: invalid label: {label_str}"))
    })?;

    let pixels = pixel_fields
        .iter()
        .enumerate()
        .map(|(col, field)| {
            field.parse::<f64>().map_err(|_| {
                SVMError::ParseError(format!(
                    "line {line_no}: invalid pixel value at column {}: {field}",
                    col + 1
                ))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok((pixels, label))
}

fn square_side(n: usize) -> Option<usize> {
    let side = (n as f64).sqrt().round() as usize;
    (side > 0 && side * side == n).then_some(side)
}
