use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// PPG samples taken from column 0 of one input array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PpgColumn {
    /// File the column was read from
    pub source: PathBuf,
    /// Samples, widened to f64
    pub data: Vec<f64>,
}

impl PpgColumn {
    pub fn new(source: impl Into<PathBuf>, data: Vec<f64>) -> Self {
        Self {
            source: source.into(),
            data,
        }
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    /// Source file name without its extension, used to name segment outputs.
    pub fn stem(&self) -> String {
        file_stem(&self.source)
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Dataset-wide normalization bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extrema {
    pub min: f64,
    pub max: f64,
    /// Number of column-0 samples the bounds were computed over
    pub sample_count: usize,
}

impl Extrema {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// True when every observed sample has the same value.
    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }
}

/// Running min/max over any number of sample slices.
///
/// Folding is commutative, so the result does not depend on the order in
/// which files are visited.
#[derive(Debug, Clone, Copy)]
pub struct ExtremaAccumulator {
    min: f64,
    max: f64,
    count: usize,
}

impl Default for ExtremaAccumulator {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            count: 0,
        }
    }
}

impl ExtremaAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, samples: &[f64]) {
        for &x in samples {
            self.min = self.min.min(x);
            self.max = self.max.max(x);
        }
        self.count += samples.len();
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            count: self.count + other.count,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `None` when no samples were observed.
    pub fn finish(self) -> Option<Extrema> {
        if self.count == 0 {
            return None;
        }
        Some(Extrema {
            min: self.min,
            max: self.max,
            sample_count: self.count,
        })
    }
}
