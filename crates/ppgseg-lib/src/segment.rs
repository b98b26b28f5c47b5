use crate::error::PipelineError;
use crate::io::npy::write_segment;
use crate::scan::{load_or_skip, Phase, SkippedFile};
use crate::signal::{Extrema, PpgColumn};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Affine map `x -> (x - min) / (max - min)` built from global bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    min: f64,
    span: f64,
}

impl Normalizer {
    /// Fails with `DegenerateRange` when `max <= min`, and with
    /// `RangeOverflow` when `max - min` is not finite.
    pub fn new(extrema: &Extrema) -> Result<Self, PipelineError> {
        if extrema.is_degenerate() {
            return Err(PipelineError::DegenerateRange {
                min: extrema.min,
                max: extrema.max,
            });
        }
        if !extrema.span().is_finite() {
            return Err(PipelineError::RangeOverflow {
                min: extrema.min,
                max: extrema.max,
            });
        }
        Ok(Self {
            min: extrema.min,
            span: extrema.span(),
        })
    }

    pub fn normalize(&self, sample: f64) -> f64 {
        (sample - self.min) / self.span
    }

    pub fn denormalize(&self, value: f64) -> f64 {
        value * self.span + self.min
    }

    /// Normalize in f64, then narrow to f32 for storage.
    pub fn normalize_window(&self, window: &[f64]) -> Vec<f32> {
        window.iter().map(|&x| self.normalize(x) as f32).collect()
    }
}

/// Number of complete windows; the remainder is dropped.
pub fn segment_count(len: usize, segment_length: usize) -> usize {
    len / segment_length
}

pub fn segment_file_name(stem: &str, index: usize) -> String {
    format!("{}_seg{}.npy", stem, index)
}

/// What was written for one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentedFile {
    pub source: PathBuf,
    pub samples: usize,
    pub segments: usize,
    pub dropped_samples: usize,
    pub outputs: Vec<PathBuf>,
}

/// Slice a column into non-overlapping windows, normalize and write each one.
pub fn write_column_segments(
    column: &PpgColumn,
    normalizer: &Normalizer,
    segment_length: usize,
    output_dir: &Path,
) -> Result<SegmentedFile, PipelineError> {
    let stem = column.stem();
    let windows = column.data.chunks_exact(segment_length);
    let dropped_samples = windows.remainder().len();
    let mut outputs = Vec::with_capacity(segment_count(column.len(), segment_length));
    for (index, window) in windows.enumerate() {
        let path = output_dir.join(segment_file_name(&stem, index));
        write_segment(&path, &normalizer.normalize_window(window))?;
        info!("wrote {}", path.display());
        outputs.push(path);
    }
    if outputs.is_empty() {
        debug!(
            "{}: {} samples, shorter than one segment",
            column.source.display(),
            column.len()
        );
    }
    Ok(SegmentedFile {
        source: column.source.clone(),
        samples: column.len(),
        segments: outputs.len(),
        dropped_samples,
        outputs,
    })
}

/// Second pass: re-read every file and write its normalized segments.
///
/// `output_dir` must already exist.
pub fn segment_files(
    files: &[PathBuf],
    extrema: &Extrema,
    segment_length: usize,
    output_dir: &Path,
) -> Result<(Vec<SegmentedFile>, Vec<SkippedFile>), PipelineError> {
    let normalizer = Normalizer::new(extrema)?;
    let mut written = Vec::new();
    let mut skipped = Vec::new();
    for path in files {
        if let Some(column) = load_or_skip(path, Phase::Segment, &mut skipped)? {
            written.push(write_column_segments(
                &column,
                &normalizer,
                segment_length,
                output_dir,
            )?);
        }
    }
    Ok((written, skipped))
}
