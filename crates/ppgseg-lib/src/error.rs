use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while scanning, normalizing and writing PPG segments.
///
/// Every variant except [`PipelineError::MalformedShape`] aborts a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No valid input array contributed any PPG sample.
    #[error("no PPG samples found in `{dir}` (no valid 2-D arrays with a PPG column)")]
    EmptyDataset { dir: PathBuf },

    /// A file could not be opened or decoded as a numeric array.
    #[error("failed to read `{path}`: {message}")]
    FileRead { path: PathBuf, message: String },

    /// Global max equals global min, so `(x - min) / (max - min)` is undefined.
    #[error("degenerate PPG range: min = {min}, max = {max}; cannot normalize")]
    DegenerateRange { min: f64, max: f64 },

    /// `max - min` overflows f64, so every normalized value would be 0 or NaN.
    #[error("PPG range overflows: min = {min}, max = {max}; cannot normalize")]
    RangeOverflow { min: f64, max: f64 },

    /// The array is not 2-D or has no PPG column. Reported and skipped.
    #[error("`{path}` has shape {shape:?}; expected a 2-D array with at least one column")]
    MalformedShape { path: PathBuf, shape: Vec<usize> },

    /// Column 0 holds a NaN or infinity.
    #[error("`{path}` has a non-finite PPG sample ({value}) at row {row}")]
    InvalidSample {
        path: PathBuf,
        row: usize,
        value: f64,
    },

    #[error("failed to write `{path}`: {message}")]
    FileWrite { path: PathBuf, message: String },

    #[error("input directory `{path}` does not exist or is not a directory")]
    InputDirMissing { path: PathBuf },

    #[error("failed to create output directory `{path}`")]
    OutputDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The TOML configuration file could not be read or parsed.
    #[error("failed to load config `{path}`: {message}")]
    Config { path: PathBuf, message: String },
}

impl PipelineError {
    pub fn file_read<S: Into<String>>(path: &Path, msg: S) -> Self {
        PipelineError::FileRead {
            path: path.to_path_buf(),
            message: msg.into(),
        }
    }

    pub fn file_write<S: Into<String>>(path: &Path, msg: S) -> Self {
        PipelineError::FileWrite {
            path: path.to_path_buf(),
            message: msg.into(),
        }
    }

    /// Whether the error should abort the run rather than skip one file.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PipelineError::MalformedShape { .. })
    }
}
