use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Samples per output segment unless configured otherwise.
pub const DEFAULT_SEGMENT_LENGTH: usize = 1024;
/// Input file extension unless configured otherwise.
pub const DEFAULT_EXTENSION: &str = "npy";

/// Fully resolved settings for one normalization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding the raw arrays
    pub input_dir: PathBuf,
    /// Directory receiving one file per segment
    pub output_dir: PathBuf,
    /// Window size in samples
    pub segment_length: usize,
    /// Recognized input extension, without the dot
    pub extension: String,
}

impl PipelineConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            segment_length: DEFAULT_SEGMENT_LENGTH,
            extension: DEFAULT_EXTENSION.into(),
        }
    }

    pub fn with_segment_length(mut self, segment_length: usize) -> Self {
        self.segment_length = segment_length;
        self
    }

    /// Checks run at startup, before anything is read.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.segment_length == 0 {
            return Err(PipelineError::InvalidConfig(
                "segment_length must be at least 1".into(),
            ));
        }
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(PipelineError::InvalidConfig(
                "extension must not be empty".into(),
            ));
        }
        if !self.input_dir.is_dir() {
            return Err(PipelineError::InputDirMissing {
                path: self.input_dir.clone(),
            });
        }
        Ok(())
    }
}

/// Partial settings as found in a TOML file or on the command line.
///
/// ```toml
/// input_dir = "device_data"
/// output_dir = "device_data/normalized_data"
/// segment_length = 1024
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub input_dir: Option<PathBuf>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub segment_length: Option<usize>,
    #[serde(default)]
    pub extension: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let contents = fs::read_to_string(path).map_err(|e| config_error(path, e))?;
        toml::from_str(&contents).map_err(|e| config_error(path, e))
    }

    pub fn parse(contents: &str) -> Result<Self, PipelineError> {
        toml::from_str(contents).map_err(|e| config_error(Path::new("<inline>"), e))
    }

    /// Field-wise overlay: values present in `overrides` win.
    pub fn merge(self, overrides: ConfigFile) -> ConfigFile {
        ConfigFile {
            input_dir: overrides.input_dir.or(self.input_dir),
            output_dir: overrides.output_dir.or(self.output_dir),
            segment_length: overrides.segment_length.or(self.segment_length),
            extension: overrides.extension.or(self.extension),
        }
    }

    pub fn input_dir(&self) -> Result<&Path, PipelineError> {
        self.input_dir
            .as_deref()
            .ok_or_else(|| PipelineError::InvalidConfig("input_dir is required".into()))
    }

    pub fn extension(&self) -> &str {
        self.extension.as_deref().unwrap_or(DEFAULT_EXTENSION)
    }

    /// Fill defaults and require both directories.
    pub fn resolve(self) -> Result<PipelineConfig, PipelineError> {
        let input_dir = self.input_dir()?.to_path_buf();
        let output_dir = self
            .output_dir
            .ok_or_else(|| PipelineError::InvalidConfig("output_dir is required".into()))?;
        Ok(PipelineConfig {
            input_dir,
            output_dir,
            segment_length: self.segment_length.unwrap_or(DEFAULT_SEGMENT_LENGTH),
            extension: self
                .extension
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
        })
    }
}

fn config_error(path: &Path, err: impl std::fmt::Display) -> PipelineError {
    PipelineError::Config {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
