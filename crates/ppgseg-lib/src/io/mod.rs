pub mod npy;

use crate::error::PipelineError;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// List regular files directly under `dir` whose extension is exactly
/// `extension`, sorted by path.
///
/// Matching is case-sensitive and hidden files are ignored, as with a shell
/// `*.npy` glob. File names need not be valid UTF-8.
pub fn list_arrays(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, PipelineError> {
    if !dir.is_dir() {
        return Err(PipelineError::InputDirMissing {
            path: dir.to_path_buf(),
        });
    }
    let wanted = OsStr::new(extension.trim_start_matches('.'));
    let entries = fs::read_dir(dir).map_err(|e| PipelineError::file_read(dir, e.to_string()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| PipelineError::file_read(dir, e.to_string()))?
            .path();
        let hidden = path
            .file_name()
            .map_or(true, |n| n.as_encoded_bytes().starts_with(b"."));
        let matches = path.extension() == Some(wanted);
        if !hidden && matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
