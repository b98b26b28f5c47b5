use crate::error::PipelineError;
use crate::io::{list_arrays, npy::load_ppg_column};
use crate::signal::{Extrema, ExtremaAccumulator, PpgColumn};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which pass of the run is touching a file; used in skip reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scan,
    Segment,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Scan => f.write_str("scan"),
            Phase::Segment => f.write_str("segment"),
        }
    }
}

/// A file excluded because it is not a 2-D array with a PPG column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub shape: Vec<usize>,
}

/// Outcome of the extrema pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// `None` when no valid file contributed a sample
    pub extrema: Option<Extrema>,
    /// Files that passed the shape check, in visit order
    pub files: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
}

impl ScanReport {
    /// Bounds for normalization, or `EmptyDataset` when there are none.
    pub fn require_extrema(&self, dir: &Path) -> Result<Extrema, PipelineError> {
        self.extrema.ok_or_else(|| PipelineError::EmptyDataset {
            dir: dir.to_path_buf(),
        })
    }
}

/// Load a file, turning a shape mismatch into a reported skip.
///
/// Any other error is fatal and propagated.
pub(crate) fn load_or_skip(
    path: &Path,
    phase: Phase,
    skipped: &mut Vec<SkippedFile>,
) -> Result<Option<PpgColumn>, PipelineError> {
    match load_ppg_column(path) {
        Ok(column) => Ok(Some(column)),
        Err(PipelineError::MalformedShape { path, shape }) => {
            warn!(
                "[{}] skipping {} (shape {:?}; expected 2-D with a PPG column)",
                phase,
                path.display(),
                shape
            );
            skipped.push(SkippedFile { path, shape });
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Fold column 0 of every file into global bounds.
pub fn scan_files(files: &[PathBuf]) -> Result<ScanReport, PipelineError> {
    let mut acc = ExtremaAccumulator::new();
    let mut valid = Vec::new();
    let mut skipped = Vec::new();
    for path in files {
        if let Some(column) = load_or_skip(path, Phase::Scan, &mut skipped)? {
            debug!("{}: {} samples", path.display(), column.len());
            acc.observe(&column.data);
            valid.push(column.source);
        }
    }
    Ok(ScanReport {
        extrema: acc.finish(),
        files: valid,
        skipped,
    })
}

/// Scan every recognized file under `dir`.
pub fn scan_directory(dir: &Path, extension: &str) -> Result<ScanReport, PipelineError> {
    let files = list_arrays(dir, extension)?;
    scan_files(&files)
}

/// Global (min, max) over column 0 of every valid file under `dir`.
pub fn scan_extrema(dir: &Path, extension: &str) -> Result<Extrema, PipelineError> {
    scan_directory(dir, extension)?.require_extrema(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use ndarray_npy::write_npy;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn extrema_span_all_valid_files() {
        let dir = tempdir().unwrap();
        write_npy(dir.path().join("a.npy"), &array![[5.0f64, 0.0], [-2.0, 0.0]]).unwrap();
        write_npy(dir.path().join("b.npy"), &array![[40.0f64], [3.0], [1.0]]).unwrap();
        write_npy(dir.path().join("flat.npy"), &array![1000.0f64, -1000.0]).unwrap();
        let report = scan_directory(dir.path(), "npy").unwrap();
        let ext = report.extrema.unwrap();
        assert_eq!(ext.min, -2.0);
        assert_eq!(ext.max, 40.0);
        assert_eq!(ext.sample_count, 5);
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].shape, vec![2]);
    }

    #[test]
    fn other_columns_do_not_affect_bounds() {
        let dir = tempdir().unwrap();
        write_npy(
            dir.path().join("a.npy"),
            &array![[1.0f64, -500.0], [2.0, 500.0]],
        )
        .unwrap();
        let ext = scan_extrema(dir.path(), "npy").unwrap();
        assert_eq!((ext.min, ext.max), (1.0, 2.0));
    }

    #[test]
    fn no_valid_files_is_empty_dataset() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            scan_extrema(dir.path(), "npy"),
            Err(PipelineError::EmptyDataset { .. })
        ));
        write_npy(dir.path().join("flat.npy"), &array![1.0f64, 2.0]).unwrap();
        write_npy(dir.path().join("rows0.npy"), &Array2::<f64>::zeros((0, 2))).unwrap();
        assert!(matches!(
            scan_extrema(dir.path(), "npy"),
            Err(PipelineError::EmptyDataset { .. })
        ));
    }

    #[test]
    fn corrupt_file_aborts_scan() {
        let dir = tempdir().unwrap();
        write_npy(dir.path().join("a.npy"), &array![[1.0f64], [2.0]]).unwrap();
        fs::write(dir.path().join("b.npy"), b"\x93NUMPY garbage").unwrap();
        match scan_extrema(dir.path(), "npy") {
            Err(PipelineError::FileRead { path, .. }) => {
                assert_eq!(path, dir.path().join("b.npy"))
            }
            other => panic!("expected read error, got {:?}", other),
        }
    }

    #[test]
    fn phase_names_render_lowercase() {
        assert_eq!(Phase::Scan.to_string(), "scan");
        assert_eq!(Phase::Segment.to_string(), "segment");
    }
}
