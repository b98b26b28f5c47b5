use crate::error::PipelineError;
use crate::signal::PpgColumn;
use ndarray::{Array1, ArrayD, ArrayView1, Ix2};
use ndarray_npy::{write_npy, ReadNpyError, ReadNpyExt, ReadableElement};
use num_traits::AsPrimitive;
use std::fs;
use std::path::Path;

/// Load column 0 of a 2-D `.npy` array as a [`PpgColumn`].
///
/// Integer and `f32` arrays are widened to `f64`. Arrays that are not 2-D, or
/// have zero columns, yield [`PipelineError::MalformedShape`].
pub fn load_ppg_column(path: &Path) -> Result<PpgColumn, PipelineError> {
    let bytes = fs::read(path).map_err(|e| PipelineError::file_read(path, e.to_string()))?;
    let array = decode_widened(&bytes)
        .map_err(|e| PipelineError::file_read(path, format!("NPY decode error: {e}")))?;
    let shape = array.shape().to_vec();
    let matrix = match array.into_dimensionality::<Ix2>() {
        Ok(m) if m.ncols() >= 1 => m,
        _ => {
            return Err(PipelineError::MalformedShape {
                path: path.to_path_buf(),
                shape,
            })
        }
    };
    let data = matrix.column(0).to_vec();
    if let Some((row, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(PipelineError::InvalidSample {
            path: path.to_path_buf(),
            row,
            value,
        });
    }
    Ok(PpgColumn::new(path, data))
}

/// Persist one normalized segment as a 1-D little-endian `<f4` array.
pub fn write_segment(path: &Path, values: &[f32]) -> Result<(), PipelineError> {
    write_npy(path, &ArrayView1::from(values))
        .map_err(|e| PipelineError::file_write(path, e.to_string()))
}

/// Read back a segment written by [`write_segment`].
pub fn load_segment(path: &Path) -> Result<Vec<f32>, PipelineError> {
    let file = fs::File::open(path).map_err(|e| PipelineError::file_read(path, e.to_string()))?;
    let array = Array1::<f32>::read_npy(file)
        .map_err(|e| PipelineError::file_read(path, format!("NPY decode error: {e}")))?;
    Ok(array.to_vec())
}

/// Try each supported element type in turn; only a descriptor mismatch moves
/// on to the next one.
fn decode_widened(bytes: &[u8]) -> Result<ArrayD<f64>, ReadNpyError> {
    read_widened::<f64>(bytes)
        .or_else(|e| on_wrong_descriptor(e, || read_widened::<f32>(bytes)))
        .or_else(|e| on_wrong_descriptor(e, || read_widened::<i64>(bytes)))
        .or_else(|e| on_wrong_descriptor(e, || read_widened::<i32>(bytes)))
        .or_else(|e| on_wrong_descriptor(e, || read_widened::<i16>(bytes)))
        .or_else(|e| on_wrong_descriptor(e, || read_widened::<u16>(bytes)))
        .or_else(|e| on_wrong_descriptor(e, || read_widened::<u8>(bytes)))
}

fn read_widened<A>(bytes: &[u8]) -> Result<ArrayD<f64>, ReadNpyError>
where
    A: ReadableElement + AsPrimitive<f64>,
{
    let array = ArrayD::<A>::read_npy(bytes)?;
    Ok(array.mapv(|v| v.as_()))
}

fn on_wrong_descriptor<F>(err: ReadNpyError, next: F) -> Result<ArrayD<f64>, ReadNpyError>
where
    F: FnOnce() -> Result<ArrayD<f64>, ReadNpyError>,
{
    match err {
        ReadNpyError::WrongDescriptor(_) => next(),
        other => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2, Array3};
    use tempfile::tempdir;

    #[test]
    fn reads_first_column_of_f64_matrix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.npy");
        let data: Array2<f64> = array![[1.0, 10.0], [2.0, 20.0], [3.5, 30.0]];
        write_npy(&path, &data).unwrap();
        let col = load_ppg_column(&path).expect("load");
        assert_eq!(col.data, vec![1.0, 2.0, 3.5]);
        assert_eq!(col.source, path);
    }

    #[test]
    fn widens_integer_and_f32_arrays() {
        let dir = tempdir().unwrap();
        let ints = dir.path().join("ints.npy");
        write_npy(&ints, &array![[512i32, 1], [-7, 2]]).unwrap();
        assert_eq!(load_ppg_column(&ints).unwrap().data, vec![512.0, -7.0]);

        let floats = dir.path().join("floats.npy");
        write_npy(&floats, &array![[0.25f32], [0.5f32]]).unwrap();
        assert_eq!(load_ppg_column(&floats).unwrap().data, vec![0.25, 0.5]);
    }

    #[test]
    fn one_dimensional_array_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flat.npy");
        write_npy(&path, &array![1.0f64, 2.0, 3.0]).unwrap();
        match load_ppg_column(&path) {
            Err(PipelineError::MalformedShape { shape, .. }) => assert_eq!(shape, vec![3]),
            other => panic!("expected malformed shape, got {:?}", other),
        }
    }

    #[test]
    fn zero_column_and_3d_arrays_are_malformed() {
        let dir = tempdir().unwrap();
        let empty_cols = dir.path().join("nocols.npy");
        write_npy(&empty_cols, &Array2::<f64>::zeros((8, 0))).unwrap();
        assert!(matches!(
            load_ppg_column(&empty_cols),
            Err(PipelineError::MalformedShape { .. })
        ));

        let cube = dir.path().join("cube.npy");
        write_npy(&cube, &Array3::<f64>::zeros((2, 2, 2))).unwrap();
        assert!(matches!(
            load_ppg_column(&cube),
            Err(PipelineError::MalformedShape { .. })
        ));
    }

    #[test]
    fn garbage_bytes_are_a_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("junk.npy");
        fs::write(&path, b"not an npy file at all").unwrap();
        let err = load_ppg_column(&path).unwrap_err();
        assert!(matches!(err, PipelineError::FileRead { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn unsupported_dtype_is_a_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flags.npy");
        write_npy(&path, &array![[true], [false]]).unwrap();
        assert!(matches!(
            load_ppg_column(&path),
            Err(PipelineError::FileRead { .. })
        ));
    }

    #[test]
    fn nan_sample_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nan.npy");
        write_npy(&path, &array![[1.0f64], [f64::NAN]]).unwrap();
        match load_ppg_column(&path) {
            Err(PipelineError::InvalidSample { row, .. }) => assert_eq!(row, 1),
            other => panic!("expected invalid sample, got {:?}", other),
        }
    }

    #[test]
    fn segment_written_as_f32_vector() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a_seg0.npy");
        write_segment(&path, &[0.0, 0.5, 1.0]).unwrap();
        assert_eq!(load_segment(&path).unwrap(), vec![0.0, 0.5, 1.0]);
        let bytes = fs::read(&path).unwrap();
        let header = String::from_utf8_lossy(&bytes[..bytes.len().min(128)]);
        assert!(header.contains("<f4"));
    }
}
