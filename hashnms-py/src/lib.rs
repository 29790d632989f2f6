//! Python bindings for the hashnms detection suppression library.
//!
//! Boxes are `float32` arrays of shape `(N, 4)`, scores `float32` arrays of
//! shape `(N,)`. Kept indices come back as `int64` arrays.

use numpy::{PyArray1, PyReadonlyArray1, PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use hashnms::{
    greedy_nms, hashed_nms, BoxesView, HashParams, KeyMode, MultiHashNms as RustMultiHashNms,
    NmsError,
};

/// Convert an NmsError to a Python exception.
fn to_py_err(err: NmsError) -> PyErr {
    if err.is_invalid_input() || err.is_domain() {
        PyValueError::new_err(err.to_string())
    } else {
        PyRuntimeError::new_err(err.to_string())
    }
}

fn parse_key_mode(key_mode: &str) -> PyResult<KeyMode> {
    match key_mode.to_lowercase().as_str() {
        "exact" => Ok(KeyMode::Exact),
        "legacy_packed" => Ok(KeyMode::LegacyPacked),
        _ => Err(PyValueError::new_err(
            "key_mode must be 'exact' or 'legacy_packed'",
        )),
    }
}

/// Borrow an `(N, 4)` array as a contiguous box buffer.
fn boxes_slice<'a>(boxes: &'a PyReadonlyArray2<'_, f32>) -> PyResult<&'a [f32]> {
    let shape = boxes.shape();
    if shape[1] != 4 {
        return Err(PyValueError::new_err(format!(
            "boxes must have shape (N, 4), got ({}, {})",
            shape[0], shape[1]
        )));
    }
    Ok(boxes.as_slice()?)
}

fn to_index_array(py: Python<'_>, keep: Vec<usize>) -> Bound<'_, PyArray1<i64>> {
    let keep: Vec<i64> = keep.into_iter().map(|idx| idx as i64).collect();
    PyArray1::from_vec(py, keep)
}

/// Greedy non-maximum suppression.
///
/// Args:
///     boxes: float32 array (N x 4) of (x1, y1, x2, y2) corners
///     scores: float32 array (N,)
///     iou_threshold: boxes overlapping a kept box with IoU >= this are removed
///
/// Returns:
///     int64 array of kept indices in ascending order
#[pyfunction]
fn nms<'py>(
    py: Python<'py>,
    boxes: PyReadonlyArray2<'py, f32>,
    scores: PyReadonlyArray1<'py, f32>,
    iou_threshold: f32,
) -> PyResult<Bound<'py, PyArray1<i64>>> {
    let view = BoxesView::from_flat(boxes_slice(&boxes)?).map_err(to_py_err)?;
    let keep = greedy_nms(view, scores.as_slice()?, iou_threshold).map_err(to_py_err)?;
    Ok(to_index_array(py, keep))
}

/// Hashed non-maximum suppression.
///
/// Args:
///     boxes: float32 array (N x 4) of (x, y, w, h)
///     scores: float32 array (N,)
///     w0, h0: base anchor size
///     alpha: ratio between consecutive anchor sizes (must not be 1)
///     bx, by: grid offsets in cells (default: 0.5)
///     key_mode: "exact" or "legacy_packed" (default: "exact")
///
/// Returns:
///     int64 array with one kept index per occupied bucket, in bucket order
#[pyfunction]
#[pyo3(signature = (boxes, scores, w0, h0, alpha, bx = 0.5, by = 0.5, key_mode = "exact"))]
#[allow(clippy::too_many_arguments)]
fn hnms<'py>(
    py: Python<'py>,
    boxes: PyReadonlyArray2<'py, f32>,
    scores: PyReadonlyArray1<'py, f32>,
    w0: f32,
    h0: f32,
    alpha: f32,
    bx: f32,
    by: f32,
    key_mode: &str,
) -> PyResult<Bound<'py, PyArray1<i64>>> {
    let params = HashParams::new(w0, h0, alpha, bx, by).with_key_mode(parse_key_mode(key_mode)?);
    let view = BoxesView::from_flat(boxes_slice(&boxes)?).map_err(to_py_err)?;
    let keep = hashed_nms(view, scores.as_slice()?, &params).map_err(to_py_err)?;
    Ok(to_index_array(py, keep))
}

/// Chain of staggered hashed NMS passes.
#[pyclass]
#[derive(Clone)]
pub struct MultiHashNms {
    inner: RustMultiHashNms,
}

#[pymethods]
impl MultiHashNms {
    /// Create `num` passes for anchor ratio `alpha`.
    ///
    /// Args:
    ///     num: number of hashing passes (>= 1)
    ///     alpha: ratio between consecutive anchor sizes (must not be 1)
    ///     parallel: quantize on a thread pool (default: False)
    #[new]
    #[pyo3(signature = (num, alpha, parallel = false))]
    fn new(num: usize, alpha: f32, parallel: bool) -> PyResult<Self> {
        let inner = RustMultiHashNms::new(num, alpha)
            .map_err(to_py_err)?
            .with_parallel(parallel);
        Ok(Self { inner })
    }

    /// Number of hashing passes.
    fn num_passes(&self) -> usize {
        self.inner.passes().len()
    }

    /// Run all passes over (x, y, w, h) boxes and return kept indices.
    fn __call__<'py>(
        &self,
        py: Python<'py>,
        boxes: PyReadonlyArray2<'py, f32>,
        scores: PyReadonlyArray1<'py, f32>,
    ) -> PyResult<Bound<'py, PyArray1<i64>>> {
        let view = BoxesView::from_flat(boxes_slice(&boxes)?).map_err(to_py_err)?;
        let keep = self
            .inner
            .apply(view, scores.as_slice()?)
            .map_err(to_py_err)?;
        Ok(to_index_array(py, keep))
    }

    fn __repr__(&self) -> String {
        let alpha = self.inner.passes().first().map_or(0.0, |p| p.alpha);
        format!(
            "MultiHashNms(num={}, alpha={})",
            self.inner.passes().len(),
            alpha
        )
    }
}

/// Python module for hashnms.
#[pymodule]
fn _hashnms(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<MultiHashNms>()?;
    m.add_function(wrap_pyfunction!(nms, m)?)?;
    m.add_function(wrap_pyfunction!(hnms, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
