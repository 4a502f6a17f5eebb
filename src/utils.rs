//! utils — conversion of Python inputs into panel types.
//!
//! Used only by the PyO3 bindings in `lib.rs`. Every helper accepts the
//! loose inputs Python callers have at hand (numpy arrays, pandas objects,
//! nested lists) and normalizes them into [`Labels`], [`Table`] or a 3D
//! `ndarray`, reporting failures as Python exceptions.

#[cfg(feature = "python-bindings")]
use ndarray::{Array2, Array3};

#[cfg(feature = "python-bindings")]
use numpy::{PyReadonlyArray2, PyReadonlyArray3, PyUntypedArrayMethods};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::PyTypeError,
    prelude::*,
    types::{PyAny, PyDict},
};

#[cfg(feature = "python-bindings")]
use crate::panel::{
    errors::PanelError,
    labels::{IntoLabels, Label, Labels},
    table::{IntoTable, Table},
};

/// Convert one Python scalar into a [`Label`].
#[cfg(feature = "python-bindings")]
pub fn extract_label(item: &Bound<'_, PyAny>) -> PyResult<Label> {
    if let Ok(int) = item.extract::<i64>() {
        return Ok(Label::Int(int));
    }
    if let Ok(name) = item.extract::<String>() {
        return Ok(Label::Str(name));
    }
    Err(PyTypeError::new_err(format!("labels must be int or str, got {item}")))
}

/// Convert a Python label container into [`Labels`].
///
/// Accepts lists, tuples, numpy arrays and pandas `Index` / `Series`
/// objects. Arrays with more than one non-unit axis are rejected with
/// `PanelError::NotOneDimensional`; unit axes are flattened away.
#[cfg(feature = "python-bindings")]
pub fn extract_labels(obj: &Bound<'_, PyAny>) -> PyResult<Labels> {
    if let Ok(shape) = obj.getattr("shape").and_then(|shape| shape.extract::<Vec<usize>>()) {
        if shape.iter().filter(|&&n| n > 1).count() > 1 {
            return Err(PanelError::NotOneDimensional { shape }.into());
        }
    }
    let flat = if obj.hasattr("ravel")? && obj.hasattr("ndim")? {
        obj.call_method0("ravel")?
    } else {
        obj.clone()
    };
    let seq = if flat.hasattr("tolist")? { flat.call_method0("tolist")? } else { flat };

    let items: Vec<Bound<'_, PyAny>> = seq
        .extract()
        .map_err(|_| PyTypeError::new_err("labels must be a one-dimensional sequence"))?;
    let labels = items.iter().map(extract_label).collect::<PyResult<Vec<Label>>>()?;
    Ok(labels.into_labels()?)
}

/// Convert a Python 2D input into a [`Table`].
///
/// Accepts a pandas `DataFrame` (values plus index and column labels), a
/// `float64` numpy array, or a nested sequence of numbers and `None`
/// (`None` and `nan` become missing values).
#[cfg(feature = "python-bindings")]
pub fn extract_table(obj: &Bound<'_, PyAny>) -> PyResult<Table> {
    if obj.hasattr("to_numpy")? && obj.hasattr("index")? && obj.hasattr("columns")? {
        let kwargs = PyDict::new(obj.py());
        kwargs.set_item("dtype", "float64")?;
        let values = extract_array2(&obj.call_method("to_numpy", (), Some(&kwargs))?)?;
        let table = Table::new(values)?
            .with_row_labels(extract_labels(&obj.getattr("index")?)?)?
            .with_column_labels(extract_labels(&obj.getattr("columns")?)?)?;
        return Ok(table);
    }
    Ok(Table::new(extract_array2(obj)?)?)
}

#[cfg(feature = "python-bindings")]
fn extract_array2(obj: &Bound<'_, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(array) = obj.extract::<PyReadonlyArray2<f64>>() {
        return Ok(array.as_array().to_owned());
    }
    let rows: Vec<Vec<Option<f64>>> = obj.extract().map_err(|_| {
        PyTypeError::new_err(
            "expected a pandas.DataFrame, a 2-D numpy.ndarray, or a nested sequence of floats",
        )
    })?;
    let (values, _, _) = rows.into_table()?.into_parts();
    Ok(values)
}

/// Convert a Python 3D input `(entity × time × variable)` into an owned
/// array.
#[cfg(feature = "python-bindings")]
pub fn extract_array3(obj: &Bound<'_, PyAny>) -> PyResult<Array3<f64>> {
    if let Ok(array) = obj.extract::<PyReadonlyArray3<f64>>() {
        return Ok(array.as_array().to_owned());
    }
    let numpy = obj.py().import("numpy")?;
    let kwargs = PyDict::new(obj.py());
    kwargs.set_item("dtype", "float64")?;
    let converted = numpy.call_method("asarray", (obj,), Some(&kwargs))?;
    if converted.downcast::<numpy::PyUntypedArray>()?.ndim() != 3 {
        return Err(PyTypeError::new_err("expected a 3-D array (entity x time x variable)"));
    }
    let array: PyReadonlyArray3<f64> = converted.extract()?;
    Ok(array.as_array().to_owned())
}

/// Normalize `x` given as one name or a sequence of names.
#[cfg(feature = "python-bindings")]
pub fn extract_names(obj: &Bound<'_, PyAny>) -> PyResult<Vec<String>> {
    if let Ok(name) = obj.extract::<String>() {
        return Ok(vec![name]);
    }
    obj.extract::<Vec<String>>()
        .map_err(|_| PyTypeError::new_err("x must be a variable name or a sequence of names"))
}
