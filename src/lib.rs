//! panel_reg — panel data assembly and within-entity regressions, with
//! optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the panel builder and the panel estimators to Python via the
//! `_panel_reg` extension module. When the `python-bindings` feature is
//! enabled, this module defines the Python-facing classes.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules: `panel` (labels, tables, the
//!   [`Panel`](crate::panel::Panel) container and its builder), `ols` (the
//!   least-squares seam and its dense default), and `estimators`
//!   (first differences and fixed effects).
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_panel_reg` Python extension.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input conversion, and error mapping.
//! - Python-side estimators own a copy of their panel, since Python objects
//!   cannot hold the borrows the Rust estimators use.
//!
//! Conventions
//! -----------
//! - Axis labels cross the boundary as Python `int` or `str`.
//! - Missing values are `nan` on both sides.
//! - Errors from core Rust code are converted to `PyErr` values at the PyO3
//!   boundary: type problems raise `TypeError`, everything else
//!   `ValueError`.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code depends on the inner modules and can ignore the PyO3
//!   items guarded by the `python-bindings` feature.
//! - A pure-Python `panel_reg` package imports `_panel_reg` and re-exports
//!   its classes.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by
//!   `tests/integration_panel_pipeline.rs`.

pub mod estimators;
pub mod logging;
pub mod ols;
pub mod panel;
pub mod utils;

#[cfg(feature = "python-bindings")]
use ndarray::{Array2, Array3};

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1, PyArray2, PyArray3};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    estimators::{FirstDiff, FixedEffects, ModelSpec, PanelFit},
    ols::{Ols, OlsOptions},
    panel::{Label, Labels, Panel, PanelBuilder},
    utils::{extract_array3, extract_label, extract_labels, extract_names, extract_table},
};

#[cfg(feature = "python-bindings")]
fn label_to_py<'py>(py: Python<'py>, label: &Label) -> PyResult<Bound<'py, PyAny>> {
    Ok(match label {
        Label::Int(value) => value.into_pyobject(py)?.into_any(),
        Label::Str(name) => name.into_pyobject(py)?.into_any(),
    })
}

#[cfg(feature = "python-bindings")]
fn labels_to_py<'py>(py: Python<'py>, labels: &Labels) -> PyResult<Vec<Bound<'py, PyAny>>> {
    labels.iter().map(|label| label_to_py(py, label)).collect()
}

#[cfg(feature = "python-bindings")]
fn ols_with(cov_type: &str) -> PyResult<Ols> {
    Ok(Ols::new(OlsOptions::new(cov_type.parse()?, None)?))
}

/// PanelBuilder — Python-facing wrapper for [`PanelBuilder`].
///
/// Purpose
/// -------
/// Let Python callers assemble a panel from label containers, pandas
/// DataFrames, numpy arrays or nested lists, one slice at a time.
///
/// Key behaviors
/// -------------
/// - `specify_times` / `specify_entities` / `specify_variables` return
///   `True` when applied and `False` when a relabel is rejected for a
///   length mismatch (the rejection is also listed in `diagnostics`).
/// - `add_slice_by_time(slice, use_index=False, use_columns=False)` and the
///   by-entity / batch variants forward to the Rust builder.
/// - `build()` returns a new `Panel` and may be called repeatedly.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "PanelBuilder", module = "panel_reg")]
pub struct PyPanelBuilder {
    pub inner: PanelBuilder,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyPanelBuilder {
    #[new]
    pub fn new() -> Self {
        PyPanelBuilder { inner: PanelBuilder::new() }
    }

    pub fn specify_times(&mut self, times: &Bound<'_, PyAny>) -> PyResult<bool> {
        Ok(self.inner.specify_times(extract_labels(times)?)?.is_applied())
    }

    pub fn specify_entities(&mut self, entities: &Bound<'_, PyAny>) -> PyResult<bool> {
        Ok(self.inner.specify_entities(extract_labels(entities)?)?.is_applied())
    }

    pub fn specify_variables(&mut self, variables: &Bound<'_, PyAny>) -> PyResult<bool> {
        Ok(self.inner.specify_variables(extract_labels(variables)?)?.is_applied())
    }

    #[pyo3(signature = (slice, use_index = false, use_columns = false))]
    pub fn add_slice_by_time(
        &mut self, slice: &Bound<'_, PyAny>, use_index: bool, use_columns: bool,
    ) -> PyResult<()> {
        self.inner.add_slice_by_time(extract_table(slice)?, use_index, use_columns)?;
        Ok(())
    }

    #[pyo3(signature = (slices, use_index = false, use_columns = false))]
    pub fn add_slices_by_time(
        &mut self, slices: Vec<Bound<'_, PyAny>>, use_index: bool, use_columns: bool,
    ) -> PyResult<()> {
        let tables = slices.iter().map(extract_table).collect::<PyResult<Vec<_>>>()?;
        self.inner.add_slices_by_time(tables, use_index, use_columns)?;
        Ok(())
    }

    #[pyo3(signature = (slice, use_index = false, use_columns = false))]
    pub fn add_slice_by_entity(
        &mut self, slice: &Bound<'_, PyAny>, use_index: bool, use_columns: bool,
    ) -> PyResult<()> {
        self.inner.add_slice_by_entity(extract_table(slice)?, use_index, use_columns)?;
        Ok(())
    }

    #[pyo3(signature = (slices, use_index = false, use_columns = false))]
    pub fn add_slices_by_entity(
        &mut self, slices: Vec<Bound<'_, PyAny>>, use_index: bool, use_columns: bool,
    ) -> PyResult<()> {
        let tables = slices.iter().map(extract_table).collect::<PyResult<Vec<_>>>()?;
        self.inner.add_slices_by_entity(tables, use_index, use_columns)?;
        Ok(())
    }

    /// Supply the whole `(entity × time × variable)` cube at once.
    pub fn set_array(&mut self, array: &Bound<'_, PyAny>) -> PyResult<()> {
        self.inner.set_array(extract_array3(array)?)?;
        Ok(())
    }

    pub fn build(&self) -> PyResult<PyPanel> {
        Ok(PyPanel { inner: self.inner.build()? })
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// `(n_entities, n_times, n_variables)`, 0 for unset dimensions.
    #[getter]
    pub fn dimensions(&self) -> (usize, usize, usize) {
        self.inner.dimensions()
    }

    #[getter]
    pub fn mode(&self) -> Option<String> {
        self.inner.mode().map(|mode| mode.to_string())
    }

    #[getter]
    pub fn diagnostics(&self) -> Vec<String> {
        self.inner.diagnostics().iter().map(ToString::to_string).collect()
    }
}

/// Panel — Python-facing wrapper for a built [`Panel`].
#[cfg(feature = "python-bindings")]
#[pyclass(name = "Panel", module = "panel_reg")]
#[derive(Clone)]
pub struct PyPanel {
    pub inner: Panel,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyPanel {
    #[getter]
    pub fn entities<'py>(&self, py: Python<'py>) -> PyResult<Vec<Bound<'py, PyAny>>> {
        labels_to_py(py, self.inner.entities())
    }

    #[getter]
    pub fn times<'py>(&self, py: Python<'py>) -> PyResult<Vec<Bound<'py, PyAny>>> {
        labels_to_py(py, self.inner.times())
    }

    #[getter]
    pub fn variables<'py>(&self, py: Python<'py>) -> PyResult<Vec<Bound<'py, PyAny>>> {
        labels_to_py(py, self.inner.variables())
    }

    #[getter]
    pub fn shape(&self) -> (usize, usize, usize) {
        self.inner.dims()
    }

    /// Copy of the `(entity × time × variable)` value cube.
    #[getter]
    pub fn values<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray3<f64>> {
        self.inner.values().clone().into_pyarray(py)
    }

    #[getter]
    pub fn n_missing(&self) -> usize {
        self.inner.n_missing()
    }

    pub fn is_balanced(&self) -> bool {
        self.inner.is_balanced()
    }

    /// Value at `(entity, time, variable)`; `None` for unknown labels.
    pub fn value(
        &self, entity: &Bound<'_, PyAny>, time: &Bound<'_, PyAny>, variable: &Bound<'_, PyAny>,
    ) -> PyResult<Option<f64>> {
        Ok(self.inner.value(&extract_label(entity)?, &extract_label(time)?, &extract_label(variable)?))
    }

    pub fn __repr__(&self) -> String {
        let (e, t, v) = self.inner.dims();
        format!("Panel(entities={e}, times={t}, variables={v}, missing={})", self.inner.n_missing())
    }
}

/// PanelFit — Python-facing view of an estimated panel regression.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "PanelFit", module = "panel_reg")]
#[derive(Clone)]
pub struct PyPanelFit {
    pub inner: PanelFit,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyPanelFit {
    #[getter]
    pub fn estimator(&self) -> String {
        self.inner.kind.to_string()
    }

    #[getter]
    pub fn dependent(&self) -> String {
        self.inner.dependent.clone()
    }

    #[getter]
    pub fn regressors(&self) -> Vec<String> {
        self.inner.regressors.clone()
    }

    #[getter]
    pub fn params(&self) -> Vec<f64> {
        self.inner.fit.params.to_vec()
    }

    #[getter]
    pub fn std_errors(&self) -> Vec<f64> {
        self.inner.fit.std_errors.to_vec()
    }

    #[getter]
    pub fn t_values(&self) -> Vec<f64> {
        self.inner.fit.t_values.to_vec()
    }

    #[getter]
    pub fn p_values(&self) -> Vec<f64> {
        self.inner.fit.p_values.to_vec()
    }

    #[getter]
    pub fn residuals<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.fit.residuals.clone().into_pyarray(py)
    }

    #[getter]
    pub fn r_squared(&self) -> f64 {
        self.inner.fit.r_squared
    }

    #[getter]
    pub fn nobs(&self) -> usize {
        self.inner.fit.nobs
    }

    #[getter]
    pub fn dropped(&self) -> usize {
        self.inner.dropped
    }

    pub fn summary(&self) -> String {
        self.inner.summary()
    }

    pub fn __str__(&self) -> String {
        self.inner.summary()
    }
}

#[cfg(feature = "python-bindings")]
fn transformed_to_py<'py>(
    py: Python<'py>, transformed: &Option<(Array2<f64>, Array3<f64>)>,
) -> (Option<Bound<'py, PyArray2<f64>>>, Option<Bound<'py, PyArray3<f64>>>) {
    match transformed {
        Some((y, x)) => (Some(y.clone().into_pyarray(py)), Some(x.clone().into_pyarray(py))),
        None => (None, None),
    }
}

/// FirstDiff — Python-facing first-difference estimator.
///
/// Constructed as `FirstDiff(panel, y, x)` where `x` is one variable name
/// or a list of names. `estimate(cov_type="nonrobust")` fits the model and
/// returns a `PanelFit`; the differenced data is then available through
/// `transformed_y` / `transformed_x`.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "FirstDiff", module = "panel_reg")]
pub struct PyFirstDiff {
    panel: Panel,
    spec: ModelSpec,
    result: Option<PanelFit>,
    transformed: Option<(Array2<f64>, Array3<f64>)>,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyFirstDiff {
    #[new]
    pub fn new(panel: PyRef<'_, PyPanel>, y: &str, x: &Bound<'_, PyAny>) -> PyResult<Self> {
        let spec = ModelSpec::new(&panel.inner, y, extract_names(x)?)?;
        Ok(PyFirstDiff { panel: panel.inner.clone(), spec, result: None, transformed: None })
    }

    #[pyo3(signature = (cov_type = "nonrobust"))]
    pub fn estimate(&mut self, cov_type: &str) -> PyResult<PyPanelFit> {
        let mut estimator = FirstDiff::new(&self.panel, &self.spec.y, self.spec.x.as_slice())?
            .with_solver(ols_with(cov_type)?);
        let fit = estimator.estimate()?.clone();
        self.transformed =
            estimator.transformed_y().cloned().zip(estimator.transformed_x().cloned());
        self.result = Some(fit.clone());
        Ok(PyPanelFit { inner: fit })
    }

    #[getter]
    pub fn result(&self) -> Option<PyPanelFit> {
        self.result.clone().map(|inner| PyPanelFit { inner })
    }

    #[getter]
    pub fn transformed_y<'py>(&self, py: Python<'py>) -> Option<Bound<'py, PyArray2<f64>>> {
        transformed_to_py(py, &self.transformed).0
    }

    #[getter]
    pub fn transformed_x<'py>(&self, py: Python<'py>) -> Option<Bound<'py, PyArray3<f64>>> {
        transformed_to_py(py, &self.transformed).1
    }
}

/// FixedEffects — Python-facing fixed-effects estimator.
///
/// Constructed as `FixedEffects(panel, y, x, include_time_effects=False)`;
/// otherwise identical to `FirstDiff`.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "FixedEffects", module = "panel_reg")]
pub struct PyFixedEffects {
    panel: Panel,
    spec: ModelSpec,
    include_time_effects: bool,
    result: Option<PanelFit>,
    transformed: Option<(Array2<f64>, Array3<f64>)>,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyFixedEffects {
    #[new]
    #[pyo3(signature = (panel, y, x, include_time_effects = false))]
    pub fn new(
        panel: PyRef<'_, PyPanel>, y: &str, x: &Bound<'_, PyAny>, include_time_effects: bool,
    ) -> PyResult<Self> {
        let spec = ModelSpec::new(&panel.inner, y, extract_names(x)?)?;
        Ok(PyFixedEffects {
            panel: panel.inner.clone(),
            spec,
            include_time_effects,
            result: None,
            transformed: None,
        })
    }

    #[pyo3(signature = (cov_type = "nonrobust"))]
    pub fn estimate(&mut self, cov_type: &str) -> PyResult<PyPanelFit> {
        let mut estimator = FixedEffects::new(
            &self.panel,
            &self.spec.y,
            self.spec.x.as_slice(),
            self.include_time_effects,
        )?
        .with_solver(ols_with(cov_type)?);
        let fit = estimator.estimate()?.clone();
        self.transformed =
            estimator.transformed_y().cloned().zip(estimator.transformed_x().cloned());
        self.result = Some(fit.clone());
        Ok(PyPanelFit { inner: fit })
    }

    #[getter]
    pub fn include_time_effects(&self) -> bool {
        self.include_time_effects
    }

    #[getter]
    pub fn result(&self) -> Option<PyPanelFit> {
        self.result.clone().map(|inner| PyPanelFit { inner })
    }

    #[getter]
    pub fn transformed_y<'py>(&self, py: Python<'py>) -> Option<Bound<'py, PyArray2<f64>>> {
        transformed_to_py(py, &self.transformed).0
    }

    #[getter]
    pub fn transformed_x<'py>(&self, py: Python<'py>) -> Option<Bound<'py, PyArray3<f64>>> {
        transformed_to_py(py, &self.transformed).1
    }
}

/// _panel_reg — PyO3 module initializer for the Python extension.
///
/// Registers the `PanelBuilder`, `Panel`, `PanelFit`, `FirstDiff` and
/// `FixedEffects` classes. Invoked by Python when importing the compiled
/// extension.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _panel_reg<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<PyPanelBuilder>()?;
    m.add_class::<PyPanel>()?;
    m.add_class::<PyPanelFit>()?;
    m.add_class::<PyFirstDiff>()?;
    m.add_class::<PyFixedEffects>()?;
    Ok(())
}
