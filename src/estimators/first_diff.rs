//! estimators::first_diff — first-difference panel regression.
//!
//! Purpose
//! -------
//! Remove time-invariant entity effects by differencing every variable
//! within entity, `Δv[e, t] = v[e, t] − v[e, t−1]`, then regress `Δy` on
//! `Δx` by least squares without an intercept.
//!
//! Key behaviors
//! -------------
//! - Construction validates the `(y, x)` choice and copies the needed
//!   variable slices; the panel is only read.
//! - [`FirstDiff::estimate`] differences, stacks entity-major, drops rows
//!   with any `NAN` (always including each entity's first period), solves,
//!   and keeps the fit and the transformed data on the estimator.
//!
//! Invariants & assumptions
//! ------------------------
//! - Differences never cross entities and never wrap around.
//! - A panel with `T` periods contributes at most `n_entities · (T − 1)`
//!   rows.

use ndarray::{Array2, Array3};
use slog::{Logger, debug, o};

use crate::{
    estimators::{
        errors::EstimationResult,
        fit::{EstimatorKind, PanelFit, fit_transformed},
        spec::{IntoRegressors, ModelSpec},
        transforms::{first_difference, map_variables},
    },
    logging::null_logger,
    ols::solver::{LeastSquares, Ols},
    panel::data::Panel,
};

/// FirstDiff — first-difference estimator over a borrowed [`Panel`].
///
/// Fields
/// ------
/// - `panel`: `&Panel`
///   Source data; never mutated.
/// - `spec`: [`ModelSpec`]
///   Validated dependent and independent variable names.
/// - `y`, `x`: `Array2<f64>`, `Array3<f64>`
///   Copies of the `(entity × time)` response and `(entity × time × k)`
///   regressors taken at construction.
/// - `solver`: `S`
///   Least-squares routine used by [`estimate`](FirstDiff::estimate).
/// - `transformed`, `result`: cached after a successful `estimate`.
pub struct FirstDiff<'a, S: LeastSquares = Ols> {
    panel: &'a Panel,
    spec: ModelSpec,
    y: Array2<f64>,
    x: Array3<f64>,
    solver: S,
    transformed: Option<(Array2<f64>, Array3<f64>)>,
    result: Option<PanelFit<S::Fit>>,
    logger: Logger,
}

impl<'a> FirstDiff<'a, Ols> {
    /// Validate `(y, x)` against `panel` and capture the variable slices.
    ///
    /// Errors
    /// ------
    /// - `EstimationError::UnknownVariable` for a name not in the panel.
    /// - `EstimationError::DependentInRegressors` when `y` is also in `x`.
    /// - `EstimationError::EmptyRegressors` for an empty `x`.
    /// - `EstimationError::DuplicateRegressor` for a repeated `x` name.
    pub fn new(panel: &'a Panel, y: &str, x: impl IntoRegressors) -> EstimationResult<Self> {
        let spec = ModelSpec::new(panel, y, x)?;
        let y = panel.variable_slice(&spec.y)?;
        let x = panel.variables_slice(&spec.x)?;
        Ok(FirstDiff {
            panel,
            spec,
            y,
            x,
            solver: Ols::default(),
            transformed: None,
            result: None,
            logger: null_logger(),
        })
    }
}

impl<'a, S: LeastSquares> FirstDiff<'a, S> {
    /// Replace the solver; clears any stored result.
    pub fn with_solver<T: LeastSquares>(self, solver: T) -> FirstDiff<'a, T> {
        FirstDiff {
            panel: self.panel,
            spec: self.spec,
            y: self.y,
            x: self.x,
            solver,
            transformed: None,
            result: None,
            logger: self.logger,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger.new(o!("component" => "first_diff"));
        self
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn panel(&self) -> &Panel {
        self.panel
    }

    /// Difference, stack, drop incomplete rows and solve with the
    /// estimator's solver. The fit and the differenced data are stored.
    ///
    /// Errors
    /// ------
    /// - `EstimationError::Solver` for any solver failure, e.g.
    ///   `OlsError::InsufficientObservations` when too few complete rows
    ///   remain. The previous result is cleared either way.
    pub fn estimate(&mut self) -> EstimationResult<&PanelFit<S::Fit>> {
        self.result = None;
        let differenced = self.transform();
        let (dy, dx) = self.transformed.insert(differenced);
        let fit = fit_transformed(
            &self.solver,
            EstimatorKind::FirstDifference,
            self.panel,
            &self.spec,
            dy.view(),
            dx,
            &self.logger,
        )?;
        Ok(self.result.insert(fit))
    }

    /// Estimate with another solver without touching the stored state.
    pub fn estimate_with<T: LeastSquares>(&self, solver: &T) -> EstimationResult<PanelFit<T::Fit>> {
        let (dy, dx) = self.transform();
        fit_transformed(
            solver,
            EstimatorKind::FirstDifference,
            self.panel,
            &self.spec,
            dy.view(),
            &dx,
            &self.logger,
        )
    }

    /// Result of the last successful [`estimate`](Self::estimate).
    pub fn result(&self) -> Option<&PanelFit<S::Fit>> {
        self.result.as_ref()
    }

    /// Differenced `(entity × time)` response of the last `estimate`.
    pub fn transformed_y(&self) -> Option<&Array2<f64>> {
        self.transformed.as_ref().map(|(y, _)| y)
    }

    /// Differenced `(entity × time × k)` regressors of the last `estimate`.
    pub fn transformed_x(&self) -> Option<&Array3<f64>> {
        self.transformed.as_ref().map(|(_, x)| x)
    }

    fn transform(&self) -> (Array2<f64>, Array3<f64>) {
        let dy = first_difference(&self.y.view());
        let dx = map_variables(&self.x, first_difference);
        debug!(self.logger, "first differences computed";
            "entities" => dy.nrows(), "usable_periods" => dy.ncols().saturating_sub(1));
        (dy, dx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        estimators::errors::EstimationError,
        ols::{
            errors::OlsError,
            options::{CovType, OlsOptions},
        },
        panel::labels::{Label, Labels},
    };
    use approx::assert_relative_eq;
    use ndarray::{array, s};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact recovery of slopes under additive entity effects.
    // - Differenced data caching and the leading NaN per entity.
    // - Propagated solver errors and specification errors.
    // - Alternative solvers through `estimate_with` / `with_solver`.
    // - The input panel staying untouched.
    // -------------------------------------------------------------------------

    /// `y = 1.5 x1 − 0.5 x2 + α_e` with `α = [10, 20, 30]`.
    fn make_panel() -> Panel {
        let x1 = array![[1.0, 3.0, 2.0, 5.0], [2.0, 2.0, 4.0, 7.0], [0.0, 1.0, 5.0, 3.0]];
        let x2 = array![[4.0, 1.0, 0.0, 2.0], [3.0, 5.0, 1.0, 1.0], [2.0, 2.0, 6.0, 0.0]];
        let alpha = array![[10.0], [20.0], [30.0]];
        let y = &x1 * 1.5 - &x2 * 0.5 + &alpha;

        let mut values = Array3::<f64>::zeros((3, 4, 3));
        values.slice_mut(s![.., .., 0]).assign(&y);
        values.slice_mut(s![.., .., 1]).assign(&x1);
        values.slice_mut(s![.., .., 2]).assign(&x2);
        Panel::new(
            Labels::new(vec!["A".into(), "B".into(), "C".into()]).unwrap(),
            Labels::range(4),
            Labels::new(vec!["y".into(), "x1".into(), "x2".into()]).unwrap(),
            values,
        )
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Differencing removes entity effects, so slopes are recovered exactly.
    //
    // Given
    // -----
    // - 3 entities × 4 periods, noiseless `y = 1.5 x1 − 0.5 x2 + α_e`.
    //
    // Expect
    // ------
    // - Coefficients [1.5, −0.5], 9 observations, 3 rows dropped (one
    //   leading period per entity).
    fn recovers_slopes_under_entity_effects() {
        let panel = make_panel();
        let mut fd = FirstDiff::new(&panel, "y", ["x1", "x2"]).unwrap();

        let fit = fd.estimate().unwrap();

        assert_relative_eq!(fit.coefficient("x1").unwrap(), 1.5, epsilon = 1e-10);
        assert_relative_eq!(fit.coefficient("x2").unwrap(), -0.5, epsilon = 1e-10);
        assert_eq!((fit.nobs(), fit.dropped), (9, 3));
        assert_eq!(fit.keys[0], (Label::from("A"), Label::Int(1)));
        assert!(fit.summary().contains("First Difference"));
    }

    #[test]
    // Purpose
    // -------
    // The differenced data is kept after `estimate`, with NaN in the first
    // period of every entity.
    fn caches_differenced_data() {
        let panel = make_panel();
        let mut fd = FirstDiff::new(&panel, "y", "x1").unwrap();
        assert!(fd.transformed_y().is_none() && fd.result().is_none());

        fd.estimate().unwrap();

        let dy = fd.transformed_y().unwrap();
        let dx = fd.transformed_x().unwrap();
        assert!(dy.column(0).iter().all(|v| v.is_nan()));
        assert_eq!(dx.slice(s![0, 1.., 0]), array![2.0, -1.0, 3.0]);
        assert!(fd.result().is_some());
    }

    #[test]
    // Purpose
    // -------
    // Estimation reads the panel and never writes to it.
    fn panel_is_not_mutated() {
        let panel = make_panel();
        let before = panel.clone();

        let mut fd = FirstDiff::new(&panel, "y", ["x1", "x2"]).unwrap();
        fd.estimate().unwrap();

        assert_eq!(panel, before);
    }

    #[test]
    // Purpose
    // -------
    // Too few differenced rows surfaces the solver's error.
    //
    // Given
    // -----
    // - 2 entities × 2 periods and 2 regressors: 2 usable rows.
    //
    // Expect
    // ------
    // - `Solver(InsufficientObservations { nobs: 2, k: 2 })`.
    fn too_few_rows_propagate_solver_error() {
        let mut values = Array3::<f64>::zeros((2, 2, 3));
        values.slice_mut(s![.., .., 1]).assign(&array![[1.0, 2.0], [3.0, 5.0]]);
        values.slice_mut(s![.., .., 2]).assign(&array![[0.0, 4.0], [1.0, 1.5]]);
        let panel = Panel::new(
            Labels::range(2),
            Labels::range(2),
            Labels::new(vec!["y".into(), "x1".into(), "x2".into()]).unwrap(),
            values,
        )
        .unwrap();
        let mut fd = FirstDiff::new(&panel, "y", ["x1", "x2"]).unwrap();

        let err = fd.estimate().unwrap_err();

        assert_eq!(err, EstimationError::Solver(OlsError::InsufficientObservations { nobs: 2, k: 2 }));
        assert!(fd.result().is_none());
    }

    #[test]
    // Purpose
    // -------
    // Construction rejects a dependent variable listed among the regressors.
    fn rejects_dependent_in_regressors() {
        let panel = make_panel();

        let err = FirstDiff::new(&panel, "y", ["x1", "y"]).err().unwrap();

        assert_eq!(err, EstimationError::DependentInRegressors { name: "y".into() });
    }

    #[test]
    // Purpose
    // -------
    // Swapping the covariance estimator changes inference but not slopes.
    fn alternative_solver_keeps_point_estimates() {
        let panel = make_panel();
        let robust = Ols::new(OlsOptions::new(CovType::HC1, None).unwrap());
        let mut fd = FirstDiff::new(&panel, "y", "x1").unwrap();

        let classical = fd.estimate().unwrap().clone();
        let hc1 = fd.estimate_with(&robust).unwrap();
        let mut swapped = FirstDiff::new(&panel, "y", "x1").unwrap().with_solver(robust);
        let stored = swapped.estimate().unwrap();

        assert_relative_eq!(classical.params()[0], hc1.params()[0], epsilon = 1e-12);
        assert_eq!(hc1.fit.cov_type, CovType::HC1);
        assert_eq!(stored.fit.params, hc1.fit.params);
    }
}
