//! estimators::fixed_effects — within (fixed effects) panel regression.
//!
//! Purpose
//! -------
//! Remove entity effects, and optionally time effects, by demeaning every
//! variable, then regress the demeaned `y` on the demeaned `x` by least
//! squares without an intercept.
//!
//! Key behaviors
//! -------------
//! - One-way: `v − entity_mean`.
//! - Two-way (`include_time_effects`): `v − entity_mean + grand_mean −
//!   time_mean`, where the time mean is taken over entities on the
//!   untransformed slice and the grand mean is the mean of entity means.
//! - Stacking, listwise deletion, solving and caching match
//!   [`FirstDiff`](crate::estimators::first_diff::FirstDiff).
//!
//! Invariants & assumptions
//! ------------------------
//! - Means skip `NAN`; cells that were missing stay missing and their rows
//!   are dropped before solving.
//! - Standard errors are not corrected for the absorbed effects' degrees of
//!   freedom; `df_resid` is `nobs − k`.

use ndarray::{Array2, Array3, ArrayView2};
use slog::{Logger, debug, o};

use crate::{
    estimators::{
        errors::EstimationResult,
        fit::{EstimatorKind, PanelFit, fit_transformed},
        spec::{IntoRegressors, ModelSpec},
        transforms::{demean_entity, demean_two_way, map_variables},
    },
    logging::null_logger,
    ols::solver::{LeastSquares, Ols},
    panel::data::Panel,
};

/// FixedEffects — entity (and optionally time) fixed-effects estimator over
/// a borrowed [`Panel`].
///
/// Fields
/// ------
/// - `panel`, `spec`, `y`, `x`, `solver`: as for `FirstDiff`.
/// - `include_time_effects`: `bool`
///   Whether period effects are removed along with entity effects.
/// - `transformed`, `result`: cached after a successful `estimate`.
pub struct FixedEffects<'a, S: LeastSquares = Ols> {
    panel: &'a Panel,
    spec: ModelSpec,
    y: Array2<f64>,
    x: Array3<f64>,
    include_time_effects: bool,
    solver: S,
    transformed: Option<(Array2<f64>, Array3<f64>)>,
    result: Option<PanelFit<S::Fit>>,
    logger: Logger,
}

impl<'a> FixedEffects<'a, Ols> {
    /// Validate `(y, x)` against `panel` and capture the variable slices.
    ///
    /// Errors
    /// ------
    /// - Same specification errors as `FirstDiff::new`.
    pub fn new(
        panel: &'a Panel, y: &str, x: impl IntoRegressors, include_time_effects: bool,
    ) -> EstimationResult<Self> {
        let spec = ModelSpec::new(panel, y, x)?;
        let y = panel.variable_slice(&spec.y)?;
        let x = panel.variables_slice(&spec.x)?;
        Ok(FixedEffects {
            panel,
            spec,
            y,
            x,
            include_time_effects,
            solver: Ols::default(),
            transformed: None,
            result: None,
            logger: null_logger(),
        })
    }

    /// Entity effects only.
    pub fn entity(panel: &'a Panel, y: &str, x: impl IntoRegressors) -> EstimationResult<Self> {
        FixedEffects::new(panel, y, x, false)
    }
}

impl<'a, S: LeastSquares> FixedEffects<'a, S> {
    /// Replace the solver; clears any stored result.
    pub fn with_solver<T: LeastSquares>(self, solver: T) -> FixedEffects<'a, T> {
        FixedEffects {
            panel: self.panel,
            spec: self.spec,
            y: self.y,
            x: self.x,
            include_time_effects: self.include_time_effects,
            solver,
            transformed: None,
            result: None,
            logger: self.logger,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger.new(o!("component" => "fixed_effects"));
        self
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn panel(&self) -> &Panel {
        self.panel
    }

    pub fn include_time_effects(&self) -> bool {
        self.include_time_effects
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::FixedEffects { time_effects: self.include_time_effects }
    }

    /// Demean, stack, drop incomplete rows and solve with the estimator's
    /// solver. The fit and the demeaned data are stored.
    ///
    /// Errors
    /// ------
    /// - `EstimationError::Solver` for any solver failure. A regressor that
    ///   is constant within every entity demeans to zero and fails as
    ///   `OlsError::RankDeficient`.
    pub fn estimate(&mut self) -> EstimationResult<&PanelFit<S::Fit>> {
        self.result = None;
        let kind = self.kind();
        let demeaned = self.transform();
        let (wy, wx) = self.transformed.insert(demeaned);
        let fit = fit_transformed(
            &self.solver,
            kind,
            self.panel,
            &self.spec,
            wy.view(),
            wx,
            &self.logger,
        )?;
        Ok(self.result.insert(fit))
    }

    /// Estimate with another solver without touching the stored state.
    pub fn estimate_with<T: LeastSquares>(&self, solver: &T) -> EstimationResult<PanelFit<T::Fit>> {
        let (wy, wx) = self.transform();
        fit_transformed(solver, self.kind(), self.panel, &self.spec, wy.view(), &wx, &self.logger)
    }

    /// Result of the last successful [`estimate`](Self::estimate).
    pub fn result(&self) -> Option<&PanelFit<S::Fit>> {
        self.result.as_ref()
    }

    /// Demeaned `(entity × time)` response of the last `estimate`.
    pub fn transformed_y(&self) -> Option<&Array2<f64>> {
        self.transformed.as_ref().map(|(y, _)| y)
    }

    /// Demeaned `(entity × time × k)` regressors of the last `estimate`.
    pub fn transformed_x(&self) -> Option<&Array3<f64>> {
        self.transformed.as_ref().map(|(_, x)| x)
    }

    fn transform(&self) -> (Array2<f64>, Array3<f64>) {
        let demean: fn(&ArrayView2<'_, f64>) -> Array2<f64> =
            if self.include_time_effects { demean_two_way } else { demean_entity };
        debug!(self.logger, "demeaning"; "time_effects" => self.include_time_effects);
        (demean(&self.y.view()), map_variables(&self.x, demean))
    }
}
