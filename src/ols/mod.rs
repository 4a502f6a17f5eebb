//! ols — least-squares fitting for the panel estimators.
//!
//! Purpose
//! -------
//! Provide the regression engine the panel transforms hand their stacked
//! data to. The estimators only depend on the [`LeastSquares`] trait, so
//! any linear least-squares routine can be plugged in; [`Ols`] is the
//! dense default.
//!
//! Key behaviors
//! -------------
//! - [`LeastSquares::fit`] takes a response vector, a design matrix and a
//!   [`MissingPolicy`], and returns a [`RegressionFit`].
//! - [`OlsOptions`] selects the covariance estimator ([`CovType`]) and the
//!   relative rank tolerance.
//! - Failures are reported as [`OlsError`] and never retried.
//!
//! Downstream usage
//! ----------------
//! - `estimators::FirstDiff` and `estimators::FixedEffects` call
//!   `fit(.., MissingPolicy::Drop)` after their own listwise deletion, so
//!   any row the solver still drops is reported in its fit.

pub mod errors;
pub mod options;
pub mod solver;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::errors::{OlsError, OlsResult};
pub use self::options::{CovType, MissingPolicy, OlsOptions};
pub use self::solver::{LeastSquares, Ols, OlsFit, RegressionFit};
