//! estimators — first-difference and fixed-effects panel regressions.
//!
//! Purpose
//! -------
//! Turn a built [`Panel`](crate::panel::Panel) into a linear regression of
//! one dependent variable on one or more independent variables after
//! removing unobserved entity effects.
//!
//! Key behaviors
//! -------------
//! - [`FirstDiff`] differences every variable within entity.
//! - [`FixedEffects`] demeans within entity, optionally also removing
//!   period effects (two-way).
//! - Both stack the transformed data entity-major ([`StackedDesign`]), drop
//!   rows with any missing value, and hand the rest to a
//!   [`LeastSquares`](crate::ols::LeastSquares) solver, [`Ols`](crate::ols::Ols)
//!   by default.
//!
//! Invariants & assumptions
//! ------------------------
//! - Estimators borrow the panel immutably; results and transformed data
//!   live on the estimator.
//! - No intercept is estimated: both transforms remove any constant.
//!
//! Downstream usage
//! ----------------
//! ```ignore
//! let mut fe = FixedEffects::new(&panel, "life_exp", ["health_spend", "beds"], true)?;
//! println!("{}", fe.estimate()?.summary());
//! ```

pub mod design;
pub mod errors;
pub mod first_diff;
pub mod fit;
pub mod fixed_effects;
pub mod spec;
pub mod transforms;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::design::StackedDesign;
pub use self::errors::{EstimationError, EstimationResult};
pub use self::first_diff::FirstDiff;
pub use self::fit::{EstimatorKind, PanelFit};
pub use self::fixed_effects::FixedEffects;
pub use self::spec::{IntoRegressors, ModelSpec};
