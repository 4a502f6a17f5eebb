//! Unified error handling for panel estimators.
//!
//! `EstimationError` groups specification failures raised at construction
//! time (unknown variables, `y` among the regressors, empty or duplicated
//! regressors) with panel-access and solver failures propagated from the
//! layers below. `EstimationResult<T>` is the matching alias.

use crate::{ols::errors::OlsError, panel::errors::PanelError};

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Unified error type for `FirstDiff` and `FixedEffects`.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimationError {
    // ---- Specification ----
    /// A variable name is not on the panel's variable axis.
    UnknownVariable { name: String },

    /// The dependent variable was also listed as a regressor.
    DependentInRegressors { name: String },

    /// No regressors were given.
    EmptyRegressors,

    /// A regressor was listed twice.
    DuplicateRegressor { name: String },

    // ---- Propagated ----
    Panel(PanelError),
    Solver(OlsError),
}

pub type EstimationResult<T> = Result<T, EstimationError>;

impl From<PanelError> for EstimationError {
    fn from(err: PanelError) -> Self {
        EstimationError::Panel(err)
    }
}

impl From<OlsError> for EstimationError {
    fn from(err: OlsError) -> Self {
        EstimationError::Solver(err)
    }
}

impl std::error::Error for EstimationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EstimationError::Panel(err) => Some(err),
            EstimationError::Solver(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for EstimationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Specification ----
            EstimationError::UnknownVariable { name } => {
                write!(f, "Estimation Error: unknown variable {name:?}")
            }
            EstimationError::DependentInRegressors { name } => write!(
                f,
                "Estimation Error: dependent variable {name:?} is also listed in x"
            ),
            EstimationError::EmptyRegressors => {
                write!(f, "Estimation Error: at least one independent variable is required")
            }
            EstimationError::DuplicateRegressor { name } => {
                write!(f, "Estimation Error: independent variable {name:?} is listed twice")
            }

            // ---- Propagated ----
            EstimationError::Panel(err) => write!(f, "{err}"),
            EstimationError::Solver(err) => write!(f, "{err}"),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<EstimationError> for PyErr {
    fn from(err: EstimationError) -> PyErr {
        match err {
            EstimationError::Panel(inner) => inner.into(),
            other => PyValueError::new_err(other.to_string()),
        }
    }
}
