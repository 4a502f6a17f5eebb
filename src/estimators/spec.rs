//! estimators::spec — validated dependent / independent variable choice.
//!
//! Purpose
//! -------
//! Normalize the `x` argument (one name or a collection of names) and check
//! the `(y, x)` pair against a panel's variable axis once, at estimator
//! construction.
//!
//! Invariants & assumptions
//! ------------------------
//! - `y` and every `x` name exist on the variable axis.
//! - `x` is non-empty, duplicate-free and does not contain `y`.

use crate::{
    estimators::errors::{EstimationError, EstimationResult},
    panel::data::Panel,
};

/// IntoRegressors — one regressor name or a collection of them.
pub trait IntoRegressors {
    fn into_regressors(self) -> Vec<String>;
}

impl IntoRegressors for &str {
    fn into_regressors(self) -> Vec<String> {
        vec![self.to_owned()]
    }
}

impl IntoRegressors for String {
    fn into_regressors(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoRegressors for &String {
    fn into_regressors(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<S: AsRef<str>> IntoRegressors for Vec<S> {
    fn into_regressors(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_owned()).collect()
    }
}

impl<S: AsRef<str>> IntoRegressors for &[S] {
    fn into_regressors(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_owned()).collect()
    }
}

impl<S: AsRef<str>, const N: usize> IntoRegressors for [S; N] {
    fn into_regressors(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_owned()).collect()
    }
}

/// ModelSpec — dependent variable plus ordered regressors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub y: String,
    pub x: Vec<String>,
}

impl ModelSpec {
    /// Validate `(y, x)` against `panel`.
    ///
    /// Errors
    /// ------
    /// - `EstimationError::UnknownVariable` for `y` or any `x` not on the
    ///   variable axis (checked in that order).
    /// - `EstimationError::EmptyRegressors` when `x` is empty.
    /// - `EstimationError::DependentInRegressors` when `y ∈ x`.
    /// - `EstimationError::DuplicateRegressor` for a repeated name.
    pub fn new(panel: &Panel, y: &str, x: impl IntoRegressors) -> EstimationResult<Self> {
        let x = x.into_regressors();
        let known = |name: &str| panel.variables().position_by_name(name).is_some();

        if !known(y) {
            return Err(EstimationError::UnknownVariable { name: y.to_owned() });
        }
        if x.is_empty() {
            return Err(EstimationError::EmptyRegressors);
        }
        for (i, name) in x.iter().enumerate() {
            if !known(name.as_str()) {
                return Err(EstimationError::UnknownVariable { name: name.clone() });
            }
            if name == y {
                return Err(EstimationError::DependentInRegressors { name: name.clone() });
            }
            if x[..i].contains(name) {
                return Err(EstimationError::DuplicateRegressor { name: name.clone() });
            }
        }
        Ok(ModelSpec { y: y.to_owned(), x })
    }
}
