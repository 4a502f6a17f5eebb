//! ols::options — configuration for the dense OLS solver.
//!
//! Purpose
//! -------
//! Collect the small set of knobs that change how [`Ols`](crate::ols::Ols)
//! treats missing rows, detects singular designs, and estimates the
//! coefficient covariance.
//!
//! Conventions
//! -----------
//! - Estimators always call the solver with [`MissingPolicy::Drop`]; the
//!   `Raise` policy exists for direct callers who want a hard failure.
//! - `rank_tol` is relative: an eigenvalue `λ` of `XᵀX` counts toward the
//!   rank when `λ > rank_tol · λ_max`.

use crate::ols::errors::{OlsError, OlsResult};

/// Default relative eigenvalue threshold for rank detection.
pub const DEFAULT_RANK_TOL: f64 = 1e-10;

/// What the solver does with rows containing `NAN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Drop incomplete rows before fitting.
    #[default]
    Drop,
    /// Fail with `OlsError::MissingValues`.
    Raise,
}

/// Coefficient covariance estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CovType {
    /// `σ̂² (XᵀX)⁻¹`.
    #[default]
    Classical,
    /// White heteroskedasticity-robust sandwich, no correction.
    HC0,
    /// HC0 scaled by `n / (n − k)`.
    HC1,
}

impl std::fmt::Display for CovType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CovType::Classical => write!(f, "nonrobust"),
            CovType::HC0 => write!(f, "HC0"),
            CovType::HC1 => write!(f, "HC1"),
        }
    }
}

impl std::str::FromStr for CovType {
    type Err = OlsError;

    fn from_str(s: &str) -> OlsResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nonrobust" | "classical" => Ok(CovType::Classical),
            "hc0" => Ok(CovType::HC0),
            "hc1" => Ok(CovType::HC1),
            _ => Err(OlsError::UnknownCovType { name: s.to_owned() }),
        }
    }
}

/// OlsOptions — validated solver configuration.
///
/// Fields
/// ------
/// - `cov_type`: [`CovType`]
///   Covariance estimator for standard errors.
/// - `rank_tol`: `f64`
///   Relative eigenvalue threshold; finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OlsOptions {
    pub cov_type: CovType,
    pub rank_tol: f64,
}

impl OlsOptions {
    /// Errors
    /// ------
    /// - `OlsError::InvalidTolerance` when `rank_tol` is not finite or ≤ 0.
    pub fn new(cov_type: CovType, rank_tol: Option<f64>) -> OlsResult<Self> {
        let rank_tol = rank_tol.unwrap_or(DEFAULT_RANK_TOL);
        if !rank_tol.is_finite() || rank_tol <= 0.0 {
            return Err(OlsError::InvalidTolerance { value: rank_tol });
        }
        Ok(OlsOptions { cov_type, rank_tol })
    }
}

impl Default for OlsOptions {
    fn default() -> Self {
        OlsOptions { cov_type: CovType::Classical, rank_tol: DEFAULT_RANK_TOL }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Tolerances must be finite and strictly positive; `None` uses the
    // default.
    fn new_validates_rank_tolerance() {
        assert_eq!(OlsOptions::new(CovType::HC1, None).unwrap().rank_tol, DEFAULT_RANK_TOL);
        assert_eq!(
            OlsOptions::new(CovType::Classical, Some(0.0)).unwrap_err(),
            OlsError::InvalidTolerance { value: 0.0 }
        );
        assert!(OlsOptions::new(CovType::Classical, Some(f64::NAN)).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Covariance names parse case-insensitively.
    fn cov_type_parses_names() {
        assert_eq!("HC1".parse::<CovType>().unwrap(), CovType::HC1);
        assert_eq!("nonrobust".parse::<CovType>().unwrap(), CovType::Classical);
        assert_eq!(
            "hc3".parse::<CovType>().unwrap_err(),
            OlsError::UnknownCovType { name: "hc3".into() }
        );
    }
}
