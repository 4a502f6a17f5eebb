//! Unified error handling for least-squares solvers.
//!
//! This module defines `OlsError`, the error type returned by every
//! [`LeastSquares`](crate::ols::LeastSquares) implementation, together with
//! the `OlsResult<T>` alias. Solver failures (rank deficiency, too few
//! observations after missing-value deletion) are propagated unchanged to
//! estimator callers.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Unified error type for least-squares fitting.
///
/// Covers input-shape problems, missing or non-finite observations,
/// degrees-of-freedom and rank failures, invalid options, and a passthrough
/// for third-party solvers that report through `anyhow`.
#[derive(Debug, Clone, PartialEq)]
pub enum OlsError {
    // ---- Inputs ----
    /// Response length and design row count differ.
    DimensionMismatch { response: usize, design: usize },

    /// The design matrix has no columns.
    EmptyDesign,

    /// Missing values were found while the policy was `Raise`.
    MissingValues { rows: usize },

    /// An infinite value was found in the data.
    NonFiniteValue { row: usize, value: f64 },

    // ---- Identification ----
    /// Not enough complete observations to estimate `k` coefficients with
    /// at least one residual degree of freedom.
    InsufficientObservations { nobs: usize, k: usize },

    /// `XᵀX` has numerical rank below the number of regressors.
    RankDeficient { rank: usize, k: usize },

    // ---- Options ----
    InvalidTolerance { value: f64 },
    UnknownCovType { name: String },

    // ---- Distribution ----
    Distribution(String),

    // ---- Anyhow catchall ----
    Anyhow(String),
}

pub type OlsResult<T> = Result<T, OlsError>;

impl From<anyhow::Error> for OlsError {
    fn from(err: anyhow::Error) -> Self {
        OlsError::Anyhow(err.to_string())
    }
}

impl std::error::Error for OlsError {}

impl std::fmt::Display for OlsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Inputs ----
            OlsError::DimensionMismatch { response, design } => write!(
                f,
                "OLS Error: response has {response} rows but design matrix has {design}"
            ),
            OlsError::EmptyDesign => write!(f, "OLS Error: design matrix has no columns"),
            OlsError::MissingValues { rows } => {
                write!(f, "OLS Error: {rows} rows contain missing values")
            }
            OlsError::NonFiniteValue { row, value } => {
                write!(f, "OLS Error: non-finite value {value} in row {row}")
            }

            // ---- Identification ----
            OlsError::InsufficientObservations { nobs, k } => write!(
                f,
                "OLS Error: {nobs} complete observations are not enough for {k} regressors"
            ),
            OlsError::RankDeficient { rank, k } => write!(
                f,
                "OLS Error: design matrix is singular (rank {rank} < {k} regressors)"
            ),

            // ---- Options ----
            OlsError::InvalidTolerance { value } => {
                write!(f, "OLS Error: rank tolerance must be finite and positive, got {value}")
            }
            OlsError::UnknownCovType { name } => write!(
                f,
                "OLS Error: unknown covariance type {name:?} (expected 'nonrobust', 'hc0' or 'hc1')"
            ),

            // ---- Distribution ----
            OlsError::Distribution(msg) => write!(f, "OLS Error: {msg}"),

            // ---- Anyhow catchall ----
            OlsError::Anyhow(msg) => write!(f, "OLS Error: {msg}"),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<OlsError> for PyErr {
    fn from(err: OlsError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
