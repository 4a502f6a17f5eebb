//! ols::solver — dense ordinary least squares behind a solver trait.
//!
//! Purpose
//! -------
//! Define the [`LeastSquares`] seam the panel estimators submit their
//! stacked response and design to, and provide [`Ols`], a dense
//! implementation based on the symmetric eigendecomposition of `XᵀX`.
//!
//! Key behaviors
//! -------------
//! - Apply the [`MissingPolicy`]: drop (or reject) rows with `NAN` in the
//!   response or any regressor before fitting.
//! - Reject fits with fewer complete observations than regressors plus one
//!   and designs whose `XᵀX` is numerically singular.
//! - Report coefficients, classical or heteroskedasticity-robust standard
//!   errors, t statistics and two-sided Student-t p-values.
//!
//! Invariants & assumptions
//! ------------------------
//! - No intercept is added; callers include one as a column when wanted.
//!   Within and first-difference transforms remove the constant.
//! - `R²` is uncentered (`1 − SSR / Σ y²`) for the same reason.
//!
//! Conventions
//! -----------
//! - No explicit inverse is formed through elimination; `(XᵀX)⁻¹` is
//!   rebuilt from eigenpairs once the rank check has passed.
//!
//! Testing notes
//! -------------
//! - Unit tests cover exact fits, missing-row handling under both policies,
//!   rank and degrees-of-freedom failures, and robust covariance.

use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::ols::{
    errors::{OlsError, OlsResult},
    options::{CovType, MissingPolicy, OlsOptions},
};

/// A fitted linear regression, as seen by the panel estimators.
pub trait RegressionFit {
    /// Estimated coefficients, one per design column.
    fn params(&self) -> ArrayView1<'_, f64>;

    /// Observations used in the fit.
    fn nobs(&self) -> usize;

    /// Plain-text summary naming the dependent and independent variables.
    /// Names beyond the fitted coefficients are ignored.
    fn summary(&self, y_name: &str, x_names: &[String]) -> String;
}

/// LeastSquares — any linear least-squares routine.
///
/// Implementations receive the response vector, the design matrix (rows =
/// observations, columns = regressors) and the missing-value policy, and
/// return a fit or an [`OlsError`]. Errors are propagated to estimator
/// callers unchanged.
pub trait LeastSquares {
    type Fit: RegressionFit;

    fn fit(
        &self, y: ArrayView1<'_, f64>, x: ArrayView2<'_, f64>, missing: MissingPolicy,
    ) -> OlsResult<Self::Fit>;
}

/// Ols — dense ordinary least squares.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ols {
    pub options: OlsOptions,
}

impl Ols {
    pub fn new(options: OlsOptions) -> Self {
        Ols { options }
    }
}

/// OlsFit — estimates and diagnostics of one OLS fit.
///
/// Fields
/// ------
/// - `params`, `std_errors`, `t_values`, `p_values`: `Array1<f64>`
///   Per-coefficient estimates and inference, in design-column order.
/// - `cov_params`: `Array2<f64>`
///   `k × k` coefficient covariance under `cov_type`.
/// - `residuals`: `Array1<f64>`
///   Residuals of the rows kept after missing-value deletion.
/// - `ssr`, `sigma2`, `r_squared`: `f64`
///   Residual sum of squares, `ssr / df_resid`, uncentered `R²`.
/// - `nobs`, `df_resid`, `dropped`: `usize`
///   Rows used, `nobs − k`, rows removed for missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub params: Array1<f64>,
    pub std_errors: Array1<f64>,
    pub t_values: Array1<f64>,
    pub p_values: Array1<f64>,
    pub cov_params: Array2<f64>,
    pub residuals: Array1<f64>,
    pub ssr: f64,
    pub sigma2: f64,
    pub r_squared: f64,
    pub nobs: usize,
    pub df_resid: usize,
    pub dropped: usize,
    pub cov_type: CovType,
}

impl LeastSquares for Ols {
    type Fit = OlsFit;

    /// Fit `y = Xβ + ε` by least squares.
    ///
    /// Errors
    /// ------
    /// - `OlsError::DimensionMismatch` when `y.len() != x.nrows()`.
    /// - `OlsError::EmptyDesign` when `x` has no columns.
    /// - `OlsError::MissingValues` under `MissingPolicy::Raise` if any row
    ///   has a `NAN`.
    /// - `OlsError::NonFiniteValue` for ±∞ in a kept row.
    /// - `OlsError::InsufficientObservations` when `nobs ≤ k` after
    ///   deletion.
    /// - `OlsError::RankDeficient` when `XᵀX` is numerically singular.
    fn fit(
        &self, y: ArrayView1<'_, f64>, x: ArrayView2<'_, f64>, missing: MissingPolicy,
    ) -> OlsResult<OlsFit> {
        if y.len() != x.nrows() {
            return Err(OlsError::DimensionMismatch { response: y.len(), design: x.nrows() });
        }
        let k = x.ncols();
        if k == 0 {
            return Err(OlsError::EmptyDesign);
        }

        let keep: Vec<usize> = (0..y.len())
            .filter(|&i| !y[i].is_nan() && !x.row(i).iter().any(|v| v.is_nan()))
            .collect();
        let dropped = y.len() - keep.len();
        if dropped > 0 && missing == MissingPolicy::Raise {
            return Err(OlsError::MissingValues { rows: dropped });
        }

        let yk: Array1<f64> = y.select(Axis(0), &keep);
        let xk: Array2<f64> = x.select(Axis(0), &keep);
        for (row, (yi, xi)) in yk.iter().zip(xk.rows()).enumerate() {
            if let Some(&value) = std::iter::once(yi).chain(xi.iter()).find(|v| !v.is_finite()) {
                return Err(OlsError::NonFiniteValue { row: keep[row], value });
            }
        }

        let nobs = keep.len();
        if nobs <= k {
            return Err(OlsError::InsufficientObservations { nobs, k });
        }

        let xtx = xk.t().dot(&xk);
        let xtx_inv = invert_gram(&xtx, self.options.rank_tol)?;
        let params = xtx_inv.dot(&xk.t().dot(&yk));
        let residuals = &yk - &xk.dot(&params);

        let ssr = residuals.dot(&residuals);
        let df_resid = nobs - k;
        let sigma2 = ssr / df_resid as f64;
        let tss = yk.dot(&yk);
        let r_squared = if tss > 0.0 { 1.0 - ssr / tss } else { f64::NAN };

        let cov_params = match self.options.cov_type {
            CovType::Classical => &xtx_inv * sigma2,
            CovType::HC0 => sandwich(&xk, &residuals, &xtx_inv),
            CovType::HC1 => sandwich(&xk, &residuals, &xtx_inv) * (nobs as f64 / df_resid as f64),
        };

        let std_errors = cov_params.diag().mapv(|v| v.max(0.0).sqrt());
        let t_values = &params / &std_errors;
        let dist = StudentsT::new(0.0, 1.0, df_resid as f64)
            .map_err(|e| OlsError::Distribution(e.to_string()))?;
        let p_values = t_values.mapv(|t| match t {
            t if t.is_nan() => f64::NAN,
            t if t.is_infinite() => 0.0,
            t => 2.0 * (1.0 - dist.cdf(t.abs())),
        });

        Ok(OlsFit {
            params,
            std_errors,
            t_values,
            p_values,
            cov_params,
            residuals,
            ssr,
            sigma2,
            r_squared,
            nobs,
            df_resid,
            dropped,
            cov_type: self.options.cov_type,
        })
    }
}

impl RegressionFit for OlsFit {
    fn params(&self) -> ArrayView1<'_, f64> {
        self.params.view()
    }

    fn nobs(&self) -> usize {
        self.nobs
    }

    fn summary(&self, y_name: &str, x_names: &[String]) -> String {
        let width = x_names.iter().map(String::len).max().unwrap_or(0).max(8);
        let rule = "=".repeat(width + 52);
        let mut out = String::new();
        out.push_str(&format!("OLS Regression Results\n{rule}\n"));
        out.push_str(&format!("Dep. Variable: {y_name}\n"));
        out.push_str(&format!(
            "No. Observations: {}    Df Residuals: {}    Covariance Type: {}\n",
            self.nobs, self.df_resid, self.cov_type
        ));
        out.push_str(&format!(
            "R-squared (uncentered): {:.4}    Sigma^2: {:.6}\n{rule}\n",
            self.r_squared, self.sigma2
        ));
        out.push_str(&format!(
            "{:<width$} {:>12} {:>12} {:>12} {:>12}\n",
            "", "coef", "std err", "t", "P>|t|"
        ));
        let rows = x_names
            .iter()
            .zip(&self.params)
            .zip(&self.std_errors)
            .zip(&self.t_values)
            .zip(&self.p_values);
        for ((((name, coef), se), t), p) in rows {
            out.push_str(&format!("{name:<width$} {coef:>12.6} {se:>12.6} {t:>12.4} {p:>12.4}\n"));
        }
        out.push_str(&rule);
        out
    }
}

// ---- Helper methods ----

/// Copy a square `ndarray` matrix into a `nalgebra::DMatrix`.
fn fill_dmatrix(src: &Array2<f64>) -> DMatrix<f64> {
    let n = src.ncols();
    DMatrix::from_fn(n, n, |i, j| src[[i, j]])
}

/// Inverse of a symmetric Gram matrix through its eigendecomposition.
///
/// Eigenvalues at or below `rank_tol · λ_max` count as zero; any such
/// eigenvalue makes the design rank deficient.
fn invert_gram(xtx: &Array2<f64>, rank_tol: f64) -> OlsResult<Array2<f64>> {
    let k = xtx.ncols();
    let eigen = fill_dmatrix(xtx).symmetric_eigen();
    let lambda_max = eigen.eigenvalues.iter().cloned().fold(0.0_f64, f64::max);
    let threshold = rank_tol * lambda_max;
    let rank = eigen.eigenvalues.iter().filter(|&&lambda| lambda > threshold).count();
    if lambda_max <= 0.0 || rank < k {
        return Err(OlsError::RankDeficient { rank: if lambda_max > 0.0 { rank } else { 0 }, k });
    }

    let q = &eigen.eigenvectors;
    let lambdas = &eigen.eigenvalues;
    Ok(Array2::from_shape_fn((k, k), |(i, j)| {
        (0..k).map(|m| q[(i, m)] * q[(j, m)] / lambdas[m]).sum()
    }))
}

/// White sandwich `(XᵀX)⁻¹ (Σ eᵢ² xᵢ xᵢᵀ) (XᵀX)⁻¹`.
fn sandwich(x: &Array2<f64>, residuals: &Array1<f64>, xtx_inv: &Array2<f64>) -> Array2<f64> {
    let weighted = x * &residuals.mapv(|e| e * e).insert_axis(Axis(1));
    let meat = x.t().dot(&weighted);
    xtx_inv.dot(&meat).dot(xtx_inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact recovery of coefficients on noiseless data.
    // - Standard errors against a hand-computed one-regressor case.
    // - Missing-row dropping vs raising.
    // - Rank-deficient and under-identified designs.
    // - HC0/HC1 relationship.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Noiseless data is fitted exactly.
    //
    // Given
    // -----
    // - `y = 2 x1 − 3 x2` on five rows.
    //
    // Expect
    // ------
    // - `params ≈ [2, −3]`, residuals ≈ 0, R² ≈ 1.
    fn exact_data_recovers_coefficients() {
        let x = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [2.0, 1.0], [1.0, 3.0]];
        let y = x.dot(&array![2.0, -3.0]);

        let fit = Ols::default().fit(y.view(), x.view(), MissingPolicy::Drop).unwrap();

        assert_relative_eq!(fit.params[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(fit.params[1], -3.0, epsilon = 1e-10);
        assert_relative_eq!(fit.ssr, 0.0, epsilon = 1e-18);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-12);
        assert_eq!((fit.nobs, fit.df_resid, fit.dropped), (5, 3, 0));
    }

    #[test]
    // Purpose
    // -------
    // Classical standard errors match the closed form for one regressor.
    //
    // Given
    // -----
    // - `x = [1, 2, 3]`, `y = [1, 3, 2]`.
    //   β = Σxy / Σx² = 13 / 14, SSR = Σy² − β Σxy = 14 − 169/14,
    //   σ² = SSR / 2, SE = sqrt(σ² / 14).
    //
    // Expect
    // ------
    // - `params[0]` and `std_errors[0]` match, p-value is in (0, 1).
    fn one_regressor_matches_closed_form() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 3.0, 2.0];

        let fit = Ols::default().fit(y.view(), x.view(), MissingPolicy::Drop).unwrap();

        let beta = 13.0 / 14.0;
        let ssr: f64 = 14.0 - 169.0 / 14.0;
        let se = (ssr / 2.0 / 14.0).sqrt();
        assert_relative_eq!(fit.params[0], beta, epsilon = 1e-12);
        assert_relative_eq!(fit.ssr, ssr, epsilon = 1e-12);
        assert_relative_eq!(fit.std_errors[0], se, epsilon = 1e-12);
        assert_relative_eq!(fit.t_values[0], beta / se, epsilon = 1e-10);
        assert!(fit.p_values[0] > 0.0 && fit.p_values[0] < 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Rows with NaN are dropped under `Drop` and rejected under `Raise`.
    fn missing_rows_follow_policy() {
        let x = array![[1.0], [f64::NAN], [2.0], [3.0]];
        let y = array![2.0, 5.0, 4.0, 6.0];

        let fit = Ols::default().fit(y.view(), x.view(), MissingPolicy::Drop).unwrap();
        let err = Ols::default().fit(y.view(), x.view(), MissingPolicy::Raise).unwrap_err();

        assert_eq!((fit.nobs, fit.dropped), (3, 1));
        assert_relative_eq!(fit.params[0], 2.0, epsilon = 1e-12);
        assert_eq!(err, OlsError::MissingValues { rows: 1 });
    }

    #[test]
    // Purpose
    // -------
    // Collinear columns and too few rows fail with solver errors.
    fn degenerate_designs_fail() {
        let collinear = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]];
        let y = array![1.0, 2.0, 3.0];
        let err = Ols::default().fit(y.view(), collinear.view(), MissingPolicy::Drop).unwrap_err();
        assert!(matches!(err, OlsError::RankDeficient { rank: 1, k: 2 }));

        let short = array![[1.0, 0.0], [0.0, 1.0]];
        let y = array![1.0, 2.0];
        let err = Ols::default().fit(y.view(), short.view(), MissingPolicy::Drop).unwrap_err();
        assert_eq!(err, OlsError::InsufficientObservations { nobs: 2, k: 2 });

        let zeros = array![[0.0], [0.0], [0.0]];
        let y = array![1.0, 2.0, 3.0];
        let err = Ols::default().fit(y.view(), zeros.view(), MissingPolicy::Drop).unwrap_err();
        assert_eq!(err, OlsError::RankDeficient { rank: 0, k: 1 });
    }

    #[test]
    // Purpose
    // -------
    // HC1 equals HC0 scaled by n / (n − k), and both leave the point
    // estimate unchanged.
    fn robust_covariances_are_consistent() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![1.2, 1.9, 3.4, 3.8, 5.3];
        let hc0 = Ols::new(OlsOptions::new(CovType::HC0, None).unwrap());
        let hc1 = Ols::new(OlsOptions::new(CovType::HC1, None).unwrap());

        let f0 = hc0.fit(y.view(), x.view(), MissingPolicy::Drop).unwrap();
        let f1 = hc1.fit(y.view(), x.view(), MissingPolicy::Drop).unwrap();

        assert_relative_eq!(f0.params[0], f1.params[0]);
        assert_relative_eq!(f1.cov_params[[0, 0]], f0.cov_params[[0, 0]] * 5.0 / 4.0, epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // The summary names the dependent and every independent variable.
    fn summary_names_variables() {
        let x = array![[1.0, 0.5], [2.0, 0.1], [3.0, 0.9], [4.0, 0.2]];
        let y = array![1.0, 2.5, 2.9, 4.2];
        let fit = Ols::default().fit(y.view(), x.view(), MissingPolicy::Drop).unwrap();

        let text = fit.summary("life_exp", &["health_spend".to_string(), "beds".to_string()]);

        assert!(text.contains("Dep. Variable: life_exp"));
        assert!(text.contains("health_spend") && text.contains("beds"));
    }

    #[test]
    // Purpose
    // -------
    // Surplus names beyond the fitted coefficients are left out of the
    // summary rather than indexed.
    fn summary_ignores_surplus_names() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 3.0, 2.0];
        let fit = Ols::default().fit(y.view(), x.view(), MissingPolicy::Drop).unwrap();

        let text = fit.summary("y", &["x1".to_string(), "x2".to_string()]);

        assert!(text.contains("x1"));
        assert!(!text.contains("x2"));
    }
}
