//! CAPM beta and expected-return estimation.
//!
//! Beta is estimated two independent ways on the same returns table: as the
//! ratio `Cov(stock, market) / Var(market)` taken from the 2x2 sample
//! covariance matrix, and as the slope of an ordinary-least-squares fit of
//! stock return on market return. The two agree up to floating point for
//! any non-degenerate table; both are reported and neither is reconciled
//! against the other.
//!
//! The expected annual return follows the CAPM formula
//! `rf + beta * (annualized market return - rf)`, where the mean monthly
//! market return is annualized by the configured number of periods per
//! year.

use crate::returns::{ReturnsError, ReturnsTable};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Market-return sample variance below this is treated as degenerate.
const MIN_MARKET_VARIANCE: f64 = 1e-12;

/// Errors that can occur during estimation.
#[derive(Debug, Error)]
pub enum EstimateError {
    /// Insufficient data for estimation
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Market returns do not vary, so beta is undefined
    #[error("Market return variance is zero; beta is undefined")]
    ZeroMarketVariance,

    /// Error reading the returns table
    #[error("Returns error: {0}")]
    Returns(#[from] ReturnsError),
}

/// Configuration for CAPM estimation.
///
/// The risk-free rate and the annualization factor are explicit inputs
/// rather than globals, so estimates are deterministic and parameterizable
/// in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapmConfig {
    /// Annual risk-free rate (default: 0.05)
    pub risk_free_rate: f64,
    /// Return periods per year used to annualize the mean market return
    /// (default: 12.0, monthly data)
    pub periods_per_year: f64,
}

impl Default for CapmConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
            periods_per_year: 12.0,
        }
    }
}

/// Ordinary-least-squares fit of stock return on market return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionLine {
    /// Intercept: excess return unexplained by market movement.
    pub alpha: f64,
    /// Slope: sensitivity of stock returns to market returns.
    pub beta: f64,
    /// Share of stock-return variance explained by the fit.
    pub r_squared: f64,
}

impl RegressionLine {
    /// Fitted stock return at a given market return.
    pub const fn predict(&self, market_return: f64) -> f64 {
        self.beta * market_return + self.alpha
    }
}

/// Full CAPM estimate for one stock/market pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapmEstimate {
    /// Beta from the covariance-ratio formula.
    pub beta_covariance: f64,
    /// Beta, alpha and R-squared from the OLS regression.
    pub regression: RegressionLine,
    /// Mean monthly market return over the sample.
    pub mean_market_return: f64,
    /// CAPM expected annual return, derived from the regression beta.
    pub expected_annual_return: f64,
}

/// 2x2 sample covariance matrix of two series.
///
/// Row/column 0 is `x`, row/column 1 is `y`; the estimator uses the n-1
/// denominator. Both slices must have the same length of at least two.
pub fn sample_covariance(x: &[f64], y: &[f64]) -> Array2<f64> {
    debug_assert_eq!(x.len(), y.len());
    debug_assert!(x.len() >= 2);

    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    let mut ss_xx = 0.0;
    let mut ss_xy = 0.0;
    let mut ss_yy = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        ss_xx += dx * dx;
        ss_xy += dx * dy;
        ss_yy += dy * dy;
    }

    let mut cov = Array2::<f64>::zeros((2, 2));
    cov[[0, 0]] = ss_xx / (n - 1.0);
    cov[[0, 1]] = ss_xy / (n - 1.0);
    cov[[1, 0]] = cov[[0, 1]];
    cov[[1, 1]] = ss_yy / (n - 1.0);
    cov
}

/// Beta from the covariance-ratio formula: `Cov(stock, market) / Var(market)`.
pub fn beta_from_covariance(table: &ReturnsTable) -> Result<f64, EstimateError> {
    let stock = table.stock_returns()?;
    let market = table.market_returns()?;

    if stock.len() < 2 {
        return Err(EstimateError::InsufficientData {
            required: 2,
            actual: stock.len(),
        });
    }

    let cov = sample_covariance(&stock, &market);
    if cov[[1, 1]].abs() < MIN_MARKET_VARIANCE {
        return Err(EstimateError::ZeroMarketVariance);
    }

    Ok(cov[[0, 1]] / cov[[1, 1]])
}

/// Fit `stock_return = alpha + beta * market_return` by least squares.
pub fn fit_regression(table: &ReturnsTable) -> Result<RegressionLine, EstimateError> {
    let stock = table.stock_returns()?;
    let market = table.market_returns()?;

    if stock.len() < 2 {
        return Err(EstimateError::InsufficientData {
            required: 2,
            actual: stock.len(),
        });
    }

    let n = market.len() as f64;
    let x_mean = market.iter().sum::<f64>() / n;
    let y_mean = stock.iter().sum::<f64>() / n;

    let mut ss_xx = 0.0;
    let mut ss_xy = 0.0;
    let mut ss_yy = 0.0;
    for (&xi, &yi) in market.iter().zip(stock.iter()) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        ss_xx += dx * dx;
        ss_xy += dx * dy;
        ss_yy += dy * dy;
    }

    // Same degeneracy convention as the covariance path.
    if ss_xx / (n - 1.0) < MIN_MARKET_VARIANCE {
        return Err(EstimateError::ZeroMarketVariance);
    }

    let beta = ss_xy / ss_xx;
    let alpha = y_mean - beta * x_mean;
    let r_squared = if ss_yy > 0.0 {
        beta * ss_xy / ss_yy
    } else {
        1.0
    };

    Ok(RegressionLine {
        alpha,
        beta,
        r_squared,
    })
}

/// CAPM expected annual return.
///
/// `rf + beta * (mean_market_return * periods_per_year - rf)`, with the
/// mean per-period market return annualized by multiplication.
pub fn expected_annual_return(beta: f64, mean_market_return: f64, config: &CapmConfig) -> f64 {
    config.risk_free_rate
        + beta * (mean_market_return * config.periods_per_year - config.risk_free_rate)
}

/// Run both beta estimators and derive the expected annual return.
pub fn estimate(table: &ReturnsTable, config: &CapmConfig) -> Result<CapmEstimate, EstimateError> {
    let beta_covariance = beta_from_covariance(table)?;
    let regression = fit_regression(table)?;

    let market = table.market_returns()?;
    let mean_market_return = market.iter().sum::<f64>() / market.len() as f64;
    let expected = expected_annual_return(regression.beta, mean_market_return, config);

    Ok(CapmEstimate {
        beta_covariance,
        regression,
        mean_market_return,
        expected_annual_return: expected,
    })
}
