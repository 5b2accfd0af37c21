//! End-to-end CAPM analysis pipeline.
//!
//! A single sequential pass with no branching, retries or shared state:
//! fetch stock closes, fetch market closes, resample both to month-end,
//! build the aligned returns table, estimate. Side effects (printing,
//! plotting, export) belong to the caller.

use chrono::{DateTime, NaiveDate, Utc};
use lintner_capm::{CapmConfig, CapmEstimate, EstimateError, ReturnsError, ReturnsTable};
use lintner_data::{DataError, YahooQuoteProvider, resample_month_end};
use lintner_output::CapmSummary;
use polars::prelude::DataFrame;
use thiserror::Error;

/// Errors from any stage of the analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Price data retrieval or resampling failed
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// The returns table could not be built
    #[error("Returns error: {0}")]
    Returns(#[from] ReturnsError),

    /// Beta or expected-return estimation failed
    #[error("Estimation error: {0}")]
    Estimate(#[from] EstimateError),
}

/// A configured CAPM analysis for one stock against one market index.
#[derive(Debug, Clone)]
pub struct CapmAnalysis {
    /// Stock symbol.
    pub stock: String,
    /// Market index symbol.
    pub market: String,
    /// Start of the price history window.
    pub start: DateTime<Utc>,
    /// End of the price history window.
    pub end: DateTime<Utc>,
    /// Estimation parameters.
    pub config: CapmConfig,
}

/// Everything a single analysis run produces.
#[derive(Debug, Clone)]
pub struct CapmReport {
    /// The aligned monthly returns table.
    pub table: ReturnsTable,
    /// Both beta estimates and the expected annual return.
    pub estimate: CapmEstimate,
    /// Presentation-ready summary of the run.
    pub summary: CapmSummary,
}

impl CapmAnalysis {
    /// Create an analysis with the default estimation config.
    pub fn new(
        stock: impl Into<String>,
        market: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            stock: stock.into(),
            market: market.into(),
            start,
            end,
            config: CapmConfig::default(),
        }
    }

    /// Replace the estimation config.
    #[must_use]
    pub fn with_config(mut self, config: CapmConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the full pipeline against a quote provider.
    pub async fn run(&self, provider: &YahooQuoteProvider) -> Result<CapmReport, AnalysisError> {
        let stock_daily = provider
            .fetch_adjusted_close(&self.stock, self.start, self.end)
            .await?;
        let market_daily = provider
            .fetch_adjusted_close(&self.market, self.start, self.end)
            .await?;

        let stock_monthly = resample_month_end(&stock_daily)?;
        let market_monthly = resample_month_end(&market_daily)?;

        self.finish(&stock_monthly, &market_monthly)
    }

    /// Build the report from already-fetched monthly price series.
    ///
    /// The numeric half of the pipeline, split out so it can run against
    /// fixed prices with no network access.
    pub fn finish(
        &self,
        stock_monthly: &DataFrame,
        market_monthly: &DataFrame,
    ) -> Result<CapmReport, AnalysisError> {
        let table = ReturnsTable::from_monthly_prices(stock_monthly, market_monthly)?;
        let estimate = lintner_capm::estimate(&table, &self.config)?;

        let dates = table.dates()?;
        let period_start = dates.first().copied().unwrap_or_else(fallback_date);
        let period_end = dates.last().copied().unwrap_or_else(fallback_date);

        let summary = CapmSummary {
            symbol: self.stock.clone(),
            market_symbol: self.market.clone(),
            period_start,
            period_end,
            observations: table.height(),
            beta_covariance: estimate.beta_covariance,
            beta_regression: estimate.regression.beta,
            alpha: estimate.regression.alpha,
            r_squared: estimate.regression.r_squared,
            mean_market_return: estimate.mean_market_return,
            risk_free_rate: self.config.risk_free_rate,
            periods_per_year: self.config.periods_per_year,
            expected_annual_return: estimate.expected_annual_return,
        };

        Ok(CapmReport {
            table,
            estimate,
            summary,
        })
    }
}

// Unreachable for a well-formed table (it always has at least one row),
// but the summary dates must not panic on one that is not.
fn fallback_date() -> NaiveDate {
    NaiveDate::default()
}
