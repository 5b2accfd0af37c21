//! CAPM estimation summary and terminal rendering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete CAPM summary for one stock/market pair.
///
/// Carries both beta estimates side by side. They agree up to floating
/// point for healthy data; they are reported independently and never
/// reconciled, so a disagreement is visible rather than papered over.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapmSummary {
    /// Stock symbol.
    pub symbol: String,

    /// Market index symbol.
    pub market_symbol: String,

    /// First month-end date in the returns table.
    pub period_start: NaiveDate,

    /// Last month-end date in the returns table.
    pub period_end: NaiveDate,

    /// Number of monthly return observations.
    pub observations: usize,

    /// Beta from the covariance-ratio formula.
    pub beta_covariance: f64,

    /// Beta from the OLS regression.
    pub beta_regression: f64,

    /// Regression intercept.
    pub alpha: f64,

    /// Share of stock-return variance explained by the regression.
    pub r_squared: f64,

    /// Mean monthly market return over the sample.
    pub mean_market_return: f64,

    /// Annual risk-free rate used in the CAPM formula.
    pub risk_free_rate: f64,

    /// Return periods per year used for annualization.
    pub periods_per_year: f64,

    /// CAPM expected annual return.
    pub expected_annual_return: f64,
}

impl CapmSummary {
    /// Annualized mean market return.
    pub const fn annualized_market_return(&self) -> f64 {
        self.mean_market_return * self.periods_per_year
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\nCAPM Summary: {} vs {}\n",
            self.symbol, self.market_symbol
        ));
        output.push_str(&format!(
            "Period: {} to {} ({} monthly observations)\n",
            self.period_start, self.period_end, self.observations
        ));
        output.push_str(&"=".repeat(64));
        output.push('\n');

        output.push_str("\nBeta Estimates:\n");
        output.push_str(&"-".repeat(64));
        output.push('\n');
        output.push_str(&format!(
            "  Beta (covariance formula):  {:>10.6}\n",
            self.beta_covariance
        ));
        output.push_str(&format!(
            "  Beta (regression):          {:>10.6}\n",
            self.beta_regression
        ));
        output.push_str(&format!("  Alpha:                      {:>10.6}\n", self.alpha));
        output.push_str(&format!(
            "  R-squared:                  {:>10.4}\n",
            self.r_squared
        ));

        output.push_str("\nExpected Return (CAPM):\n");
        output.push_str(&"-".repeat(64));
        output.push('\n');
        output.push_str(&format!(
            "  Risk-free rate:             {:>9.2}%\n",
            self.risk_free_rate * 100.0
        ));
        output.push_str(&format!(
            "  Market return (annualized): {:>9.2}%\n",
            self.annualized_market_return() * 100.0
        ));
        output.push_str(&format!(
            "  Expected annual return:     {:>9.2}%\n",
            self.expected_annual_return * 100.0
        ));

        output.push_str(&"=".repeat(64));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "# CAPM Summary: {} vs {}\n\n",
            self.symbol, self.market_symbol
        ));
        output.push_str(&format!(
            "**Period:** {} to {} ({} monthly observations)\n\n",
            self.period_start, self.period_end, self.observations
        ));

        output.push_str("| Metric | Value |\n");
        output.push_str("|--------|-------|\n");
        output.push_str(&format!(
            "| Beta (covariance formula) | {:.6} |\n",
            self.beta_covariance
        ));
        output.push_str(&format!(
            "| Beta (regression) | {:.6} |\n",
            self.beta_regression
        ));
        output.push_str(&format!("| Alpha | {:.6} |\n", self.alpha));
        output.push_str(&format!("| R-squared | {:.4} |\n", self.r_squared));
        output.push_str(&format!(
            "| Risk-free rate | {:.2}% |\n",
            self.risk_free_rate * 100.0
        ));
        output.push_str(&format!(
            "| Market return (annualized) | {:.2}% |\n",
            self.annualized_market_return() * 100.0
        ));
        output.push_str(&format!(
            "| Expected annual return | {:.2}% |\n",
            self.expected_annual_return * 100.0
        ));

        output
    }
}

impl fmt::Display for CapmSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "CAPM Summary: {} vs {} ({} to {})",
            self.symbol, self.market_symbol, self.period_start, self.period_end
        )?;
        writeln!(f, "  Beta (covariance): {:.6}", self.beta_covariance)?;
        writeln!(f, "  Beta (regression): {:.6}", self.beta_regression)?;
        writeln!(f, "  Alpha: {:.6}", self.alpha)?;
        writeln!(
            f,
            "  Expected annual return: {:.2}%",
            self.expected_annual_return * 100.0
        )?;
        Ok(())
    }
}
