//! Aligned month-end log-return series for a stock and its market index.
//!
//! Two monthly price series are inner-joined on date, so the table covers
//! exactly the months both symbols traded. Each return is the natural log
//! of the ratio of consecutive prices; the first row has no prior period
//! and is dropped. Prices must be strictly positive — a zero or negative
//! adjusted close makes the logarithm undefined, which is a precondition
//! violation of the data source rather than a handled error.

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;

/// Errors that can occur while building a returns table.
#[derive(Debug, Error)]
pub enum ReturnsError {
    /// A required column is missing from an input frame
    #[error("Missing column '{column}' in {frame} price frame")]
    MissingColumn {
        /// Name of the missing column
        column: String,
        /// Which input frame it was missing from
        frame: String,
    },

    /// Too few aligned observations to difference
    #[error("Not enough aligned observations: got {rows}, need at least 2")]
    Empty {
        /// Number of rows the two series had in common
        rows: usize,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Month-end prices and log returns for a stock/market pair.
///
/// Columns: `date`, `stock_price`, `market_price`, `stock_return`,
/// `market_return`, indexed by month-end date ascending. Row count is the
/// aligned series length minus one.
#[derive(Debug, Clone)]
pub struct ReturnsTable {
    df: DataFrame,
}

/// Natural-log return of consecutive values of `price`.
fn log_return(price: &str, name: &str) -> Expr {
    (col(price) / col(price).shift(lit(1)))
        .log(std::f64::consts::E)
        .alias(name)
}

impl ReturnsTable {
    /// Build the table from two monthly `[date, adjusted_close]` frames.
    ///
    /// The series are aligned on their common dates via an inner join, so
    /// series of different lengths reduce to the intersection of their
    /// month-end dates.
    pub fn from_monthly_prices(
        stock: &DataFrame,
        market: &DataFrame,
    ) -> Result<Self, ReturnsError> {
        for (frame, df) in [("stock", stock), ("market", market)] {
            for column in ["date", "adjusted_close"] {
                if df.column(column).is_err() {
                    return Err(ReturnsError::MissingColumn {
                        column: column.to_string(),
                        frame: frame.to_string(),
                    });
                }
            }
        }

        let stock_prices = stock
            .clone()
            .lazy()
            .select([col("date"), col("adjusted_close").alias("stock_price")]);
        let market_prices = market
            .clone()
            .lazy()
            .select([col("date"), col("adjusted_close").alias("market_price")]);

        let joined = stock_prices
            .join(
                market_prices,
                [col("date")],
                [col("date")],
                JoinArgs::new(JoinType::Inner),
            )
            .sort(["date"], SortMultipleOptions::default())
            .collect()?;

        if joined.height() < 2 {
            return Err(ReturnsError::Empty {
                rows: joined.height(),
            });
        }

        let df = joined
            .lazy()
            .with_columns([
                log_return("stock_price", "stock_return"),
                log_return("market_price", "market_return"),
            ])
            .filter(
                col("stock_return")
                    .is_not_null()
                    .and(col("market_return").is_not_null()),
            )
            .collect()?;

        Ok(Self { df })
    }

    /// Number of return rows.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// The underlying frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// Month-end dates of the return rows.
    pub fn dates(&self) -> Result<Vec<NaiveDate>, ReturnsError> {
        Ok(self
            .df
            .column("date")?
            .as_materialized_series()
            .date()?
            .as_date_iter()
            .flatten()
            .collect())
    }

    fn f64_column(&self, name: &str) -> Result<Vec<f64>, ReturnsError> {
        Ok(self
            .df
            .column(name)?
            .as_materialized_series()
            .f64()?
            .into_no_null_iter()
            .collect())
    }

    /// Month-end adjusted closes of the stock.
    pub fn stock_prices(&self) -> Result<Vec<f64>, ReturnsError> {
        self.f64_column("stock_price")
    }

    /// Month-end adjusted closes of the market index.
    pub fn market_prices(&self) -> Result<Vec<f64>, ReturnsError> {
        self.f64_column("market_price")
    }

    /// Monthly log returns of the stock.
    pub fn stock_returns(&self) -> Result<Vec<f64>, ReturnsError> {
        self.f64_column("stock_return")
    }

    /// Monthly log returns of the market index.
    pub fn market_returns(&self) -> Result<Vec<f64>, ReturnsError> {
        self.f64_column("market_return")
    }
}

/// Test helper: a monthly `[date, adjusted_close]` frame from literals.
#[cfg(test)]
pub(crate) fn monthly_frame(dates: &[&str], closes: &[f64]) -> DataFrame {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let days: Vec<i32> = dates
        .iter()
        .map(|d| {
            let date = NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap();
            (date - epoch).num_days() as i32
        })
        .collect();
    let date = Series::new("date".into(), days)
        .cast(&DataType::Date)
        .unwrap();
    DataFrame::new(vec![
        date.into(),
        Series::new("adjusted_close".into(), closes.to_vec()).into(),
    ])
    .unwrap()
}
