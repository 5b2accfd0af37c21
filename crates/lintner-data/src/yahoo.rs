//! Adjusted-close price fetching from Yahoo Finance.

use crate::error::{DataError, Result};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use std::time::Duration;
use tokio::time::sleep;
use yahoo_finance_api as yahoo;

/// Yahoo Finance quote provider with rate limiting.
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Create a new Yahoo Finance quote provider with default rate limiting (1 req/sec).
    pub fn new() -> Self {
        Self {
            provider: yahoo::YahooConnector::new().expect("Failed to create Yahoo connector"),
            rate_limit_delay: Duration::from_millis(1000),
        }
    }

    /// Create a new Yahoo Finance quote provider with custom rate limiting.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Self {
        Self {
            provider: yahoo::YahooConnector::new().expect("Failed to create Yahoo connector"),
            rate_limit_delay,
        }
    }

    /// Fetch the adjusted-close price history for a single symbol.
    ///
    /// # Arguments
    /// * `symbol` - The ticker symbol (e.g., "AAPL", "^GSPC")
    /// * `start` - Start date for the data
    /// * `end` - End date for the data
    ///
    /// # Returns
    /// A Polars DataFrame with columns: date, adjusted_close, sorted by
    /// date ascending. A single attempt is made per call; failures surface
    /// as [`DataError`].
    pub async fn fetch_adjusted_close(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<DataFrame> {
        // Validate date range
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }

        // Validate symbol
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        // Convert chrono DateTime to time::OffsetDateTime
        let start_time = time::OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;
        let end_time = time::OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;

        // Fetch data from Yahoo Finance
        let response = self
            .provider
            .get_quote_history(symbol, start_time, end_time)
            .await?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        if quotes.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        // Convert to DataFrame
        let dates: Vec<i64> = quotes.iter().map(|q| q.timestamp).collect();
        let adj_closes: Vec<f64> = quotes.iter().map(|q| q.adjclose).collect();

        let df = DataFrame::new(vec![
            Series::new("timestamp".into(), dates).into(),
            Series::new("adjusted_close".into(), adj_closes).into(),
        ])?;

        // Convert timestamp to date
        let df = df
            .lazy()
            .with_column(
                (col("timestamp") * lit(1_000_000_000))
                    .cast(DataType::Datetime(TimeUnit::Nanoseconds, None))
                    .cast(DataType::Date)
                    .alias("date"),
            )
            .select(&[col("date"), col("adjusted_close")])
            .sort(["date"], SortMultipleOptions::default())
            .collect()?;

        // Apply rate limiting
        sleep(self.rate_limit_delay).await;

        Ok(df)
    }
}

impl Default for YahooQuoteProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[tokio::test]
    #[ignore = "requires network access to Yahoo Finance"]
    async fn test_fetch_adjusted_close() {
        let provider = YahooQuoteProvider::new();
        let end = Utc::now();
        let start = end - ChronoDuration::days(30);

        let result = provider.fetch_adjusted_close("AAPL", start, end).await;
        assert!(result.is_ok());

        let df = result.unwrap();
        assert!(df.height() > 0);
        assert_eq!(df.get_column_names(), vec!["date", "adjusted_close"]);
    }

    #[tokio::test]
    async fn test_invalid_date_range() {
        let provider = YahooQuoteProvider::new();
        let start = Utc::now();
        let end = start - ChronoDuration::days(30);

        let result = provider.fetch_adjusted_close("AAPL", start, end).await;
        assert!(matches!(result, Err(DataError::InvalidDateRange { .. })));
    }

    #[tokio::test]
    async fn test_invalid_symbol() {
        let provider = YahooQuoteProvider::new();
        let end = Utc::now();
        let start = end - ChronoDuration::days(30);

        let result = provider.fetch_adjusted_close("", start, end).await;
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));
    }
}
