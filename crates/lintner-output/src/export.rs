//! Export of the monthly returns table and CAPM summary.
//!
//! Supports CSV and JSON, mirroring what the console reporting prints so
//! downstream notebooks can consume the same figures.

use crate::summary::CapmSummary;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Infer the format from a path's extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ExportError> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(format!(
                "Unsupported export extension: '{}' (expected csv or json)",
                other
            ))),
        }
    }
}

/// One row of the monthly returns table, flattened for export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnRecord {
    /// Month-end date.
    pub date: NaiveDate,

    /// Stock adjusted close at month end.
    pub stock_price: f64,

    /// Market adjusted close at month end.
    pub market_price: f64,

    /// Monthly log return of the stock.
    pub stock_return: f64,

    /// Monthly log return of the market.
    pub market_return: f64,
}

/// Writes returns tables and summaries in a chosen format.
#[derive(Debug, Clone, Copy)]
pub struct Exporter {
    format: ExportFormat,
}

impl Exporter {
    /// Create an exporter for the given format.
    pub const fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    /// The configured format.
    pub const fn format(&self) -> ExportFormat {
        self.format
    }

    /// Write the monthly returns table to `path`.
    pub fn write_returns<P: AsRef<Path>>(
        &self,
        path: P,
        records: &[ReturnRecord],
    ) -> Result<(), ExportError> {
        match self.format {
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_path(path)?;
                for record in records {
                    writer.serialize(record)?;
                }
                writer.flush()?;
                Ok(())
            }
            ExportFormat::Json => self.write_json(path, records, false),
            ExportFormat::PrettyJson => self.write_json(path, records, true),
        }
    }

    /// Write the CAPM summary to `path`.
    pub fn write_summary<P: AsRef<Path>>(
        &self,
        path: P,
        summary: &CapmSummary,
    ) -> Result<(), ExportError> {
        match self.format {
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_path(path)?;
                writer.serialize(summary)?;
                writer.flush()?;
                Ok(())
            }
            ExportFormat::Json => self.write_json(path, summary, false),
            ExportFormat::PrettyJson => self.write_json(path, summary, true),
        }
    }

    fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(
        &self,
        path: P,
        value: &T,
        pretty: bool,
    ) -> Result<(), ExportError> {
        let json = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };

        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_records() -> Vec<ReturnRecord> {
        vec![
            ReturnRecord {
                date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                stock_price: 102.0,
                market_price: 4100.0,
                stock_return: 0.0198,
                market_return: 0.0247,
            },
            ReturnRecord {
                date: NaiveDate::from_ymd_opt(2024, 3, 28).unwrap(),
                stock_price: 101.0,
                market_price: 4050.0,
                stock_return: -0.0099,
                market_return: -0.0123,
            },
        ]
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("lintner-export-test-{}", name))
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path("out.csv").unwrap(), ExportFormat::Csv);
        assert_eq!(
            ExportFormat::from_path("out.json").unwrap(),
            ExportFormat::PrettyJson
        );
        assert!(matches!(
            ExportFormat::from_path("out.parquet"),
            Err(ExportError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }

    #[test]
    fn test_csv_returns_export() {
        let path = temp_path("returns.csv");
        let exporter = Exporter::new(ExportFormat::Csv);

        exporter.write_returns(&path, &sample_records()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("date,stock_price,market_price,stock_return,market_return"));
        assert!(contents.contains("2024-02-29"));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_json_returns_round_trip() {
        let path = temp_path("returns.json");
        let exporter = Exporter::new(ExportFormat::PrettyJson);
        let records = sample_records();

        exporter.write_returns(&path, &records).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let back: Vec<ReturnRecord> = serde_json::from_str(&contents).unwrap();
        assert_eq!(back, records);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_summary_export_json() {
        let path = temp_path("summary.json");
        let summary = CapmSummary {
            symbol: "AAPL".to_string(),
            market_symbol: "^GSPC".to_string(),
            period_start: NaiveDate::from_ymd_opt(2020, 2, 28).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            observations: 59,
            beta_covariance: 1.2,
            beta_regression: 1.2,
            alpha: 0.004,
            r_squared: 0.65,
            mean_market_return: 0.01,
            risk_free_rate: 0.05,
            periods_per_year: 12.0,
            expected_annual_return: 0.134,
        };

        Exporter::new(ExportFormat::Json)
            .write_summary(&path, &summary)
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"beta_regression\":1.2"));
        fs::remove_file(&path).ok();
    }
}
