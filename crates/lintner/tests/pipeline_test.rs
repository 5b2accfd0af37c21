//! Integration tests for the full numeric pipeline on fixed price data.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use lintner::CapmAnalysis;
use lintner::capm::CapmConfig;
use lintner::data::resample_month_end;
use polars::prelude::*;

fn daily_frame(dates: &[&str], closes: &[f64]) -> DataFrame {
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

fn sample_analysis() -> CapmAnalysis {
    let start = Utc.from_utc_datetime(
        &NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_time(NaiveTime::MIN),
    );
    let end = Utc.from_utc_datetime(
        &NaiveDate::from_ymd_opt(2024, 6, 30)
            .unwrap()
            .and_time(NaiveTime::MIN),
    );
    CapmAnalysis::new("AAPL", "^GSPC", start, end)
}

/// Five months of daily data; mid-month rows must be discarded by the
/// resampler before returns are computed.
fn fixture() -> (DataFrame, DataFrame) {
    let stock = daily_frame(
        &[
            "2024-01-12", "2024-01-31", "2024-02-09", "2024-02-29", "2024-03-15", "2024-03-28",
            "2024-04-30", "2024-05-31",
        ],
        &[98.0, 100.0, 99.0, 104.0, 107.0, 103.0, 109.0, 112.0],
    );
    let market = daily_frame(
        &[
            "2024-01-12", "2024-01-31", "2024-02-09", "2024-02-29", "2024-03-15", "2024-03-28",
            "2024-04-30", "2024-05-31",
        ],
        &[3950.0, 4000.0, 3980.0, 4120.0, 4200.0, 4090.0, 4260.0, 4335.0],
    );
    (stock, market)
}

#[test]
fn test_full_pipeline_on_fixed_prices() {
    let (stock_daily, market_daily) = fixture();
    let stock_monthly = resample_month_end(&stock_daily).unwrap();
    let market_monthly = resample_month_end(&market_daily).unwrap();

    let report = sample_analysis().finish(&stock_monthly, &market_monthly).unwrap();

    // Five month-ends, differenced once.
    assert_eq!(report.table.height(), 4);
    assert_eq!(report.summary.observations, 4);
    assert_eq!(
        report.summary.period_start,
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    );
    assert_eq!(
        report.summary.period_end,
        NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()
    );

    // The first return uses month-end closes only: ln(104/100).
    let stock_returns = report.table.stock_returns().unwrap();
    assert_abs_diff_eq!(stock_returns[0], (104.0f64 / 100.0).ln(), epsilon = 1e-12);

    // Both estimators see the same table.
    assert_relative_eq!(
        report.estimate.beta_covariance,
        report.estimate.regression.beta,
        max_relative = 1e-9
    );
    assert_eq!(
        report.summary.beta_regression,
        report.estimate.regression.beta
    );
}

#[test]
fn test_pipeline_is_idempotent_on_cached_prices() {
    let (stock_daily, market_daily) = fixture();
    let stock_monthly = resample_month_end(&stock_daily).unwrap();
    let market_monthly = resample_month_end(&market_daily).unwrap();
    let analysis = sample_analysis();

    let first = analysis.finish(&stock_monthly, &market_monthly).unwrap();
    let second = analysis.finish(&stock_monthly, &market_monthly).unwrap();

    assert_eq!(first.estimate, second.estimate);
    assert_eq!(first.summary, second.summary);
}

#[test]
fn test_custom_config_flows_into_summary() {
    let (stock_daily, market_daily) = fixture();
    let stock_monthly = resample_month_end(&stock_daily).unwrap();
    let market_monthly = resample_month_end(&market_daily).unwrap();

    let config = CapmConfig {
        risk_free_rate: 0.03,
        periods_per_year: 12.0,
    };
    let report = sample_analysis()
        .with_config(config)
        .finish(&stock_monthly, &market_monthly)
        .unwrap();

    assert_abs_diff_eq!(report.summary.risk_free_rate, 0.03, epsilon = 1e-15);

    let expected = 0.03
        + report.estimate.regression.beta * (report.estimate.mean_market_return * 12.0 - 0.03);
    assert_abs_diff_eq!(
        report.summary.expected_annual_return,
        expected,
        epsilon = 1e-12
    );
}

#[test]
fn test_summary_renders_without_panic() {
    let (stock_daily, market_daily) = fixture();
    let stock_monthly = resample_month_end(&stock_daily).unwrap();
    let market_monthly = resample_month_end(&market_daily).unwrap();

    let report = sample_analysis().finish(&stock_monthly, &market_monthly).unwrap();
    let table = report.summary.to_ascii_table();

    assert!(table.contains("AAPL"));
    assert!(table.contains("^GSPC"));
    assert!(table.contains("Beta (covariance formula)"));
}
