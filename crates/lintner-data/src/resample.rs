//! Month-end downsampling of daily price series.

use crate::error::Result;
use polars::prelude::*;

/// Downsample a daily `[date, adjusted_close]` frame to month-end frequency.
///
/// Keeps the last observation of each calendar month, which for exchange
/// data is the final trading day. The output is sorted by date ascending
/// with exactly one row per observed month, so dates are strictly
/// increasing with no duplicates.
pub fn resample_month_end(prices: &DataFrame) -> Result<DataFrame> {
    let monthly = prices
        .clone()
        .lazy()
        .sort(["date"], SortMultipleOptions::default())
        .with_columns([
            col("date").dt().year().alias("year"),
            col("date").dt().month().alias("month"),
        ])
        .group_by([col("year"), col("month")])
        .agg([col("date").last(), col("adjusted_close").last()])
        .sort(["date"], SortMultipleOptions::default())
        .select([col("date"), col("adjusted_close")])
        .collect()?;

    Ok(monthly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

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

    fn dates_of(df: &DataFrame) -> Vec<NaiveDate> {
        df.column("date")
            .unwrap()
            .as_materialized_series()
            .date()
            .unwrap()
            .as_date_iter()
            .flatten()
            .collect()
    }

    fn closes_of(df: &DataFrame) -> Vec<f64> {
        df.column("adjusted_close")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn test_keeps_last_trading_day_per_month() {
        let daily = daily_frame(
            &[
                "2024-01-02",
                "2024-01-15",
                "2024-01-31",
                "2024-02-01",
                "2024-02-29",
                "2024-03-04",
                "2024-03-28",
            ],
            &[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0],
        );

        let monthly = resample_month_end(&daily).unwrap();

        assert_eq!(monthly.height(), 3);
        assert_eq!(
            dates_of(&monthly),
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 28).unwrap(),
            ]
        );
        assert_eq!(closes_of(&monthly), vec![102.0, 104.0, 106.0]);
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let daily = daily_frame(
            &["2024-02-15", "2024-01-31", "2024-02-29", "2024-01-02"],
            &[103.0, 102.0, 104.0, 100.0],
        );

        let monthly = resample_month_end(&daily).unwrap();

        assert_eq!(closes_of(&monthly), vec![102.0, 104.0]);
    }

    #[test]
    fn test_dates_strictly_increasing_across_years() {
        let daily = daily_frame(
            &["2023-12-29", "2024-01-31", "2024-12-31", "2025-01-02"],
            &[1.0, 2.0, 3.0, 4.0],
        );

        let monthly = resample_month_end(&daily).unwrap();
        let dates = dates_of(&monthly);

        assert_eq!(monthly.height(), 4);
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_single_month_collapses_to_one_row() {
        let daily = daily_frame(
            &["2024-06-03", "2024-06-14", "2024-06-28"],
            &[10.0, 11.0, 12.0],
        );

        let monthly = resample_month_end(&daily).unwrap();

        assert_eq!(monthly.height(), 1);
        assert_eq!(closes_of(&monthly), vec![12.0]);
    }
}
