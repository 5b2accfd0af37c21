//! Lintner CLI binary.
//!
//! Provides the command-line interface for the CAPM analyzer.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use lintner::{CapmAnalysis, CapmReport};
use lintner_capm::CapmConfig;
use lintner_data::YahooQuoteProvider;
use lintner_output::{ExportFormat, Exporter, ReturnRecord, plot};
use serde_json::json;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "lintner")]
#[command(about = "Lintner: CAPM beta and expected-return analyzer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate CAPM beta and expected annual return for a stock
    Analyze {
        /// Stock symbol
        symbol: String,

        /// Market index symbol
        #[arg(long, default_value = "^GSPC")]
        market: String,

        /// Start of the price history window (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// End of the price history window (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Annual risk-free rate
        #[arg(long, default_value_t = 0.05)]
        risk_free_rate: f64,

        /// Write the regression plot to this SVG path
        #[arg(long)]
        plot: Option<PathBuf>,

        /// Export the monthly returns table (format from extension: .csv or .json)
        #[arg(long)]
        export: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            symbol,
            market,
            start,
            end,
            risk_free_rate,
            plot,
            export,
            format,
        } => {
            analyze(
                &symbol,
                &market,
                start,
                end,
                risk_free_rate,
                plot,
                export,
                &format,
            )
            .await?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn analyze(
    symbol: &str,
    market: &str,
    start: NaiveDate,
    end: NaiveDate,
    risk_free_rate: f64,
    plot_path: Option<PathBuf>,
    export_path: Option<PathBuf>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let symbol = symbol.to_uppercase();
    let market = market.to_uppercase();
    let is_json = format.to_lowercase() == "json";

    if !is_json {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!(
            "║{:^62}║",
            format!("CAPM ANALYSIS: {} vs {}", symbol, market)
        );
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Period: {} to {}", start, end);
        println!("Risk-free rate: {:.2}%", risk_free_rate * 100.0);
        println!("Frequency: monthly (month-end adjusted closes)\n");
    }

    let start = Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN));
    let end = Utc.from_utc_datetime(&end.and_time(NaiveTime::MIN));

    let config = CapmConfig {
        risk_free_rate,
        ..CapmConfig::default()
    };
    let analysis = CapmAnalysis::new(symbol.clone(), market.clone(), start, end)
        .with_config(config);

    let provider = YahooQuoteProvider::new();

    // Spinner for the slow step; indicatif draws on stderr, so JSON output
    // on stdout stays clean.
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Fetching {} and {}...", symbol, market));

    let report = match analysis.run(&provider).await {
        Ok(report) => {
            pb.finish_with_message(format!(
                "Fetched {} monthly observations",
                report.summary.observations
            ));
            report
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(format!("Analysis failed: {}", e).into());
        }
    };

    if is_json {
        let output = json!({
            "analysis_type": "capm",
            "summary": serde_json::to_value(&report.summary)?,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", report.summary.to_ascii_table());
        println!(
            "CAPM line: R_a = {:.4} * R_m + {:.4}\n",
            report.estimate.regression.beta, report.estimate.regression.alpha
        );
    }

    if let Some(path) = plot_path {
        let market_returns = report.table.market_returns()?;
        let stock_returns = report.table.stock_returns()?;
        let points: Vec<(f64, f64)> = market_returns.into_iter().zip(stock_returns).collect();

        plot::save_regression(
            &path,
            &points,
            report.estimate.regression.alpha,
            report.estimate.regression.beta,
        )?;
        if !is_json {
            println!("Regression plot written to {}", path.display());
        }
    }

    if let Some(path) = export_path {
        let export_format = ExportFormat::from_path(&path)?;
        let records = build_records(&report)?;

        Exporter::new(export_format).write_returns(&path, &records)?;
        if !is_json {
            println!("Returns table exported to {}", path.display());
        }
    }

    Ok(())
}

fn build_records(report: &CapmReport) -> Result<Vec<ReturnRecord>, Box<dyn std::error::Error>> {
    let dates = report.table.dates()?;
    let stock_prices = report.table.stock_prices()?;
    let market_prices = report.table.market_prices()?;
    let stock_returns = report.table.stock_returns()?;
    let market_returns = report.table.market_returns()?;

    let mut records = Vec::with_capacity(dates.len());
    for i in 0..dates.len() {
        records.push(ReturnRecord {
            date: dates[i],
            stock_price: stock_prices[i],
            market_price: market_prices[i],
            stock_return: stock_returns[i],
            market_return: market_returns[i],
        });
    }

    Ok(records)
}
