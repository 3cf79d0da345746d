use clap::Parser;
use pricecast_core::common::time::{format_date, parse_date};
use pricecast_core::{ForecastError, ForecastResult, Pipeline, PipelineConfig, PipelineResult, QueryResult, ReadOptions};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Clean a price history, forecast it with a logistic-growth model and query the result.
#[derive(Debug, Parser)]
#[command(name = "pricecast", version, about)]
struct Cli {
    /// CSV or spreadsheet with a date column and a price column
    input: PathBuf,

    /// Name of the date column
    #[arg(long, default_value = "dt")]
    date_column: String,

    /// Name of the price column (default: first non-date column)
    #[arg(long)]
    value_column: Option<String>,

    /// JSON object with pipeline settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of future periods to forecast
    #[arg(long)]
    horizon: Option<usize>,

    /// Capacity multiplier over the historical maximum
    #[arg(long)]
    margin: Option<f64>,

    /// daily, weekly, monthly or month_start
    #[arg(long)]
    cadence: Option<String>,

    /// Date to look up in the forecast (repeatable)
    #[arg(long = "query", value_name = "DATE")]
    queries: Vec<String>,

    /// Unit appended to predicted prices
    #[arg(long)]
    unit: Option<String>,

    /// Write the forecast table as CSV
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write historical and forecast series as JSON for plotting
    #[arg(long)]
    chart_json: Option<PathBuf>,

    /// Print every date that can be queried
    #[arg(long)]
    list_dates: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> ForecastResult<()> {
    let config = build_config(cli)?;
    let pipeline = Pipeline::new(config)?;
    let opts = ReadOptions {
        date_column: cli.date_column.clone(),
        value_column: cli.value_column.clone(),
    };

    info!("Processing file: {:?}", cli.input);
    let result = pipeline.run_file(&cli.input, &opts)?;

    print_summary(&result);
    print_forecast(&result);

    if cli.list_dates {
        println!("\nAvailable dates:");
        for date in result.query().available_dates() {
            println!("  {}", date);
        }
    }

    for query in &cli.queries {
        // A bad query date does not invalidate the forecast already shown.
        match answer_query(&result, query, cli.unit.as_deref()) {
            Ok(answer) => println!("\n{}", answer),
            Err(err) => eprintln!("{}", err),
        }
    }

    if let Some(path) = &cli.output {
        write_table_csv(&result, path)?;
        info!("forecast table written to {:?}", path);
    }
    if let Some(path) = &cli.chart_json {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, &result.chart_data())?;
        info!("chart data written to {:?}", path);
    }
    Ok(())
}

/// Settings file first, command-line flags on top.
fn build_config(cli: &Cli) -> ForecastResult<PipelineConfig> {
    let mut conf: HashMap<String, serde_json::Value> = match &cli.config {
        Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        None => HashMap::new(),
    };

    if let Some(horizon) = cli.horizon {
        conf.insert("forecast_horizon".to_string(), serde_json::Value::from(horizon));
    }
    if let Some(margin) = cli.margin {
        conf.insert("growth_margin".to_string(), serde_json::Value::from(margin));
    }
    if let Some(cadence) = &cli.cadence {
        conf.insert("period_cadence".to_string(), serde_json::Value::from(cadence.as_str()));
    }

    PipelineConfig::new(Some(conf))
}

fn answer_query(result: &PipelineResult, query: &str, unit: Option<&str>) -> ForecastResult<QueryResult> {
    let answer = result.query().result(parse_date(query)?)?;
    Ok(match unit {
        Some(unit) => answer.with_unit(unit),
        None => answer,
    })
}

fn print_summary(result: &PipelineResult) {
    let cleaned = &result.cleaned;
    let bounds = cleaned.bounds();
    println!("Observations: {}", cleaned.len());
    if let (Some(first), Some(last)) = (cleaned.first_date(), cleaned.last_date()) {
        println!("Period: {} .. {}", format_date(first), format_date(last));
    }
    println!(
        "Interpolated: {}, clipped: {} (bounds [{:.2}, {:.2}])",
        cleaned.interpolated_count(),
        cleaned.clipped_count(),
        bounds.lower,
        bounds.upper
    );
    println!("Capacity: {:.2}", result.capacity.value());
}

fn print_forecast(result: &PipelineResult) {
    println!("\n{:<12} {:>14} {:>14} {:>14}", "date", "predicted", "lower", "upper");
    for row in result.table.future() {
        println!(
            "{:<12} {:>14.2} {:>14.2} {:>14.2}",
            format_date(row.date),
            row.predicted,
            row.lower_bound,
            row.upper_bound
        );
    }
}

fn write_table_csv(result: &PipelineResult, path: &Path) -> ForecastResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in result.table.rows() {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(ForecastError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_queries_and_overrides() {
        let cli = Cli::try_parse_from([
            "pricecast",
            "train.xlsx",
            "--horizon",
            "6",
            "--cadence",
            "month_start",
            "--query",
            "2024-01-31",
            "--query",
            "2024-02-29",
        ])
        .unwrap();
        assert_eq!(cli.queries.len(), 2);
        assert_eq!(cli.date_column, "dt");

        let config = build_config(&cli).unwrap();
        assert_eq!(config.forecast_horizon, 6);
        assert_eq!(config.model_conf.cadence.to_string(), "month_start");
    }

    #[test]
    fn test_answer_query() {
        let rows: Vec<String> = (0..12)
            .map(|i| format!("2022-{:02}-28,{}", i + 1, 1000 + 10 * i + 37 * (i % 5)))
            .collect();
        let data = format!("dt,price\n{}\n", rows.join("\n"));
        let raw = pricecast_core::io::series_reader::read_csv_from(data.as_bytes(), &ReadOptions::default()).unwrap();
        let result = Pipeline::new(PipelineConfig::default()).unwrap().run(&raw).unwrap();

        let answer = answer_query(&result, "2022-12-31", Some("per tonne")).unwrap();
        assert!(answer.to_string().contains("per tonne"), "{}", answer);
        let err = answer_query(&result, "2022-12-30", None).unwrap_err();
        assert_eq!(err.errcode, pricecast_core::ErrCode::NotFound);
        let err = answer_query(&result, "someday", None).unwrap_err();
        assert_eq!(err.errcode, pricecast_core::ErrCode::DataError);
    }

    #[test]
    fn test_bad_cadence_flag_is_config_error() {
        let cli = Cli::try_parse_from(["pricecast", "train.csv", "--cadence", "hourly"]).unwrap();
        let err = build_config(&cli).unwrap_err();
        assert_eq!(err.errcode, pricecast_core::ErrCode::ConfigError);
    }
}
