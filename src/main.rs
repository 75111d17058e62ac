use anyhow::{Context, Result};

use incident_survival::batch::{BatchProcessor, ResultRow, RowOutcome};
use incident_survival::config::Config;
use incident_survival::market_data::YahooChartClient;

fn fmt_opt_days(days: Option<i64>) -> String {
    days.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn render_table(rows: &[ResultRow]) -> String {
    let mut out = format!(
        "{:<10} {:>12} {:>10} {:>10} {:>10} {:>10}\n",
        "Ticker", "RunningDays", "MRL", "Survival", "Hazard", "CumHazard"
    );
    for row in rows {
        let line = match &row.outcome {
            RowOutcome::Available(s) => format!(
                "{:<10} {:>12} {:>10.2} {:>10.4} {:>10.4} {:>10.4}\n",
                row.ticker,
                fmt_opt_days(s.running_days),
                s.mean_residual_life,
                s.survival,
                s.hazard,
                s.cumulative_hazard
            ),
            RowOutcome::Unavailable { .. } => format!(
                "{:<10} {:>12} {:>10} {:>10} {:>10} {:>10}\n",
                row.ticker, "N/A", "N/A", "N/A", "N/A", "N/A"
            ),
        };
        out.push_str(&line);
    }
    out
}

/// Tickers from the command line (space or comma separated) or the config.
fn requested_tickers(args: &[String], config: &Config) -> Vec<String> {
    let from_args: Vec<String> = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .flat_map(|a| a.split(','))
        .map(|t| t.trim().to_ascii_uppercase())
        .filter(|t| !t.is_empty())
        .collect();
    if from_args.is_empty() {
        config.analysis.resolved_tickers()
    } else {
        from_args
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required by rustls 0.23+); already-installed is fine.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Set INCIDENT_SURVIVAL_CONFIG or create config/default.toml");
            std::process::exit(1);
        }
    };

    // Logs go to stderr so stdout only carries results.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.logging.level.as_str())
            }),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .json()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json_output = args.iter().any(|a| a == "--json");
    let tickers = requested_tickers(&args, &config);
    let reference_date = chrono::Local::now().date_naive();

    tracing::info!(
        tickers = tickers.len(),
        threshold = config.analysis.threshold.value(),
        base_url = %config.provider.base_url,
        "Starting incident-survival"
    );

    let client = YahooChartClient::from_config(&config.provider)
        .context("failed to create market data client")?;
    let processor = BatchProcessor::new(client, reference_date)
        .with_concurrency(config.analysis.concurrency)
        .with_return_kind(config.analysis.return_kind);

    let rows = processor
        .process_batch(&tickers, config.analysis.threshold)
        .await;

    if json_output {
        for row in &rows {
            println!("{}", serde_json::to_string(row)?);
        }
    } else {
        print!("{}", render_table(&rows));
    }

    tracing::info!("Done");
    Ok(())
}
