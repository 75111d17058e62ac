use std::path::Path;

use incident_survival::config::{parse_interval, parse_range, Config};
use incident_survival::error::AppError;
use incident_survival::market_data::{ChartWindow, Universe};
use incident_survival::model::ReturnKind;

const BASE: &str = r#"
[provider]
base_url = "https://query1.finance.yahoo.com"
interval = "1d"
range = "max"
world = false
exchange_suffix = ".SA"
timeout_secs = 20

[analysis]
threshold = -0.05
return_kind = "log"
concurrency = 4
universe = "opcoes_top_50"

[logging]
level = "debug"
"#;

#[test]
fn parse_default_toml() {
    let config = Config::from_toml_str(BASE).unwrap();
    assert_eq!(config.provider.interval, "1d");
    assert!(!config.provider.world);
    assert_eq!(config.provider.timeout_secs, 20);
    assert!((config.analysis.threshold.value() + 0.05).abs() < f64::EPSILON);
    assert_eq!(config.analysis.return_kind, ReturnKind::Log);
    assert_eq!(config.analysis.concurrency, 4);
    assert_eq!(config.analysis.universe, Universe::OpcoesTop50);
    assert_eq!(config.analysis.resolved_tickers().len(), 49);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.provider.window().unwrap(),
        ChartWindow::Range("max".to_string())
    );
}

#[test]
fn shipped_default_config_loads() {
    let config = Config::load_from(Path::new("config/default.toml")).unwrap();
    assert_eq!(config.provider.exchange_suffix, ".SA");
    assert_eq!(config.analysis.universe, Universe::OpcoesTop50);
}

#[test]
fn omitted_analysis_fields_use_defaults() {
    let toml_str = r#"
[provider]
base_url = "https://query1.finance.yahoo.com"

[analysis]
tickers = ["aapl", "msft"]

[logging]
level = "info"
"#;
    let config = Config::from_toml_str(toml_str).unwrap();
    assert_eq!(config.provider.range, "max");
    assert_eq!(config.provider.exchange_suffix, ".SA");
    assert!((config.analysis.threshold.value() + 0.05).abs() < f64::EPSILON);
    assert_eq!(config.analysis.concurrency, 4);
    assert_eq!(
        config.analysis.resolved_tickers(),
        vec!["AAPL".to_string(), "MSFT".to_string()]
    );
}

#[test]
fn date_window_overrides_range() {
    let toml_str = BASE.replace(
        "range = \"max\"",
        "range = \"max\"\nstart_date = \"2015-01-01\"\nend_date = \"2024-10-15\"",
    );
    let config = Config::from_toml_str(&toml_str).unwrap();
    match config.provider.window().unwrap() {
        ChartWindow::Dates { start, end } => {
            assert_eq!(start.to_string(), "2015-01-01");
            assert_eq!(end.to_string(), "2024-10-15");
        }
        other => panic!("expected dates, got {:?}", other),
    }
}

#[test]
fn inverted_date_range_is_rejected() {
    let toml_str = BASE.replace(
        "range = \"max\"",
        "start_date = \"2024-10-15\"\nend_date = \"2015-01-01\"",
    );
    let err = Config::from_toml_str(&toml_str).unwrap_err();
    assert!(format!("{:#}", err).contains("invalid date range"), "{:#}", err);
}

#[test]
fn half_open_date_range_is_rejected() {
    let toml_str = BASE.replace("range = \"max\"", "start_date = \"2024-10-15\"");
    assert!(Config::from_toml_str(&toml_str).is_err());
}

#[test]
fn non_finite_threshold_is_rejected() {
    let toml_str = BASE.replace("threshold = -0.05", "threshold = nan");
    let err = Config::from_toml_str(&toml_str).unwrap_err();
    assert!(format!("{:#}", err).contains("invalid threshold"), "{:#}", err);
}

fn config_error(from: &str, to: &str) -> anyhow::Error {
    Config::from_toml_str(&BASE.replace(from, to)).unwrap_err()
}

#[test]
fn invalid_provider_settings_are_rejected() {
    for (from, to) in [
        ("range = \"max\"", "range = \"forever\""),
        ("interval = \"1d\"", "interval = \"7x\""),
        ("timeout_secs = 20", "timeout_secs = 0"),
        ("concurrency = 4", "concurrency = 0"),
    ] {
        let err = config_error(from, to);
        assert!(
            matches!(err.downcast_ref::<AppError>(), Some(AppError::Config(_))),
            "{:#}",
            err
        );
    }
}

#[test]
fn missing_config_file_is_an_io_error() {
    let err = Config::load_from(Path::new("config/does-not-exist.toml")).unwrap_err();
    match err.downcast_ref::<AppError>() {
        Some(AppError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected io error, got {:?}", other),
    }
}

#[test]
fn simple_return_kind_parses() {
    let config =
        Config::from_toml_str(&BASE.replace("return_kind = \"log\"", "return_kind = \"simple\""))
            .unwrap();
    assert_eq!(config.analysis.return_kind, ReturnKind::Simple);
}

#[test]
fn parse_helpers_accept_known_values() {
    assert_eq!(parse_interval("1mo").unwrap(), "1mo");
    assert_eq!(parse_range("10y").unwrap(), "10y");
}
