use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::market_data::{ChartWindow, Universe};
use crate::model::ReturnKind;
use crate::survival::Threshold;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const CONFIG_PATH_ENV: &str = "INCIDENT_SURVIVAL_CONFIG";

const SUPPORTED_INTERVALS: &[&str] = &[
    "1m", "2m", "5m", "15m", "30m", "60m", "90m", "1h", "1d", "5d", "1wk", "1mo", "3mo",
];
const SUPPORTED_RANGES: &[&str] = &[
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Tickers are global symbols; no exchange suffix is appended.
    #[serde(default)]
    pub world: bool,
    #[serde(default = "default_exchange_suffix")]
    pub exchange_suffix: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub threshold: Threshold,
    #[serde(default)]
    pub return_kind: ReturnKind,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub universe: Universe,
    #[serde(default)]
    pub tickers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_range() -> String {
    "max".to_string()
}

fn default_exchange_suffix() -> String {
    ".SA".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_concurrency() -> usize {
    4
}

/// Validate a chart interval string such as "1d" or "1wk".
pub fn parse_interval(s: &str) -> Result<&'static str> {
    let s = s.trim();
    match SUPPORTED_INTERVALS.iter().find(|v| **v == s) {
        Some(v) => Ok(*v),
        None => bail!(AppError::Config(format!(
            "invalid interval '{}': expected one of {}",
            s,
            SUPPORTED_INTERVALS.join("/")
        ))),
    }
}

/// Validate a lookback range string such as "5y" or "max".
pub fn parse_range(s: &str) -> Result<&'static str> {
    let s = s.trim();
    match SUPPORTED_RANGES.iter().find(|v| **v == s) {
        Some(v) => Ok(*v),
        None => bail!(AppError::Config(format!(
            "invalid range '{}': expected one of {}",
            s,
            SUPPORTED_RANGES.join("/")
        ))),
    }
}

impl ProviderConfig {
    /// Explicit dates take precedence over the named range.
    pub fn window(&self) -> Result<ChartWindow> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => {
                if start >= end {
                    return Err(AppError::InvalidDateRange { start, end }.into());
                }
                Ok(ChartWindow::Dates { start, end })
            }
            (None, None) => Ok(ChartWindow::Range(parse_range(&self.range)?.to_string())),
            _ => bail!(AppError::Config(
                "provider.start_date and provider.end_date must be set together".to_string()
            )),
        }
    }
}

impl AnalysisConfig {
    /// Explicit tickers when configured, otherwise the universe preset.
    /// Order is kept and duplicates are not removed.
    pub fn resolved_tickers(&self) -> Vec<String> {
        let explicit: Vec<String> = self
            .tickers
            .iter()
            .map(|t| t.trim().to_ascii_uppercase())
            .filter(|t| !t.is_empty())
            .collect();
        if explicit.is_empty() {
            self.universe.tickers()
        } else {
            explicit
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(AppError::from)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to load {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        parse_interval(&self.provider.interval).context("provider.interval is invalid")?;
        self.provider
            .window()
            .context("provider history window is invalid")?;
        if self.provider.timeout_secs == 0 {
            bail!(AppError::Config("provider.timeout_secs must be > 0".to_string()));
        }
        if self.analysis.concurrency == 0 {
            bail!(AppError::Config("analysis.concurrency must be > 0".to_string()));
        }
        Ok(())
    }
}
