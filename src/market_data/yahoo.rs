use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::Value;
use url::Url;

use crate::config::ProviderConfig;
use crate::error::AppError;
use crate::market_data::SeriesSource;
use crate::model::{PriceBar, ReturnSeries};

/// History window requested from the chart endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartWindow {
    /// Named lookback such as `"max"` or `"5y"`.
    Range(String),
    /// `[start, end)` in calendar dates.
    Dates { start: NaiveDate, end: NaiveDate },
}

pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: String,
    interval: String,
    window: ChartWindow,
    exchange_suffix: Option<String>,
}

impl YahooChartClient {
    pub fn new(
        base_url: &str,
        interval: &str,
        window: ChartWindow,
        exchange_suffix: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("failed to build Yahoo HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            interval: interval.to_string(),
            window,
            exchange_suffix: exchange_suffix.filter(|s| !s.is_empty()),
        })
    }

    pub fn from_config(cfg: &ProviderConfig) -> Result<Self> {
        let suffix = (!cfg.world).then(|| cfg.exchange_suffix.clone());
        Self::new(
            &cfg.base_url,
            &cfg.interval,
            cfg.window()?,
            suffix,
            Duration::from_secs(cfg.timeout_secs),
        )
    }

    /// Provider symbol for a bare ticker, e.g. `PETR4` -> `PETR4.SA`.
    pub fn symbol_for(&self, ticker: &str) -> String {
        let ticker = ticker.trim().to_ascii_uppercase();
        match &self.exchange_suffix {
            Some(suffix) if !ticker.ends_with(&suffix.to_ascii_uppercase()) => {
                format!("{}{}", ticker, suffix)
            }
            _ => ticker,
        }
    }

    fn chart_url(&self, symbol: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("invalid provider base url '{}'", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("provider base url '{}' cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("interval", &self.interval);
            match &self.window {
                ChartWindow::Range(range) => {
                    query.append_pair("range", range);
                }
                ChartWindow::Dates { start, end } => {
                    query.append_pair("period1", &midnight_utc_secs(*start).to_string());
                    query.append_pair("period2", &midnight_utc_secs(*end).to_string());
                }
            }
            query.append_pair("events", "div,split");
        }
        Ok(url)
    }

    fn compact_error_body(body: &str) -> String {
        let normalized = body.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.len() > 180 {
            let cut = (0..=180)
                .rev()
                .find(|i| normalized.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}...", &normalized[..cut])
        } else {
            normalized
        }
    }

    pub async fn get_bars(&self, ticker: &str) -> Result<Vec<PriceBar>> {
        let symbol = self.symbol_for(ticker);
        let url = self.chart_url(&symbol)?;
        tracing::debug!(symbol = %symbol, url = %url, "Requesting chart");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(AppError::from)
            .with_context(|| format!("yahoo chart HTTP failed for {}", symbol))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(AppError::from)
            .with_context(|| format!("yahoo chart body read failed for {}", symbol))?;

        if !status.is_success() {
            // The provider reports unknown symbols as a 404 with a chart.error payload.
            if let Ok(root) = serde_json::from_str::<Value>(&body) {
                parse_chart_response(&root)
                    .with_context(|| format!("yahoo chart HTTP {} for {}", status, symbol))?;
            }
            bail!(
                "yahoo chart HTTP {} for {}: {}",
                status,
                symbol,
                Self::compact_error_body(&body)
            );
        }

        let bars = parse_chart_body(&body).with_context(|| format!("chart for {}", symbol))?;
        tracing::debug!(symbol = %symbol, count = bars.len(), "Fetched bars");
        Ok(bars)
    }
}

impl SeriesSource for YahooChartClient {
    async fn fetch_series(&self, ticker: &str) -> Result<ReturnSeries> {
        let bars = self.get_bars(ticker).await?;
        Ok(ReturnSeries::from_bars(&bars)?)
    }
}

/// Window bounds are UTC midnights. Daily bars are stamped at the session
/// open, so for exchanges west of UTC (B3, NYSE) the session of `start` is
/// included and the session of `end` is not. East of UTC a bar opening before
/// the UTC date change belongs to the previous UTC day and shifts by one.
fn midnight_utc_secs(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn column<'a>(quote: Option<&'a Value>, name: &str) -> &'a [Value] {
    quote
        .and_then(|q| q.get(name))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Decodes a raw chart response body. Malformed JSON is `AppError::Json`.
pub fn parse_chart_body(body: &str) -> Result<Vec<PriceBar>> {
    let root: Value = serde_json::from_str(body)
        .map_err(AppError::from)
        .context("yahoo chart JSON parse failed")?;
    parse_chart_response(&root)
}

/// Parses a `/v8/finance/chart` payload into bars ordered by time.
///
/// Prices are adjusted by the `adjclose / close` ratio when the payload
/// carries adjusted closes. Rows without a close are skipped, and timestamps
/// are shifted to the exchange `gmtoffset`.
pub fn parse_chart_response(root: &Value) -> Result<Vec<PriceBar>> {
    let chart = root.get("chart").context("missing 'chart' object")?;
    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        let code = err.get("code").and_then(Value::as_str).unwrap_or("unknown");
        let description = err
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        bail!("provider error {}: {}", code, description);
    }

    let result = chart
        .get("result")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .context("chart returned no result")?;

    let offset_secs = result
        .pointer("/meta/gmtoffset")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    let tz = i32::try_from(offset_secs)
        .ok()
        .and_then(FixedOffset::east_opt)
        .with_context(|| format!("invalid gmtoffset {}", offset_secs))?;

    let empty = Vec::new();
    let timestamps = result
        .get("timestamp")
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    let quote = result.pointer("/indicators/quote/0");
    let (opens, highs, lows, closes, volumes) = (
        column(quote, "open"),
        column(quote, "high"),
        column(quote, "low"),
        column(quote, "close"),
        column(quote, "volume"),
    );
    let adjcloses = result
        .pointer("/indicators/adjclose/0/adjclose")
        .and_then(Value::as_array);

    let at = |col: &[Value], i: usize| col.get(i).and_then(Value::as_f64);

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(secs) = ts.as_i64() else {
            continue;
        };
        let raw_close = at(closes, i);
        let adj_close = adjcloses.and_then(|a| a.get(i)).and_then(Value::as_f64);
        let Some(close) = adj_close.or(raw_close) else {
            continue;
        };
        let ratio = match (adj_close, raw_close) {
            (Some(adj), Some(raw)) if raw != 0.0 => adj / raw,
            _ => 1.0,
        };
        let scaled = |v: Option<f64>| v.map(|x| x * ratio).unwrap_or(close);

        let timestamp = DateTime::from_timestamp(secs, 0)
            .with_context(|| format!("timestamp {} out of range", secs))?
            .with_timezone(&tz);

        bars.push(PriceBar {
            timestamp,
            open: scaled(at(opens, i)),
            high: scaled(at(highs, i)),
            low: scaled(at(lows, i)),
            close,
            volume: at(volumes, i).unwrap_or(0.0),
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by(|b, a| a.timestamp == b.timestamp);
    Ok(bars)
}
