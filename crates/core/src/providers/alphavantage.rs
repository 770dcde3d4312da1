use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::QuoteProvider;
use crate::errors::CoreError;
use crate::models::quote::PricePoint;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

/// Alpha Vantage provider for stock/equity quotes.
///
/// - **Free tier**: 25 requests/day (across ALL endpoints).
/// - **Requires**: API key (set via settings as "alphavantage").
/// - **Coverage**: 100k+ global equity symbols.
///
/// `TIME_SERIES_DAILY` in compact mode returns the last 100 trading days,
/// so longer lookbacks are silently truncated.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Point the provider at a different endpoint (proxies, test servers).
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
            base_url: base_url.into(),
        }
    }
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
}

#[derive(Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyData>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
}

#[derive(Deserialize)]
struct DailyData {
    #[serde(rename = "4. close")]
    close: String,
}

fn api_error(message: String) -> CoreError {
    CoreError::Api {
        provider: PROVIDER.into(),
        message,
    }
}

/// Parse a `GLOBAL_QUOTE` response body into a price.
///
/// Rate-limit notes and empty quotes (unknown symbol) are `CoreError::Api`.
pub fn parse_global_quote(symbol: &str, body: &str) -> Result<f64, CoreError> {
    let resp: GlobalQuoteResponse = serde_json::from_str(body)
        .map_err(|e| api_error(format!("Failed to parse quote for {symbol}: {e}")))?;

    if let Some(note) = resp.note.or(resp.information) {
        return Err(api_error(format!("Request for {symbol} rejected: {note}")));
    }

    // An unknown symbol yields `"Global Quote": {}`
    let price_str = resp
        .global_quote
        .and_then(|q| q.price)
        .ok_or_else(|| api_error(format!("No quote data for {symbol}")))?;

    price_str
        .trim()
        .parse()
        .map_err(|e| api_error(format!("Invalid price format for {symbol}: {e}")))
}

/// Parse a `TIME_SERIES_DAILY` response body and keep the closes inside
/// `[from, to]`, oldest first. Unparseable rows are skipped.
pub fn parse_daily_series(
    symbol: &str,
    body: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<PricePoint>, CoreError> {
    let resp: TimeSeriesResponse = serde_json::from_str(body)
        .map_err(|e| api_error(format!("Failed to parse time series for {symbol}: {e}")))?;

    if let Some(msg) = resp.error_message.or(resp.note) {
        return Err(api_error(format!("Time series for {symbol} rejected: {msg}")));
    }

    let series = resp
        .time_series
        .ok_or_else(|| api_error(format!("No time series data for {symbol}")))?;
    Ok(select_range(&series, from, to))
}

fn select_range(
    series: &HashMap<String, DailyData>,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<PricePoint> {
    let mut points: Vec<PricePoint> = series
        .iter()
        .filter_map(|(date_str, data)| {
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
            if date < from || date > to {
                return None;
            }
            let price: f64 = data.close.trim().parse().ok()?;
            Some(PricePoint { date, price })
        })
        .collect();

    points.sort_by_key(|p| p.date);
    points
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_current_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let body = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", &symbol.to_uppercase()),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?
            .text()
            .await?;

        parse_global_quote(symbol, &body)
    }

    /// Compact daily series: the last 100 trading days at most.
    async fn get_price_range(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let body = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", &symbol.to_uppercase()),
                ("outputsize", "compact"),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?
            .text()
            .await?;

        parse_daily_series(symbol, &body, from, to)
    }
}
