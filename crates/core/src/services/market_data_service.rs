use chrono::{Duration, NaiveDate, Utc};
use log::{debug, warn};
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::analytics::UnavailableSymbol;
use crate::models::holding::normalize_symbol;
use crate::models::quote::{PricePoint, Quote};
use crate::providers::registry::QuoteProviderRegistry;
use crate::providers::traits::QuoteProvider;

/// Quotes fetched for a batch of symbols, plus the symbols that failed.
#[derive(Debug, Clone, Default)]
pub struct QuoteBatch {
    pub quotes: HashMap<String, Quote>,
    pub unavailable: Vec<UnavailableSymbol>,
}

/// Fetches quotes from the registered providers.
///
/// Providers are tried in registration order. If the primary fails (API
/// down, rate limited, unknown symbol), the next one is tried. Whatever
/// goes wrong, callers only ever see `CoreError::DataUnavailable`.
pub struct MarketDataService {
    registry: QuoteProviderRegistry,
}

impl MarketDataService {
    pub fn new(registry: QuoteProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn has_provider(&self) -> bool {
        !self.registry.is_empty()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Fetch the latest price and `history_days` of daily closes ending at
    /// `as_of` for one symbol.
    pub async fn fetch_quote(
        &self,
        symbol: &str,
        as_of: NaiveDate,
        history_days: u32,
    ) -> Result<Quote, CoreError> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(CoreError::ValidationError("Symbol must not be empty".into()));
        }

        let providers = self.registry.providers();
        if providers.is_empty() {
            return Err(CoreError::DataUnavailable {
                symbol,
                reason: "no quote provider configured".into(),
            });
        }

        let from = as_of - Duration::days(i64::from(history_days));
        let mut last_error = None;

        for provider in providers {
            debug!("Fetching {symbol} from {}", provider.name());
            match Self::fetch_price(provider, &symbol).await {
                Ok(price) => {
                    let history = Self::fetch_history(provider, &symbol, from, as_of).await;
                    return Ok(Quote::new(symbol, price, Utc::now(), history));
                }
                Err(e) => {
                    warn!("{} failed for {symbol}: {e}", provider.name());
                    last_error = Some(e);
                }
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "all providers failed".into());
        Err(CoreError::DataUnavailable { symbol, reason })
    }

    /// Fetch quotes for several symbols, one after another.
    /// A failing symbol is recorded in `unavailable` and never aborts the batch.
    pub async fn fetch_quotes(
        &self,
        symbols: &[String],
        as_of: NaiveDate,
        history_days: u32,
    ) -> QuoteBatch {
        let mut batch = QuoteBatch::default();

        for symbol in symbols {
            let key = normalize_symbol(symbol);
            if batch.quotes.contains_key(&key)
                || batch.unavailable.iter().any(|u| u.symbol == key)
            {
                continue;
            }

            match self.fetch_quote(&key, as_of, history_days).await {
                Ok(quote) => {
                    batch.quotes.insert(key, quote);
                }
                Err(e) => {
                    warn!("Quote for {key} unavailable: {e}");
                    let reason = match e.into_unavailable(&key) {
                        CoreError::DataUnavailable { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    batch.unavailable.push(UnavailableSymbol { symbol: key, reason });
                }
            }
        }

        batch
    }

    /// Latest price from one provider, rejecting non-finite or negative values.
    async fn fetch_price(provider: &dyn QuoteProvider, symbol: &str) -> Result<f64, CoreError> {
        let price = provider.get_current_price(symbol).await?;
        if !price.is_finite() || price < 0.0 {
            return Err(CoreError::Api {
                provider: provider.name().to_string(),
                message: format!(
                    "Invalid price returned for {symbol}: {price} (must be finite and non-negative)"
                ),
            });
        }
        Ok(price)
    }

    /// History from the same provider that supplied the price.
    /// A failure here degrades to an empty series.
    async fn fetch_history(
        provider: &dyn QuoteProvider,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<PricePoint> {
        match provider.get_price_range(symbol, from, to).await {
            Ok(points) => points
                .into_iter()
                .filter(|p| p.price.is_finite() && p.price >= 0.0)
                .collect(),
            Err(e) => {
                warn!("{} returned no history for {symbol}: {e}", provider.name());
                Vec::new()
            }
        }
    }
}
