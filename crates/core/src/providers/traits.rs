use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::quote::PricePoint;

/// Boundary to an external stock-quote service.
///
/// Implementations only talk to their upstream and map its failures into
/// `CoreError`; fallback between providers and folding errors into
/// `DataUnavailable` happen in `MarketDataService`.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Latest traded (or last close) price of a stock, in its listing currency.
    async fn get_current_price(&self, symbol: &str) -> Result<f64, CoreError>;

    /// Daily closes between `from` and `to` (inclusive), sorted by date.
    async fn get_price_range(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError>;
}
