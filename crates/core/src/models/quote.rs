use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::holding::normalize_symbol;

/// A single closing price (date → price).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// A market snapshot for one symbol: the latest price plus a recent
/// daily history, sorted oldest-first.
///
/// Quotes are fetched per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,
    pub history: Vec<PricePoint>,
}

impl Quote {
    pub fn new(
        symbol: impl Into<String>,
        price: f64,
        timestamp: DateTime<Utc>,
        mut history: Vec<PricePoint>,
    ) -> Self {
        history.sort_by_key(|p| p.date);
        history.dedup_by_key(|p| p.date);
        Self {
            symbol: normalize_symbol(&symbol.into()),
            price,
            timestamp,
            history,
        }
    }

    /// Closing prices of the history, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.history.iter().map(|p| p.price).collect()
    }
}
