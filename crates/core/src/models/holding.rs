use serde::{Deserialize, Serialize};

/// A recorded position in a single stock.
///
/// `cost_basis` is the price paid **per unit**, not the total outlay.
/// Holdings are unique by `symbol` within a portfolio; the symbol is
/// trimmed and uppercased on construction so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol, uppercased (e.g., "AAPL", "BRK.B")
    pub symbol: String,

    /// Number of shares held (may be zero for a watch-list entry)
    pub quantity: f64,

    /// Purchase price per share
    pub cost_basis: f64,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, quantity: f64, cost_basis: f64) -> Self {
        Self {
            symbol: normalize_symbol(&symbol.into()),
            quantity,
            cost_basis,
        }
    }

    /// Total amount paid for the position.
    pub fn cost_value(&self) -> f64 {
        self.quantity * self.cost_basis
    }
}

/// Canonical form of a ticker symbol.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
