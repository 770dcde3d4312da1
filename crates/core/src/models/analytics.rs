use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::swot::SwotSummary;

/// Per-holding outcome of an analysis run.
///
/// Monetary metrics are `None` when not applicable: the quote is missing,
/// or (for `gain_loss_pct`) the cost basis is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub quantity: f64,
    pub cost_basis: f64,

    /// Latest market price per share
    pub price: Option<f64>,

    /// quantity × price
    pub market_value: Option<f64>,

    /// quantity × cost_basis
    pub cost_value: f64,

    /// (price − cost_basis) × quantity
    pub gain_loss: Option<f64>,

    /// (price − cost_basis) / cost_basis, as a fraction (0.5 = +50%)
    pub gain_loss_pct: Option<f64>,

    /// This holding's share of the priced portfolio value, as a fraction
    pub allocation_pct: Option<f64>,

    pub swot: SwotSummary,

    /// `swot` rendered for display
    pub swot_text: String,
}

/// A symbol whose quote could not be fetched, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnavailableSymbol {
    pub symbol: String,
    pub reason: String,
}

/// Aggregate view of the whole portfolio for one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub as_of: DateTime<Utc>,

    /// Number of holdings analyzed
    pub total_holdings: usize,

    /// Holdings that had a quote
    pub priced_holdings: usize,

    /// Cost of priced holdings only
    pub total_cost: f64,

    /// Market value of priced holdings
    pub total_value: f64,

    /// Sum of defined per-holding gain/loss; not-applicable rows are excluded
    pub total_gain_loss: f64,

    /// total_gain_loss / total_cost, when total_cost > 0
    pub total_gain_loss_pct: Option<f64>,

    pub results: Vec<AnalysisResult>,

    pub unavailable: Vec<UnavailableSymbol>,
}
