use std::collections::HashMap;

use crate::models::analytics::{AnalysisResult, PortfolioSummary, UnavailableSymbol};
use crate::models::context::AnalysisContext;
use crate::models::holding::Holding;
use crate::models::quote::Quote;
use crate::models::swot::SwotSummary;
use crate::services::swot_service::SwotService;

/// Joins holdings with quotes: gain/loss per holding, portfolio totals and
/// a SWOT summary per symbol.
///
/// No I/O. A missing quote degrades that one row to not-applicable.
pub struct AnalyticsService {
    swot_service: SwotService,
}

impl AnalyticsService {
    pub fn new() -> Self {
        Self {
            swot_service: SwotService::new(),
        }
    }

    /// One result per holding, in the same order as `holdings`.
    ///
    /// `quotes` is keyed by uppercased symbol.
    pub fn analyze(
        &self,
        holdings: &[Holding],
        quotes: &HashMap<String, Quote>,
        ctx: &AnalysisContext,
    ) -> Vec<AnalysisResult> {
        let mut results: Vec<AnalysisResult> = holdings
            .iter()
            .map(|holding| match quotes.get(&holding.symbol) {
                Some(quote) => self.priced_result(holding, quote, ctx),
                None => Self::unpriced_result(holding),
            })
            .collect();

        let total_value: f64 = results.iter().filter_map(|r| r.market_value).sum();
        for result in &mut results {
            result.allocation_pct = match result.market_value {
                Some(value) if total_value > 0.0 => Some(value / total_value),
                _ => None,
            };
        }

        results
    }

    /// Analyze and aggregate.
    ///
    /// Totals only include rows with a defined value; a not-applicable row
    /// is left out rather than counted as zero.
    pub fn summarize(
        &self,
        holdings: &[Holding],
        quotes: &HashMap<String, Quote>,
        unavailable: Vec<UnavailableSymbol>,
        ctx: &AnalysisContext,
    ) -> PortfolioSummary {
        let results = self.analyze(holdings, quotes, ctx);

        let priced: Vec<&AnalysisResult> = results.iter().filter(|r| r.price.is_some()).collect();
        let priced_holdings = priced.len();
        let total_cost: f64 = priced.iter().map(|r| r.cost_value).sum();
        let total_value: f64 = priced.iter().filter_map(|r| r.market_value).sum();
        let total_gain_loss: f64 = results.iter().filter_map(|r| r.gain_loss).sum();
        let total_gain_loss_pct = (total_cost > 0.0).then(|| total_gain_loss / total_cost);

        PortfolioSummary {
            as_of: ctx.as_of,
            total_holdings: results.len(),
            priced_holdings,
            total_cost,
            total_value,
            total_gain_loss,
            total_gain_loss_pct,
            results,
            unavailable,
        }
    }

    fn priced_result(
        &self,
        holding: &Holding,
        quote: &Quote,
        ctx: &AnalysisContext,
    ) -> AnalysisResult {
        let price = quote.price;
        let gain_loss = (price - holding.cost_basis) * holding.quantity;
        let gain_loss_pct = (holding.cost_basis > 0.0)
            .then(|| (price - holding.cost_basis) / holding.cost_basis);

        let as_of = quote.timestamp.date_naive();
        let swot = self
            .swot_service
            .assess(price, as_of, &quote.history, &ctx.swot);
        let swot_text = swot.to_text();

        AnalysisResult {
            symbol: holding.symbol.clone(),
            quantity: holding.quantity,
            cost_basis: holding.cost_basis,
            price: Some(price),
            market_value: Some(price * holding.quantity),
            cost_value: holding.cost_value(),
            gain_loss: Some(gain_loss),
            gain_loss_pct,
            allocation_pct: None,
            swot,
            swot_text,
        }
    }

    fn unpriced_result(holding: &Holding) -> AnalysisResult {
        let swot = SwotSummary::unavailable(format!(
            "Data unavailable: no market data for {}",
            holding.symbol
        ));
        let swot_text = swot.to_text();

        AnalysisResult {
            symbol: holding.symbol.clone(),
            quantity: holding.quantity,
            cost_basis: holding.cost_basis,
            price: None,
            market_value: None,
            cost_value: holding.cost_value(),
            gain_loss: None,
            gain_loss_pct: None,
            allocation_pct: None,
            swot,
            swot_text,
        }
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
