pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use log::{debug, info, warn};
use std::collections::HashMap;

use errors::CoreError;
use models::{
    analytics::PortfolioSummary,
    context::AnalysisContext,
    holding::Holding,
    portfolio::Portfolio,
    quote::Quote,
    settings::{Settings, SwotSettings},
};
use providers::registry::QuoteProviderRegistry;
use services::{
    analytics_service::AnalyticsService, holdings_service::HoldingsService,
    market_data_service::MarketDataService,
};
use storage::manager::StorageManager;

/// Main entry point for the Stock Dashboard core library.
/// Holds the portfolio state and all services needed to operate on it.
///
/// One request at a time: every call runs to completion before the next.
#[must_use]
pub struct StockDashboard {
    portfolio: Portfolio,
    holdings_service: HoldingsService,
    market_data_service: MarketDataService,
    analytics_service: AnalyticsService,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
    /// Providers were supplied by the caller; API key changes leave them alone.
    custom_providers: bool,
}

impl std::fmt::Debug for StockDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockDashboard")
            .field("holdings", &self.portfolio.holdings.len())
            .field("providers", &self.market_data_service.provider_names())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl StockDashboard {
    /// Create a brand new empty portfolio with default settings.
    pub fn create_new() -> Self {
        let portfolio = Portfolio::default();
        let registry = QuoteProviderRegistry::new_with_defaults(&portfolio.settings.api_keys);
        Self::build_with(portfolio, registry, false)
    }

    /// Wrap an existing portfolio with a caller-supplied provider registry.
    ///
    /// Holdings are normalized and validated as if added one by one; an
    /// invalid or duplicate holding, or invalid settings, is a
    /// `ValidationError`. The registry is kept as given, even when API keys
    /// change later.
    pub fn with_registry(
        portfolio: Portfolio,
        registry: QuoteProviderRegistry,
    ) -> Result<Self, CoreError> {
        let portfolio = Self::checked(portfolio)?;
        Ok(Self::build_with(portfolio, registry, true))
    }

    /// Load a portfolio from bytes produced by `save_to_bytes`.
    ///
    /// The loaded holdings and settings go through the same validation as
    /// `add_holding` and the settings setters.
    pub fn load_from_bytes(data: &[u8]) -> Result<Self, CoreError> {
        let portfolio = StorageManager::load_from_bytes(data)?;
        Self::build(portfolio)
    }

    /// Save the current portfolio to bytes.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, CoreError> {
        let bytes = StorageManager::save_to_bytes(&self.portfolio)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Load from a file on disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str) -> Result<Self, CoreError> {
        let portfolio = StorageManager::load_from_file(path)?;
        Self::build(portfolio)
    }

    /// Save to a file on disk (native only, not WASM).
    /// Clears the unsaved-changes flag on success.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(&mut self, path: &str) -> Result<(), CoreError> {
        StorageManager::save_to_file(&self.portfolio, path)?;
        self.dirty = false;
        Ok(())
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Add a holding. Fails with `ValidationError` on bad input or a
    /// symbol that is already held.
    pub fn add_holding(
        &mut self,
        symbol: &str,
        quantity: f64,
        cost_basis: f64,
    ) -> Result<(), CoreError> {
        self.holdings_service
            .add(&mut self.portfolio, Holding::new(symbol, quantity, cost_basis))?;
        self.dirty = true;
        Ok(())
    }

    /// Change quantity and cost basis of an existing holding.
    pub fn update_holding(
        &mut self,
        symbol: &str,
        quantity: f64,
        cost_basis: f64,
    ) -> Result<(), CoreError> {
        self.holdings_service
            .update(&mut self.portfolio, symbol, quantity, cost_basis)?;
        self.dirty = true;
        Ok(())
    }

    /// Remove a holding by symbol and return it.
    pub fn remove_holding(&mut self, symbol: &str) -> Result<Holding, CoreError> {
        let removed = self.holdings_service.remove(&mut self.portfolio, symbol)?;
        self.dirty = true;
        Ok(removed)
    }

    /// Get a single holding by symbol (case-insensitive).
    #[must_use]
    pub fn get_holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings_service.get(&self.portfolio, symbol)
    }

    /// All holdings, ordered by symbol.
    #[must_use]
    pub fn list_holdings(&self) -> &[Holding] {
        self.holdings_service.list(&self.portfolio)
    }

    #[must_use]
    pub fn holding_count(&self) -> usize {
        self.portfolio.holdings.len()
    }

    // ── Market data & analysis ──────────────────────────────────────

    /// Fetch a quote (latest price + history) for one symbol.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        let today = chrono::Utc::now().date_naive();
        self.market_data_service
            .fetch_quote(symbol, today, self.portfolio.settings.history_days)
            .await
    }

    /// Fetch quotes for every holding and analyze the whole portfolio.
    ///
    /// Symbols whose quote cannot be fetched are reported in
    /// `PortfolioSummary::unavailable` and analyzed as not-applicable.
    pub async fn analyze(&self) -> Result<PortfolioSummary, CoreError> {
        let ctx = AnalysisContext::from_settings(&self.portfolio.settings);
        let symbols: Vec<String> = self
            .portfolio
            .holdings
            .iter()
            .map(|h| h.symbol.clone())
            .collect();

        let batch = self
            .market_data_service
            .fetch_quotes(
                &symbols,
                ctx.as_of.date_naive(),
                self.portfolio.settings.history_days,
            )
            .await;

        if !batch.unavailable.is_empty() {
            warn!(
                "{} of {} symbols have no market data",
                batch.unavailable.len(),
                symbols.len()
            );
        }

        let summary = self.analytics_service.summarize(
            &self.portfolio.holdings,
            &batch.quotes,
            batch.unavailable,
            &ctx,
        );
        info!(
            "Analyzed {} holdings ({} priced), total gain/loss {:.2}",
            summary.total_holdings, summary.priced_holdings, summary.total_gain_loss
        );
        Ok(summary)
    }

    /// Analyze against quotes the caller already has (offline, replay).
    #[must_use]
    pub fn analyze_with_quotes(
        &self,
        quotes: &HashMap<String, Quote>,
        ctx: &AnalysisContext,
    ) -> PortfolioSummary {
        let unavailable = self
            .portfolio
            .holdings
            .iter()
            .filter(|h| !quotes.contains_key(&h.symbol))
            .map(|h| models::analytics::UnavailableSymbol {
                symbol: h.symbol.clone(),
                reason: "no quote supplied".into(),
            })
            .collect();

        self.analytics_service
            .summarize(&self.portfolio.holdings, quotes, unavailable, ctx)
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Get current settings.
    #[must_use]
    pub fn get_settings(&self) -> &Settings {
        &self.portfolio.settings
    }

    /// Set an API key for a provider (e.g., "alphavantage").
    /// Rebuilds the default provider registry so the new key takes effect
    /// immediately. Providers passed to `with_registry` are kept.
    pub fn set_api_key(&mut self, provider: String, key: String) {
        self.portfolio.settings.api_keys.insert(provider, key);
        self.rebuild_registry();
        self.dirty = true;
    }

    /// Remove an API key for a provider.
    /// Rebuilds the default provider registry so the removal takes effect
    /// immediately. Providers passed to `with_registry` are kept.
    pub fn remove_api_key(&mut self, provider: &str) -> bool {
        let removed = self.portfolio.settings.api_keys.remove(provider).is_some();
        if removed {
            self.rebuild_registry();
            self.dirty = true;
        }
        removed
    }

    /// Replace the SWOT cutoffs. Invalid settings are rejected unchanged.
    pub fn set_swot_settings(&mut self, swot: SwotSettings) -> Result<(), CoreError> {
        swot.validate()?;
        self.portfolio.settings.swot = swot;
        self.dirty = true;
        Ok(())
    }

    /// Set how many days of history each quote carries (1..=3650).
    pub fn set_history_days(&mut self, days: u32) -> Result<(), CoreError> {
        let settings = Settings {
            history_days: days,
            ..self.portfolio.settings.clone()
        };
        settings.validate()?;
        self.portfolio.settings.history_days = days;
        self.dirty = true;
        Ok(())
    }

    // ── Provider Availability ───────────────────────────────────────

    /// Check if at least one quote provider is configured.
    #[must_use]
    pub fn is_provider_available(&self) -> bool {
        self.market_data_service.has_provider()
    }

    /// Names of configured providers in fallback order.
    #[must_use]
    pub fn get_provider_names(&self) -> Vec<String> {
        self.market_data_service.provider_names()
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export all holdings as a JSON array.
    pub fn export_holdings_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.portfolio.holdings).map_err(|e| {
            CoreError::Serialization(format!("Failed to serialize holdings to JSON: {e}"))
        })
    }

    /// Export all holdings as CSV. Columns: symbol, quantity, cost_basis
    #[must_use]
    pub fn export_holdings_to_csv(&self) -> String {
        let mut csv = String::from("symbol,quantity,cost_basis\n");
        for h in &self.portfolio.holdings {
            // Symbols cannot contain whitespace but may contain commas or quotes
            let symbol = if h.symbol.contains(',') || h.symbol.contains('"') {
                format!("\"{}\"", h.symbol.replace('"', "\"\""))
            } else {
                h.symbol.clone()
            };
            csv.push_str(&format!("{},{},{}\n", symbol, h.quantity, h.cost_basis));
        }
        csv
    }

    /// Import holdings from a JSON array. All holdings are validated first;
    /// if any fails, none are added. Returns the number imported.
    pub fn import_holdings_from_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let holdings: Vec<Holding> = serde_json::from_str(json)?;
        let mut staged = self.portfolio.clone();

        for holding in &holdings {
            self.holdings_service.add(&mut staged, holding.clone())?;
        }

        self.portfolio = staged;
        if !holdings.is_empty() {
            self.dirty = true;
        }
        Ok(holdings.len())
    }

    /// The full portfolio (holdings + settings) as pretty JSON.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.portfolio)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize portfolio: {e}")))
    }

    /// Returns `true` if the portfolio has been modified since the last save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(portfolio: Portfolio) -> Result<Self, CoreError> {
        let portfolio = Self::checked(portfolio)?;
        let registry = QuoteProviderRegistry::new_with_defaults(&portfolio.settings.api_keys);
        Ok(Self::build_with(portfolio, registry, false))
    }

    fn build_with(
        portfolio: Portfolio,
        registry: QuoteProviderRegistry,
        custom_providers: bool,
    ) -> Self {
        Self {
            portfolio,
            holdings_service: HoldingsService::new(),
            market_data_service: MarketDataService::new(registry),
            analytics_service: AnalyticsService::new(),
            dirty: false,
            custom_providers,
        }
    }

    /// Portfolios from outside (files, callers) hold the same invariants as
    /// ones built through `add_holding`.
    fn checked(mut portfolio: Portfolio) -> Result<Portfolio, CoreError> {
        portfolio.settings.validate()?;
        HoldingsService::new().restore(&mut portfolio)?;
        Ok(portfolio)
    }

    fn rebuild_registry(&mut self) {
        if self.custom_providers {
            debug!("Keeping caller-supplied providers after API key change");
            return;
        }
        let registry = QuoteProviderRegistry::new_with_defaults(&self.portfolio.settings.api_keys);
        self.market_data_service = MarketDataService::new(registry);
    }
}
