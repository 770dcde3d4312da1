// ═══════════════════════════════════════════════════════════════════
// Integration Tests: StockDashboard facade end to end
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use std::collections::HashMap;

use stock_dashboard_core::errors::CoreError;
use stock_dashboard_core::models::context::AnalysisContext;
use stock_dashboard_core::models::holding::Holding;
use stock_dashboard_core::models::portfolio::Portfolio;
use stock_dashboard_core::models::quote::{PricePoint, Quote};
use stock_dashboard_core::models::settings::SwotSettings;
use stock_dashboard_core::providers::registry::QuoteProviderRegistry;
use stock_dashboard_core::providers::traits::QuoteProvider;
use stock_dashboard_core::storage::manager::StorageManager;
use stock_dashboard_core::StockDashboard;

// ═══════════════════════════════════════════════════════════════════
// Mock Quote Provider (for testing without real API calls)
// ═══════════════════════════════════════════════════════════════════

/// Quotes fixed prices; history rises 0.2% a day up to the current price.
struct MockQuoteProvider {
    prices: HashMap<String, f64>,
}

impl MockQuoteProvider {
    fn new() -> Self {
        let mut prices = HashMap::new();
        prices.insert("AAPL".to_string(), 150.0);
        prices.insert("MSFT".to_string(), 330.0);
        prices.insert("TSLA".to_string(), 200.0);
        Self { prices }
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn name(&self) -> &str {
        "MockProvider"
    }

    async fn get_current_price(&self, symbol: &str) -> Result<f64, CoreError> {
        self.prices.get(symbol).copied().ok_or_else(|| CoreError::Api {
            provider: "MockProvider".into(),
            message: format!("Unknown symbol {symbol}"),
        })
    }

    async fn get_price_range(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let price = self.prices.get(symbol).copied().unwrap_or(0.0);
        let start = std::cmp::max(from, to - Duration::days(29));
        let days = (to - start).num_days() as i32;
        Ok(start
            .iter_days()
            .take_while(|d| *d <= to)
            .enumerate()
            .map(|(i, date)| PricePoint {
                date,
                price: price / 1.002_f64.powi(days - i as i32 + 1),
            })
            .collect())
    }
}

fn dashboard() -> StockDashboard {
    let mut registry = QuoteProviderRegistry::new();
    registry.register(Box::new(MockQuoteProvider::new()));
    StockDashboard::with_registry(Portfolio::default(), registry).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Holdings through the facade
// ═══════════════════════════════════════════════════════════════════

mod holdings {
    use super::*;

    #[test]
    fn new_dashboard_is_clean_and_empty() {
        let d = dashboard();
        assert_eq!(d.holding_count(), 0);
        assert!(!d.has_unsaved_changes());
    }

    #[test]
    fn add_update_remove() {
        let mut d = dashboard();
        d.add_holding("aapl", 10.0, 100.0).unwrap();
        assert!(d.has_unsaved_changes());
        assert_eq!(d.get_holding("AAPL").unwrap().quantity, 10.0);

        d.update_holding("AAPL", 15.0, 110.0).unwrap();
        assert_eq!(d.get_holding("aapl").unwrap().cost_basis, 110.0);

        let removed = d.remove_holding("AAPL").unwrap();
        assert_eq!(removed.quantity, 15.0);
        assert_eq!(d.holding_count(), 0);
    }

    #[test]
    fn invalid_input_is_rejected_without_side_effects() {
        let mut d = dashboard();
        assert!(d.add_holding("", 1.0, 1.0).unwrap_err().is_validation());
        assert!(d.add_holding("AAPL", -1.0, 1.0).unwrap_err().is_validation());
        assert_eq!(d.holding_count(), 0);
        assert!(!d.has_unsaved_changes());
    }

    #[test]
    fn list_is_sorted_by_symbol() {
        let mut d = dashboard();
        d.add_holding("TSLA", 1.0, 1.0).unwrap();
        d.add_holding("AAPL", 1.0, 1.0).unwrap();
        d.add_holding("MSFT", 1.0, 1.0).unwrap();
        let symbols: Vec<&str> = d.list_holdings().iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "TSLA"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Analysis
// ═══════════════════════════════════════════════════════════════════

mod analysis {
    use super::*;

    #[tokio::test]
    async fn empty_portfolio_gives_empty_summary() {
        let summary = dashboard().analyze().await.unwrap();
        assert!(summary.results.is_empty());
        assert!(summary.unavailable.is_empty());
        assert_eq!(summary.total_gain_loss, 0.0);
        assert_eq!(summary.total_gain_loss_pct, None);
    }

    #[tokio::test]
    async fn aapl_example_end_to_end() {
        let mut d = dashboard();
        d.add_holding("AAPL", 10.0, 100.0).unwrap();

        let summary = d.analyze().await.unwrap();
        assert_eq!(summary.results.len(), 1);
        let r = &summary.results[0];
        assert_eq!(r.symbol, "AAPL");
        assert_eq!(r.price, Some(150.0));
        assert_eq!(r.gain_loss, Some(500.0));
        assert_eq!(r.gain_loss_pct, Some(0.5));
        assert_eq!(summary.total_gain_loss, 500.0);
    }

    #[tokio::test]
    async fn rising_history_yields_upward_momentum() {
        let mut d = dashboard();
        d.add_holding("MSFT", 1.0, 300.0).unwrap();

        let summary = d.analyze().await.unwrap();
        let text = &summary.results[0].swot_text;
        assert!(text.contains("Strength: upward momentum"), "got: {text}");
        assert!(text.contains("Opportunity: stability"), "got: {text}");
    }

    #[tokio::test]
    async fn unknown_symbol_does_not_block_others() {
        let mut d = dashboard();
        d.add_holding("AAPL", 10.0, 100.0).unwrap();
        d.add_holding("NOPE", 3.0, 50.0).unwrap();
        d.add_holding("TSLA", 2.0, 250.0).unwrap();

        let summary = d.analyze().await.unwrap();
        assert_eq!(summary.total_holdings, 3);
        assert_eq!(summary.priced_holdings, 2);
        assert_eq!(summary.total_gain_loss, 400.0);

        let nope = summary.results.iter().find(|r| r.symbol == "NOPE").unwrap();
        assert_eq!(nope.gain_loss, None);
        assert!(nope.swot_text.starts_with("Data unavailable"));

        assert_eq!(summary.unavailable.len(), 1);
        assert_eq!(summary.unavailable[0].symbol, "NOPE");
        assert!(summary.unavailable[0].reason.contains("Unknown symbol NOPE"));
    }

    #[tokio::test]
    async fn zero_cost_basis_is_not_a_fault() {
        let mut d = dashboard();
        d.add_holding("AAPL", 2.0, 0.0).unwrap();

        let summary = d.analyze().await.unwrap();
        assert_eq!(summary.results[0].gain_loss, Some(300.0));
        assert_eq!(summary.results[0].gain_loss_pct, None);
        assert_eq!(summary.total_gain_loss_pct, None);
    }

    #[tokio::test]
    async fn fetch_quote_through_facade() {
        let d = dashboard();
        let q = d.fetch_quote("tsla").await.unwrap();
        assert_eq!(q.symbol, "TSLA");
        assert_eq!(q.price, 200.0);
        assert_eq!(q.history.len(), 30);

        let err = d.fetch_quote("NOPE").await.unwrap_err();
        assert!(matches!(err, CoreError::DataUnavailable { .. }));
    }

    #[tokio::test]
    async fn no_provider_marks_everything_unavailable() {
        let mut d =
            StockDashboard::with_registry(Portfolio::default(), QuoteProviderRegistry::new())
                .unwrap();
        d.add_holding("AAPL", 1.0, 1.0).unwrap();
        assert!(!d.is_provider_available());

        let summary = d.analyze().await.unwrap();
        assert_eq!(summary.priced_holdings, 0);
        assert_eq!(summary.unavailable.len(), 1);
    }

    #[test]
    fn analyze_with_supplied_quotes() {
        let mut d = dashboard();
        d.add_holding("AAPL", 10.0, 100.0).unwrap();
        d.add_holding("MSFT", 1.0, 300.0).unwrap();

        let mut quotes = HashMap::new();
        quotes.insert("AAPL".to_string(), Quote::new("AAPL", 150.0, Utc::now(), Vec::new()));
        let ctx = AnalysisContext::new(Utc::now(), SwotSettings::default());

        let summary = d.analyze_with_quotes(&quotes, &ctx);
        assert_eq!(summary.priced_holdings, 1);
        assert_eq!(summary.total_gain_loss, 500.0);
        assert_eq!(summary.unavailable[0].symbol, "MSFT");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn swot_settings_are_validated() {
        let mut d = dashboard();
        let bad = SwotSettings { trend_window: 0, ..SwotSettings::default() };
        assert!(d.set_swot_settings(bad).is_err());
        assert_eq!(d.get_settings().swot, SwotSettings::default());
        assert!(!d.has_unsaved_changes());

        let good = SwotSettings { trend_window: 10, ..SwotSettings::default() };
        d.set_swot_settings(good.clone()).unwrap();
        assert_eq!(d.get_settings().swot, good);
        assert!(d.has_unsaved_changes());
    }

    #[test]
    fn history_days_bounds() {
        let mut d = dashboard();
        assert!(d.set_history_days(0).is_err());
        assert!(d.set_history_days(3651).is_err());
        d.set_history_days(90).unwrap();
        assert_eq!(d.get_settings().history_days, 90);
    }

    #[test]
    fn api_keys_rebuild_providers() {
        let mut d = StockDashboard::create_new();
        assert_eq!(d.get_provider_names(), vec!["Yahoo Finance"]);

        d.set_api_key("alphavantage".into(), "demo".into());
        assert_eq!(d.get_provider_names(), vec!["Yahoo Finance", "Alpha Vantage"]);

        assert!(d.remove_api_key("alphavantage"));
        assert!(!d.remove_api_key("alphavantage"));
        assert_eq!(d.get_provider_names(), vec!["Yahoo Finance"]);
    }
    #[test]
    fn api_keys_keep_caller_supplied_providers() {
        let mut d = dashboard();
        d.set_api_key("alphavantage".into(), "demo".into());
        assert_eq!(d.get_provider_names(), vec!["MockProvider"]);
        assert_eq!(d.get_settings().api_keys["alphavantage"], "demo");

        assert!(d.remove_api_key("alphavantage"));
        assert_eq!(d.get_provider_names(), vec!["MockProvider"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Persistence, export and import
// ═══════════════════════════════════════════════════════════════════

mod persistence {
    use super::*;

    #[test]
    fn bytes_round_trip_clears_dirty_flag() {
        let mut d = dashboard();
        d.add_holding("AAPL", 10.0, 100.0).unwrap();
        d.set_history_days(120).unwrap();

        let bytes = d.save_to_bytes().unwrap();
        assert!(!d.has_unsaved_changes());

        let loaded = StockDashboard::load_from_bytes(&bytes).unwrap();
        assert_eq!(loaded.list_holdings(), d.list_holdings());
        assert_eq!(loaded.get_settings().history_days, 120);
        assert!(!loaded.has_unsaved_changes());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.stkd");
        let path_str = path.to_str().unwrap();

        let mut d = dashboard();
        d.add_holding("MSFT", 2.0, 300.0).unwrap();
        d.save_to_file(path_str).unwrap();

        let loaded = StockDashboard::load_from_file(path_str).unwrap();
        assert_eq!(loaded.get_holding("MSFT").unwrap().quantity, 2.0);
    }

    #[test]
    fn csv_export() {
        let mut d = dashboard();
        d.add_holding("MSFT", 2.0, 300.5).unwrap();
        d.add_holding("AAPL", 10.0, 100.0).unwrap();
        assert_eq!(
            d.export_holdings_to_csv(),
            "symbol,quantity,cost_basis\nAAPL,10,100\nMSFT,2,300.5\n"
        );
    }

    #[test]
    fn json_export_then_import() {
        let mut source = dashboard();
        source.add_holding("AAPL", 10.0, 100.0).unwrap();
        source.add_holding("TSLA", 1.0, 250.0).unwrap();
        let json = source.export_holdings_to_json().unwrap();

        let mut target = dashboard();
        assert_eq!(target.import_holdings_from_json(&json).unwrap(), 2);
        assert_eq!(target.list_holdings(), source.list_holdings());
        assert!(target.has_unsaved_changes());
    }

    #[test]
    fn import_is_all_or_nothing() {
        let mut d = dashboard();
        d.add_holding("AAPL", 1.0, 1.0).unwrap();
        let json = r#"[
            {"symbol": "MSFT", "quantity": 1.0, "cost_basis": 300.0},
            {"symbol": "aapl", "quantity": 2.0, "cost_basis": 2.0}
        ]"#;

        let err = d.import_holdings_from_json(json).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(d.holding_count(), 1);
        assert!(d.get_holding("MSFT").is_none());
    }

    #[test]
    fn import_rejects_malformed_json() {
        let mut d = dashboard();
        assert!(matches!(
            d.import_holdings_from_json("{not json"),
            Err(CoreError::Deserialization(_))
        ));
    }

    #[test]
    fn to_json_contains_holdings_and_settings() {
        let mut d = dashboard();
        d.add_holding("AAPL", 1.0, 1.0).unwrap();
        let json = d.to_json().unwrap();
        assert!(json.contains("\"AAPL\""));
        assert!(json.contains("history_days"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Portfolios from outside: crafted files and caller-built portfolios
// ═══════════════════════════════════════════════════════════════════

mod untrusted_input {
    use super::*;

    fn holding(symbol: &str, quantity: f64, cost_basis: f64) -> Holding {
        Holding { symbol: symbol.into(), quantity, cost_basis }
    }

    fn crafted_bytes(portfolio: &Portfolio) -> Vec<u8> {
        StorageManager::save_to_bytes(portfolio).unwrap()
    }

    fn mock_registry() -> QuoteProviderRegistry {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(Box::new(MockQuoteProvider::new()));
        registry
    }

    #[test]
    fn lowercase_symbol_in_file_is_normalized() {
        let portfolio = Portfolio {
            holdings: vec![holding("msft", 1.0, 10.0), holding("aapl", 10.0, 100.0)],
            ..Portfolio::default()
        };
        let mut d = StockDashboard::load_from_bytes(&crafted_bytes(&portfolio)).unwrap();

        let symbols: Vec<&str> = d.list_holdings().iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(d.get_holding("AAPL").unwrap().quantity, 10.0);
        assert!(d.remove_holding("aapl").is_ok());
    }

    #[test]
    fn negative_quantity_in_file_is_rejected() {
        let portfolio = Portfolio {
            holdings: vec![holding("AAPL", -10.0, 100.0)],
            ..Portfolio::default()
        };
        let err = StockDashboard::load_from_bytes(&crafted_bytes(&portfolio)).unwrap_err();
        assert!(err.is_validation(), "unexpected error: {err}");
    }

    #[test]
    fn duplicate_symbol_in_file_is_rejected() {
        let portfolio = Portfolio {
            holdings: vec![
                holding("MSFT", 1.0, 10.0),
                holding("MSFT", 1.0, 10.0),
                holding("aapl", 1.0, 10.0),
            ],
            ..Portfolio::default()
        };
        let err = StockDashboard::load_from_bytes(&crafted_bytes(&portfolio)).unwrap_err();
        assert!(err.is_validation(), "unexpected error: {err}");
    }

    #[test]
    fn invalid_settings_in_file_are_rejected() {
        let mut portfolio = Portfolio::default();
        portfolio.settings.history_days = 0;
        let err = StockDashboard::load_from_bytes(&crafted_bytes(&portfolio)).unwrap_err();
        assert!(err.is_validation());

        let mut portfolio = Portfolio::default();
        portfolio.settings.swot.long_window = 5;
        let err = StockDashboard::load_from_bytes(&crafted_bytes(&portfolio)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn crafted_file_on_disk_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crafted.stkd");
        let path_str = path.to_str().unwrap();

        let portfolio = Portfolio {
            holdings: vec![holding("AAPL", 1.0, f64::NAN)],
            ..Portfolio::default()
        };
        StorageManager::save_to_file(&portfolio, path_str).unwrap();

        let err = StockDashboard::load_from_file(path_str).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn with_registry_validates_holdings() {
        let portfolio = Portfolio {
            holdings: vec![
                holding("aapl", -10.0, 100.0),
                holding("MSFT", 1.0, 10.0),
                holding("MSFT", 1.0, 10.0),
            ],
            ..Portfolio::default()
        };
        let err = StockDashboard::with_registry(portfolio, mock_registry()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn with_registry_totals_count_each_symbol_once() {
        let portfolio = Portfolio {
            holdings: vec![holding("msft", 1.0, 310.0), holding("aapl", 10.0, 100.0)],
            ..Portfolio::default()
        };
        let d = StockDashboard::with_registry(portfolio, mock_registry()).unwrap();

        let mut quotes = HashMap::new();
        quotes.insert("AAPL".to_string(), Quote::new("AAPL", 150.0, Utc::now(), Vec::new()));
        quotes.insert("MSFT".to_string(), Quote::new("MSFT", 330.0, Utc::now(), Vec::new()));
        let ctx = AnalysisContext::new(Utc::now(), SwotSettings::default());

        let summary = d.analyze_with_quotes(&quotes, &ctx);
        assert_eq!(summary.priced_holdings, 2);
        assert_eq!(summary.total_gain_loss, 520.0);
        assert!(summary.unavailable.is_empty());
    }
}
