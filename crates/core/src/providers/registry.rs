use std::collections::HashMap;

use super::alphavantage::AlphaVantageProvider;
use super::traits::QuoteProvider;
#[cfg(not(target_arch = "wasm32"))]
use super::yahoo_finance::YahooFinanceProvider;

/// API key name under which the Alpha Vantage key is stored in settings.
pub const ALPHAVANTAGE_KEY: &str = "alphavantage";

/// Ordered list of quote providers. Earlier providers are tried first;
/// later ones act as fallbacks.
pub struct QuoteProviderRegistry {
    providers: Vec<Box<dyn QuoteProvider>>,
}

impl QuoteProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with all default providers pre-configured.
    pub fn new_with_defaults(api_keys: &HashMap<String, String>) -> Self {
        let mut registry = Self::new();

        // Yahoo Finance: no API key needed (primary). Native only.
        #[cfg(not(target_arch = "wasm32"))]
        {
            match YahooFinanceProvider::new() {
                Ok(yahoo) => registry.register(Box::new(yahoo)),
                Err(e) => log::warn!("Yahoo Finance provider unavailable: {e}"),
            }
        }

        // Alpha Vantage: requires API key (fallback)
        if let Some(key) = api_keys.get(ALPHAVANTAGE_KEY) {
            if !key.trim().is_empty() {
                registry.register(Box::new(AlphaVantageProvider::new(key.clone())));
            }
        }

        registry
    }

    /// Register a new provider at the lowest priority.
    pub fn register(&mut self, provider: Box<dyn QuoteProvider>) {
        self.providers.push(provider);
    }

    /// All providers in priority order.
    pub fn providers(&self) -> Vec<&dyn QuoteProvider> {
        self.providers.iter().map(|p| p.as_ref()).collect()
    }

    /// Provider names in priority order.
    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }
}

impl Default for QuoteProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
