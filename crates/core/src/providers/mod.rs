pub mod registry;
pub mod traits;

// Quote provider implementations
pub mod alphavantage;
#[cfg(not(target_arch = "wasm32"))]
pub mod yahoo_finance;
