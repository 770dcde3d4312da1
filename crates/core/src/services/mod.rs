pub mod analytics_service;
pub mod holdings_service;
pub mod market_data_service;
pub mod swot_service;
