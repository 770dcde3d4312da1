pub mod analytics;
pub mod context;
pub mod holding;
pub mod portfolio;
pub mod quote;
pub mod settings;
pub mod swot;
