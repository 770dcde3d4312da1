use chrono::{DateTime, Utc};

use super::settings::{Settings, SwotSettings};

/// Everything one analysis request needs besides holdings and quotes.
///
/// Built fresh for each request and passed down explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisContext {
    pub as_of: DateTime<Utc>,
    pub swot: SwotSettings,
}

impl AnalysisContext {
    pub fn new(as_of: DateTime<Utc>, swot: SwotSettings) -> Self {
        Self { as_of, swot }
    }

    /// Context for "now" using the portfolio's settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(Utc::now(), settings.swot.clone())
    }
}
