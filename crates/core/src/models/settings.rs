use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::CoreError;

/// Default history lookback for quotes (one year, as the dashboard charts).
pub const DEFAULT_HISTORY_DAYS: u32 = 365;

/// Upper bound for the history lookback (10 years).
pub const MAX_HISTORY_DAYS: u32 = 3650;

/// User-configurable settings, stored inside the saved portfolio file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "alphavantage").
    pub api_keys: HashMap<String, String>,

    /// How many calendar days of history to fetch with each quote.
    pub history_days: u32,

    /// Heuristic cutoffs for SWOT generation.
    pub swot: SwotSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_keys: HashMap::new(),
            history_days: DEFAULT_HISTORY_DAYS,
            swot: SwotSettings::default(),
        }
    }
}

impl Settings {
    /// Checks the history lookback range and the SWOT cutoffs.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.history_days == 0 || self.history_days > MAX_HISTORY_DAYS {
            return Err(CoreError::ValidationError(format!(
                "History lookback of {} days must be between 1 and {MAX_HISTORY_DAYS}",
                self.history_days
            )));
        }
        self.swot.validate()
    }
}

/// Cutoffs used by the SWOT heuristics.
///
/// The SWOT labels are what callers rely on; these numbers only decide
/// which label a given price series earns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwotSettings {
    /// Number of trailing closes used for the short moving average and
    /// for the volatility estimate.
    pub trend_window: usize,

    /// Number of trailing closes for the long moving average.
    pub long_window: usize,

    /// Relative distance from the short average that still counts as flat
    /// (0.01 = 1%).
    pub trend_band: f64,

    /// Annualized volatility above which a stock is flagged as a threat.
    pub volatility_threshold: f64,
}

impl Default for SwotSettings {
    fn default() -> Self {
        Self {
            trend_window: 20,
            long_window: 50,
            trend_band: 0.01,
            volatility_threshold: 0.30,
        }
    }
}

impl SwotSettings {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.trend_window < 2 {
            return Err(CoreError::ValidationError(format!(
                "SWOT trend window must be at least 2 (got {})",
                self.trend_window
            )));
        }
        if self.long_window < self.trend_window {
            return Err(CoreError::ValidationError(format!(
                "SWOT long window ({}) must not be shorter than the trend window ({})",
                self.long_window, self.trend_window
            )));
        }
        if !self.trend_band.is_finite() || self.trend_band < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "SWOT trend band must be finite and non-negative (got {})",
                self.trend_band
            )));
        }
        if !self.volatility_threshold.is_finite() || self.volatility_threshold < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "SWOT volatility threshold must be finite and non-negative (got {})",
                self.volatility_threshold
            )));
        }
        Ok(())
    }
}
