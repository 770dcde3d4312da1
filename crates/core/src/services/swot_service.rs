use chrono::NaiveDate;

use crate::models::quote::PricePoint;
use crate::models::settings::SwotSettings;
use crate::models::swot::{SwotSummary, Trend, Volatility};

/// Trading days per year, used to annualize daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

pub const UPWARD_MOMENTUM: &str = "upward momentum";
pub const DOWNWARD_MOMENTUM: &str = "downward momentum";
pub const VOLATILITY: &str = "volatility";
pub const STABILITY: &str = "stability";
pub const POSITIVE_TECHNICAL_TREND: &str = "positive technical trend";
pub const NEGATIVE_TECHNICAL_TREND: &str = "negative technical trend";
pub const INSUFFICIENT_HISTORY: &str = "Note: insufficient price history";

/// Derives a SWOT summary from the latest price and its recent history.
///
/// Pure: the same inputs always give the same summary.
pub struct SwotService;

impl SwotService {
    pub fn new() -> Self {
        Self
    }

    /// Assess one stock whose latest `price` was quoted on `as_of`.
    ///
    /// History points dated `as_of` or later are ignored: that bar's close
    /// is `price` itself and must not be counted twice.
    ///
    /// - Trend: `price` vs. the mean of the last `trend_window` closes.
    /// - Technical trend: `price`, the short and the long moving average
    ///   stacked in the same direction.
    /// - Dispersion: annualized sample std-dev of daily returns over the
    ///   trailing window, `price` included as the newest observation.
    pub fn assess(
        &self,
        price: f64,
        as_of: NaiveDate,
        history: &[PricePoint],
        settings: &SwotSettings,
    ) -> SwotSummary {
        let closes: Vec<f64> = history
            .iter()
            .filter(|p| p.date < as_of)
            .map(|p| p.price)
            .collect();
        let short = tail(&closes, settings.trend_window);

        let trend = Self::trend(price, short, settings.trend_band);
        let annualized_volatility = Self::annualized_volatility(price, short);
        let volatility = match annualized_volatility {
            Some(v) if v > settings.volatility_threshold => Volatility::High,
            Some(_) => Volatility::Low,
            None => Volatility::Unknown,
        };

        let mut summary = SwotSummary {
            trend,
            volatility,
            annualized_volatility,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            opportunities: Vec::new(),
            threats: Vec::new(),
            notes: Vec::new(),
        };

        match trend {
            Trend::Rising => summary.strengths.push(UPWARD_MOMENTUM.into()),
            Trend::Falling => summary.weaknesses.push(DOWNWARD_MOMENTUM.into()),
            Trend::Flat | Trend::Unknown => {}
        }

        if closes.len() >= settings.long_window {
            let sma_short = mean(short);
            let sma_long = mean(tail(&closes, settings.long_window));
            if price > sma_short && sma_short > sma_long {
                summary.strengths.push(POSITIVE_TECHNICAL_TREND.into());
            } else if price < sma_short && sma_short < sma_long {
                summary.weaknesses.push(NEGATIVE_TECHNICAL_TREND.into());
            }
        }

        match volatility {
            Volatility::High => summary.threats.push(VOLATILITY.into()),
            Volatility::Low => summary.opportunities.push(STABILITY.into()),
            Volatility::Unknown => {}
        }

        if trend == Trend::Unknown || volatility == Volatility::Unknown {
            summary.notes.push(INSUFFICIENT_HISTORY.into());
        }

        summary
    }

    fn trend(price: f64, window: &[f64], band: f64) -> Trend {
        if window.len() < 2 {
            return Trend::Unknown;
        }
        let avg = mean(window);
        if price > avg * (1.0 + band) {
            Trend::Rising
        } else if price < avg * (1.0 - band) {
            Trend::Falling
        } else {
            Trend::Flat
        }
    }

    fn annualized_volatility(price: f64, window: &[f64]) -> Option<f64> {
        let mut series = window.to_vec();
        series.push(price);

        let returns: Vec<f64> = series
            .windows(2)
            .filter(|w| w[0] > 0.0)
            .map(|w| w[1] / w[0] - 1.0)
            .collect();

        sample_std_dev(&returns).map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt())
    }
}

impl Default for SwotService {
    fn default() -> Self {
        Self::new()
    }
}

/// Last `n` elements (or all of them if shorter).
fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1); `None` below two values.
fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}
