use serde::{Deserialize, Serialize};

/// Direction of the latest price relative to its trailing average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Rising,
    Falling,
    Flat,
    /// Not enough history to tell
    Unknown,
}

/// Dispersion bucket of recent daily returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Volatility {
    High,
    Low,
    Unknown,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Rising => write!(f, "Rising"),
            Trend::Falling => write!(f, "Falling"),
            Trend::Flat => write!(f, "Flat"),
            Trend::Unknown => write!(f, "Unknown"),
        }
    }
}

impl std::fmt::Display for Volatility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Volatility::High => write!(f, "High"),
            Volatility::Low => write!(f, "Low"),
            Volatility::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Four-bucket qualitative summary of a stock's recent price action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwotSummary {
    pub trend: Trend,
    pub volatility: Volatility,

    /// Annualized volatility of daily returns, when computable
    pub annualized_volatility: Option<f64>,

    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,

    /// Free-form remarks (missing data, short history)
    pub notes: Vec<String>,
}

impl SwotSummary {
    /// A summary carrying only a note, used when no quote could be fetched.
    pub fn unavailable(note: impl Into<String>) -> Self {
        Self {
            trend: Trend::Unknown,
            volatility: Volatility::Unknown,
            annualized_volatility: None,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            opportunities: Vec::new(),
            threats: Vec::new(),
            notes: vec![note.into()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.strengths.is_empty()
            && self.weaknesses.is_empty()
            && self.opportunities.is_empty()
            && self.threats.is_empty()
    }

    /// Render as one `Label: text` line per entry, in S, W, O, T order,
    /// followed by notes.
    pub fn to_text(&self) -> String {
        let sections = [
            ("Strength", &self.strengths),
            ("Weakness", &self.weaknesses),
            ("Opportunity", &self.opportunities),
            ("Threat", &self.threats),
        ];

        let mut lines: Vec<String> = sections
            .iter()
            .flat_map(|(label, items)| items.iter().map(move |text| format!("{label}: {text}")))
            .collect();
        lines.extend(self.notes.iter().cloned());
        lines.join("\n")
    }
}
