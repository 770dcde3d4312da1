use crate::errors::CoreError;
use crate::models::holding::{normalize_symbol, Holding};
use crate::models::portfolio::Portfolio;

/// Manages the holdings list of a portfolio.
///
/// Pure business logic, no I/O. Holdings stay sorted by symbol so that
/// adding and then removing a holding leaves the list exactly as before.
pub struct HoldingsService;

impl HoldingsService {
    pub fn new() -> Self {
        Self
    }

    /// Add a new holding. Rejects invalid input and duplicate symbols.
    pub fn add(&self, portfolio: &mut Portfolio, holding: Holding) -> Result<(), CoreError> {
        let holding = Holding::new(holding.symbol, holding.quantity, holding.cost_basis);
        Self::validate(&holding)?;

        match Self::position(&portfolio.holdings, &holding.symbol) {
            Ok(_) => Err(CoreError::ValidationError(format!(
                "{} is already in the portfolio; edit the existing holding instead",
                holding.symbol
            ))),
            Err(pos) => {
                portfolio.holdings.insert(pos, holding);
                Ok(())
            }
        }
    }

    /// Remove a holding by symbol (case-insensitive) and return it.
    pub fn remove(&self, portfolio: &mut Portfolio, symbol: &str) -> Result<Holding, CoreError> {
        let symbol = normalize_symbol(symbol);
        let idx = Self::position(&portfolio.holdings, &symbol)
            .map_err(|_| CoreError::HoldingNotFound(symbol.clone()))?;
        Ok(portfolio.holdings.remove(idx))
    }

    /// Replace quantity and cost basis of an existing holding.
    /// Nothing changes if the new values are invalid.
    pub fn update(
        &self,
        portfolio: &mut Portfolio,
        symbol: &str,
        quantity: f64,
        cost_basis: f64,
    ) -> Result<(), CoreError> {
        let updated = Holding::new(symbol, quantity, cost_basis);
        Self::validate(&updated)?;

        let idx = Self::position(&portfolio.holdings, &updated.symbol)
            .map_err(|_| CoreError::HoldingNotFound(updated.symbol.clone()))?;
        portfolio.holdings[idx] = updated;
        Ok(())
    }

    /// Re-add every holding of a portfolio that did not come through `add`
    /// (a loaded file, a caller-built `Portfolio`). Symbols are normalized
    /// and the list re-sorted; any invalid or duplicate holding rejects the
    /// whole portfolio and leaves it untouched.
    pub fn restore(&self, portfolio: &mut Portfolio) -> Result<(), CoreError> {
        let mut staged = Portfolio::default();
        for holding in &portfolio.holdings {
            self.add(&mut staged, holding.clone())?;
        }
        portfolio.holdings = staged.holdings;
        Ok(())
    }

    /// Look up a holding by symbol (case-insensitive).
    pub fn get<'a>(&self, portfolio: &'a Portfolio, symbol: &str) -> Option<&'a Holding> {
        let symbol = normalize_symbol(symbol);
        Self::position(&portfolio.holdings, &symbol)
            .ok()
            .map(|idx| &portfolio.holdings[idx])
    }

    /// All holdings, ordered by symbol.
    pub fn list<'a>(&self, portfolio: &'a Portfolio) -> &'a [Holding] {
        &portfolio.holdings
    }

    /// Rules:
    /// - Symbol must be non-empty and contain no whitespace
    /// - Quantity and cost basis must be finite and non-negative
    pub fn validate(holding: &Holding) -> Result<(), CoreError> {
        if holding.symbol.is_empty() {
            return Err(CoreError::ValidationError(
                "Symbol must not be empty".into(),
            ));
        }
        if holding.symbol.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(CoreError::ValidationError(format!(
                "Symbol '{}' must not contain whitespace",
                holding.symbol
            )));
        }
        if !holding.quantity.is_finite() || holding.quantity < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Quantity for {} must be a non-negative number (got {})",
                holding.symbol, holding.quantity
            )));
        }
        if !holding.cost_basis.is_finite() || holding.cost_basis < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Cost basis for {} must be a non-negative number (got {})",
                holding.symbol, holding.cost_basis
            )));
        }
        Ok(())
    }

    fn position(holdings: &[Holding], symbol: &str) -> Result<usize, usize> {
        holdings.binary_search_by(|h| h.symbol.as_str().cmp(symbol))
    }
}

impl Default for HoldingsService {
    fn default() -> Self {
        Self::new()
    }
}
