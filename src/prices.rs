// 💹 Price Source - per-share quote capability
//
// The dashboard core consumes prices through this trait; it never talks to a
// finance endpoint itself. A concrete network client lives at the application
// edge and plugs in here. `StaticPriceSource` is the in-memory implementation
// the CLI, server, and tests run on.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

// ============================================================================
// ERRORS
// ============================================================================

/// Price fetch failure
#[derive(Debug, Clone, PartialEq)]
pub enum PriceFetchError {
    /// No quote available for the symbol
    UnknownSymbol(String),

    /// Transport failure or malformed response from the quote provider
    Fetch(String),
}

impl fmt::Display for PriceFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceFetchError::UnknownSymbol(symbol) => {
                write!(f, "no quote available for symbol {}", symbol)
            }
            PriceFetchError::Fetch(msg) => write!(f, "price fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for PriceFetchError {}

// ============================================================================
// PRICE SOURCE
// ============================================================================

/// Capability supplying current and historical per-share prices.
pub trait PriceSource {
    /// Latest quote for a symbol
    fn current_price(&self, symbol: &str) -> Result<f64, PriceFetchError>;

    /// Closing price on a past date. `Ok(None)` when the date is in the
    /// future (no price exists yet), which is distinct from a fetch error.
    fn historical_price(
        &self,
        symbol: &str,
        date: NaiveDate,
    ) -> Result<Option<f64>, PriceFetchError>;
}

// ============================================================================
// STATIC PRICE SOURCE
// ============================================================================

/// In-memory quote table.
///
/// Current quotes are keyed by symbol; historical closes by (symbol, date).
/// Historical lookups for past dates with no recorded close fall back to the
/// current quote, and future dates yield no price.
pub struct StaticPriceSource {
    quotes: RwLock<HashMap<String, f64>>,
    history: RwLock<HashMap<(String, NaiveDate), f64>>,
    today: NaiveDate,
}

impl StaticPriceSource {
    pub fn new(today: NaiveDate) -> Self {
        StaticPriceSource {
            quotes: RwLock::new(HashMap::new()),
            history: RwLock::new(HashMap::new()),
            today,
        }
    }

    /// Set the current quote for a symbol
    pub fn set_quote(&self, symbol: &str, price: f64) {
        let mut quotes = self.quotes.write().unwrap();
        quotes.insert(symbol.to_uppercase(), price);
    }

    /// Record a historical close
    pub fn set_close(&self, symbol: &str, date: NaiveDate, price: f64) {
        let mut history = self.history.write().unwrap();
        history.insert((symbol.to_uppercase(), date), price);
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }
}

impl PriceSource for StaticPriceSource {
    fn current_price(&self, symbol: &str) -> Result<f64, PriceFetchError> {
        let quotes = self.quotes.read().unwrap();
        quotes
            .get(&symbol.to_uppercase())
            .copied()
            .ok_or_else(|| PriceFetchError::UnknownSymbol(symbol.to_string()))
    }

    fn historical_price(
        &self,
        symbol: &str,
        date: NaiveDate,
    ) -> Result<Option<f64>, PriceFetchError> {
        if date > self.today {
            return Ok(None);
        }
        let key = (symbol.to_uppercase(), date);
        let history = self.history.read().unwrap();
        if let Some(price) = history.get(&key) {
            return Ok(Some(*price));
        }
        // No recorded close for that day; use the live quote
        self.current_price(symbol).map(Some)
    }
}

// ============================================================================
// TESTS
// ============================================================================
