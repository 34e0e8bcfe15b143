// 📦 Vesting Tranche - one dated batch of shares becoming vested
//
// A tranche is immutable once generated; only its price is populated later by
// the valuation step. "No price yet", "priced", and "fetch failed" are three
// distinct states, modeled explicitly instead of stacking optional fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// TRANCHE PRICE
// ============================================================================

/// Per-tranche price state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail")]
pub enum TranchePrice {
    /// Observed per-share price (historical at vest date, or current quote)
    Priced(f64),

    /// No price attached yet (fresh schedule, or vest date in the future
    /// with no quote requested)
    Unpriced,

    /// Price fetch failed; valuation falls back to the grant price
    Errored(String),
}

impl TranchePrice {
    /// Observed price, if one was successfully attached
    pub fn observed(&self) -> Option<f64> {
        match self {
            TranchePrice::Priced(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, TranchePrice::Errored(_))
    }
}

// ============================================================================
// VESTING TRANCHE
// ============================================================================

/// One dated batch of shares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VestingTranche {
    /// Vest date (grant date + N calendar months)
    pub date: NaiveDate,

    /// Number of shares vesting on this date
    pub quantity: u32,

    /// Price state, attached by the valuation step
    pub price: TranchePrice,
}

impl VestingTranche {
    /// Whether this tranche has vested as of the given date
    pub fn is_vested(&self, as_of: NaiveDate) -> bool {
        self.date <= as_of
    }

    /// Dollar value at the attached price, or at `fallback_price` when no
    /// price was attached (unpriced or errored)
    pub fn value(&self, fallback_price: f64) -> f64 {
        let price = self.price.observed().unwrap_or(fallback_price);
        self.quantity as f64 * price
    }

    /// Copy of this tranche with a new price state
    pub fn with_price(&self, price: TranchePrice) -> VestingTranche {
        VestingTranche {
            price,
            ..self.clone()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tranche(quantity: u32, price: TranchePrice) -> VestingTranche {
        VestingTranche {
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            quantity,
            price,
        }
    }

    #[test]
    fn test_is_vested() {
        let t = tranche(10, TranchePrice::Unpriced);
        assert!(t.is_vested(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(t.is_vested(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()));
        assert!(!t.is_vested(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));
    }

    #[test]
    fn test_value_uses_observed_price() {
        let t = tranche(10, TranchePrice::Priced(150.0));
        assert_eq!(t.value(100.0), 1500.0);
    }

    #[test]
    fn test_value_falls_back_when_unpriced() {
        let t = tranche(10, TranchePrice::Unpriced);
        assert_eq!(t.value(100.0), 1000.0);
    }

    #[test]
    fn test_value_falls_back_when_errored() {
        let t = tranche(10, TranchePrice::Errored("timeout".to_string()));
        assert_eq!(t.value(42.5), 425.0);
        assert!(t.price.is_errored());
    }

    #[test]
    fn test_with_price_preserves_date_and_quantity() {
        let t = tranche(10, TranchePrice::Unpriced);
        let priced = t.with_price(TranchePrice::Priced(99.0));
        assert_eq!(priced.date, t.date);
        assert_eq!(priced.quantity, 10);
        assert_eq!(priced.price.observed(), Some(99.0));
    }
}
