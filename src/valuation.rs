// 🧮 Valuation Engine
// Pure reducers over a grant's tranche sequence: vested share counts, dollar
// values, and per-grant summaries. The only non-pure entry point is
// `reprice`, which consults a PriceSource and returns a new grant value.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entities::{Grant, TranchePrice};
use crate::prices::PriceSource;

// ============================================================================
// REDUCERS
// ============================================================================

/// Shares vested on or before `as_of`. Monotonically non-decreasing in `as_of`.
pub fn total_vested(grant: &Grant, as_of: NaiveDate) -> u32 {
    grant
        .tranches
        .iter()
        .filter(|t| t.is_vested(as_of))
        .map(|t| t.quantity)
        .sum()
}

/// Shares still unvested after `as_of`
pub fn unvested(grant: &Grant, as_of: NaiveDate) -> u32 {
    grant.total_shares - total_vested(grant, as_of)
}

/// Dollar value of the whole grant: each tranche at its attached price, or at
/// `fallback_price` where none is attached.
pub fn total_value(grant: &Grant, fallback_price: f64) -> f64 {
    grant
        .tranches
        .iter()
        .map(|t| t.value(fallback_price))
        .sum()
}

/// Dollar value of tranches vested on or before `as_of`
pub fn vested_value(grant: &Grant, as_of: NaiveDate, fallback_price: f64) -> f64 {
    grant
        .tranches
        .iter()
        .filter(|t| t.is_vested(as_of))
        .map(|t| t.value(fallback_price))
        .sum()
}

/// Dollar value of tranches still unvested after `as_of`
pub fn unvested_value(grant: &Grant, as_of: NaiveDate, fallback_price: f64) -> f64 {
    grant
        .tranches
        .iter()
        .filter(|t| !t.is_vested(as_of))
        .map(|t| t.value(fallback_price))
        .sum()
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Per-grant valuation rollup for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub grant_id: String,
    pub symbol: String,
    pub as_of: NaiveDate,
    pub vested_shares: u32,
    pub unvested_shares: u32,
    pub vested_value: f64,
    pub unvested_value: f64,
    pub total_value: f64,
    /// True when any tranche carries a price-fetch error marker; its value
    /// fell back to the grant price
    pub price_errors: bool,
}

/// Summarize a grant as of a date. Tranches without an attached price are
/// valued at the grant price.
pub fn summarize(grant: &Grant, as_of: NaiveDate) -> ValuationSummary {
    let fallback = grant.grant_price;
    ValuationSummary {
        grant_id: grant.id.clone(),
        symbol: grant.symbol.clone(),
        as_of,
        vested_shares: total_vested(grant, as_of),
        unvested_shares: unvested(grant, as_of),
        vested_value: vested_value(grant, as_of, fallback),
        unvested_value: unvested_value(grant, as_of, fallback),
        total_value: total_value(grant, fallback),
        price_errors: grant.has_price_errors(),
    }
}

// ============================================================================
// REPRICING
// ============================================================================

/// Attach per-tranche prices from a PriceSource, returning a new grant value.
///
/// Vested tranches get the historical close at their vest date; unvested
/// tranches get the current quote. A failed fetch marks the tranche
/// `Errored` (valuation then falls back to the grant price); one tranche
/// failing never blocks the others.
pub fn reprice<S: PriceSource + ?Sized>(grant: &Grant, source: &S, as_of: NaiveDate) -> Grant {
    let tranches = grant
        .tranches
        .iter()
        .map(|t| {
            let fetched = if t.is_vested(as_of) {
                source.historical_price(&grant.symbol, t.date)
            } else {
                source.current_price(&grant.symbol).map(Some)
            };
            let price = match fetched {
                Ok(Some(p)) => TranchePrice::Priced(p),
                Ok(None) => TranchePrice::Unpriced,
                Err(e) => TranchePrice::Errored(e.to_string()),
            };
            t.with_price(price)
        })
        .collect();

    grant.with_tranches(tranches)
}

// ============================================================================
// TESTS
// ============================================================================
