// ⏱️ Periodic Price Refresh
// Background task that re-fetches prices for every held grant on an interval.
//
// Each grant is repriced in its own spawned task: one symbol failing never
// touches the others, and a failed fetch surfaces as an Errored marker on the
// tranche rather than an aborted cycle. Results are applied by whole-value
// replacement in the registry; a result for a grant removed mid-flight is
// simply discarded.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::entities::GrantRegistry;
use crate::prices::PriceSource;
use crate::valuation;

/// Default refresh cadence
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Reprice every registered grant once. Per-grant tasks run independently;
/// the cycle completes when all of them have resolved.
pub async fn refresh_once(
    registry: &Arc<GrantRegistry>,
    source: &Arc<dyn PriceSource + Send + Sync>,
) {
    let today = Utc::now().date_naive();

    let handles: Vec<_> = registry
        .snapshot()
        .into_iter()
        .map(|grant| {
            let registry = Arc::clone(registry);
            let source = Arc::clone(source);
            tokio::spawn(async move {
                let repriced =
                    tokio::task::spawn_blocking(move || {
                        valuation::reprice(&grant, source.as_ref(), today)
                    })
                    .await;
                if let Ok(repriced) = repriced {
                    // false = grant was removed while the fetch was in flight
                    registry.replace(repriced);
                }
            })
        })
        .collect();

    for handle in handles {
        // A panicked fetch task only loses its own grant's update
        let _ = handle.await;
    }
}

/// Run the refresh loop forever. Spawn this alongside the server.
pub async fn run(
    registry: Arc<GrantRegistry>,
    source: Arc<dyn PriceSource + Send + Sync>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        refresh_once(&registry, &source).await;
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Grant, GrantParams};
    use crate::prices::StaticPriceSource;
    use chrono::NaiveDate;

    fn grant(symbol: &str) -> Grant {
        Grant::new(GrantParams {
            symbol: symbol.to_string(),
            grant_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            total_shares: 1200,
            grant_price: 50.0,
            vesting_years: 4,
            cliff_months: 12,
            frequency_months: 3,
        })
        .unwrap()
    }

    fn shared_source() -> Arc<dyn PriceSource + Send + Sync> {
        let source = StaticPriceSource::new(Utc::now().date_naive());
        source.set_quote("ACME", 120.0);
        Arc::new(source)
    }

    #[tokio::test]
    async fn test_refresh_attaches_prices() {
        let registry = Arc::new(GrantRegistry::new());
        let g = grant("ACME");
        let id = g.id.clone();
        registry.add(g);

        refresh_once(&registry, &shared_source()).await;

        let refreshed = registry.get(&id).unwrap();
        assert!(refreshed
            .tranches
            .iter()
            .all(|t| t.price.observed() == Some(120.0)));
    }

    #[tokio::test]
    async fn test_refresh_failures_are_independent() {
        let registry = Arc::new(GrantRegistry::new());
        let good = grant("ACME");
        let bad = grant("NOPE");
        let good_id = good.id.clone();
        let bad_id = bad.id.clone();
        registry.add(good);
        registry.add(bad);

        refresh_once(&registry, &shared_source()).await;

        // Known symbol got quotes; unknown symbol got error markers
        assert!(!registry.get(&good_id).unwrap().has_price_errors());
        assert!(registry.get(&bad_id).unwrap().has_price_errors());
    }

    #[tokio::test]
    async fn test_refresh_skips_removed_grant() {
        let registry = Arc::new(GrantRegistry::new());
        let g = grant("ACME");
        let id = g.id.clone();
        registry.add(g);
        registry.remove(&id);

        refresh_once(&registry, &shared_source()).await;

        assert!(registry.is_empty());
    }
}
