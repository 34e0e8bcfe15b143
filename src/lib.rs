// Total Compensation Dashboard - Core Library
// Vesting schedules, valuation, and salary/bonus aggregation for the CLI and
// the API server. All state is in-memory; nothing persists across runs.

pub mod compensation;
pub mod entities;
pub mod prices;
pub mod schedule;
pub mod valuation;

// Background refresh needs the async runtime from the server feature
#[cfg(feature = "server")]
pub mod refresh;

// Re-export commonly used types
pub use compensation::{
    dashboard_summary, load_bonuses_csv, load_grants_csv, yearly_breakdown, Bonus,
    CompensationProfile, DashboardSummary, YearSummary,
};
pub use entities::{Grant, GrantParams, GrantRegistry, TranchePrice, VestingTranche};
pub use prices::{PriceFetchError, PriceSource, StaticPriceSource};
pub use schedule::{generate, generate_standard, ScheduleError};
pub use valuation::{
    reprice, summarize, total_value, total_vested, unvested, ValuationSummary,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
