// 🪙 Grant Entity - an RSU award vesting over time
//
// A grant is an immutable record: its tranche sequence is generated once at
// creation and never regenerated. Editing vesting parameters means creating a
// new Grant. The only mutation a grant ever sees is whole-value replacement
// when the valuation step attaches fresh tranche prices.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::entities::VestingTranche;
use crate::schedule::{self, ScheduleError};

// ============================================================================
// GRANT PARAMETERS
// ============================================================================

/// User-supplied grant parameters, validated by `Grant::new`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantParams {
    /// Ticker symbol (e.g. "ACME")
    pub symbol: String,

    /// Date the award was granted
    pub grant_date: NaiveDate,

    /// Total shares in the award (positive)
    pub total_shares: u32,

    /// Per-share price on the grant date; the valuation fallback
    pub grant_price: f64,

    /// Vesting period in years
    #[serde(default = "default_vesting_years")]
    pub vesting_years: u32,

    /// Initial waiting period in months before anything vests (0 = no cliff)
    #[serde(default = "default_cliff_months")]
    pub cliff_months: u32,

    /// Interval in months between vesting events after the cliff
    #[serde(default = "default_frequency_months")]
    pub frequency_months: u32,
}

fn default_vesting_years() -> u32 {
    schedule::DEFAULT_VESTING_YEARS
}

fn default_cliff_months() -> u32 {
    schedule::DEFAULT_CLIFF_MONTHS
}

fn default_frequency_months() -> u32 {
    schedule::DEFAULT_FREQUENCY_MONTHS
}

// ============================================================================
// GRANT ENTITY
// ============================================================================

/// RSU grant with its derived vesting schedule
///
/// Identity: UUID (never changes). The tranche sequence is derived from the
/// parameters at construction time and ordered strictly by date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
    /// Stable identity (UUID)
    pub id: String,

    /// Ticker symbol, uppercased
    pub symbol: String,

    pub grant_date: NaiveDate,
    pub total_shares: u32,
    pub grant_price: f64,

    pub vesting_years: u32,
    pub cliff_months: u32,
    pub frequency_months: u32,

    /// Derived tranche sequence (strictly increasing dates, quantities sum to
    /// total_shares)
    pub tranches: Vec<VestingTranche>,

    /// When this grant was registered
    pub created_at: DateTime<Utc>,
}

impl Grant {
    /// Create a grant, generating its vesting schedule.
    ///
    /// Fails with `ScheduleError::InvalidParameters` on malformed inputs;
    /// a grant with a corrupt tranche sequence can never exist.
    pub fn new(params: GrantParams) -> Result<Self, ScheduleError> {
        if params.grant_price <= 0.0 || !params.grant_price.is_finite() {
            return Err(ScheduleError::InvalidParameters(
                "grant_price must be a positive number".to_string(),
            ));
        }
        if params.symbol.trim().is_empty() {
            return Err(ScheduleError::InvalidParameters(
                "symbol must not be empty".to_string(),
            ));
        }

        let tranches = schedule::generate(
            params.grant_date,
            params.total_shares,
            params.vesting_years,
            params.cliff_months,
            params.frequency_months,
        )?;

        Ok(Grant {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: params.symbol.trim().to_uppercase(),
            grant_date: params.grant_date,
            total_shares: params.total_shares,
            grant_price: params.grant_price,
            vesting_years: params.vesting_years,
            cliff_months: params.cliff_months,
            frequency_months: params.frequency_months,
            tranches,
            created_at: Utc::now(),
        })
    }

    /// Copy of this grant with a new tranche sequence (same identity).
    /// Used by the valuation step to attach prices without mutating in place.
    pub fn with_tranches(&self, tranches: Vec<VestingTranche>) -> Grant {
        Grant {
            tranches,
            ..self.clone()
        }
    }

    /// Date of the final vesting event
    pub fn final_vest_date(&self) -> Option<NaiveDate> {
        self.tranches.last().map(|t| t.date)
    }

    /// Whether any tranche carries a price-fetch error marker
    pub fn has_price_errors(&self) -> bool {
        self.tranches.iter().any(|t| t.price.is_errored())
    }
}

// ============================================================================
// GRANT REGISTRY
// ============================================================================

/// In-memory collection of grants.
///
/// All state is lost on shutdown (no persistence by design). Updates replace
/// whole grant values, so readers working from a snapshot never observe a
/// partially repriced grant.
pub struct GrantRegistry {
    grants: Arc<RwLock<Vec<Grant>>>,
}

impl GrantRegistry {
    pub fn new() -> Self {
        GrantRegistry {
            grants: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register a grant
    pub fn add(&self, grant: Grant) {
        let mut grants = self.grants.write().unwrap();
        grants.push(grant);
    }

    /// Remove a grant by id. Returns false if no such grant.
    pub fn remove(&self, id: &str) -> bool {
        let mut grants = self.grants.write().unwrap();
        let before = grants.len();
        grants.retain(|g| g.id != id);
        grants.len() < before
    }

    /// Clone of a grant by id
    pub fn get(&self, id: &str) -> Option<Grant> {
        let grants = self.grants.read().unwrap();
        grants.iter().find(|g| g.id == id).cloned()
    }

    /// Consistent snapshot of every grant
    pub fn snapshot(&self) -> Vec<Grant> {
        let grants = self.grants.read().unwrap();
        grants.clone()
    }

    /// Replace a grant with an updated value (matched by id).
    ///
    /// Returns false when the id is no longer registered; a repriced grant
    /// that outlived its removal is simply discarded by the caller.
    pub fn replace(&self, updated: Grant) -> bool {
        let mut grants = self.grants.write().unwrap();
        match grants.iter_mut().find(|g| g.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.grants.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GrantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
