// Domain Entities
//
// Each entity is a plain serde value:
// - VestingTranche: one dated batch of shares (immutable once generated)
// - Grant: an RSU award with its derived tranche sequence
// - GrantRegistry: in-memory grant collection with whole-value replacement

pub mod grant;
pub mod tranche;

pub use grant::{Grant, GrantParams, GrantRegistry};
pub use tranche::{TranchePrice, VestingTranche};
