// 📅 Vesting Schedule Generator
// Deterministically partitions a grant's shares into dated tranches.
//
// The schedule is pure arithmetic over the grant parameters:
// - cliff grants: one big tranche at the cliff, then even tranches
// - no-cliff grants: even tranches from the first period onward
//
// Invariants (hold for every valid input):
// - emitted quantities sum exactly to total_shares (no share lost to rounding)
// - tranche dates are strictly increasing

use chrono::{Months, NaiveDate};
use std::fmt;

use crate::entities::{TranchePrice, VestingTranche};

// ============================================================================
// DEFAULTS
// ============================================================================

/// Standard 4-year vesting period
pub const DEFAULT_VESTING_YEARS: u32 = 4;

/// Standard 1-year cliff
pub const DEFAULT_CLIFF_MONTHS: u32 = 12;

/// Standard monthly vesting after the cliff
pub const DEFAULT_FREQUENCY_MONTHS: u32 = 1;

/// Longest accepted vesting period. Anything beyond this is a typo, not a
/// schedule; it also keeps month arithmetic and tranche counts small.
pub const MAX_VESTING_YEARS: u32 = 100;

// ============================================================================
// ERRORS
// ============================================================================

/// Schedule generation failure
///
/// Parameters are validated up front; no tranche is ever produced from a
/// malformed input set.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// Malformed generator inputs (zero shares, zero period, cliff past the
    /// end of the vesting period, ...)
    InvalidParameters(String),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::InvalidParameters(msg) => {
                write!(f, "invalid schedule parameters: {}", msg)
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

// ============================================================================
// GENERATOR
// ============================================================================

/// Add `months` calendar months to a date, clamping the day-of-month to the
/// end of the target month (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    // Months::new takes u32; overflow is only possible near NaiveDate::MAX,
    // far beyond any vesting horizon. Saturate rather than panic.
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

/// Validate generator inputs, returning the total vesting duration in months.
fn validate(
    total_shares: u32,
    vesting_years: u32,
    cliff_months: u32,
    frequency_months: u32,
) -> Result<u32, ScheduleError> {
    if total_shares == 0 {
        return Err(ScheduleError::InvalidParameters(
            "total_shares must be a positive integer".to_string(),
        ));
    }
    if vesting_years == 0 {
        return Err(ScheduleError::InvalidParameters(
            "vesting_years must be at least 1".to_string(),
        ));
    }
    if vesting_years > MAX_VESTING_YEARS {
        return Err(ScheduleError::InvalidParameters(format!(
            "vesting_years ({}) exceeds the maximum of {}",
            vesting_years, MAX_VESTING_YEARS
        )));
    }
    if frequency_months == 0 {
        return Err(ScheduleError::InvalidParameters(
            "frequency_months must be at least 1".to_string(),
        ));
    }

    let total_months = vesting_years * 12;
    if cliff_months > total_months {
        return Err(ScheduleError::InvalidParameters(format!(
            "cliff_months ({}) exceeds the vesting period ({} months)",
            cliff_months, total_months
        )));
    }

    Ok(total_months)
}

/// Generate the ordered tranche sequence for a grant.
///
/// Cliff grants emit `floor((total - cliff) / freq) + 1` events; the cliff
/// event absorbs the integer-division remainder. No-cliff grants emit
/// `ceil(total / freq)` events; the final event absorbs the remainder and its
/// date is clamped to the end of the vesting period.
///
/// `cliff_months == total_months` is a valid degenerate case: a single
/// tranche holding every share (e.g. a 1-year cliff-vest-all award).
pub fn generate(
    grant_date: NaiveDate,
    total_shares: u32,
    vesting_years: u32,
    cliff_months: u32,
    frequency_months: u32,
) -> Result<Vec<VestingTranche>, ScheduleError> {
    let total_months = validate(total_shares, vesting_years, cliff_months, frequency_months)?;

    let event_count = if cliff_months > 0 {
        // The +1 is the cliff event itself
        (total_months - cliff_months) / frequency_months + 1
    } else {
        // ceil(total / freq)
        total_months.div_ceil(frequency_months)
    };

    let base = total_shares / event_count;
    let remainder = total_shares - base * event_count;

    let mut tranches = Vec::with_capacity(event_count as usize);

    if cliff_months > 0 {
        // Cliff tranche absorbs the remainder
        tranches.push(VestingTranche {
            date: add_months(grant_date, cliff_months),
            quantity: base + remainder,
            price: TranchePrice::Unpriced,
        });
        let mut offset = cliff_months + frequency_months;
        while offset <= total_months {
            tranches.push(VestingTranche {
                date: add_months(grant_date, offset),
                quantity: base,
                price: TranchePrice::Unpriced,
            });
            offset += frequency_months;
        }
    } else {
        // Final tranche absorbs the remainder; its date never passes the end
        // of the vesting period
        for event in 1..=event_count {
            let offset = (event * frequency_months).min(total_months);
            let quantity = if event == event_count {
                base + remainder
            } else {
                base
            };
            tranches.push(VestingTranche {
                date: add_months(grant_date, offset),
                quantity,
                price: TranchePrice::Unpriced,
            });
        }
    }

    debug_assert_eq!(
        tranches.iter().map(|t| t.quantity).sum::<u32>(),
        total_shares
    );

    Ok(tranches)
}

/// Generate with the standard 4-year / 1-year-cliff / monthly parameters.
pub fn generate_standard(
    grant_date: NaiveDate,
    total_shares: u32,
) -> Result<Vec<VestingTranche>, ScheduleError> {
    generate(
        grant_date,
        total_shares,
        DEFAULT_VESTING_YEARS,
        DEFAULT_CLIFF_MONTHS,
        DEFAULT_FREQUENCY_MONTHS,
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn quantities(tranches: &[VestingTranche]) -> Vec<u32> {
        tranches.iter().map(|t| t.quantity).collect()
    }

    #[test]
    fn test_standard_four_year_grant() {
        // 4 years, 12-month cliff, monthly: 37 events
        let tranches = generate_standard(date(2024, 1, 1), 4800).unwrap();

        assert_eq!(tranches.len(), 37);
        assert_eq!(tranches[0].date, date(2025, 1, 1));
        assert_eq!(tranches.last().unwrap().date, date(2028, 1, 1));

        // 4800 / 37 = 129 base, remainder 27 absorbed at the cliff
        assert_eq!(tranches[0].quantity, 129 + 27);
        assert_eq!(tranches[1].quantity, 129);
        assert_eq!(tranches.iter().map(|t| t.quantity).sum::<u32>(), 4800);
    }

    #[test]
    fn test_quarterly_after_cliff_scenario() {
        // 1200 shares, 4y, 12m cliff, quarterly:
        // event_count = floor((48-12)/3)+1 = 13; base = 92; remainder = 4
        let tranches = generate(date(2024, 1, 1), 1200, 4, 12, 3).unwrap();

        assert_eq!(tranches.len(), 13);
        assert_eq!(tranches[0].date, date(2025, 1, 1));
        assert_eq!(tranches[0].quantity, 96);
        for t in &tranches[1..] {
            assert_eq!(t.quantity, 92);
        }
        assert_eq!(tranches.iter().map(|t| t.quantity).sum::<u32>(), 1200);
        assert_eq!(tranches[1].date, date(2025, 4, 1));
        assert_eq!(tranches.last().unwrap().date, date(2028, 1, 1));
    }

    #[test]
    fn test_no_cliff_monthly_scenario() {
        // 100 shares, 1y, no cliff, monthly:
        // 12 events, base 8, final absorbs remainder 4
        let tranches = generate(date(2024, 1, 1), 100, 1, 0, 1).unwrap();

        assert_eq!(tranches.len(), 12);
        assert_eq!(quantities(&tranches), vec![8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 12]);
        assert_eq!(tranches[0].date, date(2024, 2, 1));
        assert_eq!(tranches.last().unwrap().date, date(2025, 1, 1));
    }

    #[test]
    fn test_no_cliff_uneven_frequency_clamps_final_date() {
        // 12 months at 5-month frequency: ceil(12/5) = 3 events
        // dates at months 5, 10, and 12 (clamped from 15)
        let tranches = generate(date(2024, 1, 1), 90, 1, 0, 5).unwrap();

        assert_eq!(tranches.len(), 3);
        assert_eq!(tranches[0].date, date(2024, 6, 1));
        assert_eq!(tranches[1].date, date(2024, 11, 1));
        assert_eq!(tranches[2].date, date(2025, 1, 1));
        assert_eq!(tranches.iter().map(|t| t.quantity).sum::<u32>(), 90);
    }

    #[test]
    fn test_cliff_equals_total_single_tranche() {
        // 1-year cliff-vest-all: one event with everything
        let tranches = generate(date(2024, 3, 15), 500, 1, 12, 1).unwrap();

        assert_eq!(tranches.len(), 1);
        assert_eq!(tranches[0].quantity, 500);
        assert_eq!(tranches[0].date, date(2025, 3, 15));
    }

    #[test]
    fn test_end_of_month_clamping() {
        // Jan 31 + 1 month clamps to the shorter month
        let tranches = generate(date(2024, 1, 31), 120, 1, 0, 1).unwrap();

        assert_eq!(tranches[0].date, date(2024, 2, 29)); // leap year
        assert_eq!(tranches[1].date, date(2024, 3, 31));
        assert_eq!(tranches[2].date, date(2024, 4, 30));
    }

    #[test]
    fn test_dates_strictly_increasing() {
        let cases = [
            (4800u32, 4u32, 12u32, 1u32),
            (1200, 4, 12, 3),
            (100, 1, 0, 1),
            (90, 1, 0, 5),
            (7, 2, 6, 4),
            (1, 1, 0, 12),
        ];
        for (shares, years, cliff, freq) in cases {
            let tranches = generate(date(2023, 5, 31), shares, years, cliff, freq).unwrap();
            for pair in tranches.windows(2) {
                assert!(
                    pair[0].date < pair[1].date,
                    "dates not strictly increasing for {:?}",
                    (shares, years, cliff, freq)
                );
            }
            assert_eq!(
                tranches.iter().map(|t| t.quantity).sum::<u32>(),
                shares,
                "quantity sum mismatch for {:?}",
                (shares, years, cliff, freq)
            );
        }
    }

    #[test]
    fn test_shares_fewer_than_events() {
        // base = 0; the remainder carries everything
        let tranches = generate(date(2024, 1, 1), 3, 1, 0, 1).unwrap();

        assert_eq!(tranches.len(), 12);
        assert_eq!(tranches.iter().map(|t| t.quantity).sum::<u32>(), 3);
        assert_eq!(tranches.last().unwrap().quantity, 3);
    }

    #[test]
    fn test_rejects_zero_shares() {
        let err = generate(date(2024, 1, 1), 0, 4, 12, 1).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidParameters(_)));
    }

    #[test]
    fn test_rejects_zero_vesting_years() {
        let err = generate(date(2024, 1, 1), 100, 0, 0, 1).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidParameters(_)));
    }

    #[test]
    fn test_rejects_oversized_vesting_years() {
        // Values past the cap must come back as a validation error, never as
        // an arithmetic overflow or a giant tranche allocation
        let err = generate(date(2024, 1, 1), 10, 400_000_000, 0, 1).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidParameters(_)));

        let err = generate(date(2024, 1, 1), 10, u32::MAX, 0, 1).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidParameters(_)));

        let err = generate(date(2024, 1, 1), 10, MAX_VESTING_YEARS + 1, 0, 1).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidParameters(_)));

        // The cap itself is still a valid schedule
        let tranches = generate(date(2024, 1, 1), 2400, MAX_VESTING_YEARS, 0, 12).unwrap();
        assert_eq!(tranches.len(), 100);
        assert_eq!(tranches.iter().map(|t| t.quantity).sum::<u32>(), 2400);
    }

    #[test]
    fn test_rejects_zero_frequency() {
        let err = generate(date(2024, 1, 1), 100, 4, 12, 0).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidParameters(_)));
    }

    #[test]
    fn test_rejects_cliff_past_vesting_period() {
        let err = generate(date(2024, 1, 1), 100, 1, 13, 1).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidParameters(_)));
    }

    #[test]
    fn test_add_months_clamps_day() {
        assert_eq!(add_months(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(add_months(date(2023, 1, 31), 1), date(2023, 2, 28));
        assert_eq!(add_months(date(2024, 8, 31), 1), date(2024, 9, 30));
        assert_eq!(add_months(date(2024, 6, 15), 12), date(2025, 6, 15));
    }
}
