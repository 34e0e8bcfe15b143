// 💰 Compensation Aggregation
// Folds salary, bonuses, and equity vesting into the total-comp dashboard:
// a yearly timeline plus an overall summary. Pure functions over in-memory
// values; CSV loaders feed the in-memory state (nothing is ever written back).

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::entities::{Grant, GrantParams};
use crate::valuation;

// ============================================================================
// RECORDS
// ============================================================================

/// One-off cash bonus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bonus {
    #[serde(rename = "Date")]
    pub date: NaiveDate,

    #[serde(rename = "Amount")]
    pub amount: f64,

    #[serde(rename = "Label")]
    pub label: String,
}

/// Cash side of the package
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompensationProfile {
    pub annual_salary: f64,
    pub bonuses: Vec<Bonus>,
}

impl CompensationProfile {
    pub fn new(annual_salary: f64) -> Self {
        CompensationProfile {
            annual_salary,
            bonuses: Vec::new(),
        }
    }

    /// Sum of bonuses dated in the given calendar year
    pub fn bonuses_in_year(&self, year: i32) -> f64 {
        self.bonuses
            .iter()
            .filter(|b| b.date.year() == year)
            .map(|b| b.amount)
            .sum()
    }

    pub fn total_bonuses(&self) -> f64 {
        self.bonuses.iter().map(|b| b.amount).sum()
    }
}

// ============================================================================
// TIMELINE
// ============================================================================

/// One calendar year of the total-comp timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: i32,
    pub salary: f64,
    pub bonus: f64,
    /// Value of shares vesting this year (tranche price, or the grant price
    /// where none is attached)
    pub equity: f64,
    pub total: f64,
}

/// Group tranches and bonuses by calendar year.
///
/// The timeline spans every year that has a vesting event or a bonus; the
/// annual salary is applied to each year in the span.
pub fn yearly_breakdown(profile: &CompensationProfile, grants: &[Grant]) -> Vec<YearSummary> {
    let mut equity_by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for grant in grants {
        for tranche in &grant.tranches {
            *equity_by_year.entry(tranche.date.year()).or_insert(0.0) +=
                tranche.value(grant.grant_price);
        }
    }

    let mut years: BTreeSet<i32> = equity_by_year.keys().copied().collect();
    for bonus in &profile.bonuses {
        years.insert(bonus.date.year());
    }

    years
        .into_iter()
        .map(|year| {
            let bonus = profile.bonuses_in_year(year);
            let equity = equity_by_year.get(&year).copied().unwrap_or(0.0);
            YearSummary {
                year,
                salary: profile.annual_salary,
                bonus,
                equity,
                total: profile.annual_salary + bonus + equity,
            }
        })
        .collect()
}

// ============================================================================
// DASHBOARD SUMMARY
// ============================================================================

/// Overall totals across the whole package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub as_of: NaiveDate,
    pub annual_salary: f64,
    pub total_bonuses: f64,
    pub grant_count: usize,
    pub vested_shares: u32,
    pub unvested_shares: u32,
    pub vested_value: f64,
    pub unvested_value: f64,
    pub equity_total_value: f64,
    /// Salary + this year's bonuses + value vesting this calendar year
    pub this_year_total: f64,
    /// True when any grant carries a price-fetch error marker
    pub price_errors: bool,
}

pub fn dashboard_summary(
    profile: &CompensationProfile,
    grants: &[Grant],
    as_of: NaiveDate,
) -> DashboardSummary {
    let mut vested_shares = 0;
    let mut unvested_shares = 0;
    let mut vested_value = 0.0;
    let mut unvested_value = 0.0;
    let mut equity_total_value = 0.0;
    let mut this_year_equity = 0.0;
    let mut price_errors = false;

    for grant in grants {
        let summary = valuation::summarize(grant, as_of);
        vested_shares += summary.vested_shares;
        unvested_shares += summary.unvested_shares;
        vested_value += summary.vested_value;
        unvested_value += summary.unvested_value;
        equity_total_value += summary.total_value;
        price_errors |= summary.price_errors;

        this_year_equity += grant
            .tranches
            .iter()
            .filter(|t| t.date.year() == as_of.year())
            .map(|t| t.value(grant.grant_price))
            .sum::<f64>();
    }

    let this_year_bonus = profile.bonuses_in_year(as_of.year());

    DashboardSummary {
        as_of,
        annual_salary: profile.annual_salary,
        total_bonuses: profile.total_bonuses(),
        grant_count: grants.len(),
        vested_shares,
        unvested_shares,
        vested_value,
        unvested_value,
        equity_total_value,
        this_year_total: profile.annual_salary + this_year_bonus + this_year_equity,
        price_errors,
    }
}

// ============================================================================
// CSV INGESTION
// ============================================================================

/// CSV row for a grant import
#[derive(Debug, Deserialize)]
struct GrantRow {
    #[serde(rename = "Symbol")]
    symbol: String,

    #[serde(rename = "Grant_Date")]
    grant_date: NaiveDate,

    #[serde(rename = "Total_Shares")]
    total_shares: u32,

    #[serde(rename = "Grant_Price")]
    grant_price: f64,

    #[serde(rename = "Vesting_Years")]
    vesting_years: u32,

    #[serde(rename = "Cliff_Months")]
    cliff_months: u32,

    #[serde(rename = "Frequency_Months")]
    frequency_months: u32,
}

/// Load grants from a CSV file. Each row is validated through `Grant::new`;
/// a malformed row fails the whole import with its line number.
pub fn load_grants_csv(path: &Path) -> Result<Vec<Grant>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open grants CSV: {:?}", path))?;

    let mut grants = Vec::new();
    for (index, record) in reader.deserialize::<GrantRow>().enumerate() {
        let row = record.with_context(|| format!("malformed grant row at line {}", index + 2))?;
        let grant = Grant::new(GrantParams {
            symbol: row.symbol,
            grant_date: row.grant_date,
            total_shares: row.total_shares,
            grant_price: row.grant_price,
            vesting_years: row.vesting_years,
            cliff_months: row.cliff_months,
            frequency_months: row.frequency_months,
        })
        .with_context(|| format!("invalid grant at line {}", index + 2))?;
        grants.push(grant);
    }

    Ok(grants)
}

/// Load bonuses from a CSV file (Date, Amount, Label columns)
pub fn load_bonuses_csv(path: &Path) -> Result<Vec<Bonus>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open bonuses CSV: {:?}", path))?;

    let mut bonuses = Vec::new();
    for (index, record) in reader.deserialize::<Bonus>().enumerate() {
        let bonus = record.with_context(|| format!("malformed bonus row at line {}", index + 2))?;
        bonuses.push(bonus);
    }

    Ok(bonuses)
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

    fn grant() -> Grant {
        // 100 shares, 1y, no cliff, monthly, granted 2024-01-01 at $10:
        // 11 tranches of 8 in 2024 (Feb..Dec), final tranche of 12 on 2025-01-01
        Grant::new(GrantParams {
            symbol: "ACME".to_string(),
            grant_date: date(2024, 1, 1),
            total_shares: 100,
            grant_price: 10.0,
            vesting_years: 1,
            cliff_months: 0,
            frequency_months: 1,
        })
        .unwrap()
    }

    fn profile() -> CompensationProfile {
        CompensationProfile {
            annual_salary: 150_000.0,
            bonuses: vec![
                Bonus {
                    date: date(2024, 3, 15),
                    amount: 10_000.0,
                    label: "Annual bonus".to_string(),
                },
                Bonus {
                    date: date(2025, 3, 15),
                    amount: 12_000.0,
                    label: "Annual bonus".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_yearly_breakdown_groups_by_vest_year() {
        let years = yearly_breakdown(&profile(), &[grant()]);

        assert_eq!(years.len(), 2);
        assert_eq!(years[0].year, 2024);
        // 11 tranches of 8 shares at $10
        assert_eq!(years[0].equity, 880.0);
        assert_eq!(years[0].bonus, 10_000.0);
        assert_eq!(years[0].total, 150_000.0 + 10_000.0 + 880.0);

        assert_eq!(years[1].year, 2025);
        assert_eq!(years[1].equity, 120.0);
        assert_eq!(years[1].bonus, 12_000.0);
    }

    #[test]
    fn test_yearly_breakdown_includes_bonus_only_years() {
        let mut p = profile();
        p.bonuses.push(Bonus {
            date: date(2030, 1, 1),
            amount: 5_000.0,
            label: "Retention".to_string(),
        });

        let years = yearly_breakdown(&p, &[grant()]);
        let last = years.last().unwrap();
        assert_eq!(last.year, 2030);
        assert_eq!(last.equity, 0.0);
        assert_eq!(last.bonus, 5_000.0);
    }

    #[test]
    fn test_yearly_equity_sums_to_total_grant_value() {
        let g = grant();
        let years = yearly_breakdown(&CompensationProfile::default(), &[g.clone()]);
        let equity_total: f64 = years.iter().map(|y| y.equity).sum();
        assert!((equity_total - valuation::total_value(&g, g.grant_price)).abs() < 1e-9);
    }

    #[test]
    fn test_dashboard_summary() {
        let summary = dashboard_summary(&profile(), &[grant()], date(2024, 6, 15));

        assert_eq!(summary.grant_count, 1);
        // Feb..Jun vested: 5 tranches of 8
        assert_eq!(summary.vested_shares, 40);
        assert_eq!(summary.unvested_shares, 60);
        assert_eq!(summary.equity_total_value, 1000.0);
        assert_eq!(summary.total_bonuses, 22_000.0);
        // salary + 2024 bonus + 2024 vest-year equity (880)
        assert_eq!(summary.this_year_total, 150_000.0 + 10_000.0 + 880.0);
        assert!(!summary.price_errors);
    }

    #[test]
    fn test_dashboard_summary_no_grants() {
        let summary = dashboard_summary(&profile(), &[], date(2024, 6, 15));
        assert_eq!(summary.vested_shares, 0);
        assert_eq!(summary.equity_total_value, 0.0);
        assert_eq!(summary.this_year_total, 160_000.0);
    }

    #[test]
    fn test_load_bonuses_csv() {
        let dir = std::env::temp_dir();
        let path = dir.join("total_comp_test_bonuses.csv");
        std::fs::write(
            &path,
            "Date,Amount,Label\n2024-03-15,10000.0,Annual bonus\n2024-09-01,2500.0,Spot award\n",
        )
        .unwrap();

        let bonuses = load_bonuses_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(bonuses.len(), 2);
        assert_eq!(bonuses[0].date, date(2024, 3, 15));
        assert_eq!(bonuses[1].amount, 2500.0);
        assert_eq!(bonuses[1].label, "Spot award");
    }

    #[test]
    fn test_load_grants_csv() {
        let dir = std::env::temp_dir();
        let path = dir.join("total_comp_test_grants.csv");
        std::fs::write(
            &path,
            "Symbol,Grant_Date,Total_Shares,Grant_Price,Vesting_Years,Cliff_Months,Frequency_Months\n\
             ACME,2024-01-01,1200,50.0,4,12,3\n",
        )
        .unwrap();

        let grants = load_grants_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].symbol, "ACME");
        assert_eq!(grants[0].tranches.len(), 13);
    }

    #[test]
    fn test_load_grants_csv_rejects_invalid_row() {
        let dir = std::env::temp_dir();
        let path = dir.join("total_comp_test_grants_bad.csv");
        std::fs::write(
            &path,
            "Symbol,Grant_Date,Total_Shares,Grant_Price,Vesting_Years,Cliff_Months,Frequency_Months\n\
             ACME,2024-01-01,0,50.0,4,12,3\n",
        )
        .unwrap();

        let result = load_grants_csv(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}
