// Total Compensation Dashboard - CLI
// `schedule` prints a generated vesting schedule; `dashboard` loads grant and
// bonus CSVs and prints the yearly total-comp breakdown.

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use std::env;
use std::path::Path;

use total_comp::{
    dashboard_summary, load_bonuses_csv, load_grants_csv, schedule, valuation, yearly_breakdown,
    CompensationProfile, Grant, GrantParams,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("schedule") => run_schedule(&args[2..]),
        Some("dashboard") => run_dashboard(&args[2..]),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("Total Compensation Dashboard v{}", total_comp::VERSION);
    println!();
    println!("Usage:");
    println!("  total-comp schedule <SYMBOL> <GRANT_DATE> <SHARES> <PRICE> [YEARS] [CLIFF_MONTHS] [FREQ_MONTHS] [--json]");
    println!("  total-comp dashboard <grants.csv> <bonuses.csv> <annual_salary>");
    println!();
    println!("Examples:");
    println!("  total-comp schedule ACME 2024-01-01 4800 52.50");
    println!("  total-comp schedule ACME 2024-01-01 1200 52.50 4 12 3");
    println!("  total-comp dashboard grants.csv bonuses.csv 150000");
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date {:?} (expected YYYY-MM-DD)", s))
}

fn run_schedule(args: &[String]) -> Result<()> {
    let json = args.iter().any(|a| a == "--json");
    let args: Vec<&String> = args.iter().filter(|a| *a != "--json").collect();

    if args.len() < 4 {
        print_usage();
        bail!("schedule requires SYMBOL, GRANT_DATE, SHARES, and PRICE");
    }

    let symbol = args[0].to_string();
    let grant_date = parse_date(args[1].as_str())?;
    let total_shares: u32 = args[2].parse().context("SHARES must be a positive integer")?;
    let grant_price: f64 = args[3].parse().context("PRICE must be a number")?;

    let vesting_years = match args.get(4) {
        Some(v) => v.parse().context("YEARS must be an integer")?,
        None => schedule::DEFAULT_VESTING_YEARS,
    };
    let cliff_months = match args.get(5) {
        Some(v) => v.parse().context("CLIFF_MONTHS must be an integer")?,
        None => schedule::DEFAULT_CLIFF_MONTHS,
    };
    let frequency_months = match args.get(6) {
        Some(v) => v.parse().context("FREQ_MONTHS must be an integer")?,
        None => schedule::DEFAULT_FREQUENCY_MONTHS,
    };

    let grant = Grant::new(GrantParams {
        symbol,
        grant_date,
        total_shares,
        grant_price,
        vesting_years,
        cliff_months,
        frequency_months,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&grant)?);
    } else {
        print_grant_schedule(&grant);
    }
    Ok(())
}

fn print_grant_schedule(grant: &Grant) {
    println!("📅 Vesting schedule for {} ({} shares granted {})",
        grant.symbol, grant.total_shares, grant.grant_date);
    println!("   {}y vesting, {}m cliff, every {}m",
        grant.vesting_years, grant.cliff_months, grant.frequency_months);
    println!();
    println!("   {:<12} {:>10} {:>14}", "Date", "Shares", "Value");
    println!("   {:-<12} {:->10} {:->14}", "", "", "");

    for tranche in &grant.tranches {
        println!(
            "   {:<12} {:>10} {:>13.2}",
            tranche.date.to_string(),
            tranche.quantity,
            tranche.value(grant.grant_price)
        );
    }

    let today = Utc::now().date_naive();
    let vested = valuation::total_vested(grant, today);
    println!();
    println!("   Total: {} shares, ${:.2} at grant price", grant.total_shares,
        valuation::total_value(grant, grant.grant_price));
    println!("   Vested as of {}: {} shares", today, vested);
}

fn run_dashboard(args: &[String]) -> Result<()> {
    if args.len() < 3 {
        print_usage();
        bail!("dashboard requires grants.csv, bonuses.csv, and annual_salary");
    }

    let grants = load_grants_csv(Path::new(&args[0]))?;
    let bonuses = load_bonuses_csv(Path::new(&args[1]))?;
    let annual_salary: f64 = args[2].parse().context("annual_salary must be a number")?;

    let profile = CompensationProfile {
        annual_salary,
        bonuses,
    };

    println!("💰 Total Compensation Dashboard");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ Loaded {} grants, {} bonuses", grants.len(), profile.bonuses.len());

    let today = Utc::now().date_naive();
    let summary = dashboard_summary(&profile, &grants, today);

    println!();
    println!("   Salary:          ${:>14.2}", summary.annual_salary);
    println!("   Bonuses (all):   ${:>14.2}", summary.total_bonuses);
    println!("   Equity (total):  ${:>14.2}", summary.equity_total_value);
    println!("   Vested value:    ${:>14.2}  ({} shares)", summary.vested_value, summary.vested_shares);
    println!("   Unvested value:  ${:>14.2}  ({} shares)", summary.unvested_value, summary.unvested_shares);
    println!("   This year total: ${:>14.2}", summary.this_year_total);

    println!();
    println!("   {:<6} {:>14} {:>12} {:>14} {:>16}", "Year", "Salary", "Bonus", "Equity", "Total");
    for year in yearly_breakdown(&profile, &grants) {
        println!(
            "   {:<6} {:>14.2} {:>12.2} {:>14.2} {:>16.2}",
            year.year, year.salary, year.bonus, year.equity, year.total
        );
    }

    Ok(())
}
