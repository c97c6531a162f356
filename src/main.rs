//! Loan Planner CLI
//!
//! Walks the lever sequence for a set of mortgage accounts and prints the
//! resulting baseline/optimized projection.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, ValueEnum};

use loan_planner::account::load_accounts_from_reader;
use loan_planner::amortization::{amortization_schedule, monthly_payment};
use loan_planner::assumptions::load_assumptions_from_reader;
use loan_planner::{
    Assumptions, ChartSeriesAdapter, LoanType, MortgageAccount, OptimizationLever, Planner, PrepaymentMode,
    ProjectionUnit, RateType,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitArg {
    Age,
    Year,
}

#[derive(Debug, Parser)]
#[command(name = "loan_planner", version, about = "Preview mortgage optimization levers and project their effect")]
struct Args {
    /// Accounts CSV (defaults to a sample 2,000,000 commercial loan)
    #[arg(long)]
    accounts: Option<PathBuf>,

    /// Assumptions JSON; missing fields keep their defaults
    #[arg(long)]
    assumptions: Option<PathBuf>,

    #[arg(long, default_value_t = 30)]
    start_age: i32,

    #[arg(long, default_value_t = 65)]
    end_age: i32,

    /// Label the projection by age or calendar year
    #[arg(long, value_enum, default_value_t = UnitArg::Age)]
    unit: UnitArg,

    /// Monthly household income increase
    #[arg(long, default_value_t = 0.0)]
    income_increase: f64,

    /// Monthly household expense reduction
    #[arg(long, default_value_t = 0.0)]
    expense_reduction: f64,

    /// Confirm every lever, even those with no benefit
    #[arg(long)]
    confirm_all: bool,

    /// Print the first N months of each account's amortization schedule
    #[arg(long, default_value_t = 0)]
    schedule: usize,
}

fn sample_accounts() -> Result<Vec<MortgageAccount>> {
    let home =
        MortgageAccount::new(1, "Primary residence", LoanType::Commercial, RateType::Fixed, 2_000_000.0, 4.9, 300)?
            .with_lever(OptimizationLever::CommercialToFundConversion {
                convert_amount: 500_000.0,
                fund_rate_percent: 3.25,
                fee_rate_percent: 0.0,
            })?
            .with_lever(OptimizationLever::FixedToFloatingConversion {
                lpr_basis_point_delta: -30.0,
            })?
            .with_lever(OptimizationLever::Prepayment {
                amount: 200_000.0,
                mode: PrepaymentMode::ReduceTerm,
            })?;
    Ok(vec![home])
}

fn print_schedule(account: &MortgageAccount, months: usize) {
    let schedule = amortization_schedule(account.principal, account.annual_rate_percent, account.remaining_term_months);
    println!("  {:>5} {:>12} {:>12} {:>12} {:>16}", "Month", "Payment", "Interest", "Principal", "Balance");
    for row in schedule.iter().take(months) {
        println!(
            "  {:>5} {:>12.2} {:>12.2} {:>12.2} {:>16.2}",
            row.month, row.payment, row.interest, row.principal, row.remaining_balance
        );
    }
    if schedule.len() > months {
        println!("  ... ({} more months)", schedule.len() - months);
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Loan Planner v{}", env!("CARGO_PKG_VERSION"));
    println!("=================\n");

    let accounts = match &args.accounts {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            load_accounts_from_reader(file).with_context(|| format!("loading accounts from {}", path.display()))?
        }
        None => sample_accounts()?,
    };

    let assumptions = match &args.assumptions {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            load_assumptions_from_reader(file).with_context(|| format!("loading assumptions from {}", path.display()))?
        }
        None => Assumptions::default_planning(),
    };

    for account in &accounts {
        println!(
            "Account {} ({}): principal {:.2} at {:.2}% over {} months, payment {:.2}",
            account.id,
            account.name,
            account.principal,
            account.annual_rate_percent,
            account.remaining_term_months,
            monthly_payment(account.principal, account.annual_rate_percent, account.term_months()),
        );
        if args.schedule > 0 {
            print_schedule(account, args.schedule);
        }
    }
    println!();

    let mut planner = Planner::new(accounts, assumptions)?;
    if args.income_increase != 0.0 || args.expense_reduction != 0.0 {
        planner.set_budget_adjustment(args.income_increase, args.expense_reduction)?;
    }

    println!(
        "{:<30} {:>14} {:>12} {:>10} {:>14}  Decision",
        "Lever", "InterestSaved", "Monthly", "Months", "Annual"
    );
    println!("{}", "-".repeat(95));

    while let Some(lever) = planner.session().current_lever() {
        let summary = planner.preview_step(lever)?;
        let accept = args.confirm_all || summary.annual_improvement > 0.0;
        let outcome = if accept {
            planner.confirm_step(lever)
        } else {
            planner.reject_step(lever)
        };
        anyhow::ensure!(outcome.is_applied(), "lever {} was not applied: {:?}", lever, outcome);

        println!(
            "{:<30} {:>14.2} {:>12.2} {:>10.1} {:>14.2}  {}",
            lever.as_str(),
            summary.interest_saved,
            summary.monthly_delta,
            summary.term_delta_months,
            summary.annual_improvement,
            if accept { "confirmed" } else { "rejected" },
        );
    }

    let improvement = planner.session().cumulative_annual_improvement();
    println!("\nCumulative annual improvement: {:.2}\n", improvement);

    let (start, end, unit) = match args.unit {
        UnitArg::Age => (args.start_age, args.end_age, ProjectionUnit::Age),
        UnitArg::Year => {
            let year = chrono::Local::now().year();
            (year, year + (args.end_age - args.start_age), ProjectionUnit::Year)
        }
    };

    let projection = planner.get_projection(start, end, unit)?;
    let chart = ChartSeriesAdapter::from_projection(&projection);

    println!("{:>6} {:>16} {:>16}", format!("{:?}", unit), "Baseline", "Optimized");
    println!("{}", "-".repeat(40));
    for point in &chart.points {
        println!("{:>6} {:>16.2} {:>16.2}", point.unit, point.baseline, point.optimized);
    }

    if let Some((low, high)) = chart.bounds() {
        println!("\nRange: {:.2} to {:.2}", low, high);
    }

    Ok(())
}
