//! Mortgage Engine CLI
//!
//! Command-line interface for computing, exporting and comparing loan plans

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use mortgage_engine::comparison::{PlanComparison, PlanResult};
use mortgage_engine::export::write_schedule_csv_path;
use mortgage_engine::loan::{load_plan, load_plans, load_prepayments, load_rate_schedule};
use mortgage_engine::PlanRunner;

/// Variable-rate mortgage amortization with early repayment
#[derive(Parser)]
#[command(name = "mortgage", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute one plan's schedule and write it to CSV
    Schedule {
        /// Plan file (JSON)
        #[arg(long)]
        plan: PathBuf,

        /// Rate table (CSV: period,annual_rate) replacing the plan's rates
        #[arg(long)]
        rates: Option<PathBuf>,

        /// Prepayment table (CSV: month,amount,fee_rate); enables prepayments
        #[arg(long)]
        prepayments: Option<PathBuf>,

        /// Output CSV path
        #[arg(long, default_value = "schedule_output.csv")]
        output: PathBuf,

        /// Number of months to print to the console
        #[arg(long, default_value_t = 24)]
        rows: usize,
    },
    /// Compare the total cost of two plans
    Compare {
        #[arg(long)]
        plan_a: PathBuf,

        #[arg(long)]
        plan_b: PathBuf,

        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run every plan in a JSON array and write one CSV per plan
    Batch {
        #[arg(long)]
        plans: PathBuf,

        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let runner = PlanRunner::new();

    match cli.command {
        Commands::Schedule { plan, rates, prepayments, output, rows } => {
            let mut plan = load_plan(&plan)
                .with_context(|| format!("loading plan {}", plan.display()))?;
            if let Some(path) = rates {
                plan.rate_schedule = load_rate_schedule(&path)
                    .with_context(|| format!("loading rate table {}", path.display()))?;
            }
            if let Some(path) = prepayments {
                plan.prepayments = load_prepayments(&path)
                    .with_context(|| format!("loading prepayment table {}", path.display()))?;
                plan.prepayments_enabled = true;
            }

            let result = runner
                .run(&plan)
                .with_context(|| format!("computing plan '{}'", plan.name))?;

            print_schedule(&result, rows);
            write_schedule_csv_path(&result.schedule, &output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("\nFull schedule written to: {}", output.display());
        }
        Commands::Compare { plan_a, plan_b, json } => {
            let first = load_plan(&plan_a)
                .with_context(|| format!("loading plan {}", plan_a.display()))?;
            let second = load_plan(&plan_b)
                .with_context(|| format!("loading plan {}", plan_b.display()))?;

            let comparison = runner.compare(&first, &second).context("comparing plans")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                print_comparison(&comparison);
            }
        }
        Commands::Batch { plans, output_dir } => {
            let plans = load_plans(&plans)
                .with_context(|| format!("loading plans {}", plans.display()))?;

            let mut failures = 0;
            for (plan, result) in plans.iter().zip(runner.run_batch(&plans)) {
                match result {
                    Ok(result) => {
                        let path = output_path(&output_dir, &result.name);
                        write_schedule_csv_path(&result.schedule, &path)
                            .with_context(|| format!("writing {}", path.display()))?;
                        println!(
                            "{:<24} {:>4} months  total {:>18.2}  interest {:>16.2}  -> {}",
                            result.name,
                            result.summary.months,
                            result.summary.total_payment,
                            result.summary.total_interest,
                            path.display()
                        );
                    }
                    Err(e) => {
                        failures += 1;
                        eprintln!("{:<24} failed: {}", plan.name, e);
                    }
                }
            }

            if failures > 0 {
                anyhow::bail!("{} of {} plans failed", failures, plans.len());
            }
        }
    }

    Ok(())
}

fn output_path(dir: &Path, name: &str) -> PathBuf {
    let file_name: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    dir.join(format!("{}.csv", file_name))
}

fn print_schedule(result: &PlanResult, rows: usize) {
    println!("Plan: {}", result.name);
    println!("{:>5} {:>6} {:>7} {:>18} {:>16} {:>16} {:>16} {:>16} {:>18}",
        "Month", "Period", "Rate", "Opening", "Interest", "Principal", "Prepaid", "Fee", "Closing");
    println!("{}", "-".repeat(130));

    for row in result.schedule.iter().take(rows) {
        println!("{:>5} {:>6} {:>7.3} {:>18.2} {:>16.2} {:>16.2} {:>16.2} {:>16.2} {:>18.2}",
            row.month,
            row.period_index + 1,
            row.annual_rate,
            row.opening_balance,
            row.interest_amount,
            row.principal_amount,
            row.prepayment_amount,
            row.prepayment_fee,
            row.closing_balance,
        );
    }

    if result.schedule.len() > rows {
        println!("... ({} more months)", result.schedule.len() - rows);
    }

    let summary = &result.summary;
    println!("\nSummary:");
    println!("  Months:          {}", summary.months);
    println!("  Total payment:   {:.2}", summary.total_payment);
    println!("  Total interest:  {:.2}", summary.total_interest);
    println!("  Prepaid:         {:.2}", summary.total_prepayment);
    println!("  Prepayment fees: {:.2}", result.total_fee);
    if let Some(cost) = result.effective_annual_cost {
        println!("  Effective cost:  {:.4}%", cost * 100.0);
    }
}

fn print_comparison(comparison: &PlanComparison) {
    println!("{:<24} {:>8} {:>20} {:>20} {:>16} {:>10}",
        "Plan", "Months", "Total payment", "Total interest", "Fees", "Eff. cost");
    for plan in [&comparison.plan1, &comparison.plan2] {
        let cost = plan
            .effective_annual_cost
            .map(|c| format!("{:.4}%", c * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        println!("{:<24} {:>8} {:>20.2} {:>20.2} {:>16.2} {:>10}",
            plan.name, plan.months, plan.total_payment, plan.total_interest, plan.total_fees, cost);
    }

    println!("\nDifference (plan 1 - plan 2): {:.2}", comparison.difference);
    match comparison.cheaper_plan() {
        Some(plan) => println!("Cheaper plan: {}", plan.name),
        None => println!("Both plans cost the same"),
    }
}
