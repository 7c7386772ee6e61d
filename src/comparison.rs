//! Plan runner and two-plan comparison
//!
//! Holds one engine configuration and evaluates loan plans end to end:
//! schedule, optional prepayments, totals and effective cost. Plans share no
//! state, so batches run in parallel.

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::amortization::{
    effective_annual_cost, AmortizationEngine, AppliedPrepayment, Schedule, ScheduleSummary,
};
use crate::error::Result;
use crate::loan::LoanPlan;

/// Outcome of evaluating one plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResult {
    pub name: String,
    pub schedule: Schedule,
    pub summary: ScheduleSummary,
    /// Fees charged across every applied prepayment
    pub total_fee: f64,
    pub applied_prepayments: Vec<AppliedPrepayment>,
    pub effective_annual_cost: Option<f64>,
}

/// Reduced totals for one side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTotals {
    pub name: String,
    pub months: u32,
    pub total_payment: f64,
    pub total_interest: f64,
    /// Fees charged. A plan run counts every applied event; a bare schedule
    /// only has its row fees, which keep the last event of each month.
    pub total_fees: f64,
    pub effective_annual_cost: Option<f64>,
}

impl PlanTotals {
    fn from_result(result: &PlanResult) -> Self {
        Self {
            name: result.name.clone(),
            months: result.summary.months,
            total_payment: result.summary.total_payment,
            total_interest: result.summary.total_interest,
            total_fees: result.total_fee,
            effective_annual_cost: result.effective_annual_cost,
        }
    }

    fn from_schedule(name: &str, schedule: &Schedule) -> Self {
        let summary = schedule.summary();
        Self {
            name: name.to_string(),
            months: summary.months,
            total_payment: summary.total_payment,
            total_interest: summary.total_interest,
            total_fees: summary.total_fees,
            effective_annual_cost: None,
        }
    }
}

/// Side-by-side totals of two plans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanComparison {
    pub plan1: PlanTotals,
    pub plan2: PlanTotals,
    /// plan1 total payment minus plan2 total payment; positive means plan 2 is cheaper
    pub difference: f64,
}

impl PlanComparison {
    fn between(plan1: PlanTotals, plan2: PlanTotals) -> Self {
        let difference = plan1.total_payment - plan2.total_payment;
        Self { plan1, plan2, difference }
    }

    /// Plan with the lower total payment, None on a tie
    pub fn cheaper_plan(&self) -> Option<&PlanTotals> {
        if self.difference > 0.0 {
            Some(&self.plan2)
        } else if self.difference < 0.0 {
            Some(&self.plan1)
        } else {
            None
        }
    }

    /// plan1 interest minus plan2 interest
    pub fn interest_difference(&self) -> f64 {
        self.plan1.total_interest - self.plan2.total_interest
    }
}

/// Compare two already computed schedules
pub fn compare_schedules(plan1: &Schedule, plan2: &Schedule) -> PlanComparison {
    PlanComparison::between(
        PlanTotals::from_schedule("plan 1", plan1),
        PlanTotals::from_schedule("plan 2", plan2),
    )
}

/// Evaluates loan plans against a single engine configuration
#[derive(Debug, Clone, Default)]
pub struct PlanRunner {
    engine: AmortizationEngine,
}

impl PlanRunner {
    /// Create runner with the default engine configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute a plan's schedule and apply its prepayments
    pub fn run(&self, plan: &LoanPlan) -> Result<PlanResult> {
        let schedule = self.engine.compute_schedule(&plan.parameters())?;
        let outcome = self
            .engine
            .apply_prepayments(schedule, plan.prepayments_enabled, &plan.prepayments)?;

        let summary = outcome.schedule.summary();
        let cost = effective_annual_cost(&outcome.schedule, plan.principal);

        info!(
            "plan '{}': {} months, total payment {:.2}, interest {:.2}, fees {:.2}",
            plan.name, summary.months, summary.total_payment, summary.total_interest, outcome.total_fee
        );

        Ok(PlanResult {
            name: plan.name.clone(),
            schedule: outcome.schedule,
            summary,
            total_fee: outcome.total_fee,
            applied_prepayments: outcome.applied,
            effective_annual_cost: cost,
        })
    }

    /// Run many plans in parallel; each plan succeeds or fails on its own
    pub fn run_batch(&self, plans: &[LoanPlan]) -> Vec<Result<PlanResult>> {
        plans.par_iter().map(|plan| self.run(plan)).collect()
    }

    /// Evaluate two plans and compare their totals
    pub fn compare(&self, plan1: &LoanPlan, plan2: &LoanPlan) -> Result<PlanComparison> {
        let (first, second) = rayon::join(|| self.run(plan1), || self.run(plan2));
        Ok(PlanComparison::between(
            PlanTotals::from_result(&first?),
            PlanTotals::from_result(&second?),
        ))
    }
}
