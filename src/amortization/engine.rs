//! Core amortization engine for monthly variable-rate schedules

use log::debug;

use super::annuity::{level_payment, monthly_rate};
use super::schedule::{Schedule, ScheduleRow};
use super::state::AmortizationState;
use crate::error::{LoanError, Result};
use crate::loan::{LoanParameters, RateSchedule};

/// Months covered by one entry of the rate schedule
pub const DEFAULT_MONTHS_PER_PERIOD: u32 = 6;

/// Outstanding balance at or below which a loan counts as repaid
pub const DEFAULT_BALANCE_EPSILON: f64 = 1.0;

/// Configuration for an amortization run
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Months per rate period
    pub months_per_period: u32,

    /// Residual balance treated as fully repaid (currency units)
    pub balance_epsilon: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            months_per_period: DEFAULT_MONTHS_PER_PERIOD,
            balance_epsilon: DEFAULT_BALANCE_EPSILON,
        }
    }
}

/// Main amortization engine
///
/// The installment is re-amortized every month: the level payment is
/// recomputed from the current balance, the months left in the term and the
/// rate of the current period. Under a constant rate this reproduces the
/// textbook fixed payment; when the rate steps at a period boundary the
/// payment follows it without modelling the reset as a separate event.
#[derive(Debug, Clone, Default)]
pub struct AmortizationEngine {
    config: EngineConfig,
}

impl AmortizationEngine {
    /// Create a new engine with the given config
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rate period (0-based) a 1-based month falls in, before clamping
    pub fn period_for_month(&self, month: u32) -> usize {
        (month.saturating_sub(1) / self.config.months_per_period.max(1)) as usize
    }

    /// Build the full schedule for a loan
    pub fn compute_schedule(&self, params: &LoanParameters) -> Result<Schedule> {
        params.validate()?;

        let rates = &params.rate_schedule;
        if !rates.covers(params.term_months, self.config.months_per_period) {
            debug!(
                "rate schedule has {} of {} periods, reusing {}% for the remainder",
                rates.len(),
                RateSchedule::periods_required(params.term_months, self.config.months_per_period),
                rates.rates().last().copied().unwrap_or_default(),
            );
        }

        let mut schedule = Schedule::new(params.term_months);
        let mut state = AmortizationState::new(params.principal, params.term_months, params.start_date);

        while state.month < state.term_months && !state.is_repaid(self.config.balance_epsilon) {
            state.advance_month();

            let (period, annual_rate) = rates
                .rate_for_period(self.period_for_month(state.month))
                .ok_or_else(|| LoanError::invalid("rate_schedule", "must contain at least one rate"))?;
            state.set_rate(period, annual_rate);

            let row = self.amortize_month(&mut state)?;
            schedule.push(row);
        }

        if !state.is_repaid(self.config.balance_epsilon) {
            return Err(LoanError::Computation(format!(
                "balance {} still outstanding after final month {}",
                state.balance, state.month
            )));
        }

        if schedule.repaid_early() {
            debug!(
                "balance repaid after {} of {} months",
                schedule.len(),
                params.term_months
            );
        }

        Ok(schedule)
    }

    /// Split the current month's installment and roll the balance forward
    ///
    /// Expects `state` to already sit on the month being amortized with its
    /// rate applied.
    pub(crate) fn amortize_month(&self, state: &mut AmortizationState) -> Result<ScheduleRow> {
        let rate = monthly_rate(state.annual_rate);
        let opening_balance = state.balance;

        let mut payment = level_payment(opening_balance, rate, state.remaining_months())?;
        let interest = opening_balance * rate;
        let mut principal = payment - interest;

        // Final installment can overshoot on rounding
        if principal > opening_balance {
            principal = opening_balance;
            payment = interest + principal;
        }

        if !interest.is_finite() || !principal.is_finite() {
            return Err(LoanError::Computation(format!(
                "non-finite installment split in month {}",
                state.month
            )));
        }

        state.balance = opening_balance - principal;

        Ok(ScheduleRow {
            payment_date: state.payment_date(),
            period_index: state.period_index,
            annual_rate: state.annual_rate,
            opening_balance,
            closing_balance: state.balance,
            interest_amount: interest,
            principal_amount: principal,
            total_payment: payment,
            ..ScheduleRow::new(state.month)
        })
    }
}

/// Compute a schedule with the default engine configuration
///
/// `rate_schedule` holds one annual rate (percentage points) per 6-month
/// period.
pub fn compute_schedule(principal: f64, term_months: u32, rate_schedule: &[f64]) -> Result<Schedule> {
    let params = LoanParameters::new(principal, term_months, rate_schedule);
    AmortizationEngine::default().compute_schedule(&params)
}
