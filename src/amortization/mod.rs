//! Amortization engine: schedule generation and prepayment re-derivation

mod annuity;
mod cost;
mod engine;
mod prepayment;
mod schedule;
mod state;

pub use annuity::{level_payment, monthly_rate};
pub use cost::{effective_annual_cost, periodic_irr};
pub use engine::{
    compute_schedule, AmortizationEngine, EngineConfig, DEFAULT_BALANCE_EPSILON,
    DEFAULT_MONTHS_PER_PERIOD,
};
pub use prepayment::{apply_prepayments, AppliedPrepayment, PrepaymentEvent, PrepaymentOutcome};
pub use schedule::{Schedule, ScheduleRow, ScheduleSummary};
pub use state::AmortizationState;
