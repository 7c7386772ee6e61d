//! Mortgage Engine - Variable-rate amortization with early repayment
//!
//! This library provides:
//! - Monthly amortization schedules with rates that step every 6 months
//! - Re-derivation of the schedule after out-of-order prepayments with fees
//! - Two-plan comparison and effective borrowing cost
//! - Flat-file plan loading and CSV schedule export

pub mod error;
pub mod loan;
pub mod amortization;
pub mod comparison;
pub mod export;

// Re-export commonly used types
pub use error::LoanError;
pub use loan::{LoanParameters, LoanPlan, RateSchedule};
pub use amortization::{
    apply_prepayments, compute_schedule, AmortizationEngine, EngineConfig, PrepaymentEvent,
    PrepaymentOutcome, Schedule, ScheduleRow,
};
pub use comparison::{compare_schedules, PlanComparison, PlanRunner};
