//! Loan terms, named plans and their flat-file loaders

mod params;
mod plan;
pub mod loader;

pub use params::{LoanParameters, RateSchedule, MAX_TERM_MONTHS};
pub use plan::LoanPlan;
pub use loader::{load_plan, load_plans, load_prepayments, load_rate_schedule};
