//! Named loan plan as read from a plan file

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::params::{LoanParameters, RateSchedule};
use crate::amortization::PrepaymentEvent;

fn default_plan_name() -> String {
    "plan".to_string()
}

/// A loan together with the prepayments the borrower intends to make
///
/// Prepayments are listed independently of whether they are switched on;
/// `prepayments_enabled` is the gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPlan {
    #[serde(default = "default_plan_name")]
    pub name: String,

    pub principal: f64,

    pub term_months: u32,

    /// Annual rate per 6-month period (percentage points)
    pub rate_schedule: RateSchedule,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub prepayments_enabled: bool,

    #[serde(default)]
    pub prepayments: Vec<PrepaymentEvent>,
}

impl LoanPlan {
    pub fn new(name: impl Into<String>, params: LoanParameters) -> Self {
        Self {
            name: name.into(),
            principal: params.principal,
            term_months: params.term_months,
            rate_schedule: params.rate_schedule,
            start_date: params.start_date,
            prepayments_enabled: false,
            prepayments: Vec::new(),
        }
    }

    /// Switch prepayments on with the given events
    pub fn with_prepayments(mut self, events: Vec<PrepaymentEvent>) -> Self {
        self.prepayments_enabled = true;
        self.prepayments = events;
        self
    }

    /// Loan terms for the engine
    pub fn parameters(&self) -> LoanParameters {
        LoanParameters {
            principal: self.principal,
            term_months: self.term_months,
            rate_schedule: self.rate_schedule.clone(),
            start_date: self.start_date,
        }
    }
}
