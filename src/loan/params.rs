//! Loan parameter structures consumed by the amortization engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{LoanError, Result};

/// Longest term accepted, in months (100 years)
pub const MAX_TERM_MONTHS: u32 = 1200;

/// Annual interest rates (percentage points), one entry per rate period
///
/// A schedule shorter than the loan needs is not an error: the final entry
/// applies to every period past the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateSchedule {
    rates: Vec<f64>,
}

impl RateSchedule {
    pub fn new(rates: Vec<f64>) -> Self {
        Self { rates }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// Resolve the period actually used for `period` and its annual rate.
    ///
    /// Periods past the end reuse the last entry. Returns None only for an
    /// empty schedule.
    pub fn rate_for_period(&self, period: usize) -> Option<(usize, f64)> {
        let last = self.rates.len().checked_sub(1)?;
        let idx = period.min(last);
        Some((idx, self.rates[idx]))
    }

    /// Number of periods a term of `term_months` spans
    pub fn periods_required(term_months: u32, months_per_period: u32) -> usize {
        term_months.div_ceil(months_per_period.max(1)) as usize
    }

    /// Whether every period of the term has its own entry
    pub fn covers(&self, term_months: u32, months_per_period: u32) -> bool {
        self.rates.len() >= Self::periods_required(term_months, months_per_period)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.rates.is_empty() {
            return Err(LoanError::invalid("rate_schedule", "must contain at least one rate"));
        }
        for (i, &rate) in self.rates.iter().enumerate() {
            if !rate.is_finite() || rate < 0.0 {
                return Err(LoanError::invalid(
                    "rate_schedule",
                    format!("period {} rate {} must be a finite non-negative percentage", i + 1, rate),
                ));
            }
        }
        Ok(())
    }
}

impl From<Vec<f64>> for RateSchedule {
    fn from(rates: Vec<f64>) -> Self {
        Self::new(rates)
    }
}

impl From<&[f64]> for RateSchedule {
    fn from(rates: &[f64]) -> Self {
        Self::new(rates.to_vec())
    }
}

/// Terms of a single loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Initial amount owed
    pub principal: f64,

    /// Total number of monthly installments
    pub term_months: u32,

    /// Annual rate per period (percentage points)
    pub rate_schedule: RateSchedule,

    /// Date of the first installment, if payment dates should be tracked
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl LoanParameters {
    pub fn new(principal: f64, term_months: u32, rate_schedule: impl Into<RateSchedule>) -> Self {
        Self {
            principal,
            term_months,
            rate_schedule: rate_schedule.into(),
            start_date: None,
        }
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Reject parameters that can never produce a schedule
    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(LoanError::invalid(
                "principal",
                format!("must be a positive amount, got {}", self.principal),
            ));
        }
        if self.term_months == 0 {
            return Err(LoanError::invalid("term_months", "must be at least one month"));
        }
        if self.term_months > MAX_TERM_MONTHS {
            return Err(LoanError::invalid(
                "term_months",
                format!("{} exceeds the {} month maximum", self.term_months, MAX_TERM_MONTHS),
            ));
        }
        self.rate_schedule.validate()
    }
}
