//! Amortization schedule output structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single month of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    // Timing
    pub month: u32,
    pub payment_date: Option<NaiveDate>,
    pub period_index: usize,
    pub annual_rate: f64,

    // Balances
    pub opening_balance: f64,
    pub closing_balance: f64,

    // Scheduled installment split
    pub interest_amount: f64,
    pub principal_amount: f64,

    // Early repayment landing on this month
    pub prepayment_amount: f64,
    pub prepayment_fee: f64,

    /// Installment plus any prepayment and its fee
    pub total_payment: f64,
}

impl ScheduleRow {
    /// Create an empty row for the given month
    pub fn new(month: u32) -> Self {
        Self {
            month,
            payment_date: None,
            period_index: 0,
            annual_rate: 0.0,
            opening_balance: 0.0,
            closing_balance: 0.0,
            interest_amount: 0.0,
            principal_amount: 0.0,
            prepayment_amount: 0.0,
            prepayment_fee: 0.0,
            total_payment: 0.0,
        }
    }

    pub fn has_prepayment(&self) -> bool {
        self.prepayment_amount > 0.0 || self.prepayment_fee > 0.0
    }

    /// Drop any prepayment recorded on this row
    pub(crate) fn clear_prepayment(&mut self) {
        self.set_prepayment(0.0, 0.0);
    }

    /// Record a prepayment on this row, replacing any already recorded
    pub(crate) fn set_prepayment(&mut self, amount: f64, fee: f64) {
        if self.has_prepayment() {
            self.total_payment -= self.prepayment_amount + self.prepayment_fee;
        }
        self.prepayment_amount = amount;
        self.prepayment_fee = fee;
        self.total_payment += amount + fee;
    }
}

/// Month-ordered schedule for one loan
///
/// Rows are stored densely: the row for month `m` sits at index `m - 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Contractual term the schedule was amortized over
    pub term_months: u32,

    rows: Vec<ScheduleRow>,
}

impl Schedule {
    pub fn new(term_months: u32) -> Self {
        Self {
            term_months,
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for a 1-based month, if the schedule reaches it
    pub fn row(&self, month: u32) -> Option<&ScheduleRow> {
        let idx = (month as usize).checked_sub(1)?;
        self.rows.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleRow> {
        self.rows.iter()
    }

    /// Closing balance of the last row (0 for an empty schedule)
    pub fn final_balance(&self) -> f64 {
        self.rows.last().map(|r| r.closing_balance).unwrap_or(0.0)
    }

    /// Whether the loan was repaid before the contractual term
    pub fn repaid_early(&self) -> bool {
        (self.rows.len() as u32) < self.term_months
    }

    pub(crate) fn push(&mut self, row: ScheduleRow) {
        self.rows.push(row);
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [ScheduleRow] {
        &mut self.rows
    }

    /// Replace every row after `month` with `suffix`
    pub(crate) fn replace_after(&mut self, month: u32, suffix: Vec<ScheduleRow>) {
        self.rows.truncate(month as usize);
        self.rows.extend(suffix);
    }

    /// Get summary statistics
    pub fn summary(&self) -> ScheduleSummary {
        let total_payment: f64 = self.rows.iter().map(|r| r.total_payment).sum();
        let total_interest: f64 = self.rows.iter().map(|r| r.interest_amount).sum();
        let total_principal: f64 = self.rows.iter().map(|r| r.principal_amount).sum();
        let total_prepayment: f64 = self.rows.iter().map(|r| r.prepayment_amount).sum();
        let total_fees: f64 = self.rows.iter().map(|r| r.prepayment_fee).sum();

        ScheduleSummary {
            months: self.rows.len() as u32,
            total_payment,
            total_interest,
            total_principal,
            total_prepayment,
            total_fees,
            final_balance: self.final_balance(),
        }
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ScheduleRow;
    type IntoIter = std::slice::Iter<'a, ScheduleRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub months: u32,
    pub total_payment: f64,
    pub total_interest: f64,
    pub total_principal: f64,
    pub total_prepayment: f64,
    pub total_fees: f64,
    pub final_balance: f64,
}
