//! Running state while amortizing a loan month by month

use chrono::{Months, NaiveDate};

/// State of a loan at a point in time during amortization
#[derive(Debug, Clone)]
pub struct AmortizationState {
    /// Current month (1-indexed, 0 before the first installment)
    pub month: u32,

    /// Contractual term in months
    pub term_months: u32,

    /// Outstanding principal
    pub balance: f64,

    /// Rate period the current month falls in
    pub period_index: usize,

    /// Annual rate in effect (percentage points)
    pub annual_rate: f64,

    /// First installment date, if tracked
    start_date: Option<NaiveDate>,
}

impl AmortizationState {
    /// State before the first installment of a new loan
    pub fn new(principal: f64, term_months: u32, start_date: Option<NaiveDate>) -> Self {
        Self::resume(0, principal, term_months, start_date)
    }

    /// State immediately after `month` has closed with `balance` outstanding
    pub fn resume(month: u32, balance: f64, term_months: u32, start_date: Option<NaiveDate>) -> Self {
        Self {
            month,
            term_months,
            balance,
            period_index: 0,
            annual_rate: 0.0,
            start_date,
        }
    }

    /// Advance to next month
    pub fn advance_month(&mut self) {
        self.month += 1;
    }

    /// Apply the rate for the current month
    pub fn set_rate(&mut self, period_index: usize, annual_rate: f64) {
        self.period_index = period_index;
        self.annual_rate = annual_rate;
    }

    /// Installments left including the current month
    pub fn remaining_months(&self) -> u32 {
        self.term_months.saturating_sub(self.month) + 1
    }

    /// Outstanding balance is within `epsilon` of zero
    pub fn is_repaid(&self, epsilon: f64) -> bool {
        self.balance <= epsilon
    }

    /// Calendar date of the current installment
    pub fn payment_date(&self) -> Option<NaiveDate> {
        let offset = self.month.checked_sub(1)?;
        self.start_date?.checked_add_months(Months::new(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_months_counts_current() {
        let mut state = AmortizationState::new(1000.0, 12, None);
        state.advance_month();
        assert_eq!(state.month, 1);
        assert_eq!(state.remaining_months(), 12);

        let mut state = AmortizationState::resume(11, 100.0, 12, None);
        state.advance_month();
        assert_eq!(state.remaining_months(), 1);
    }

    #[test]
    fn test_payment_date_clamps_to_month_end() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let mut state = AmortizationState::new(1000.0, 12, Some(start));
        assert_eq!(state.payment_date(), None);

        state.advance_month();
        assert_eq!(state.payment_date(), Some(start));

        state.advance_month();
        assert_eq!(state.payment_date(), NaiveDate::from_ymd_opt(2024, 2, 29));
    }
}
