//! Early repayment events and schedule re-derivation
//!
//! Events are applied in ascending month order. Each one reads the balance
//! recorded at its month (after any earlier events), charges its fee against
//! that balance, lowers the balance by the clamped amount and re-amortizes
//! every later month from the new balance.

use std::cmp::Ordering;

use log::debug;
use serde::{Deserialize, Serialize};

use super::engine::AmortizationEngine;
use super::schedule::{Schedule, ScheduleRow};
use super::state::AmortizationState;
use crate::error::{LoanError, Result};

/// An extra payment toward principal at a given month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentEvent {
    /// 1-based month the payment lands on
    pub month: u32,

    /// Amount the borrower intends to pay down
    pub amount: f64,

    /// Fee as a percentage of the balance outstanding at `month`
    pub fee_rate: f64,
}

impl PrepaymentEvent {
    pub fn new(month: u32, amount: f64, fee_rate: f64) -> Self {
        Self { month, amount, fee_rate }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(LoanError::invalid(
                "prepayment.amount",
                format!("month {}: amount {} must be finite and non-negative", self.month, self.amount),
            ));
        }
        if !self.fee_rate.is_finite() || self.fee_rate < 0.0 {
            return Err(LoanError::invalid(
                "prepayment.fee_rate",
                format!("month {}: fee rate {} must be finite and non-negative", self.month, self.fee_rate),
            ));
        }
        Ok(())
    }

    /// Processing order: month, then amount, then fee rate
    fn processing_order(&self, other: &Self) -> Ordering {
        self.month
            .cmp(&other.month)
            .then_with(|| self.amount.total_cmp(&other.amount))
            .then_with(|| self.fee_rate.total_cmp(&other.fee_rate))
    }
}

/// Record of an event that took effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedPrepayment {
    pub month: u32,
    pub requested_amount: f64,
    pub actual_amount: f64,
    pub fee: f64,
    /// Balance at the event month before the prepayment
    pub balance_before: f64,
}

/// Schedule after prepayments, with the fees they incurred
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentOutcome {
    pub schedule: Schedule,
    pub total_fee: f64,
    pub applied: Vec<AppliedPrepayment>,
}

impl AmortizationEngine {
    /// Apply prepayment events to a computed schedule
    ///
    /// With `enabled` false the schedule comes back with its prepayment
    /// columns cleared and no fee. Events landing past the end of the
    /// schedule (including one truncated by an earlier event) are skipped.
    /// A zero amount is still charged its fee.
    pub fn apply_prepayments(
        &self,
        mut schedule: Schedule,
        enabled: bool,
        events: &[PrepaymentEvent],
    ) -> Result<PrepaymentOutcome> {
        if !enabled {
            schedule.rows_mut().iter_mut().for_each(ScheduleRow::clear_prepayment);
            return Ok(PrepaymentOutcome {
                schedule,
                total_fee: 0.0,
                applied: Vec::new(),
            });
        }

        for event in events {
            event.validate()?;
        }

        let mut ordered = events.to_vec();
        ordered.sort_by(PrepaymentEvent::processing_order);

        let mut total_fee = 0.0;
        let mut applied = Vec::with_capacity(ordered.len());

        for event in &ordered {
            let Some(row) = event_row(&mut schedule, event.month) else {
                debug!(
                    "skipping prepayment at month {}: schedule ends at month {}",
                    event.month,
                    schedule.len()
                );
                continue;
            };

            let balance_before = row.closing_balance;
            let fee = balance_before * event.fee_rate / 100.0;
            let actual_amount = event.amount.min(balance_before);
            let new_balance = balance_before - actual_amount;

            row.closing_balance = new_balance;
            row.set_prepayment(actual_amount, fee);

            total_fee += fee;
            applied.push(AppliedPrepayment {
                month: event.month,
                requested_amount: event.amount,
                actual_amount,
                fee,
                balance_before,
            });

            let suffix = self.rederive_after(&schedule, event.month, new_balance)?;
            schedule.replace_after(event.month, suffix);
        }

        Ok(PrepaymentOutcome {
            schedule,
            total_fee,
            applied,
        })
    }

    /// Re-amortize every row after `month` starting from `balance`
    ///
    /// Each row keeps its period and rate. Stops at the first month that
    /// leaves the balance repaid; rows past that point are dropped.
    fn rederive_after(&self, schedule: &Schedule, month: u32, balance: f64) -> Result<Vec<ScheduleRow>> {
        let epsilon = self.config().balance_epsilon;
        let later = schedule.rows().get(month as usize..).unwrap_or_default();

        let mut state = AmortizationState::resume(month, balance, schedule.term_months, None);
        let mut suffix = Vec::with_capacity(later.len());

        for existing in later {
            if state.is_repaid(epsilon) {
                debug!(
                    "prepayment at month {} repays the loan after month {}",
                    month, state.month
                );
                break;
            }

            state.advance_month();
            state.set_rate(existing.period_index, existing.annual_rate);

            let mut row = self.amortize_month(&mut state)?;
            row.payment_date = existing.payment_date;
            suffix.push(row);
        }

        Ok(suffix)
    }
}

fn event_row(schedule: &mut Schedule, month: u32) -> Option<&mut ScheduleRow> {
    let idx = (month as usize).checked_sub(1)?;
    schedule.rows_mut().get_mut(idx)
}

/// Apply prepayments with the default engine configuration
pub fn apply_prepayments(
    schedule: Schedule,
    enabled: bool,
    events: &[PrepaymentEvent],
) -> Result<PrepaymentOutcome> {
    AmortizationEngine::default().apply_prepayments(schedule, enabled, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::compute_schedule;

    fn scenario_schedule() -> Schedule {
        compute_schedule(1_500_000_000.0, 12, &[6.0, 6.5]).unwrap()
    }

    #[test]
    fn test_single_prepayment_scenario() {
        let baseline = scenario_schedule();
        let event = PrepaymentEvent::new(6, 200_000_000.0, 2.0);

        let outcome = apply_prepayments(baseline.clone(), true, &[event]).unwrap();
        let schedule = &outcome.schedule;

        let month_6 = schedule.row(6).unwrap();
        let baseline_6 = baseline.row(6).unwrap();
        assert_eq!(month_6.prepayment_amount, 200_000_000.0);

        let expected_fee = baseline_6.closing_balance * 0.02;
        assert!((month_6.prepayment_fee - expected_fee).abs() < 1e-6);
        assert!((outcome.total_fee - expected_fee).abs() < 1e-6);
        assert!(
            (month_6.closing_balance - (baseline_6.closing_balance - 200_000_000.0)).abs() < 1e-6
        );
        assert!(
            (month_6.total_payment - (baseline_6.total_payment + 200_000_000.0 + expected_fee)).abs()
                < 1e-3
        );

        for month in 7..=12 {
            let adjusted = schedule.row(month).unwrap();
            let original = baseline.row(month).unwrap();
            assert!(adjusted.opening_balance < original.opening_balance, "month {}", month);
            assert_eq!(adjusted.prepayment_amount, 0.0);
        }
        assert_eq!(schedule.row(7).unwrap().opening_balance, month_6.closing_balance);
        assert!(schedule.final_balance().abs() <= 1.0);
    }

    #[test]
    fn test_balances_chain_after_several_events() {
        let events = [
            PrepaymentEvent::new(3, 150_000_000.0, 1.0),
            PrepaymentEvent::new(7, 80_000_000.0, 0.5),
            PrepaymentEvent::new(12, 1_000.0, 2.0),
        ];
        let outcome = apply_prepayments(scenario_schedule(), true, &events).unwrap();
        let schedule = &outcome.schedule;

        assert_eq!(schedule.len(), 12);
        assert_eq!(outcome.applied.len(), 3);
        assert_eq!(outcome.applied[2].month, 12);

        for pair in schedule.rows().windows(2) {
            assert_eq!(
                pair[1].opening_balance, pair[0].closing_balance,
                "month {} does not open on month {} closing",
                pair[1].month, pair[0].month
            );
        }
        for row in schedule.iter() {
            assert!(row.closing_balance <= row.opening_balance, "month {}", row.month);
        }
        assert!(schedule.final_balance() <= 1.0);
    }

    #[test]
    fn test_rows_before_event_untouched() {
        let baseline = scenario_schedule();
        let outcome =
            apply_prepayments(baseline.clone(), true, &[PrepaymentEvent::new(6, 200_000_000.0, 2.0)])
                .unwrap();

        assert_eq!(&outcome.schedule.rows()[..5], &baseline.rows()[..5]);
    }

    #[test]
    fn test_disabled_returns_schedule_without_fees() {
        let baseline = scenario_schedule();
        let outcome =
            apply_prepayments(baseline.clone(), false, &[PrepaymentEvent::new(3, 1_000.0, 5.0)]).unwrap();

        assert_eq!(outcome.schedule, baseline);
        assert_eq!(outcome.total_fee, 0.0);
        assert!(outcome.applied.is_empty());
    }

    #[test]
    fn test_order_of_events_does_not_matter() {
        let events = [
            PrepaymentEvent::new(3, 100_000_000.0, 1.0),
            PrepaymentEvent::new(9, 50_000_000.0, 3.0),
        ];
        let reversed = [events[1], events[0]];

        let forward = apply_prepayments(scenario_schedule(), true, &events).unwrap();
        let backward = apply_prepayments(scenario_schedule(), true, &reversed).unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward.applied[0].month, 3);
        assert_eq!(forward.applied[1].month, 9);
    }

    #[test]
    fn test_later_fee_uses_reduced_balance() {
        let baseline = scenario_schedule();
        let events = [
            PrepaymentEvent::new(9, 0.0, 1.0),
            PrepaymentEvent::new(3, 300_000_000.0, 0.0),
        ];
        let outcome = apply_prepayments(baseline.clone(), true, &events).unwrap();

        let month_9 = outcome.schedule.row(9).unwrap();
        assert!(month_9.prepayment_fee < baseline.row(9).unwrap().closing_balance * 0.01);
        assert!((month_9.prepayment_fee - month_9.closing_balance * 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_balances_never_negative() {
        let events = [
            PrepaymentEvent::new(2, 700_000_000.0, 1.5),
            PrepaymentEvent::new(4, 900_000_000.0, 1.5),
            PrepaymentEvent::new(5, 900_000_000.0, 1.5),
        ];
        let outcome = apply_prepayments(scenario_schedule(), true, &events).unwrap();

        for row in outcome.schedule.iter() {
            assert!(row.closing_balance >= 0.0);
            assert!(row.opening_balance >= 0.0);
        }
        for applied in &outcome.applied {
            assert!(applied.actual_amount <= applied.balance_before);
        }
    }

    #[test]
    fn test_oversized_prepayment_truncates_schedule() {
        let baseline = scenario_schedule();
        let balance_at_4 = baseline.row(4).unwrap().closing_balance;

        let events = [
            PrepaymentEvent::new(4, 5_000_000_000.0, 1.0),
            PrepaymentEvent::new(8, 1_000.0, 1.0),
        ];
        let outcome = apply_prepayments(baseline, true, &events).unwrap();

        assert_eq!(outcome.schedule.len(), 4);
        let month_4 = outcome.schedule.row(4).unwrap();
        assert_eq!(month_4.prepayment_amount, balance_at_4);
        assert_eq!(month_4.closing_balance, 0.0);

        // Month 8 no longer exists, so only the first event applied
        assert_eq!(outcome.applied.len(), 1);
        assert!((outcome.total_fee - balance_at_4 * 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_zero_amount_still_charges_fee() {
        let baseline = scenario_schedule();
        let outcome = apply_prepayments(baseline.clone(), true, &[PrepaymentEvent::new(5, 0.0, 2.0)]).unwrap();

        let month_5 = outcome.schedule.row(5).unwrap();
        let baseline_5 = baseline.row(5).unwrap();
        assert_eq!(month_5.prepayment_amount, 0.0);
        assert!((month_5.prepayment_fee - baseline_5.closing_balance * 0.02).abs() < 1e-6);
        assert_eq!(month_5.closing_balance, baseline_5.closing_balance);

        for (adjusted, original) in outcome.schedule.iter().zip(baseline.iter()).skip(5) {
            assert_eq!(adjusted.closing_balance, original.closing_balance);
        }
    }

    #[test]
    fn test_out_of_range_events_skipped() {
        let baseline = scenario_schedule();
        let events = [PrepaymentEvent::new(0, 1_000.0, 1.0), PrepaymentEvent::new(13, 1_000.0, 1.0)];
        let outcome = apply_prepayments(baseline.clone(), true, &events).unwrap();

        assert_eq!(outcome.schedule, baseline);
        assert_eq!(outcome.total_fee, 0.0);
        assert!(outcome.applied.is_empty());
    }

    #[test]
    fn test_same_month_events_last_one_wins_row() {
        let events = [
            PrepaymentEvent::new(6, 100_000_000.0, 1.0),
            PrepaymentEvent::new(6, 50_000_000.0, 1.0),
        ];
        let outcome = apply_prepayments(scenario_schedule(), true, &events).unwrap();

        // Processed smallest amount first
        let month_6 = outcome.schedule.row(6).unwrap();
        assert_eq!(month_6.prepayment_amount, 100_000_000.0);
        assert_eq!(outcome.applied.len(), 2);
        assert_eq!(outcome.applied[0].actual_amount, 50_000_000.0);
        assert!(outcome.applied[1].balance_before < outcome.applied[0].balance_before);
    }

    #[test]
    fn test_invalid_event_rejected() {
        let err = apply_prepayments(scenario_schedule(), true, &[PrepaymentEvent::new(3, -5.0, 1.0)])
            .unwrap_err();
        assert!(err.is_invalid_input());

        let err = apply_prepayments(scenario_schedule(), true, &[PrepaymentEvent::new(3, 5.0, f64::NAN)])
            .unwrap_err();
        assert!(err.is_invalid_input());
    }
}
