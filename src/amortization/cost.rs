//! Effective borrowing cost of a schedule
//!
//! The internal rate of return of the borrower's cash flows (loan proceeds in,
//! installments, prepayments and fees out), expressed as an annual rate. Two
//! plans with different fee structures become comparable on one number.

use super::schedule::Schedule;

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 200;

/// Monthly rates the search is confined to
const RATE_FLOOR: f64 = -0.99;
const RATE_CEILING: f64 = 10.0;

/// Present value of `cashflows` at a monthly `rate`, with its slope in `rate`
///
/// Evaluated back to front as a polynomial in the discount factor
/// v = 1 / (1 + rate).
fn present_value(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let v = 1.0 / (1.0 + rate);
    let (pv, dpv_dv) = cashflows
        .iter()
        .rev()
        .fold((0.0, 0.0), |(pv, slope), &cf| (pv * v + cf, slope * v + pv));

    // dv/drate = -v^2
    (pv, -dpv_dv * v * v)
}

/// Monthly rate at which `cashflows` have zero present value
///
/// Newton steps from `guess`; if a step stalls on a flat slope or the
/// iteration budget runs out, the root is bracketed over the full search
/// range instead. None when the flows never change sign.
pub fn periodic_irr(cashflows: &[f64], guess: f64) -> Option<f64> {
    let inflow = cashflows.iter().any(|&cf| cf > TOLERANCE);
    let outflow = cashflows.iter().any(|&cf| cf < -TOLERANCE);

    match (inflow, outflow) {
        (false, false) if !cashflows.is_empty() => return Some(0.0),
        (true, true) => {}
        _ => return None,
    }

    let mut rate = guess.clamp(RATE_FLOOR, RATE_CEILING);
    for _ in 0..MAX_ITERATIONS {
        let (pv, slope) = present_value(cashflows, rate);
        if !slope.is_finite() || slope.abs() < 1e-20 {
            break;
        }

        let next = (rate - pv / slope).clamp(RATE_FLOOR, RATE_CEILING);
        if (next - rate).abs() < TOLERANCE {
            return Some(next);
        }
        rate = next;
    }

    bracket_root(cashflows)
}

fn bracket_root(cashflows: &[f64]) -> Option<f64> {
    let pv_at = |rate: f64| present_value(cashflows, rate).0;

    let (mut low, mut high) = (RATE_FLOOR, RATE_CEILING);
    let low_sign = pv_at(low).signum();
    if low_sign == pv_at(high).signum() {
        return None;
    }

    while high - low > 2.0 * TOLERANCE {
        let mid = 0.5 * (low + high);
        let pv = pv_at(mid);
        if pv.abs() < TOLERANCE {
            return Some(mid);
        }
        if pv.signum() == low_sign {
            low = mid;
        } else {
            high = mid;
        }
    }

    Some(0.5 * (low + high))
}

/// Annual effective cost of a schedule funded with `principal`
///
/// Returns a decimal rate (0.0617 for 6.17%). A fee-free schedule at a
/// constant rate gives the nominal rate compounded monthly.
pub fn effective_annual_cost(schedule: &Schedule, principal: f64) -> Option<f64> {
    let first = schedule.rows().first()?;

    let cashflows: Vec<f64> = std::iter::once(principal)
        .chain(schedule.iter().map(|r| -r.total_payment))
        .collect();

    // First month's interest over its opening balance is the contract rate
    let guess = if first.opening_balance > 0.0 {
        first.interest_amount / first.opening_balance
    } else {
        0.0
    };

    periodic_irr(&cashflows, guess).map(|monthly| (1.0 + monthly).powi(12) - 1.0)
}
