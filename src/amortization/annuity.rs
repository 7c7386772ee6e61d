//! Level-payment annuity formula used for every re-amortization step

use crate::error::{LoanError, Result};

/// Convert an annual rate in percentage points to a monthly decimal rate
pub fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 100.0 / 12.0
}

/// Level payment that retires `balance` over `remaining_months` at `rate`
///
/// M = P * r(1+r)^n / ((1+r)^n - 1). A rate of exactly zero is straight-line
/// principal. `(1+r)^n - 1` is evaluated as `exp_m1(n * ln_1p(r))` so rates
/// near the rounding step of 1.0 keep their precision. A payment that still
/// comes out non-finite is a computation error.
pub fn level_payment(balance: f64, rate: f64, remaining_months: u32) -> Result<f64> {
    if remaining_months == 0 {
        return Err(LoanError::Computation(
            "cannot amortize over zero remaining months".to_string(),
        ));
    }

    let n = remaining_months as f64;
    if rate == 0.0 {
        return Ok(balance / n);
    }

    let denominator = (n * rate.ln_1p()).exp_m1();
    let growth = denominator + 1.0;
    let payment = balance * rate * growth / denominator;

    if denominator == 0.0 || !payment.is_finite() {
        return Err(LoanError::Computation(format!(
            "annuity payment is not finite (balance {}, monthly rate {:e}, {} months)",
            balance, rate, remaining_months
        )));
    }

    Ok(payment)
}
