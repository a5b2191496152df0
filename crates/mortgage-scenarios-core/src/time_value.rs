use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::types::{Money, Rate, MONTHS_PER_YEAR};
use crate::MortgageResult;

/// Interest/principal split of a single amortization period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationStep {
    pub interest: Money,
    pub principal: Money,
    pub new_balance: Money,
}

/// Level monthly payment that fully amortizes `loan_amount` over `years`.
///
/// Standard annuity formula `P*r*(1+r)^n / ((1+r)^n - 1)` with `r = rate/12`
/// and `n = years*12`. A zero rate falls back to straight-line repayment.
/// Negative rates (heavily discounted loans) go through the same formula.
pub fn monthly_payment(loan_amount: Money, annual_rate: Rate, years: u32) -> MortgageResult<Money> {
    if years == 0 {
        return Err(MortgageError::InvalidInput {
            field: "years".into(),
            reason: "Loan term must be at least one year".into(),
        });
    }

    let n = years * MONTHS_PER_YEAR;

    if annual_rate.is_zero() {
        return Ok(loan_amount / Decimal::from(n));
    }

    let monthly_rate = annual_rate / Decimal::from(MONTHS_PER_YEAR);
    let one_plus_r = Decimal::ONE + monthly_rate;
    if one_plus_r <= Decimal::ZERO {
        return Err(MortgageError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Monthly rate must be greater than -100%".into(),
        });
    }

    let rate_share = loan_amount
        .checked_mul(monthly_rate)
        .ok_or_else(|| MortgageError::invalid("loan_amount", "Loan amount too large to price"))?;

    let factor = match checked_pow(one_plus_r, n) {
        Some(f) => f,
        // (1+r)^n beyond Decimal range: the annuity factor has converged to r.
        None if monthly_rate > Decimal::ZERO => return Ok(rate_share),
        None => Decimal::ZERO,
    };

    // Positive rates divide by 1 - (1+r)^-n so a large factor never multiplies
    // the loan. Negative rates keep factor < 1 and use the direct form.
    let (numerator, denom) = if monthly_rate > Decimal::ZERO {
        (rate_share, Decimal::ONE - Decimal::ONE / factor)
    } else {
        (rate_share * factor, factor - Decimal::ONE)
    };
    if denom.is_zero() {
        return Err(MortgageError::DivisionByZero {
            context: "monthly payment annuity factor".into(),
        });
    }

    Ok(numerator / denom)
}

/// Apply one month of interest accrual and repayment.
///
/// Principal is capped at the outstanding balance, so the returned balance
/// never drops below zero.
pub fn amortization_step(balance: Money, monthly_rate: Rate, payment: Money) -> AmortizationStep {
    let interest = balance * monthly_rate;
    let mut principal = payment - interest;
    if principal > balance {
        principal = balance;
    }
    AmortizationStep {
        interest,
        principal,
        new_balance: balance - principal,
    }
}

/// base^n by repeated multiplication; `None` on overflow.
fn checked_pow(base: Decimal, n: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result.checked_mul(base)?;
    }
    Some(result)
}
