//! Month-by-month amortization with yearly aggregation.
//!
//! The level payment is computed once with [`monthly_payment`] and then
//! applied period by period with [`amortization_step`]. Iterating on a
//! balance that carries its own rounding accumulates a small residual; the
//! final scheduled month absorbs it so the loan closes at exactly zero, and
//! [`ScheduleOutput::final_payment_adjustment`] reports how large it was.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::scenarios::inputs::MAX_TERM_YEARS;
use crate::time_value::{amortization_step, monthly_payment};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, MONTHS_PER_YEAR};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationMonth {
    /// 1-based month index.
    pub month: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub remaining_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    /// 1-based year index.
    pub year: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    /// Balance after the last payment of the year.
    pub remaining_balance: Money,
    pub cumulative_interest: Money,
    /// Calendar date of the year's last payment, when a start date is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Yearly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub loan_amount: Money,
    pub annual_rate: Rate,
    pub term_years: u32,
    /// Loan origination date. The first payment falls one month later.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub granularity: Granularity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payments: Money,
    /// Final payment minus the level payment (drift absorbed at payoff).
    pub final_payment_adjustment: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    pub years: Vec<AmortizationYear>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub months: Vec<AmortizationMonth>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build a schedule with totals, optional calendar dates and optional
/// monthly detail.
pub fn build_schedule(input: &ScheduleInput) -> MortgageResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let months = monthly_schedule(input.loan_amount, input.annual_rate, input.term_years)?;
    let mut years = aggregate_years(&months);

    if let Some(origin) = input.start_date {
        for y in years.iter_mut() {
            y.period_end = Some(add_months(origin, y.year * MONTHS_PER_YEAR)?);
        }
    }
    let payoff_date = match input.start_date {
        Some(origin) => Some(add_months(origin, input.term_years * MONTHS_PER_YEAR)?),
        None => None,
    };

    let level = months.first().map(|m| m.payment).unwrap_or(Decimal::ZERO);
    let last = months.last().map(|m| m.payment).unwrap_or(Decimal::ZERO);
    let total_interest: Money = months.iter().map(|m| m.interest).sum();
    let total_payments: Money = months.iter().map(|m| m.payment).sum();

    if input.annual_rate < Decimal::ZERO {
        warnings.push(format!(
            "Negative annual rate {}: interest portions are negative",
            input.annual_rate
        ));
    }

    let output = ScheduleOutput {
        monthly_payment: level,
        total_interest,
        total_payments,
        final_payment_adjustment: last - level,
        payoff_date,
        years,
        months: match input.granularity {
            Granularity::Monthly => months,
            Granularity::Yearly => Vec::new(),
        },
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization, monthly compounding",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Year-aggregated schedule: exactly `term_years` entries.
pub fn schedule(loan_amount: Money, annual_rate: Rate, term_years: u32) -> MortgageResult<Vec<AmortizationYear>> {
    let months = monthly_schedule(loan_amount, annual_rate, term_years)?;
    Ok(aggregate_years(&months))
}

/// Full monthly schedule: exactly `term_years * 12` entries, final balance
/// zero.
pub fn monthly_schedule(
    loan_amount: Money,
    annual_rate: Rate,
    term_years: u32,
) -> MortgageResult<Vec<AmortizationMonth>> {
    validate(loan_amount, annual_rate, term_years)?;

    let payment = monthly_payment(loan_amount, annual_rate, term_years)?;
    let monthly_rate = annual_rate / Decimal::from(MONTHS_PER_YEAR);
    let n = term_years * MONTHS_PER_YEAR;

    let mut rows = Vec::with_capacity(n as usize);
    let mut balance = loan_amount;

    for month in 1..=n {
        let step = amortization_step(balance, monthly_rate, payment);
        let mut principal = step.principal;
        let mut new_balance = step.new_balance;
        if month == n && !new_balance.is_zero() {
            tracing::trace!(residual = %new_balance, "absorbing residual balance into final payment");
            principal += new_balance;
            new_balance = Decimal::ZERO;
        }
        rows.push(AmortizationMonth {
            month,
            payment: step.interest + principal,
            interest: step.interest,
            principal,
            remaining_balance: new_balance,
        });
        balance = new_balance;
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn aggregate_years(months: &[AmortizationMonth]) -> Vec<AmortizationYear> {
    let mut cumulative_interest = Decimal::ZERO;
    months
        .chunks(MONTHS_PER_YEAR as usize)
        .enumerate()
        .map(|(idx, chunk)| {
            let interest_paid: Money = chunk.iter().map(|m| m.interest).sum();
            let principal_paid: Money = chunk.iter().map(|m| m.principal).sum();
            cumulative_interest += interest_paid;
            AmortizationYear {
                year: idx as u32 + 1,
                principal_paid,
                interest_paid,
                remaining_balance: chunk.last().map(|m| m.remaining_balance).unwrap_or_default(),
                cumulative_interest,
                period_end: None,
            }
        })
        .collect()
}

fn add_months(origin: NaiveDate, months: u32) -> MortgageResult<NaiveDate> {
    origin
        .checked_add_months(Months::new(months))
        .ok_or_else(|| MortgageError::DateError(format!("{origin} + {months} months is out of range")))
}

fn validate(loan_amount: Money, annual_rate: Rate, term_years: u32) -> MortgageResult<()> {
    if loan_amount < Decimal::ZERO {
        return Err(MortgageError::invalid("loan_amount", "Loan amount cannot be negative"));
    }
    if term_years == 0 || term_years > MAX_TERM_YEARS {
        return Err(MortgageError::invalid(
            "term_years",
            format!("Loan term must be between 1 and {MAX_TERM_YEARS} years"),
        ));
    }
    if annual_rate <= -Decimal::ONE {
        return Err(MortgageError::invalid(
            "annual_rate",
            "Annual rate must be greater than -100%",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TOL: Decimal = dec!(0.01);

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    #[test]
    fn test_yearly_schedule_length_and_payoff() {
        let years = schedule(dec!(200_000), dec!(0.05), 30).unwrap();
        assert_eq!(years.len(), 30);
        assert_eq!(years[0].year, 1);
        assert_eq!(years[29].year, 30);
        assert_eq!(years[29].remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_principal_sums_to_loan() {
        let years = schedule(dec!(250_000), dec!(0.0675), 15).unwrap();
        let principal: Decimal = years.iter().map(|y| y.principal_paid).sum();
        assert_close(principal, dec!(250_000), TOL, "principal repaid");
    }

    #[test]
    fn test_first_year_split() {
        let years = schedule(dec!(200_000), dec!(0.05), 30).unwrap();
        // Year 1 of a 200k/5%/30y loan: ~9,933 interest, ~2,951 principal.
        assert_close(years[0].interest_paid, dec!(9933), dec!(2), "year 1 interest");
        assert_close(years[0].principal_paid, dec!(2951), dec!(2), "year 1 principal");
        assert_eq!(years[0].cumulative_interest, years[0].interest_paid);
    }

    #[test]
    fn test_balance_declines_monotonically() {
        let years = schedule(dec!(300_000), dec!(0.07), 30).unwrap();
        for pair in years.windows(2) {
            assert!(pair[1].remaining_balance < pair[0].remaining_balance);
        }
    }

    #[test]
    fn test_residual_drift_is_small() {
        let months = monthly_schedule(dec!(200_000), dec!(0.05), 30).unwrap();
        assert_eq!(months.len(), 360);
        let level = months[0].payment;
        let last = months[359].payment;
        assert_close(last, level, dec!(1), "final payment vs level");
        assert_eq!(months[359].remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_schedule_is_straight_line() {
        let years = schedule(dec!(120_000), Decimal::ZERO, 10).unwrap();
        for y in &years {
            assert_eq!(y.interest_paid, Decimal::ZERO);
            assert_eq!(y.principal_paid, dec!(12_000));
        }
        assert_eq!(years[9].remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_negative_rate_still_pays_off() {
        let years = schedule(dec!(100_000), dec!(-0.01), 20).unwrap();
        assert_eq!(years.len(), 20);
        assert!(years[0].interest_paid < Decimal::ZERO);
        assert_close(years[19].remaining_balance, Decimal::ZERO, TOL, "payoff");
    }

    #[test]
    fn test_high_rate_long_term_schedule_completes() {
        let years = schedule(dec!(1_000_000), dec!(0.60), 100).unwrap();
        assert_eq!(years.len(), 100);
        assert_eq!(years[99].remaining_balance, Decimal::ZERO);
        // Almost nothing but interest for decades.
        assert!(years[0].principal_paid < dec!(1));
    }

    #[test]
    fn test_zero_term_rejected() {
        assert!(matches!(
            schedule(dec!(100_000), dec!(0.05), 0),
            Err(MortgageError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_build_schedule_dates_and_totals() {
        let input = ScheduleInput {
            loan_amount: dec!(200_000),
            annual_rate: dec!(0.05),
            term_years: 30,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 15),
            granularity: Granularity::Yearly,
        };
        let out = build_schedule(&input).unwrap();
        let r = &out.result;
        assert_close(r.monthly_payment, dec!(1073.64), dec!(0.01), "payment");
        assert_eq!(r.payoff_date, NaiveDate::from_ymd_opt(2055, 1, 15));
        assert_eq!(r.years[0].period_end, NaiveDate::from_ymd_opt(2026, 1, 15));
        assert!(r.months.is_empty());
        assert_close(r.total_payments, r.total_interest + dec!(200_000), TOL, "payments = interest + principal");
        assert_close(r.total_interest, dec!(186_511), dec!(5), "lifetime interest");
        assert!(r.final_payment_adjustment.abs() < dec!(1));
    }

    #[test]
    fn test_build_schedule_monthly_detail() {
        let input = ScheduleInput {
            loan_amount: dec!(50_000),
            annual_rate: dec!(0.04),
            term_years: 5,
            start_date: None,
            granularity: Granularity::Monthly,
        };
        let out = build_schedule(&input).unwrap();
        assert_eq!(out.result.months.len(), 60);
        assert_eq!(out.result.years.len(), 5);
        assert!(out.result.payoff_date.is_none());
    }
}
