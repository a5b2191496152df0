//! Grid search over discount points × down-payment ratio.
//!
//! Every grid point is priced independently from the validated
//! [`InputParameters`]. Points whose cash requirement exceeds the buyer's
//! cash are pruned before any monthly figures are computed; the rest are
//! priced and passed through the affordability filter. Output order is
//! points ascending, then down payment ascending.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::affordability::{self, Constraint};
use super::inputs::{
    validate_config, validate_grid, validate_params, EnumerationConfig, InputParameters,
};
use super::ranking::{best_by, rank_scenarios, RankingCriterion};
use crate::time_value::monthly_payment;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, MONTHS_PER_YEAR};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One feasible (points, down payment) combination, fully priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub points: u32,
    pub down_pct: Rate,
    pub down_payment: Money,
    pub loan_amount: Money,
    /// Base rate less the point discount. Not floored at zero.
    pub adjusted_rate: Rate,
    pub closing_cost: Money,
    pub total_cash_used: Money,
    pub monthly_principal_interest: Money,
    pub monthly_property_tax: Money,
    pub monthly_insurance: Money,
    pub monthly_pmi: Money,
    /// P&I + tax + insurance + PMI + HOA.
    pub total_monthly: Money,
    pub dti: Rate,
}

/// Input for a full scenario search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSearchInput {
    pub params: InputParameters,
    #[serde(default)]
    pub config: EnumerationConfig,
    /// Order of the returned scenarios.
    #[serde(default)]
    pub rank_by: RankingCriterion,
    /// Keep only the first `top_n` scenarios after ranking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
}

/// How the grid was reduced to the feasible set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStatistics {
    pub points_values: usize,
    pub down_payment_values: usize,
    pub grid_points: usize,
    /// Grid points removed because cash required exceeded cash available.
    pub pruned_by_cash: usize,
    /// A candidate breaking both DTI and the expense cap counts in both.
    pub rejected_by_dti: usize,
    pub rejected_by_monthly_expense: usize,
    pub feasible: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSearchOutput {
    pub scenarios: Vec<ScenarioResult>,
    pub statistics: SearchStatistics,
    pub lowest_monthly: Option<ScenarioResult>,
    pub lowest_cash: Option<ScenarioResult>,
    pub lowest_dti: Option<ScenarioResult>,
}

/// Result of pricing a single grid point.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    PrunedByCash { total_cash_used: Money },
    Rejected(Vec<Constraint>),
    Feasible(ScenarioResult),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Search the grid and return scenarios with statistics and warnings.
pub fn search_scenarios(
    input: &ScenarioSearchInput,
) -> MortgageResult<ComputationOutput<ScenarioSearchOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_params(&input.params)?;
    validate_config(&input.config)?;
    validate_grid(&input.params, &input.config)?;

    let mut stats = SearchStatistics::default();
    let mut scenarios = run_grid(&input.params, &input.config, &mut stats, |_| true)?;

    if let Some(p) = first_non_positive_rate_point(&input.params, &input.config) {
        tracing::warn!(points = p, "discount points drive the adjusted rate to or below zero");
        warnings.push(format!(
            "Adjusted rate reaches {} at {} points; rates are not floored at zero",
            adjusted_rate(&input.params, &input.config, p),
            p
        ));
    }

    if scenarios.is_empty() {
        tracing::warn!(grid_points = stats.grid_points, "no scenario satisfies constraints");
        warnings.push("No scenario satisfies the cash, DTI and monthly expense constraints".into());
    }

    let lowest_monthly = best_by(&scenarios, RankingCriterion::TotalMonthly).cloned();
    let lowest_cash = best_by(&scenarios, RankingCriterion::TotalCashUsed).cloned();
    let lowest_dti = best_by(&scenarios, RankingCriterion::Dti).cloned();

    rank_scenarios(&mut scenarios, input.rank_by);
    if let Some(n) = input.top_n {
        scenarios.truncate(n);
    }

    let output = ScenarioSearchOutput {
        scenarios,
        statistics: stats,
        lowest_monthly,
        lowest_cash,
        lowest_dti,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Discount point x down payment grid search with affordability filter",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// All feasible scenarios in grid order. An empty result is not an error.
pub fn enumerate_scenarios(
    params: &InputParameters,
    config: &EnumerationConfig,
) -> MortgageResult<Vec<ScenarioResult>> {
    enumerate_scenarios_with(params, config, |_| true)
}

/// Like [`enumerate_scenarios`], but asks `keep_going(points)` before each
/// row of the points axis. Returning `false` stops the search and yields
/// the scenarios gathered so far.
pub fn enumerate_scenarios_with<F>(
    params: &InputParameters,
    config: &EnumerationConfig,
    keep_going: F,
) -> MortgageResult<Vec<ScenarioResult>>
where
    F: FnMut(u32) -> bool,
{
    validate_params(params)?;
    validate_config(config)?;
    validate_grid(params, config)?;
    let mut stats = SearchStatistics::default();
    run_grid(params, config, &mut stats, keep_going)
}

/// Down-payment ratios from `min` to `max` inclusive. When `step` does not
/// land on `max`, `max` is appended.
pub fn down_payment_grid(min: Rate, max: Rate, step: Rate) -> Vec<Rate> {
    let mut values = Vec::new();
    if step <= Decimal::ZERO || min > max {
        return values;
    }
    let mut current = min;
    while current <= max {
        values.push(current);
        current += step;
    }
    if let Some(&last) = values.last() {
        if last < max {
            values.push(max);
        }
    }
    values
}

/// Price one grid point and classify it.
pub fn evaluate_candidate(
    params: &InputParameters,
    config: &EnumerationConfig,
    points: u32,
    down_pct: Rate,
) -> MortgageResult<Candidate> {
    let twelve = Decimal::from(MONTHS_PER_YEAR);
    let points_dec = Decimal::from(points);

    let down_payment = params.price * down_pct;
    let loan_amount = params.price - down_payment;
    let rate = adjusted_rate(params, config, points);
    let closing_cost = loan_amount * points_dec * config.point_cost_rate;
    let total_cash_used = down_payment + closing_cost;

    if total_cash_used > params.cash_available {
        return Ok(Candidate::PrunedByCash { total_cash_used });
    }

    let monthly_principal_interest = monthly_payment(loan_amount, rate, params.term_years)?;
    let monthly_property_tax = params.price * params.property_tax_rate / twelve;
    let monthly_insurance = params.price * params.insurance_rate / twelve;
    let monthly_pmi = if down_pct < config.pmi_cutoff {
        loan_amount * params.pmi_rate / twelve
    } else {
        Decimal::ZERO
    };
    let total_monthly = monthly_principal_interest
        + monthly_property_tax
        + monthly_insurance
        + monthly_pmi
        + params.hoa_monthly;
    let dti = (total_monthly + params.monthly_liabilities) / (params.annual_income / twelve);

    let broken = affordability::violations(total_cash_used, total_monthly, dti, params);
    if !broken.is_empty() {
        return Ok(Candidate::Rejected(broken));
    }

    Ok(Candidate::Feasible(ScenarioResult {
        points,
        down_pct,
        down_payment,
        loan_amount,
        adjusted_rate: rate,
        closing_cost,
        total_cash_used,
        monthly_principal_interest,
        monthly_property_tax,
        monthly_insurance,
        monthly_pmi,
        total_monthly,
        dti,
    }))
}

// ---------------------------------------------------------------------------
// Grid walk
// ---------------------------------------------------------------------------

fn run_grid<F>(
    params: &InputParameters,
    config: &EnumerationConfig,
    stats: &mut SearchStatistics,
    mut keep_going: F,
) -> MortgageResult<Vec<ScenarioResult>>
where
    F: FnMut(u32) -> bool,
{
    let downs = down_payment_grid(
        params.min_down_pct,
        params.max_down_pct,
        config.down_payment_step,
    );
    stats.points_values = config.max_points as usize + 1;
    stats.down_payment_values = downs.len();

    tracing::debug!(
        points_values = stats.points_values,
        down_payment_values = stats.down_payment_values,
        "enumerating mortgage scenarios"
    );

    let mut scenarios = Vec::new();
    for points in 0..=config.max_points {
        if !keep_going(points) {
            tracing::debug!(points, "scenario search stopped by caller");
            break;
        }
        for &down_pct in &downs {
            stats.grid_points += 1;
            match evaluate_candidate(params, config, points, down_pct)? {
                Candidate::PrunedByCash { total_cash_used } => {
                    tracing::trace!(points, %down_pct, %total_cash_used, "pruned: insufficient cash");
                    stats.pruned_by_cash += 1;
                }
                Candidate::Rejected(broken) => {
                    if broken.contains(&Constraint::Dti) {
                        stats.rejected_by_dti += 1;
                    }
                    if broken.contains(&Constraint::MonthlyExpense) {
                        stats.rejected_by_monthly_expense += 1;
                    }
                }
                Candidate::Feasible(s) => scenarios.push(s),
            }
        }
    }

    stats.feasible = scenarios.len();
    tracing::debug!(
        grid_points = stats.grid_points,
        pruned_by_cash = stats.pruned_by_cash,
        rejected_by_dti = stats.rejected_by_dti,
        rejected_by_monthly_expense = stats.rejected_by_monthly_expense,
        feasible = stats.feasible,
        "scenario search complete"
    );

    Ok(scenarios)
}

fn adjusted_rate(params: &InputParameters, config: &EnumerationConfig, points: u32) -> Rate {
    params.base_interest_rate - Decimal::from(points) * config.point_rate_discount
}

fn first_non_positive_rate_point(params: &InputParameters, config: &EnumerationConfig) -> Option<u32> {
    (0..=config.max_points).find(|&p| adjusted_rate(params, config, p) <= Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MortgageError;
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

    fn standard_params() -> InputParameters {
        InputParameters {
            price: dec!(400_000),
            hoa_monthly: dec!(100),
            property_tax_rate: dec!(0.012),
            insurance_rate: dec!(0.003),
            pmi_rate: dec!(0.006),
            cash_available: dec!(100_000),
            min_down_pct: dec!(0.05),
            max_down_pct: dec!(0.25),
            base_interest_rate: dec!(0.065),
            term_years: 30,
            monthly_liabilities: dec!(400),
            annual_income: dec!(160_000),
            max_dti: dec!(0.43),
            max_monthly_expense: None,
        }
    }

    fn feasible(c: Candidate) -> ScenarioResult {
        match c {
            Candidate::Feasible(s) => s,
            other => panic!("Expected feasible candidate, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // Down payment axis
    // -----------------------------------------------------------------------

    #[test]
    fn test_grid_inclusive_exact_steps() {
        let g = down_payment_grid(Decimal::ZERO, Decimal::ONE, dec!(0.01));
        assert_eq!(g.len(), 101);
        assert_eq!(g[0], Decimal::ZERO);
        assert_eq!(g[20], dec!(0.20));
        assert_eq!(*g.last().unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_grid_appends_max_when_step_overshoots() {
        let g = down_payment_grid(dec!(0.10), dec!(0.25), dec!(0.10));
        assert_eq!(g, vec![dec!(0.10), dec!(0.20), dec!(0.25)]);
    }

    #[test]
    fn test_grid_collapses_when_min_equals_max() {
        let g = down_payment_grid(dec!(0.15), dec!(0.15), dec!(0.005));
        assert_eq!(g, vec![dec!(0.15)]);
    }

    // -----------------------------------------------------------------------
    // Candidate pricing
    // -----------------------------------------------------------------------

    #[test]
    fn test_candidate_figures() {
        let p = standard_params();
        let s = feasible(evaluate_candidate(&p, &EnumerationConfig::default(), 2, dec!(0.10)).unwrap());

        assert_eq!(s.down_payment, dec!(40_000));
        assert_eq!(s.loan_amount, dec!(360_000));
        assert_eq!(s.adjusted_rate, dec!(0.060));
        assert_eq!(s.closing_cost, dec!(7200));
        assert_eq!(s.total_cash_used, dec!(47_200));
        assert_eq!(s.monthly_property_tax, dec!(400));
        assert_eq!(s.monthly_insurance, dec!(100));
        assert_eq!(s.monthly_pmi, dec!(180));
        // 360k @ 6% / 30y
        assert_close(s.monthly_principal_interest, dec!(2158.38), TOL, "P&I");
        assert_eq!(
            s.total_monthly,
            s.monthly_principal_interest + dec!(400) + dec!(100) + dec!(180) + dec!(100)
        );
        assert_eq!(s.dti, (s.total_monthly + dec!(400)) / (dec!(160_000) / dec!(12)));
    }

    #[test]
    fn test_pmi_boundary_at_twenty_percent() {
        let p = standard_params();
        let cfg = EnumerationConfig::default();
        let at = feasible(evaluate_candidate(&p, &cfg, 0, dec!(0.20)).unwrap());
        let below = feasible(evaluate_candidate(&p, &cfg, 0, dec!(0.19)).unwrap());
        assert_eq!(at.monthly_pmi, Decimal::ZERO);
        assert!(below.monthly_pmi > Decimal::ZERO);
    }

    #[test]
    fn test_cash_shortfall_is_pruned() {
        let mut p = standard_params();
        p.cash_available = dec!(20_000);
        let c = evaluate_candidate(&p, &EnumerationConfig::default(), 0, dec!(0.10)).unwrap();
        assert_eq!(
            c,
            Candidate::PrunedByCash {
                total_cash_used: dec!(40_000)
            }
        );
    }

    #[test]
    fn test_dti_rejection_reported() {
        let mut p = standard_params();
        p.annual_income = dec!(40_000);
        let c = evaluate_candidate(&p, &EnumerationConfig::default(), 0, dec!(0.10)).unwrap();
        assert_eq!(c, Candidate::Rejected(vec![Constraint::Dti]));
    }

    #[test]
    fn test_negative_rate_is_not_clamped() {
        let mut p = standard_params();
        p.base_interest_rate = dec!(0.01);
        p.cash_available = dec!(200_000);
        let cfg = EnumerationConfig::default();
        let s = feasible(evaluate_candidate(&p, &cfg, 10, dec!(0.20)).unwrap());
        assert_eq!(s.adjusted_rate, dec!(-0.015));
        assert!(s.monthly_principal_interest > Decimal::ZERO);
        assert!(s.monthly_principal_interest < s.loan_amount / dec!(360));
    }

    #[test]
    fn test_zero_adjusted_rate_uses_straight_line() {
        let mut p = standard_params();
        p.base_interest_rate = dec!(0.025);
        p.cash_available = dec!(200_000);
        let s = feasible(evaluate_candidate(&p, &EnumerationConfig::default(), 10, dec!(0.20)).unwrap());
        assert_eq!(s.adjusted_rate, Decimal::ZERO);
        assert_eq!(s.monthly_principal_interest, s.loan_amount / dec!(360));
    }

    // -----------------------------------------------------------------------
    // Enumeration
    // -----------------------------------------------------------------------

    #[test]
    fn test_enumeration_order() {
        let s = enumerate_scenarios(&standard_params(), &EnumerationConfig::default()).unwrap();
        assert!(!s.is_empty());
        for pair in s.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.points < b.points || (a.points == b.points && a.down_pct < b.down_pct),
                "out of order: ({}, {}) before ({}, {})",
                a.points,
                a.down_pct,
                b.points,
                b.down_pct
            );
        }
    }

    #[test]
    fn test_invalid_input_fails_before_enumeration() {
        let mut p = standard_params();
        p.price = Decimal::ZERO;
        assert!(enumerate_scenarios(&p, &EnumerationConfig::default()).is_err());
    }

    #[test]
    fn test_cancellation_between_rows() {
        let p = standard_params();
        let cfg = EnumerationConfig::default();
        let s = enumerate_scenarios_with(&p, &cfg, |points| points < 2).unwrap();
        assert!(!s.is_empty());
        assert!(s.iter().all(|x| x.points < 2));
    }

    #[test]
    fn test_search_statistics_add_up() {
        let input = ScenarioSearchInput {
            params: standard_params(),
            config: EnumerationConfig::default(),
            rank_by: RankingCriterion::Enumeration,
            top_n: None,
        };
        let out = search_scenarios(&input).unwrap();
        let st = &out.result.statistics;
        assert_eq!(st.points_values, 11);
        assert_eq!(st.down_payment_values, 21);
        assert_eq!(st.grid_points, 231);
        assert_eq!(st.feasible, out.result.scenarios.len());
        // No expense cap, so every non-pruned infeasible point broke DTI.
        assert_eq!(st.grid_points, st.pruned_by_cash + st.rejected_by_dti + st.feasible);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_double_rejection_counts_in_both_and_never_as_cash() {
        let mut p = standard_params();
        p.annual_income = dec!(40_000);
        p.cash_available = dec!(1_000_000);
        p.max_monthly_expense = Some(Decimal::ZERO);
        let input = ScenarioSearchInput {
            params: p,
            config: EnumerationConfig::default(),
            rank_by: RankingCriterion::Enumeration,
            top_n: None,
        };
        let st = search_scenarios(&input).unwrap().result.statistics;
        assert_eq!(st.pruned_by_cash, 0);
        assert_eq!(st.feasible, 0);
        assert_eq!(st.rejected_by_dti, st.grid_points);
        assert_eq!(st.rejected_by_monthly_expense, st.grid_points);
    }

    #[test]
    fn test_search_ranking_and_top_n() {
        let input = ScenarioSearchInput {
            params: standard_params(),
            config: EnumerationConfig::default(),
            rank_by: RankingCriterion::TotalMonthly,
            top_n: Some(3),
        };
        let out = search_scenarios(&input).unwrap();
        let r = &out.result;
        assert_eq!(r.scenarios.len(), 3);
        assert_eq!(Some(&r.scenarios[0]), r.lowest_monthly.as_ref());
        assert!(r.scenarios[0].total_monthly <= r.scenarios[1].total_monthly);
        assert!(r.scenarios[1].total_monthly <= r.scenarios[2].total_monthly);
    }

    #[test]
    fn test_search_empty_result_warns() {
        let mut p = standard_params();
        p.cash_available = Decimal::ZERO;
        let input = ScenarioSearchInput {
            params: p,
            config: EnumerationConfig::default(),
            rank_by: RankingCriterion::Enumeration,
            top_n: None,
        };
        let out = search_scenarios(&input).unwrap();
        assert!(out.result.scenarios.is_empty());
        assert!(out.result.lowest_monthly.is_none());
        assert!(out.warnings.iter().any(|w| w.contains("No scenario")));
    }

    #[test]
    fn test_oversized_point_discount_rejected_up_front() {
        let cfg = EnumerationConfig {
            point_rate_discount: dec!(2),
            ..EnumerationConfig::default()
        };
        let mut calls = 0;
        let err = enumerate_scenarios_with(&standard_params(), &cfg, |_| {
            calls += 1;
            true
        })
        .unwrap_err();
        match err {
            MortgageError::InvalidInput { field, .. } => assert_eq!(field, "point_rate_discount"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_high_rate_long_term_grid_prices_without_overflow() {
        let mut p = standard_params();
        p.base_interest_rate = Decimal::ONE;
        p.term_years = 63;
        p.min_down_pct = dec!(0.10);
        p.max_down_pct = dec!(0.10);
        p.annual_income = dec!(5_000_000);
        p.cash_available = dec!(200_000);
        let s = enumerate_scenarios(&p, &EnumerationConfig::default()).unwrap();
        assert_eq!(s.len(), 11);
        // Interest-only limit: loan * r / 12
        assert_close(s[0].monthly_principal_interest, dec!(30_000), TOL, "0 points");
    }

    #[test]
    fn test_search_warns_on_non_positive_rate() {
        let mut p = standard_params();
        p.base_interest_rate = dec!(0.02);
        let input = ScenarioSearchInput {
            params: p,
            config: EnumerationConfig::default(),
            rank_by: RankingCriterion::Enumeration,
            top_n: None,
        };
        let out = search_scenarios(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("at 8 points")));
    }
}
