//! Balance and interest figures at fixed year marks, for side-by-side
//! comparison of scenarios.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;

use super::schedule::{schedule, AmortizationYear};
use crate::scenarios::enumerator::{search_scenarios, ScenarioResult, ScenarioSearchInput};
use crate::scenarios::inputs::{EnumerationConfig, InputParameters};
use crate::scenarios::ranking::RankingCriterion;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::MortgageResult;

const DEFAULT_MILESTONE_YEARS: [u32; 3] = [5, 10, 15];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub year: u32,
    pub remaining_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// A scenario with its milestone figures and lifetime totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDetails {
    pub scenario: ScenarioResult,
    pub term_years: u32,
    /// Ascending by year.
    pub milestones: Vec<Milestone>,
    pub total_interest: Money,
    pub total_payments: Money,
}

impl LoanDetails {
    pub fn milestone(&self, year: u32) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.year == year)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDetailsInput {
    pub params: InputParameters,
    #[serde(default)]
    pub config: EnumerationConfig,
    #[serde(default)]
    pub rank_by: RankingCriterion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
    #[serde(default = "default_milestone_years")]
    pub milestone_years: BTreeSet<u32>,
}

pub fn default_milestone_years() -> BTreeSet<u32> {
    DEFAULT_MILESTONE_YEARS.into_iter().collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDetailsOutput {
    pub loans: Vec<LoanDetails>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Enumerate, rank and attach milestones to every selected scenario.
pub fn loan_details(input: &LoanDetailsInput) -> MortgageResult<ComputationOutput<LoanDetailsOutput>> {
    let start = Instant::now();

    let search = search_scenarios(&ScenarioSearchInput {
        params: input.params.clone(),
        config: input.config.clone(),
        rank_by: input.rank_by,
        top_n: input.top_n,
    })?;
    let mut warnings = search.warnings;

    let term = input.params.term_years;
    if let Some(&past) = input.milestone_years.iter().find(|&&y| y > term) {
        warnings.push(format!(
            "Milestone year {past} is past the {term}-year term; payoff figures are reported"
        ));
    }

    let loans = search
        .result
        .scenarios
        .iter()
        .map(|s| attach_milestones(s, term, &input.milestone_years))
        .collect::<MortgageResult<Vec<_>>>()?;

    tracing::debug!(loans = loans.len(), milestones = input.milestone_years.len(), "attached loan milestones");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Scenario search with amortization milestones",
        input,
        warnings,
        elapsed,
        LoanDetailsOutput { loans },
    ))
}

/// Schedule the scenario's loan over `term_years` and pick out `years`.
pub fn attach_milestones(
    scenario: &ScenarioResult,
    term_years: u32,
    years: &BTreeSet<u32>,
) -> MortgageResult<LoanDetails> {
    let sched = schedule(scenario.loan_amount, scenario.adjusted_rate, term_years)?;
    let total_interest = sched
        .last()
        .map(|y| y.cumulative_interest)
        .unwrap_or(Decimal::ZERO);

    Ok(LoanDetails {
        scenario: scenario.clone(),
        term_years,
        milestones: milestones_from_schedule(scenario, &sched, years),
        total_interest,
        total_payments: scenario.loan_amount + total_interest,
    })
}

/// Milestones read off an existing yearly schedule.
///
/// Year 0 is the untouched loan. Years past the end of the schedule report
/// the payoff state.
pub fn milestones_from_schedule(
    scenario: &ScenarioResult,
    sched: &[AmortizationYear],
    years: &BTreeSet<u32>,
) -> Vec<Milestone> {
    years
        .iter()
        .map(|&year| {
            let row = match year {
                0 => None,
                y => sched.get(y as usize - 1).or_else(|| sched.last()),
            };
            let (remaining_balance, cumulative_interest) = match row {
                Some(r) => (r.remaining_balance, r.cumulative_interest),
                None => (scenario.loan_amount, Decimal::ZERO),
            };
            Milestone {
                year,
                remaining_balance,
                cumulative_interest,
                cumulative_principal: scenario.loan_amount - remaining_balance,
            }
        })
        .collect()
}
