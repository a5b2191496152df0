use serde::{Deserialize, Serialize};

use super::enumerator::ScenarioResult;
use crate::types::Money;

/// Affordability measure used to order feasible scenarios (ascending).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingCriterion {
    /// Keep grid order: points ascending, then down payment ascending.
    #[default]
    Enumeration,
    TotalMonthly,
    TotalCashUsed,
    Dti,
    AdjustedRate,
}

impl RankingCriterion {
    fn key(self, s: &ScenarioResult) -> Option<Money> {
        match self {
            RankingCriterion::Enumeration => None,
            RankingCriterion::TotalMonthly => Some(s.total_monthly),
            RankingCriterion::TotalCashUsed => Some(s.total_cash_used),
            RankingCriterion::Dti => Some(s.dti),
            RankingCriterion::AdjustedRate => Some(s.adjusted_rate),
        }
    }
}

/// Sort in place by `criterion`. The sort is stable, so ties keep
/// enumeration order.
pub fn rank_scenarios(scenarios: &mut [ScenarioResult], criterion: RankingCriterion) {
    if criterion == RankingCriterion::Enumeration {
        return;
    }
    scenarios.sort_by(|a, b| criterion.key(a).cmp(&criterion.key(b)));
}

/// The first scenario minimising `criterion`, or the first in grid order
/// for [`RankingCriterion::Enumeration`].
pub fn best_by(scenarios: &[ScenarioResult], criterion: RankingCriterion) -> Option<&ScenarioResult> {
    scenarios.iter().min_by_key(|s| criterion.key(s))
}
