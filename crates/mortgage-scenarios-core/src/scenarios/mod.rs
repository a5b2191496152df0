pub mod affordability;
pub mod enumerator;
pub mod inputs;
pub mod ranking;

pub use affordability::{is_feasible, Constraint};
pub use enumerator::{
    enumerate_scenarios, enumerate_scenarios_with, search_scenarios, ScenarioResult,
    ScenarioSearchInput, ScenarioSearchOutput,
};
pub use inputs::{EnumerationConfig, InputParameters, PercentageInputs};
pub use ranking::{rank_scenarios, RankingCriterion};
