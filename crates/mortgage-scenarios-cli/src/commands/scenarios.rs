use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_scenarios_core::amortization::milestones::{
    self, default_milestone_years, LoanDetailsInput,
};
use mortgage_scenarios_core::scenarios::enumerator::{self, ScenarioSearchInput};
use mortgage_scenarios_core::scenarios::inputs::{EnumerationConfig, PercentageInputs};
use mortgage_scenarios_core::scenarios::ranking::RankingCriterion;

use crate::input;

/// Buyer parameters as entered on a form. Rates and percentages are whole
/// percent (6.5 = 6.5%).
#[derive(Args)]
pub struct FormArgs {
    /// Home price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Monthly HOA dues
    #[arg(long, default_value = "0")]
    pub hoa: Decimal,

    /// Annual property tax, percent of price
    #[arg(long)]
    pub tax: Option<Decimal>,

    /// Annual insurance, percent of price
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Annual PMI, percent of loan amount
    #[arg(long)]
    pub pmi: Option<Decimal>,

    /// Cash available for down payment and closing costs
    #[arg(long)]
    pub cash: Option<Decimal>,

    /// Minimum down payment, percent (default 0)
    #[arg(long)]
    pub min_down: Option<Decimal>,

    /// Maximum down payment, percent (default 100)
    #[arg(long)]
    pub max_down: Option<Decimal>,

    /// Interest rate before points, percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value = "30")]
    pub term: u32,

    /// Existing monthly debt payments
    #[arg(long, default_value = "0")]
    pub liabilities: Decimal,

    /// Gross annual income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Maximum debt-to-income ratio, percent
    #[arg(long)]
    pub max_dti: Option<Decimal>,

    /// Cap on total monthly housing cost
    #[arg(long)]
    pub max_expense: Option<Decimal>,

    /// Highest number of discount points to explore
    #[arg(long)]
    pub max_points: Option<u32>,

    /// Down payment step as a decimal ratio (e.g. 0.005)
    #[arg(long)]
    pub down_payment_step: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RankArg {
    Enumeration,
    Monthly,
    Cash,
    Dti,
    Rate,
}

impl From<RankArg> for RankingCriterion {
    fn from(arg: RankArg) -> Self {
        match arg {
            RankArg::Enumeration => RankingCriterion::Enumeration,
            RankArg::Monthly => RankingCriterion::TotalMonthly,
            RankArg::Cash => RankingCriterion::TotalCashUsed,
            RankArg::Dti => RankingCriterion::Dti,
            RankArg::Rate => RankingCriterion::AdjustedRate,
        }
    }
}

/// Arguments for the scenario search
#[derive(Args)]
pub struct ScenariosArgs {
    #[command(flatten)]
    pub form: FormArgs,

    /// Order scenarios by this measure
    #[arg(long, value_enum)]
    pub rank_by: Option<RankArg>,

    /// Keep only the first N scenarios after ranking
    #[arg(long)]
    pub top: Option<usize>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for scenario milestones
#[derive(Args)]
pub struct LoanDetailsArgs {
    #[command(flatten)]
    pub form: FormArgs,

    #[arg(long, value_enum)]
    pub rank_by: Option<RankArg>,

    #[arg(long)]
    pub top: Option<usize>,

    /// Milestone years, comma separated (default 5,10,15)
    #[arg(long, value_delimiter = ',')]
    pub milestones: Vec<u32>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_scenarios(args: ScenariosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut search: ScenarioSearchInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if args.form.price.is_some() {
        ScenarioSearchInput {
            params: args.form.to_percentage_inputs()?.normalize(),
            config: args.form.config(),
            rank_by: RankingCriterion::Enumeration,
            top_n: None,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--price and friends, --input <file>, or stdin required for scenario search".into());
    };

    if let Some(rank) = args.rank_by {
        search.rank_by = rank.into();
    }
    if args.top.is_some() {
        search.top_n = args.top;
    }

    let result = enumerator::search_scenarios(&search)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_loan_details(args: LoanDetailsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut details: LoanDetailsInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if args.form.price.is_some() {
        LoanDetailsInput {
            params: args.form.to_percentage_inputs()?.normalize(),
            config: args.form.config(),
            rank_by: RankingCriterion::Enumeration,
            top_n: None,
            milestone_years: default_milestone_years(),
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--price and friends, --input <file>, or stdin required for loan details".into());
    };

    if let Some(rank) = args.rank_by {
        details.rank_by = rank.into();
    }
    if args.top.is_some() {
        details.top_n = args.top;
    }
    if !args.milestones.is_empty() {
        details.milestone_years = args.milestones.into_iter().collect();
    }

    let result = milestones::loan_details(&details)?;
    Ok(serde_json::to_value(result)?)
}

impl FormArgs {
    fn to_percentage_inputs(&self) -> Result<PercentageInputs, Box<dyn std::error::Error>> {
        Ok(PercentageInputs {
            price: self.price.ok_or("--price is required (or provide --input)")?,
            hoa_monthly: self.hoa,
            property_tax_pct: self.tax.ok_or("--tax is required (or provide --input)")?,
            insurance_pct: self
                .insurance
                .ok_or("--insurance is required (or provide --input)")?,
            pmi_pct: self.pmi.ok_or("--pmi is required (or provide --input)")?,
            cash_available: self.cash.ok_or("--cash is required (or provide --input)")?,
            min_down_pct: self.min_down,
            max_down_pct: self.max_down,
            interest_rate_pct: self.rate.ok_or("--rate is required (or provide --input)")?,
            term_years: self.term,
            monthly_liabilities: self.liabilities,
            annual_income: self.income.ok_or("--income is required (or provide --input)")?,
            max_dti_pct: self.max_dti.ok_or("--max-dti is required (or provide --input)")?,
            max_monthly_expense: self.max_expense,
        })
    }

    fn config(&self) -> EnumerationConfig {
        let mut config = EnumerationConfig::default();
        if let Some(points) = self.max_points {
            config.max_points = points;
        }
        if let Some(step) = self.down_payment_step {
            config.down_payment_step = step;
        }
        config
    }
}
