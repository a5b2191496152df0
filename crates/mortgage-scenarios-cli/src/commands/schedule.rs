use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use mortgage_scenarios_core::amortization::schedule::{self, Granularity, ScheduleInput};

use crate::input;

#[derive(Args)]
pub struct ScheduleArgs {
    /// Amount borrowed
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Annual interest rate, percent (6.5 = 6.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value = "30")]
    pub term: u32,

    /// Origination date (YYYY-MM-DD); rows then carry period end dates
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Emit every month instead of yearly totals
    #[arg(long)]
    pub monthly: bool,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut sched_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(loan_amount) = args.loan_amount {
        let rate = args.rate.ok_or("--rate is required (or provide --input)")?;
        ScheduleInput {
            loan_amount,
            annual_rate: rate / dec!(100),
            term_years: args.term,
            start_date: args.start_date,
            granularity: Granularity::Yearly,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--loan-amount/--rate, --input <file>, or stdin required for amortization schedule".into());
    };

    if args.monthly {
        sched_input.granularity = Granularity::Monthly;
    }

    let result = schedule::build_schedule(&sched_input)?;
    Ok(serde_json::to_value(result)?)
}
