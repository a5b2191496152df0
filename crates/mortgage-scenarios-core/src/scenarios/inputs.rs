//! Buyer parameters, grid configuration and form-input normalisation.
//!
//! Everything that enters the enumerator passes through [`validate_params`]
//! and [`validate_config`] exactly once. Downstream code assumes the
//! invariants those functions establish.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::types::{Money, Percent, Rate, MONTHS_PER_YEAR};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Highest discount point count explored by default.
pub const DEFAULT_MAX_POINTS: u32 = 10;

/// Rate reduction bought by one discount point (0.25%).
pub const DEFAULT_POINT_RATE_DISCOUNT: Rate = dec!(0.0025);

/// Closing cost of one discount point as a fraction of the loan (1%).
pub const DEFAULT_POINT_COST_RATE: Rate = dec!(0.01);

/// Down-payment axis step (1 percentage point).
pub const DEFAULT_DOWN_PAYMENT_STEP: Rate = dec!(0.01);

/// Down-payment ratio at or above which no PMI is charged.
pub const DEFAULT_PMI_CUTOFF: Rate = dec!(0.20);

/// Upper bound on the points axis to keep the grid small.
pub const MAX_POINTS_LIMIT: u32 = 100;

/// Longest supported loan term.
pub const MAX_TERM_YEARS: u32 = 100;

const DEFAULT_TERM_YEARS: u32 = 30;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Validated buyer and property parameters. All rates are decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputParameters {
    /// Purchase price of the home.
    pub price: Money,
    /// Monthly HOA dues.
    #[serde(default)]
    pub hoa_monthly: Money,
    /// Annual property tax as a fraction of price.
    pub property_tax_rate: Rate,
    /// Annual homeowner's insurance as a fraction of price.
    pub insurance_rate: Rate,
    /// Annual PMI as a fraction of the loan amount.
    pub pmi_rate: Rate,
    /// Cash available for down payment and closing costs.
    pub cash_available: Money,
    #[serde(default)]
    pub min_down_pct: Rate,
    #[serde(default = "default_max_down_pct")]
    pub max_down_pct: Rate,
    /// Nominal annual rate before any discount points.
    pub base_interest_rate: Rate,
    pub term_years: u32,
    /// Existing monthly debt payments (car, student loans, cards).
    #[serde(default)]
    pub monthly_liabilities: Money,
    /// Gross annual income.
    pub annual_income: Money,
    /// Maximum debt-to-income ratio (e.g. 0.43).
    pub max_dti: Rate,
    /// Cap on the total monthly housing cost. `None` leaves it unconstrained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_monthly_expense: Option<Money>,
}

fn default_max_down_pct() -> Rate {
    Decimal::ONE
}

/// Shape of the (points × down payment) grid and the pricing of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumerationConfig {
    pub max_points: u32,
    pub point_rate_discount: Rate,
    pub point_cost_rate: Rate,
    pub down_payment_step: Rate,
    pub pmi_cutoff: Rate,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        EnumerationConfig {
            max_points: DEFAULT_MAX_POINTS,
            point_rate_discount: DEFAULT_POINT_RATE_DISCOUNT,
            point_cost_rate: DEFAULT_POINT_COST_RATE,
            down_payment_step: DEFAULT_DOWN_PAYMENT_STEP,
            pmi_cutoff: DEFAULT_PMI_CUTOFF,
        }
    }
}

/// Parameters as typed into a form: percentages are whole percent
/// (6.5 = 6.5%) and the optional fields may be left blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentageInputs {
    pub price: Money,
    #[serde(default)]
    pub hoa_monthly: Money,
    pub property_tax_pct: Percent,
    pub insurance_pct: Percent,
    pub pmi_pct: Percent,
    pub cash_available: Money,
    #[serde(default)]
    pub min_down_pct: Option<Percent>,
    #[serde(default)]
    pub max_down_pct: Option<Percent>,
    pub interest_rate_pct: Percent,
    #[serde(default = "default_term_years")]
    pub term_years: u32,
    #[serde(default)]
    pub monthly_liabilities: Money,
    pub annual_income: Money,
    pub max_dti_pct: Percent,
    #[serde(default)]
    pub max_monthly_expense: Option<Money>,
}

fn default_term_years() -> u32 {
    DEFAULT_TERM_YEARS
}

impl PercentageInputs {
    /// Convert form percentages to decimal rates and fill in defaults.
    ///
    /// The result is not validated; pass it through [`validate_params`].
    pub fn normalize(&self) -> InputParameters {
        let hundred = dec!(100);
        InputParameters {
            price: self.price,
            hoa_monthly: self.hoa_monthly,
            property_tax_rate: self.property_tax_pct / hundred,
            insurance_rate: self.insurance_pct / hundred,
            pmi_rate: self.pmi_pct / hundred,
            cash_available: self.cash_available,
            min_down_pct: self.min_down_pct.map_or(Decimal::ZERO, |p| p / hundred),
            max_down_pct: self.max_down_pct.map_or(Decimal::ONE, |p| p / hundred),
            base_interest_rate: self.interest_rate_pct / hundred,
            term_years: self.term_years,
            monthly_liabilities: self.monthly_liabilities,
            annual_income: self.annual_income,
            max_dti: self.max_dti_pct / hundred,
            max_monthly_expense: self.max_monthly_expense,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject parameter sets that would make the enumeration meaningless.
pub fn validate_params(params: &InputParameters) -> MortgageResult<()> {
    if params.price <= Decimal::ZERO {
        return Err(MortgageError::invalid("price", "Home price must be positive"));
    }
    if params.annual_income <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "annual_income",
            "Annual income must be positive",
        ));
    }
    if params.term_years == 0 {
        return Err(MortgageError::invalid(
            "term_years",
            "Loan term must be at least one year",
        ));
    }
    if params.term_years > MAX_TERM_YEARS {
        return Err(MortgageError::invalid(
            "term_years",
            format!("Loan term cannot exceed {MAX_TERM_YEARS} years"),
        ));
    }

    non_negative("hoa_monthly", params.hoa_monthly)?;
    non_negative("cash_available", params.cash_available)?;
    non_negative("monthly_liabilities", params.monthly_liabilities)?;
    if let Some(cap) = params.max_monthly_expense {
        non_negative("max_monthly_expense", cap)?;
    }

    unit_interval("property_tax_rate", params.property_tax_rate)?;
    unit_interval("insurance_rate", params.insurance_rate)?;
    unit_interval("pmi_rate", params.pmi_rate)?;
    unit_interval("base_interest_rate", params.base_interest_rate)?;
    unit_interval("max_dti", params.max_dti)?;
    unit_interval("min_down_pct", params.min_down_pct)?;
    unit_interval("max_down_pct", params.max_down_pct)?;

    if params.min_down_pct > params.max_down_pct {
        return Err(MortgageError::invalid(
            "min_down_pct",
            format!(
                "Minimum down payment {} exceeds maximum {}",
                params.min_down_pct, params.max_down_pct
            ),
        ));
    }

    Ok(())
}

/// Reject grid configurations that cannot produce a finite, ordered grid.
pub fn validate_config(config: &EnumerationConfig) -> MortgageResult<()> {
    if config.down_payment_step <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "down_payment_step",
            "Step must be positive",
        ));
    }
    if config.max_points > MAX_POINTS_LIMIT {
        return Err(MortgageError::invalid(
            "max_points",
            format!("At most {MAX_POINTS_LIMIT} discount points are supported"),
        ));
    }
    non_negative("point_rate_discount", config.point_rate_discount)?;
    non_negative("point_cost_rate", config.point_cost_rate)?;
    unit_interval("pmi_cutoff", config.pmi_cutoff)?;
    Ok(())
}

/// Reject a points axis that pushes the adjusted rate to a monthly rate of
/// -100% or below. Negative rates above that bound stay valid.
pub fn validate_grid(params: &InputParameters, config: &EnumerationConfig) -> MortgageResult<()> {
    let lowest = params.base_interest_rate
        - Decimal::from(config.max_points) * config.point_rate_discount;
    if lowest <= -Decimal::from(MONTHS_PER_YEAR) {
        return Err(MortgageError::invalid(
            "point_rate_discount",
            format!(
                "{} points at {} per point bring the annual rate to {lowest}",
                config.max_points, config.point_rate_discount
            ),
        ));
    }
    Ok(())
}

fn non_negative(field: &str, value: Decimal) -> MortgageResult<()> {
    if value < Decimal::ZERO {
        return Err(MortgageError::invalid(field, "Value cannot be negative"));
    }
    Ok(())
}

fn unit_interval(field: &str, value: Decimal) -> MortgageResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(MortgageError::invalid(
            field,
            format!("Must be between 0 and 1 (got {value})"),
        ));
    }
    Ok(())
}
