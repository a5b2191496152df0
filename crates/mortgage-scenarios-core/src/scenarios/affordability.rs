use serde::{Deserialize, Serialize};

use super::inputs::InputParameters;
use crate::types::{Money, Rate};

/// A borrower constraint a candidate scenario can break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constraint {
    /// Down payment plus closing costs exceed available cash.
    Cash,
    /// Debt-to-income ratio above the borrower's maximum.
    Dti,
    /// Total monthly housing cost above the optional cap.
    MonthlyExpense,
}

/// Every constraint the candidate breaks, in a fixed order.
pub fn violations(
    cash_used: Money,
    total_monthly: Money,
    dti: Rate,
    params: &InputParameters,
) -> Vec<Constraint> {
    let mut broken = Vec::new();
    if cash_used > params.cash_available {
        broken.push(Constraint::Cash);
    }
    if dti > params.max_dti {
        broken.push(Constraint::Dti);
    }
    if let Some(cap) = params.max_monthly_expense {
        if total_monthly > cap {
            broken.push(Constraint::MonthlyExpense);
        }
    }
    broken
}

/// True when the candidate satisfies cash, DTI and monthly-expense limits.
pub fn is_feasible(cash_used: Money, total_monthly: Money, dti: Rate, params: &InputParameters) -> bool {
    violations(cash_used, total_monthly, dti, params).is_empty()
}
