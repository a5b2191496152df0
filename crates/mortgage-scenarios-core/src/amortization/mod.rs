pub mod milestones;
pub mod schedule;

pub use milestones::{attach_milestones, loan_details, LoanDetails, LoanDetailsInput, Milestone};
pub use schedule::{build_schedule, monthly_schedule, schedule, AmortizationMonth, AmortizationYear};
