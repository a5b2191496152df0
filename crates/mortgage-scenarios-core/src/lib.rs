//! Mortgage financing scenario explorer.
//!
//! Enumerates discount point × down payment combinations for a single home
//! purchase, filters them by cash, debt-to-income and monthly-cost limits,
//! and projects amortization for the survivors. All arithmetic is
//! `rust_decimal::Decimal`; formatting is left to callers.

pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "amortization")]
pub mod amortization;

pub use error::MortgageError;
pub use types::*;

/// Standard result type for all mortgage-scenario operations
pub type MortgageResult<T> = Result<T, MortgageError>;
