pub mod scenarios;
pub mod schedule;
