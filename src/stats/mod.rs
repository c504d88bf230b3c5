//! Stats module - Wage and share derivations

mod calculator;

pub use calculator::{StatsCalculator, HOURS_PER_YEAR};
