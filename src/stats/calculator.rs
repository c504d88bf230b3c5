//! Statistics Calculator Module
//! Handles wage annualization, ratios, employment shares and ranking order.

use statrs::statistics::{Data, Median};
use std::cmp::Ordering;

/// Standard full-time hours per year used to annualize hourly wages.
pub const HOURS_PER_YEAR: f64 = 2080.0;

/// Handles the small numeric derivations shared by the query functions.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Annualize an hourly wage.
    pub fn annualize(hourly: f64) -> f64 {
        hourly * HOURS_PER_YEAR
    }

    /// Prefer the annual figure, else annualize the hourly one.
    pub fn annual_or_hourly(annual: Option<f64>, hourly: Option<f64>) -> Option<f64> {
        annual.or_else(|| hourly.map(Self::annualize))
    }

    /// Ratio of two optional values; NaN unless both exist and the denominator is positive.
    pub fn relative_ratio(value: Option<f64>, baseline: Option<f64>) -> f64 {
        match (value, baseline) {
            (Some(v), Some(b)) if b > 0.0 && !v.is_nan() => v / b,
            _ => f64::NAN,
        }
    }

    /// Median of the present values, NaN when there are none.
    pub fn median(values: impl IntoIterator<Item = Option<f64>>) -> f64 {
        let present: Vec<f64> = values
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect();
        if present.is_empty() {
            return f64::NAN;
        }
        Data::new(present).median()
    }

    /// Percent share of each value within the total of the present values.
    ///
    /// Absent values stay absent, and every share is absent when the total is
    /// not positive.
    pub fn share_percentages(values: &[Option<f64>]) -> Vec<Option<f64>> {
        let total: f64 = values.iter().flatten().sum();
        if total <= 0.0 {
            return vec![None; values.len()];
        }
        values
            .iter()
            .map(|v| v.map(|v| v / total * 100.0))
            .collect()
    }

    /// Descending order with absent values last.
    pub fn cmp_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    /// Render an optional value with the NaN sentinel for absence.
    pub fn or_nan(value: Option<f64>) -> f64 {
        value.unwrap_or(f64::NAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annual_or_hourly() {
        assert_eq!(StatsCalculator::annual_or_hourly(Some(1.0), Some(2.0)), Some(1.0));
        assert_eq!(StatsCalculator::annual_or_hourly(None, Some(2.0)), Some(4160.0));
        assert_eq!(StatsCalculator::annual_or_hourly(None, None), None);
    }

    #[test]
    fn test_relative_ratio() {
        assert_eq!(StatsCalculator::relative_ratio(Some(50_000.0), Some(40_000.0)), 1.25);
        assert!(StatsCalculator::relative_ratio(Some(50_000.0), Some(0.0)).is_nan());
        assert!(StatsCalculator::relative_ratio(None, Some(40_000.0)).is_nan());
        assert!(StatsCalculator::relative_ratio(Some(1.0), None).is_nan());
    }

    #[test]
    fn test_median() {
        assert_eq!(StatsCalculator::median([Some(3.0), None, Some(1.0), Some(2.0)]), 2.0);
        assert_eq!(StatsCalculator::median([Some(1.0), Some(4.0)]), 2.5);
        assert!(StatsCalculator::median([None, None]).is_nan());
    }

    #[test]
    fn test_share_percentages() {
        let shares = StatsCalculator::share_percentages(&[Some(30.0), Some(10.0), None]);
        assert_eq!(shares, vec![Some(75.0), Some(25.0), None]);

        let zero = StatsCalculator::share_percentages(&[Some(0.0), None]);
        assert_eq!(zero, vec![None, None]);
    }

    #[test]
    fn test_cmp_desc_puts_absent_last() {
        let mut values = vec![None, Some(1.0), Some(3.0), None, Some(2.0)];
        values.sort_by(|a, b| StatsCalculator::cmp_desc(*a, *b));
        assert_eq!(values, vec![Some(3.0), Some(2.0), Some(1.0), None, None]);
    }
}
