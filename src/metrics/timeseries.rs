use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//a point in the equity curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub shares: u64,
    pub price: f64,
    //cash + shares * price
    pub total_value: f64,
    //running peak of total_value, seeded with initial cash
    pub peak: f64,
}

impl EquityPoint {
    pub fn new(date: NaiveDate, shares: u64, price: f64, total_value: f64, peak: f64) -> Self {
        EquityPoint {
            date,
            shares,
            price,
            total_value,
            peak,
        }
    }

    //percent below the running peak at this point
    pub fn drawdown(&self) -> f64 {
        if self.peak <= 0.0 {
            return 0.0;
        }
        (self.peak - self.total_value) / self.peak * 100.0
    }
}

//collects the total values of a curve
pub fn total_values(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve.iter().map(|point| point.total_value).collect()
}

//percent decline from the overall peak to the overall trough
//peak includes initial cash; an empty curve or a non-positive peak yields 0
pub fn max_drawdown(equity_curve: &[EquityPoint], initial_cash: f64) -> f64 {
    if equity_curve.is_empty() {
        return 0.0;
    }

    let peak = equity_curve
        .iter()
        .map(|point| point.total_value)
        .fold(initial_cash, f64::max);
    let trough = equity_curve
        .iter()
        .map(|point| point.total_value)
        .fold(f64::INFINITY, f64::min);

    if peak <= 0.0 {
        return 0.0;
    }

    (peak - trough) / peak * 100.0
}

//mean over population standard deviation of the equity levels themselves
//(not of returns); 0 for fewer than two samples or zero dispersion
pub fn sharpe_ratio(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let mean = values.mean();
    let std_dev = values.population_std_dev();

    if !std_dev.is_finite() || std_dev == 0.0 {
        return 0.0;
    }

    mean / std_dev
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut peak = 100.0_f64;
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                peak = peak.max(v);
                EquityPoint::new(start + chrono::Duration::days(i as i64), 0, 1.0, v, peak)
            })
            .collect()
    }

    #[test]
    fn drawdown_uses_overall_peak_and_trough() {
        let points = curve(&[100.0, 120.0, 90.0, 110.0]);
        assert_relative_eq!(max_drawdown(&points, 100.0), 25.0);
        assert_relative_eq!(points[2].drawdown(), 25.0);
    }

    #[test]
    fn drawdown_counts_initial_cash_as_peak() {
        let points = curve(&[80.0, 90.0]);
        assert_relative_eq!(max_drawdown(&points, 100.0), 20.0);
    }

    #[test]
    fn drawdown_of_empty_curve_is_zero() {
        assert_eq!(max_drawdown(&[], 100.0), 0.0);
    }

    #[test]
    fn drawdown_with_non_positive_peak_is_zero() {
        let points = curve(&[-5.0, -10.0]);
        assert_eq!(max_drawdown(&points, 0.0), 0.0);
    }

    #[test]
    fn sharpe_uses_population_std_dev() {
        //mean 3, population variance 2
        let sharpe = sharpe_ratio(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_relative_eq!(sharpe, 3.0 / 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn sharpe_guards() {
        assert_eq!(sharpe_ratio(&[]), 0.0);
        assert_eq!(sharpe_ratio(&[42.0]), 0.0);
        assert_eq!(sharpe_ratio(&[7.0, 7.0, 7.0]), 0.0);
    }
}
