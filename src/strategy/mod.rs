pub mod sma_crossover;

use crate::data::PriceBar;
use serde::{Deserialize, Serialize};

//signal emitted for a single bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    None,
    Buy,
    Sell,
}

//strategy interface consumed by the executor
//signals depend on position state, so they are queried bar by bar
pub trait Strategy {
    //first bar index at which signals are evaluated
    fn warmup(&self) -> usize;

    //number of bars the strategy was built over
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    //signal at bar `index` given the current position state
    //must only look at bars <= index
    fn signal(&self, index: usize, position_open: bool) -> Signal;

    //returns the strategy name
    fn name(&self) -> &str;
}

//simple moving average of close over the trailing `period` bars, aligned with `bars`
//the first period-1 entries are None (insufficient history)
pub fn sma_series(bars: &[PriceBar], period: usize) -> Vec<Option<f64>> {
    let mut series = Vec::with_capacity(bars.len());
    if period == 0 {
        series.resize(bars.len(), None);
        return series;
    }

    for i in 0..bars.len() {
        if i + 1 < period {
            series.push(None);
        } else {
            let window = &bars[i + 1 - period..=i];
            series.push(sma(window.iter().map(|bar| bar.close)));
        }
    }

    series
}

//helper function to calculate simple moving average
pub fn sma<I: IntoIterator<Item = f64>>(prices: I) -> Option<f64> {
    let (sum, count) = prices
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), price| (sum + price, count + 1));
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                PriceBar::flat(start + chrono::Duration::days(i as i64), close, 1).unwrap()
            })
            .collect()
    }

    #[test]
    fn sma_of_empty_is_none() {
        assert_eq!(sma(Vec::new()), None);
        assert_relative_eq!(sma(vec![1.0, 2.0, 3.0]).unwrap(), 2.0);
    }

    #[test]
    fn series_is_aligned_with_warmup_gaps() {
        let series = sma_series(&bars(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3);

        assert_eq!(series.len(), 5);
        assert_eq!(series[0], None);
        assert_eq!(series[1], None);
        assert_relative_eq!(series[2].unwrap(), 2.0);
        assert_relative_eq!(series[3].unwrap(), 3.0);
        assert_relative_eq!(series[4].unwrap(), 4.0);
    }

    #[test]
    fn period_longer_than_series_is_all_none() {
        let series = sma_series(&bars(&[1.0, 2.0]), 10);
        assert_eq!(series, vec![None, None]);
        assert_eq!(sma_series(&bars(&[1.0]), 0), vec![None]);
    }
}
