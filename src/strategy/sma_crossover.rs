use crate::data::PriceBar;
use crate::strategy::{sma_series, Signal, Strategy};

pub const DEFAULT_SHORT_WINDOW: usize = 10;
pub const DEFAULT_LONG_WINDOW: usize = 30;

//sma crossover strategy
//buys on the bar where the short sma crosses strictly above the long sma
//sells when the short sma drops below the long sma, or on the final bar
#[derive(Debug, Clone)]
pub struct SmaCrossoverStrategy {
    short_window: usize,
    long_window: usize,
    short: Vec<Option<f64>>,
    long: Vec<Option<f64>>,
}

impl SmaCrossoverStrategy {
    pub fn new(bars: &[PriceBar], short_window: usize, long_window: usize) -> Self {
        SmaCrossoverStrategy {
            short_window,
            long_window,
            short: sma_series(bars, short_window),
            long: sma_series(bars, long_window),
        }
    }

    //10/30 crossover
    pub fn standard(bars: &[PriceBar]) -> Self {
        Self::new(bars, DEFAULT_SHORT_WINDOW, DEFAULT_LONG_WINDOW)
    }

    pub fn short_series(&self) -> &[Option<f64>] {
        &self.short
    }

    pub fn long_series(&self) -> &[Option<f64>] {
        &self.long
    }

    fn averages(&self, index: usize) -> Option<(f64, f64)> {
        Some((*self.short.get(index)?.as_ref()?, *self.long.get(index)?.as_ref()?))
    }

    //bullish cross: at-or-below on the previous bar, strictly above on this one
    fn crossed_up(&self, index: usize) -> bool {
        if index == 0 {
            return false;
        }
        match (self.averages(index - 1), self.averages(index)) {
            (Some((prev_short, prev_long)), Some((short, long))) => {
                prev_short <= prev_long && short > long
            }
            _ => false,
        }
    }

    fn below(&self, index: usize) -> bool {
        self.averages(index)
            .map(|(short, long)| short < long)
            .unwrap_or(false)
    }
}

impl Strategy for SmaCrossoverStrategy {
    fn warmup(&self) -> usize {
        self.short_window.max(self.long_window)
    }

    fn len(&self) -> usize {
        self.short.len()
    }

    fn signal(&self, index: usize, position_open: bool) -> Signal {
        if index < self.warmup() || index >= self.len() {
            return Signal::None;
        }

        let is_last = index + 1 == self.len();

        if !position_open && self.crossed_up(index) {
            Signal::Buy
        } else if position_open && (self.below(index) || is_last) {
            Signal::Sell
        } else {
            Signal::None
        }
    }

    fn name(&self) -> &str {
        "SMA Crossover"
    }
}
