use crate::config::PositionSizing;

//percent of cash used when no recognised policy is configured
pub const FALLBACK_PERCENT: f64 = 95.0;

//converts a sizing policy into a whole share count for an entry
//never fractional; affordability including commission is checked by the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSizer {
    pub policy: PositionSizing,
    pub value: f64,
}

impl PositionSizer {
    pub fn new(policy: PositionSizing, value: f64) -> Self {
        PositionSizer { policy, value }
    }

    //sizer used for an unrecognized policy
    pub fn fallback() -> Self {
        Self::new(PositionSizing::Percentage, FALLBACK_PERCENT)
    }

    //returns the number of shares to buy at `price` with `available_cash`
    pub fn size(&self, available_cash: f64, price: f64) -> u64 {
        if !(price.is_finite() && price > 0.0) {
            return 0;
        }

        let raw = match self.policy {
            PositionSizing::Percentage => available_cash * (self.value / 100.0) / price,
            PositionSizing::AllIn => available_cash / price,
            PositionSizing::FixedAmount => self.value / price,
            PositionSizing::FixedShares => self.value,
        };

        whole_shares(raw)
    }
}

//floors to a non-negative integer; NaN and negatives become 0
fn whole_shares(raw: f64) -> u64 {
    if raw.is_nan() || raw <= 0.0 {
        return 0;
    }
    //`as` saturates at u64::MAX for huge values
    raw.floor() as u64
}
