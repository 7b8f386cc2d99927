use crate::data::bar::PriceBar;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::Rng;

//starting level of the random walk
pub const START_PRICE: f64 = 100.0;

//hard floor applied to the walk after every step
pub const PRICE_FLOOR: f64 = 10.0;

//daily drift draw, slightly skewed upwards
pub const DRIFT_LOW: f64 = -0.96;
pub const DRIFT_HIGH: f64 = 1.04;

//max fractional excursion of high/low from the walk value
pub const WICK_SPREAD: f64 = 0.02;

//half-width of the close noise around the walk value
pub const CLOSE_NOISE: f64 = 0.005;

pub const VOLUME_MIN: u64 = 100_000;
pub const VOLUME_MAX: u64 = 1_100_000;

//generates a randomized daily ohlcv series over [start, end]
//the random stream is supplied by the caller so seeded runs are reproducible
#[derive(Debug, Clone, Copy)]
pub struct PriceSeriesGenerator {
    start: NaiveDate,
    end: NaiveDate,
}

impl PriceSeriesGenerator {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        PriceSeriesGenerator { start, end }
    }

    //walks calendar days from start to end inclusive, skipping weekends
    //the walk advances on each bar's close, not its open
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<PriceBar> {
        let mut bars = Vec::new();
        let mut price = START_PRICE;

        for date in trading_days(self.start, self.end) {
            price += rng.gen_range(DRIFT_LOW..DRIFT_HIGH);
            price = price.max(PRICE_FLOOR);

            let bar = PriceBar {
                date,
                open: price,
                high: price * (1.0 + rng.gen_range(0.0..WICK_SPREAD)),
                low: price * (1.0 - rng.gen_range(0.0..WICK_SPREAD)),
                close: price * (1.0 + rng.gen_range(-CLOSE_NOISE..CLOSE_NOISE)),
                volume: rng.gen_range(VOLUME_MIN..VOLUME_MAX),
            };

            price = bar.close;
            bars.push(bar);
        }

        bars
    }
}

//returns true for saturday and sunday
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

//iterates the weekdays in [start, end]; empty when start > end
pub fn trading_days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start
        .iter_days()
        .take_while(move |date| *date <= end)
        .filter(|date| !is_weekend(*date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn skips_weekends() {
        //2024-01-06 is a saturday
        let generator = PriceSeriesGenerator::new(date(2024, 1, 1), date(2024, 1, 14));
        let bars = generator.generate(&mut ChaCha8Rng::seed_from_u64(7));

        assert_eq!(bars.len(), 10);
        assert!(bars.iter().all(|bar| !is_weekend(bar.date)));
        assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn weekend_only_range_is_empty() {
        let generator = PriceSeriesGenerator::new(date(2024, 1, 6), date(2024, 1, 7));
        assert!(generator
            .generate(&mut ChaCha8Rng::seed_from_u64(1))
            .is_empty());
    }

    #[test]
    fn inverted_range_is_empty() {
        let generator = PriceSeriesGenerator::new(date(2024, 2, 1), date(2024, 1, 1));
        assert!(generator
            .generate(&mut ChaCha8Rng::seed_from_u64(1))
            .is_empty());
    }

    #[test]
    fn same_seed_same_series() {
        let generator = PriceSeriesGenerator::new(date(2023, 1, 1), date(2023, 12, 31));
        let a = generator.generate(&mut ChaCha8Rng::seed_from_u64(42));
        let b = generator.generate(&mut ChaCha8Rng::seed_from_u64(42));
        let c = generator.generate(&mut ChaCha8Rng::seed_from_u64(43));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn walk_is_clamped_at_floor() {
        //all-zero stream: every draw sits at the low end, drift -0.96 per day
        let mut rng = StepRng::new(0, 0);
        let generator = PriceSeriesGenerator::new(date(2024, 1, 1), date(2024, 10, 6));
        let bars = generator.generate(&mut rng);
        assert_eq!(bars.len(), 200);

        let trough = bars
            .iter()
            .position(|bar| bar.open == PRICE_FLOOR)
            .unwrap();
        assert!(trough < 100);
        assert!(bars[..trough].iter().all(|bar| bar.open > PRICE_FLOOR));
        assert!(bars[trough..].iter().all(|bar| bar.open == PRICE_FLOOR));
        assert!(bars[trough..]
            .iter()
            .all(|bar| bar.close == PRICE_FLOOR * (1.0 - CLOSE_NOISE)));
    }

    #[test]
    fn fields_stay_within_draw_bounds() {
        let generator = PriceSeriesGenerator::new(date(2020, 1, 1), date(2023, 12, 31));
        let bars = generator.generate(&mut ChaCha8Rng::seed_from_u64(9));

        for bar in &bars {
            assert!(bar.open >= PRICE_FLOOR);
            assert!(bar.high >= bar.open && bar.high <= bar.open * (1.0 + WICK_SPREAD));
            assert!(bar.low <= bar.open && bar.low >= bar.open * (1.0 - WICK_SPREAD));
            assert!((bar.close / bar.open - 1.0).abs() <= CLOSE_NOISE + 1e-12);
            assert!((VOLUME_MIN..VOLUME_MAX).contains(&bar.volume));
        }
    }
}
