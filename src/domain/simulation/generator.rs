//! Stochastic OHLC walks.
//!
//! Both entry points are pure: every random draw comes from the `Rng` passed in,
//! so a seeded generator reproduces a sequence exactly.

use super::config::SimulationConfig;
use crate::domain::errors::{SimulationError, SimulationResult};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{Candle, MIN_PRICE, floor_price, same_cents};
use crate::log_debug;
use chrono::{Days, NaiveDate};
use rand::Rng;

/// Shape parameters of the walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkParams {
    pub daily_move: f64,
    pub wick_range: f64,
    pub random_move: f64,
    pub drift_multiplier: f64,
    pub running_floor: f64,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

impl From<&SimulationConfig> for WalkParams {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            daily_move: config.daily_move,
            wick_range: config.wick_range,
            random_move: config.random_move,
            drift_multiplier: config.drift_multiplier,
            running_floor: config.running_floor,
        }
    }
}

/// Nudge applied to a close that would leave a zero-height body.
const NUDGE_MIN: f64 = 0.1;
const NUDGE_MAX: f64 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct PriceWalkGenerator {
    params: WalkParams,
}

impl PriceWalkGenerator {
    pub fn new(params: WalkParams) -> Self {
        Self { params }
    }

    /// `count` daily candles ending at `end_date`, each opening at the previous close.
    pub fn generate_initial_series<R: Rng + ?Sized>(
        &self,
        count: usize,
        starting_price: f64,
        end_date: NaiveDate,
        rng: &mut R,
    ) -> SimulationResult<Vec<Candle>> {
        if !starting_price.is_finite() || starting_price < MIN_PRICE {
            return Err(SimulationError::InvalidStartingPrice(starting_price));
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        let first_date = end_date
            .checked_sub_days(Days::new(count as u64 - 1))
            .ok_or(SimulationError::DateOverflow(end_date))?;

        let mut candles = Vec::with_capacity(count);
        let mut open = starting_price;
        for offset in 0..count {
            let date = first_date
                .checked_add_days(Days::new(offset as u64))
                .ok_or(SimulationError::DateOverflow(first_date))?;

            let delta = symmetric(rng, self.params.daily_move);
            let close = (open + delta).max(self.params.running_floor);
            let close = separate_from_open(open, close, self.params.running_floor, rng);

            let candle = self.with_wicks(date, open, close, rng);
            open = candle.close;
            candles.push(candle);
        }

        Ok(candles)
    }

    /// Forward path of `steps` candles from `start` whose last close is exactly `target`.
    pub fn generate_path<R: Rng + ?Sized>(
        &self,
        start: &Candle,
        target: f64,
        steps: usize,
        rng: &mut R,
    ) -> SimulationResult<Vec<Candle>> {
        if steps == 0 {
            return Err(SimulationError::ZeroSteps);
        }
        if !target.is_finite() || target < MIN_PRICE {
            return Err(SimulationError::InvalidTarget { value: target, min: MIN_PRICE });
        }
        if !start.close.is_finite() {
            return Err(SimulationError::InvalidStartingPrice(start.close));
        }

        let distance = target - start.close;
        let direction = if distance > 0.0 {
            1.0
        } else if distance < 0.0 {
            -1.0
        } else {
            0.0
        };
        // Fixed for the whole path, taken from the original distance
        let drift = (distance / steps as f64 * self.params.drift_multiplier).abs();

        log_debug!(
            LogComponent::Domain("PriceWalk"),
            "path {:.2} -> {:.2} in {} steps (drift {:.3})",
            start.close,
            target,
            steps,
            drift
        );

        let mut path = Vec::with_capacity(steps);
        let mut date = start.date;
        let mut open = start.close;
        for step in 0..steps {
            date = date.succ_opt().ok_or(SimulationError::DateOverflow(date))?;

            let close = if step + 1 == steps {
                target
            } else {
                let noise = symmetric(rng, self.params.random_move);
                let close = floor_price(open + direction * drift + noise);
                separate_from_open(open, close, MIN_PRICE, rng)
            };

            let candle = self.with_wicks(date, open, close, rng);
            open = candle.close;
            path.push(candle);
        }

        Ok(path)
    }

    fn with_wicks<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        open: f64,
        close: f64,
        rng: &mut R,
    ) -> Candle {
        let high = open.max(close) + rng.gen_range(0.0..=self.params.wick_range);
        let low = open.min(close) - rng.gen_range(0.0..=self.params.wick_range);
        Candle::new(date, floor_price(open), floor_price(high), floor_price(low), floor_price(close))
    }
}

fn symmetric<R: Rng + ?Sized>(rng: &mut R, half_width: f64) -> f64 {
    rng.gen_range(-half_width..=half_width)
}

/// Push `close` away from `open` when the two share the same cents.
///
/// The nudge goes up whenever going down would cross `floor`.
fn separate_from_open<R: Rng + ?Sized>(open: f64, close: f64, floor: f64, rng: &mut R) -> f64 {
    if !same_cents(open, close) {
        return close;
    }
    let nudge = rng.gen_range(NUDGE_MIN..=NUDGE_MAX);
    let downward = rng.gen_bool(0.5);
    if downward && close - nudge >= floor { close - nudge } else { close + nudge }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn nudge_moves_close_off_open() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let close = separate_from_open(50.0, 50.001, MIN_PRICE, &mut rng);
            assert!(!same_cents(50.0, close));
            let gap = (close - 50.001).abs();
            assert!((NUDGE_MIN..=NUDGE_MAX).contains(&gap));
        }
    }

    #[test]
    fn nudge_respects_floor() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let close = separate_from_open(MIN_PRICE, MIN_PRICE, MIN_PRICE, &mut rng);
            assert!(close > MIN_PRICE);
        }
    }

    #[test]
    fn flat_target_still_converges() {
        let mut rng = StdRng::seed_from_u64(11);
        let start = Candle::new(day(2024, 1, 1), 99.0, 101.0, 98.0, 100.0);
        let path = PriceWalkGenerator::default().generate_path(&start, 100.0, 4, &mut rng).unwrap();
        assert_eq!(path.last().map(|c| c.close), Some(100.0));
    }

    #[test]
    fn zero_width_noise_is_deterministic() {
        let params = WalkParams { random_move: 0.0, wick_range: 0.0, ..WalkParams::default() };
        let mut rng = StdRng::seed_from_u64(0);
        let start = Candle::new(day(2024, 1, 1), 99.0, 101.0, 98.0, 100.0);
        let path = PriceWalkGenerator::new(params).generate_path(&start, 110.0, 2, &mut rng).unwrap();
        // drift = 10 / 2 * 1.5
        assert!((path[0].close - 107.5).abs() < 1e-9);
        assert_eq!(path[1].open, path[0].close);
        assert_eq!(path[1].close, 110.0);
    }

    #[test]
    fn history_holds_running_floor() {
        let mut rng = StdRng::seed_from_u64(21);
        let series = PriceWalkGenerator::default()
            .generate_initial_series(200, 12.0, day(2024, 6, 30), &mut rng)
            .unwrap();
        assert!(series.iter().all(|c| c.close >= 10.0));
    }
}
