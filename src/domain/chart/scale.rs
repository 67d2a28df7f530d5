//! Value-axis domain calculation and the scales derived from it.

use super::value_objects::{PlotArea, PriceDomain};
use crate::domain::market_data::{Candle, CandleWindow, MIN_PRICE};
use chrono::NaiveDate;

/// Fraction of the price range added above and below the data.
pub const DOMAIN_PADDING: f64 = 0.1;

/// Derives the value-axis domain from a set of candles.
pub struct ScaleCalculator;

impl ScaleCalculator {
    /// Padded `[lowest low, highest high]` range, `None` for an empty input.
    pub fn compute_domain<'a, I>(candles: I) -> Option<PriceDomain>
    where
        I: IntoIterator<Item = &'a Candle>,
    {
        let (low, high) = candles.into_iter().fold(None, |acc: Option<(f64, f64)>, c| {
            Some(match acc {
                Some((low, high)) => (low.min(c.low), high.max(c.high)),
                None => (c.low, c.high),
            })
        })?;

        let range = high - low;
        Some(PriceDomain {
            min: (low - DOMAIN_PADDING * range).max(MIN_PRICE),
            max: high + DOMAIN_PADDING * range,
        })
    }

    /// Domain covering the visible window and a path that has not been revealed yet,
    /// so the axis already fits every candle of the upcoming run.
    pub fn compute_run_domain(window: &CandleWindow, path: &[Candle]) -> Option<PriceDomain> {
        Self::compute_domain(window.iter().chain(path.iter()))
    }
}

/// Continuous price → pixel mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: PriceDomain,
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: PriceDomain, range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f64) -> f64 {
        let (r0, r1) = self.range;
        let span = self.domain.span();
        if span == 0.0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - self.domain.min) / span * (r1 - r0)
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let (r0, r1) = self.range;
        if r1 == r0 {
            return self.domain.min;
        }
        self.domain.min + (pixel - r0) / (r1 - r0) * self.domain.span()
    }

    /// Round tick values (1, 2 or 5 × 10ⁿ apart), roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let PriceDomain { min, max } = self.domain;
        if count == 0 || !(max > min) || !min.is_finite() || !max.is_finite() {
            return Vec::new();
        }

        let raw = (max - min) / count as f64;
        let exponent = raw.log10().floor();
        let power = 10f64.powf(exponent);
        let error = raw / power;
        let factor = if error >= 50f64.sqrt() {
            10.0
        } else if error >= 10f64.sqrt() {
            5.0
        } else if error >= 2f64.sqrt() {
            2.0
        } else {
            1.0
        };

        // Sub-unit steps divide by an integer to keep values like 0.3 exact
        let (first, last, to_value): (i64, i64, Box<dyn Fn(i64) -> f64>) = if exponent < 0.0 {
            let inverse = (1.0 / (factor * power)).round();
            (
                (min * inverse).ceil() as i64,
                (max * inverse).floor() as i64,
                Box::new(move |i| i as f64 / inverse),
            )
        } else {
            let step = factor * power;
            ((min / step).ceil() as i64, (max / step).floor() as i64, Box::new(move |i| i as f64 * step))
        };

        (first..=last).map(to_value).collect()
    }
}

/// Ordinal scale placing one evenly spaced band per date.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    keys: Vec<NaiveDate>,
    range: (f64, f64),
    padding: f64,
}

impl BandScale {
    /// `keys` must be sorted ascending, as the window's dates are.
    pub fn new(keys: Vec<NaiveDate>, range: (f64, f64), padding: f64) -> Self {
        Self { keys, range, padding: padding.clamp(0.0, 1.0) }
    }

    pub fn step(&self) -> f64 {
        let n = self.keys.len() as f64;
        (self.range.1 - self.range.0) / (n + self.padding).max(1.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    pub fn index_of(&self, key: &NaiveDate) -> Option<usize> {
        self.keys.binary_search(key).ok()
    }

    /// Left edge of the band for `key`.
    pub fn position(&self, key: &NaiveDate) -> Option<f64> {
        self.index_of(key).map(|i| self.position_at(i))
    }

    pub fn position_at(&self, index: usize) -> f64 {
        let step = self.step();
        self.range.0 + step * self.padding + step * index as f64
    }

    pub fn center(&self, key: &NaiveDate) -> Option<f64> {
        self.position(key).map(|x| x + self.bandwidth() / 2.0)
    }

    pub fn keys(&self) -> &[NaiveDate] {
        &self.keys
    }
}

/// Per-render mapping from data space to plot-local pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleMapping {
    pub x: BandScale,
    pub y: LinearScale,
}

/// Gap between candle bodies as a fraction of the band step.
pub const BAND_PADDING: f64 = 0.3;

impl ScaleMapping {
    pub fn new(dates: Vec<NaiveDate>, domain: PriceDomain, plot: &PlotArea) -> Self {
        Self {
            x: BandScale::new(dates, (0.0, plot.width), BAND_PADDING),
            y: LinearScale::new(domain, (plot.height, 0.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(day: u32, low: f64, high: f64) -> Candle {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        Candle::new(date, low + 1.0, high, low, high - 1.0)
    }

    #[test]
    fn domain_pads_ten_percent_each_side() {
        let candles = [candle(1, 100.0, 120.0), candle(2, 90.0, 110.0)];
        let domain = ScaleCalculator::compute_domain(&candles).unwrap();
        assert!((domain.min - 87.0).abs() < 1e-9);
        assert!((domain.max - 123.0).abs() < 1e-9);
    }

    #[test]
    fn domain_floor_is_positive() {
        let candles = [candle(1, 0.5, 40.0)];
        let domain = ScaleCalculator::compute_domain(&candles).unwrap();
        assert_eq!(domain.min, MIN_PRICE);
    }

    #[test]
    fn empty_input_has_no_domain() {
        assert!(ScaleCalculator::compute_domain(&[] as &[Candle]).is_none());
    }

    #[test]
    fn linear_scale_inverts_its_mapping() {
        let scale = LinearScale::new(PriceDomain::new(50.0, 150.0), (400.0, 0.0));
        assert_eq!(scale.map(50.0), 400.0);
        assert_eq!(scale.map(150.0), 0.0);
        assert!((scale.invert(scale.map(123.4)) - 123.4).abs() < 1e-9);
    }

    #[test]
    fn ticks_use_round_steps() {
        let scale = LinearScale::new(PriceDomain::new(90.0, 130.0), (100.0, 0.0));
        assert_eq!(scale.ticks(10), vec![90.0, 95.0, 100.0, 105.0, 110.0, 115.0, 120.0, 125.0, 130.0]);

        let fine = LinearScale::new(PriceDomain::new(0.12, 0.5), (100.0, 0.0));
        assert_eq!(fine.ticks(4), vec![0.2, 0.3, 0.4, 0.5]);
    }

    #[test]
    fn band_scale_spaces_evenly() {
        let dates: Vec<_> = (1..=4).map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap()).collect();
        let band = BandScale::new(dates.clone(), (0.0, 430.0), 0.3);
        assert!((band.step() - 100.0).abs() < 1e-9);
        assert!((band.bandwidth() - 70.0).abs() < 1e-9);
        assert!((band.position(&dates[0]).unwrap() - 30.0).abs() < 1e-9);
        assert!((band.center(&dates[3]).unwrap() - 365.0).abs() < 1e-9);
        assert!(band.position(&NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()).is_none());
    }
}
