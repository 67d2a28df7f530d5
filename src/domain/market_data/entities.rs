use super::value_objects::MIN_PRICE;
use chrono::NaiveDate;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Domain entity - one daily OHLC record
#[derive(Debug, Clone, Copy, PartialEq, Constructor, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// Drawn red: the day closed below its open.
    pub fn is_bearish(&self) -> bool {
        self.open > self.close
    }

    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }

    pub fn body_size(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// OHLC ordering plus the positive price floor.
    pub fn is_valid(&self) -> bool {
        self.high >= self.body_top()
            && self.low <= self.body_bottom()
            && [self.open, self.high, self.low, self.close]
                .iter()
                .all(|p| p.is_finite() && *p >= MIN_PRICE)
    }
}

/// Default rolling window capacity.
pub const DEFAULT_WINDOW_CAPACITY: usize = 60;

/// Domain entity - bounded, chronologically ordered candle buffer.
///
/// Updates never mutate a window that has been handed out: [`CandleWindow::appended`]
/// returns a new window, so every snapshot the renderer holds stays stable.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleWindow {
    candles: VecDeque<Candle>,
    capacity: usize,
}

impl CandleWindow {
    pub fn new(capacity: usize) -> Self {
        Self { candles: VecDeque::with_capacity(capacity + 1), capacity: capacity.max(1) }
    }

    /// Build a window from a chronological run, keeping the most recent `capacity` candles.
    pub fn from_candles<I>(capacity: usize, candles: I) -> Self
    where
        I: IntoIterator<Item = Candle>,
    {
        candles.into_iter().fold(Self::new(capacity), |mut window, candle| {
            window.push(candle);
            window
        })
    }

    /// New window with `candle` added and the oldest entries evicted past capacity.
    pub fn appended(&self, candle: Candle) -> Self {
        let mut next = self.clone();
        next.push(candle);
        next
    }

    fn push(&mut self, candle: Candle) {
        if let Some(last) = self.candles.back_mut() {
            // One candle per date: a repeated date replaces the stored one
            if last.date == candle.date {
                *last = candle;
                return;
            }
            if candle.date < last.date {
                self.insert_sorted(candle);
                return;
            }
        }

        self.candles.push_back(candle);
        self.evict();
    }

    fn insert_sorted(&mut self, candle: Candle) {
        let pos = self.candles.partition_point(|c| c.date < candle.date);
        match self.candles.get_mut(pos) {
            Some(existing) if existing.date == candle.date => *existing = candle,
            _ => {
                self.candles.insert(pos, candle);
                self.evict();
            }
        }
    }

    fn evict(&mut self) {
        while self.candles.len() > self.capacity {
            self.candles.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn first(&self) -> Option<&Candle> {
        self.candles.front()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Candle> + ExactSizeIterator + Clone {
        self.candles.iter()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.candles.iter().map(|c| c.date).collect()
    }

    pub fn to_vec(&self) -> Vec<Candle> {
        self.candles.iter().copied().collect()
    }

    pub fn latest_close(&self) -> Option<f64> {
        self.last().map(|c| c.close)
    }
}

impl Default for CandleWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}
