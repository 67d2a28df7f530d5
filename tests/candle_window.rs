use chrono::{Days, NaiveDate};
use price_sim_wasm::domain::market_data::{Candle, CandleWindow, DEFAULT_WINDOW_CAPACITY};
use quickcheck_macros::quickcheck;

fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(offset)
}

fn candle(offset: u64) -> Candle {
    let base = 100.0 + offset as f64;
    Candle::new(day(offset), base, base + 2.0, base - 2.0, base + 1.0)
}

#[test]
fn revealing_into_a_full_window_drops_the_oldest() {
    let window = CandleWindow::from_candles(DEFAULT_WINDOW_CAPACITY, (0..60).map(candle));
    assert_eq!(window.len(), 60);

    let next = window.appended(candle(60));
    assert_eq!(next.len(), 60);
    assert_eq!(next.first().map(|c| c.date), Some(day(1)));
    assert_eq!(next.last().map(|c| c.date), Some(day(60)));
    assert_eq!(window.first().map(|c| c.date), Some(day(0)));
}

#[test]
fn history_longer_than_capacity_keeps_the_tail() {
    let window = CandleWindow::from_candles(10, (0..25).map(candle));
    assert_eq!(window.dates(), (15..25).map(day).collect::<Vec<_>>());
}

#[quickcheck]
fn window_never_exceeds_capacity(capacity: u8, appends: u8) -> bool {
    let capacity = 1 + capacity as usize % 80;
    let mut window = CandleWindow::new(capacity);
    for offset in 0..appends as u64 {
        window = window.appended(candle(offset));
        if window.len() > capacity {
            return false;
        }
    }
    window.len() == capacity.min(appends as usize)
}

#[quickcheck]
fn eviction_is_first_in_first_out(appends: u8) -> bool {
    let capacity = 7;
    let window = (0..appends as u64).fold(CandleWindow::new(capacity), |w, offset| w.appended(candle(offset)));
    let start = (appends as u64).saturating_sub(capacity as u64);
    window.dates() == (start..appends as u64).map(day).collect::<Vec<_>>()
}
