use chrono::NaiveDate;
use price_sim_wasm::domain::errors::SimulationError;
use price_sim_wasm::domain::market_data::{Candle, MIN_PRICE, same_cents};
use price_sim_wasm::domain::simulation::PriceWalkGenerator;
use quickcheck_macros::quickcheck;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn start_candle(close: f64) -> Candle {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    Candle::new(date, close, close + 1.0, (close - 1.0).max(MIN_PRICE), close)
}

fn path_for(seed: u64, close: f64, target: f64, steps: usize) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(seed);
    PriceWalkGenerator::default()
        .generate_path(&start_candle(close), target, steps, &mut rng)
        .unwrap()
}

// Maps arbitrary inputs onto a realistic start price, target and step count.
fn scenario(start: u16, target: u16, steps: u8) -> (f64, f64, usize) {
    (1.0 + start as f64 / 10.0, 0.01 + target as f64 / 10.0, 1 + steps as usize % 20)
}

#[test]
fn up_move_of_twenty_in_five_steps() {
    let start = start_candle(100.0);
    let path = path_for(42, 100.0, 120.0, 5);

    assert_eq!(path.len(), 5);
    assert_eq!(path.last().unwrap().close, 120.0);
    for (i, candle) in path.iter().enumerate() {
        assert_eq!(candle.date, start.date + chrono::Days::new(i as u64 + 1));
    }
}

#[quickcheck]
fn path_converges_on_target(seed: u64, start: u16, target: u16, steps: u8) -> bool {
    let (close, target, steps) = scenario(start, target, steps);
    let path = path_for(seed, close, target, steps);
    path.len() == steps && path.last().map(|c| c.close) == Some(target)
}

#[quickcheck]
fn path_candles_are_well_formed(seed: u64, start: u16, target: u16, steps: u8) -> bool {
    let (close, target, steps) = scenario(start, target, steps);
    path_for(seed, close, target, steps).iter().all(Candle::is_valid)
}

#[quickcheck]
fn path_is_continuous(seed: u64, start: u16, target: u16, steps: u8) -> bool {
    let (close, target, steps) = scenario(start, target, steps);
    let origin = start_candle(close);
    let path = path_for(seed, close, target, steps);

    let mut previous = origin;
    path.iter().all(|candle| {
        let linked = candle.date == previous.date.succ_opt().unwrap() && candle.open == previous.close;
        previous = *candle;
        linked
    })
}

#[quickcheck]
fn only_the_pinned_candle_may_be_flat(seed: u64, start: u16, target: u16, steps: u8) -> bool {
    let (close, target, steps) = scenario(start, target, steps);
    let path = path_for(seed, close, target, steps);
    path[..path.len() - 1].iter().all(|c| !same_cents(c.open, c.close))
}

#[quickcheck]
fn history_is_well_formed(seed: u64, count: u8) -> bool {
    let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    let series = PriceWalkGenerator::default()
        .generate_initial_series(count as usize, 100.0, end, &mut rng)
        .unwrap();

    let chained = series.windows(2).all(|pair| {
        pair[1].open == pair[0].close && pair[1].date == pair[0].date.succ_opt().unwrap()
    });
    series.len() == count as usize
        && chained
        && series.iter().all(|c| c.is_valid() && !same_cents(c.open, c.close))
        && series.last().is_none_or(|c| c.date == end)
        && series.first().is_none_or(|c| c.open == 100.0)
}

#[test]
fn same_seed_same_path() {
    assert_eq!(path_for(7, 50.0, 30.0, 8), path_for(7, 50.0, 30.0, 8));
}

#[test]
fn invalid_inputs_are_rejected() {
    let generator = PriceWalkGenerator::default();
    let mut rng = StdRng::seed_from_u64(1);
    let start = start_candle(100.0);

    assert_eq!(generator.generate_path(&start, 120.0, 0, &mut rng), Err(SimulationError::ZeroSteps));
    assert!(matches!(
        generator.generate_path(&start, f64::NAN, 3, &mut rng),
        Err(SimulationError::InvalidTarget { .. })
    ));
    assert!(matches!(
        generator.generate_path(&start, 0.001, 3, &mut rng),
        Err(SimulationError::InvalidTarget { .. })
    ));

    let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert_eq!(
        generator.generate_initial_series(10, -5.0, end, &mut rng),
        Err(SimulationError::InvalidStartingPrice(-5.0))
    );
    assert_eq!(generator.generate_initial_series(0, 100.0, end, &mut rng), Ok(Vec::new()));
}
