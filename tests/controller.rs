use chrono::NaiveDate;
use price_sim_wasm::application::{ChangeKind, SimulatorController, VirtualClock};
use price_sim_wasm::domain::errors::{ConfigError, SimulationError};
use price_sim_wasm::domain::market_data::{Direction, MIN_PRICE};
use price_sim_wasm::domain::simulation::SimulationConfig;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::rc::Rc;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 15).unwrap()
}

fn controller(seed: u64) -> (SimulatorController<VirtualClock>, VirtualClock) {
    let clock = VirtualClock::new();
    let mut controller =
        SimulatorController::new(SimulationConfig::default(), clock.clone(), StdRng::seed_from_u64(seed)).unwrap();
    assert!(controller.reset(today()).unwrap());
    (controller, clock)
}

#[test]
fn reset_builds_sixty_days_ending_today() {
    let (controller, _) = controller(1);
    let window = controller.window();
    assert_eq!(window.len(), 60);
    assert_eq!(window.last().map(|c| c.date), Some(today()));
    assert_eq!(window.first().map(|c| c.open), Some(100.0));
    assert!(controller.domain().is_some());
}

#[test]
fn run_reaches_target_and_keeps_window_bounded() {
    let (mut controller, clock) = controller(2);
    let last_close = controller.window().latest_close().unwrap();

    assert!(controller.trigger_simulation(Direction::Up).unwrap());
    assert!(controller.is_animating());
    clock.run_until_idle();

    let window = controller.window();
    assert!(!controller.is_animating());
    assert_eq!(window.len(), 60);
    assert_eq!(window.latest_close(), Some(last_close + 20.0));
    assert_eq!(window.last().map(|c| c.date), today().checked_add_days(chrono::Days::new(5)));
}

#[test]
fn domain_is_fixed_for_the_whole_run() {
    let (mut controller, clock) = controller(3);
    controller.trigger_simulation(Direction::Down).unwrap();
    let domain = controller.domain().unwrap();

    for _ in 0..5 {
        clock.advance(400);
        assert_eq!(controller.domain(), Some(domain));
        let window = controller.window();
        assert!(window.iter().all(|c| domain.contains(c.low) && domain.contains(c.high)));
    }
    assert!(!controller.is_animating());
}

#[test]
fn trigger_while_animating_is_dropped() {
    let (mut controller, clock) = controller(4);
    assert!(controller.trigger_simulation(Direction::Up).unwrap());
    clock.advance(500);
    let before = controller.domain();

    assert!(!controller.trigger_simulation(Direction::Down).unwrap());
    assert_eq!(controller.domain(), before);
    assert_eq!(clock.pending(), 4);
}

#[test]
fn reset_is_refused_mid_run() {
    let (mut controller, clock) = controller(5);
    controller.trigger_simulation(Direction::Up).unwrap();
    assert!(!controller.reset(today()).unwrap());
    clock.run_until_idle();
    assert!(controller.reset(today()).unwrap());
}

#[test]
fn down_target_never_drops_below_floor() {
    let config = SimulationConfig { starting_price: 15.0, price_change: 500.0, ..SimulationConfig::default() };
    let clock = VirtualClock::new();
    let mut controller = SimulatorController::new(config, clock.clone(), StdRng::seed_from_u64(6)).unwrap();
    controller.reset(today()).unwrap();

    controller.trigger_simulation(Direction::Down).unwrap();
    clock.run_until_idle();
    assert_eq!(controller.window().latest_close(), Some(MIN_PRICE));
}

#[test]
fn listener_sees_every_change() {
    let (mut controller, clock) = controller(7);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    controller.set_listener(move |kind| sink.borrow_mut().push(kind));

    controller.trigger_simulation(Direction::Up).unwrap();
    clock.run_until_idle();

    let seen = seen.borrow();
    assert_eq!(seen.first(), Some(&ChangeKind::RunStarted));
    assert_eq!(seen.iter().filter(|k| k.is_reveal()).count(), 5);
    assert_eq!(seen.last(), Some(&ChangeKind::Reveal { is_last: true }));
}

#[test]
fn trigger_before_reset_has_nothing_to_extend() {
    let mut controller =
        SimulatorController::new(SimulationConfig::default(), VirtualClock::new(), StdRng::seed_from_u64(8)).unwrap();
    assert_eq!(controller.trigger_simulation(Direction::Up), Err(SimulationError::EmptyWindow));
}

#[test]
fn invalid_config_is_rejected() {
    let config = SimulationConfig { simulation_steps: 0, ..SimulationConfig::default() };
    let result = SimulatorController::new(config, VirtualClock::new(), StdRng::seed_from_u64(9));
    assert!(matches!(result, Err(ConfigError::Invalid { field: "simulation_steps", .. })));
}
