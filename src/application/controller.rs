use super::scheduler::Scheduler;
use super::sequencer::AnimationSequencer;
use crate::domain::chart::{PriceDomain, ScaleCalculator};
use crate::domain::errors::{ConfigError, SimulationError, SimulationResult};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{CandleWindow, Direction};
use crate::domain::simulation::{PriceWalkGenerator, SimulationConfig, WalkParams};
use crate::{log_debug, log_info};
use chrono::NaiveDate;
use rand::Rng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::rc::Rc;

/// What changed in the simulation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A fresh history replaced the window.
    Reset,
    /// A run was accepted; the domain now covers the upcoming path.
    RunStarted,
    /// One candle of the run was appended to the window.
    Reveal { is_last: bool },
}

impl ChangeKind {
    pub fn is_reveal(&self) -> bool {
        matches!(self, Self::Reveal { .. })
    }
}

pub type ChangeListener = Rc<dyn Fn(ChangeKind)>;

/// Window + domain pair shared with the reveal callbacks.
#[derive(Debug, Clone, Default)]
struct SimulationState {
    window: CandleWindow,
    domain: Option<PriceDomain>,
}

/// Owns the data window and turns user triggers into animated runs.
pub struct SimulatorController<S: Scheduler, R: Rng = StdRng> {
    config: SimulationConfig,
    generator: PriceWalkGenerator,
    sequencer: AnimationSequencer,
    scheduler: S,
    rng: R,
    state: Rc<RefCell<SimulationState>>,
    listener: Option<ChangeListener>,
}

impl<S: Scheduler, R: Rng> SimulatorController<S, R> {
    pub fn new(config: SimulationConfig, scheduler: S, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = SimulationState {
            window: CandleWindow::new(config.window_capacity),
            domain: None,
        };
        Ok(Self {
            generator: PriceWalkGenerator::new(WalkParams::from(&config)),
            config,
            sequencer: AnimationSequencer::new(),
            scheduler,
            rng,
            state: Rc::new(RefCell::new(state)),
            listener: None,
        })
    }

    /// Called after every state change, including reveals fired by the scheduler.
    pub fn set_listener<F>(&mut self, listener: F)
    where
        F: Fn(ChangeKind) + 'static,
    {
        self.listener = Some(Rc::new(listener));
    }

    /// Replace the window with a freshly generated history ending at `end_date`.
    ///
    /// Refused (returns `false`) while a run is revealing candles.
    pub fn reset(&mut self, end_date: NaiveDate) -> SimulationResult<bool> {
        if self.sequencer.is_animating() {
            return Ok(false);
        }

        let history = self.generator.generate_initial_series(
            self.config.history_length,
            self.config.starting_price,
            end_date,
            &mut self.rng,
        )?;
        let window = CandleWindow::from_candles(self.config.window_capacity, history);
        let domain = ScaleCalculator::compute_domain(window.iter());

        log_info!(
            LogComponent::Application("Simulator"),
            "history ready: {} candles, last close {:.2}",
            window.len(),
            window.latest_close().unwrap_or_default()
        );

        *self.state.borrow_mut() = SimulationState { window, domain };
        self.notify(ChangeKind::Reset);
        Ok(true)
    }

    /// Start a run moving the price `price_change` up or down.
    ///
    /// Returns `Ok(false)` when a run is already in progress; the request is dropped.
    pub fn trigger_simulation(&mut self, direction: Direction) -> SimulationResult<bool> {
        if self.sequencer.is_animating() {
            log_debug!(
                LogComponent::Application("Simulator"),
                "trigger {} dropped: run in progress",
                direction
            );
            return Ok(false);
        }

        let start = self.state.borrow().window.last().copied().ok_or(SimulationError::EmptyWindow)?;
        let target = direction.target_from(start.close, self.config.price_change);
        let path = self.generator.generate_path(
            &start,
            target,
            self.config.simulation_steps,
            &mut self.rng,
        )?;

        {
            let mut state = self.state.borrow_mut();
            state.domain = ScaleCalculator::compute_run_domain(&state.window, &path);
        }

        log_info!(
            LogComponent::Application("Simulator"),
            "run {}: {:.2} -> {:.2} over {} candles",
            direction,
            start.close,
            target,
            path.len()
        );

        let state = Rc::clone(&self.state);
        let listener = self.listener.clone();
        let started = self.sequencer.run(
            &self.scheduler,
            path,
            move |candle, is_last| {
                {
                    let mut state = state.borrow_mut();
                    state.window = state.window.appended(candle);
                }
                if let Some(listener) = &listener {
                    listener(ChangeKind::Reveal { is_last });
                }
            },
            self.config.step_delay_ms,
        );

        if started {
            self.notify(ChangeKind::RunStarted);
        }
        Ok(started)
    }

    pub fn is_animating(&self) -> bool {
        self.sequencer.is_animating()
    }

    /// Snapshot of the current window.
    pub fn window(&self) -> CandleWindow {
        self.state.borrow().window.clone()
    }

    pub fn domain(&self) -> Option<PriceDomain> {
        self.state.borrow().domain
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn notify(&self, kind: ChangeKind) {
        if let Some(listener) = &self.listener {
            listener(kind);
        }
    }
}
