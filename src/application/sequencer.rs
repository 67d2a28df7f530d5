use super::scheduler::Scheduler;
use crate::domain::logging::LogComponent;
use crate::domain::market_data::Candle;
use crate::log_debug;
use std::cell::Cell;
use std::rc::Rc;

/// Staggers the reveal of a generated path, one candle per step.
///
/// Runs never overlap: while one is in flight, [`AnimationSequencer::run`] is a no-op.
#[derive(Debug, Clone, Default)]
pub struct AnimationSequencer {
    animating: Rc<Cell<bool>>,
}

impl AnimationSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_animating(&self) -> bool {
        self.animating.get()
    }

    /// Schedule `path[i]` at `(i + 1) * step_delay_ms`. Returns `false` when the run was refused
    /// (another run is active or the path is empty).
    ///
    /// `on_reveal` receives each candle with `is_last` set for the final one; the in-progress
    /// flag is already cleared when the final call happens.
    pub fn run<S, F>(&self, scheduler: &S, path: Vec<Candle>, on_reveal: F, step_delay_ms: u64) -> bool
    where
        S: Scheduler + ?Sized,
        F: Fn(Candle, bool) + 'static,
    {
        if self.animating.get() {
            log_debug!(LogComponent::Application("Sequencer"), "run ignored: already animating");
            return false;
        }
        let Some(last_index) = path.len().checked_sub(1) else {
            return false;
        };

        self.animating.set(true);
        log_debug!(
            LogComponent::Application("Sequencer"),
            "revealing {} candles every {}ms",
            path.len(),
            step_delay_ms
        );

        let on_reveal = Rc::new(on_reveal);
        for (index, candle) in path.into_iter().enumerate() {
            let animating = Rc::clone(&self.animating);
            let on_reveal = Rc::clone(&on_reveal);
            let is_last = index == last_index;
            let delay = (index as u64 + 1).saturating_mul(step_delay_ms);

            scheduler.schedule(
                delay,
                Box::new(move || {
                    if is_last {
                        animating.set(false);
                    }
                    on_reveal(candle, is_last);
                }),
            );
        }

        true
    }
}
