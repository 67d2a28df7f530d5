//! Delayed, fire-and-forget work items.
//!
//! Everything that has to happen "later" (the staggered candle reveals) goes
//! through [`Scheduler`]. The browser implementation lives in
//! `infrastructure::timers`; [`VirtualClock`] drives the same code from tests
//! without waiting on a wall clock.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub type Task = Box<dyn FnOnce() + 'static>;

pub trait Scheduler {
    /// Run `task` once, `delay_ms` milliseconds from now.
    fn schedule(&self, delay_ms: u64, task: Task);
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn schedule(&self, delay_ms: u64, task: Task) {
        (**self).schedule(delay_ms, task);
    }
}

#[derive(Default)]
struct ClockState {
    now: u64,
    next_seq: u64,
    // (fire time, insertion order) keeps equal deadlines FIFO
    queue: BTreeMap<(u64, u64), Task>,
}

/// Manually advanced clock holding a queue of `(fire_time, task)` pairs.
#[derive(Clone, Default)]
pub struct VirtualClock {
    state: Rc<RefCell<ClockState>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.state.borrow().now
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    pub fn next_fire_time(&self) -> Option<u64> {
        self.state.borrow().queue.keys().next().map(|(fire, _)| *fire)
    }

    /// Move time forward by `ms`, running every task that falls due. Returns how many ran.
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.now().saturating_add(ms);
        self.advance_to(target)
    }

    pub fn advance_to(&self, target: u64) -> usize {
        let mut ran = 0;
        loop {
            // Release the borrow before running: tasks may schedule more work
            let due = {
                let mut state = self.state.borrow_mut();
                match state.queue.keys().next() {
                    Some(&(fire, _)) if fire <= target => {
                        state.now = state.now.max(fire);
                        state.queue.pop_first()
                    }
                    _ => None,
                }
            };
            match due {
                Some((_, task)) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }

        let mut state = self.state.borrow_mut();
        state.now = state.now.max(target);
        ran
    }

    /// Drain the queue, jumping from deadline to deadline.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(fire) = self.next_fire_time() {
            ran += self.advance_to(fire);
        }
        ran
    }
}

impl Scheduler for VirtualClock {
    fn schedule(&self, delay_ms: u64, task: Task) {
        let mut state = self.state.borrow_mut();
        let key = (state.now.saturating_add(delay_ms), state.next_seq);
        state.next_seq += 1;
        state.queue.insert(key, task);
    }
}
