use crate::application::{Scheduler, Task};
use gloo::render::{AnimationFrame, request_animation_frame};
use gloo::timers::callback::Timeout;

/// Runs scheduled tasks on `setTimeout`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserScheduler;

impl BrowserScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for BrowserScheduler {
    fn schedule(&self, delay_ms: u64, task: Task) {
        let delay = u32::try_from(delay_ms).unwrap_or(u32::MAX);
        // Fire-and-forget: the timeout owns the task until it runs
        let _ = Timeout::new(delay, task).forget();
    }
}

/// Holds at most one pending animation frame; requesting again while one
/// is pending is a no-op.
#[derive(Default)]
pub struct FrameLoop {
    // Dropping an AnimationFrame cancels it, so the last handle lives until the next request
    handle: Option<AnimationFrame>,
    in_flight: bool,
}

impl FrameLoop {
    pub fn request<F>(&mut self, callback: F)
    where
        F: FnOnce(f64) + 'static,
    {
        if self.in_flight {
            return;
        }
        self.in_flight = true;
        self.handle = Some(request_animation_frame(callback));
    }

    /// Mark the pending frame as delivered; call first thing inside the callback.
    pub fn clear(&mut self) {
        self.in_flight = false;
    }

    pub fn cancel(&mut self) {
        self.handle.take();
        self.in_flight = false;
    }
}
