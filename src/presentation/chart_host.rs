use crate::application::{ChangeKind, Scheduler, SimulatorController};
use crate::domain::chart::{ContainerSize, EnterMode, Margin};
use crate::domain::errors::{AppError, AppResult};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::Direction;
use crate::domain::simulation::SimulationConfig;
use crate::infrastructure::rendering::{ChartRenderer, ChartStyle, RenderBackend, RenderRequest};
use crate::{log_error, log_warn};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use std::cell::Cell;
use std::rc::Rc;

/// What the page shows next to the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostSnapshot {
    pub is_animating: bool,
    pub current_price: f64,
    pub candle_count: usize,
}

/// Glues the controller to a renderer and a backend.
///
/// State changes only mark the host dirty and call `on_change`; drawing
/// happens in [`ChartHost::paint`], driven by the caller's frame loop.
pub struct ChartHost<S: Scheduler, B: RenderBackend> {
    controller: SimulatorController<S, StdRng>,
    renderer: ChartRenderer,
    backend: B,
    size: ContainerSize,
    margin: Margin,
    dirty: Rc<Cell<Option<EnterMode>>>,
    // Last reconcile was refused; the renderer still holds the old layout
    stale: bool,
}

fn mark_dirty(dirty: &Cell<Option<EnterMode>>, mode: EnterMode) {
    // An animated enter must survive a later immediate re-render in the same frame
    let merged = match (dirty.get(), mode) {
        (Some(EnterMode::Animated), _) | (_, EnterMode::Animated) => EnterMode::Animated,
        _ => EnterMode::Immediate,
    };
    dirty.set(Some(merged));
}

impl<S: Scheduler, B: RenderBackend> ChartHost<S, B> {
    pub fn new<F>(
        config: SimulationConfig,
        scheduler: S,
        rng: StdRng,
        backend: B,
        size: ContainerSize,
        on_change: F,
    ) -> AppResult<Self>
    where
        F: Fn() + 'static,
    {
        let mut controller = SimulatorController::new(config, scheduler, rng)?;
        let dirty = Rc::new(Cell::new(None));

        let listener_dirty = Rc::clone(&dirty);
        controller.set_listener(move |kind| {
            let mode = match kind {
                ChangeKind::Reveal { .. } => EnterMode::Animated,
                ChangeKind::Reset | ChangeKind::RunStarted => EnterMode::Immediate,
            };
            mark_dirty(&listener_dirty, mode);
            on_change();
        });

        Ok(Self {
            controller,
            renderer: ChartRenderer::new(ChartStyle::default()),
            backend,
            size,
            margin: Margin::default(),
            dirty,
            stale: false,
        })
    }

    pub fn reset(&mut self, end_date: NaiveDate) -> AppResult<bool> {
        Ok(self.controller.reset(end_date)?)
    }

    pub fn trigger(&mut self, direction: Direction) -> AppResult<bool> {
        Ok(self.controller.trigger_simulation(direction)?)
    }

    pub fn trigger_named(&mut self, direction: &str) -> AppResult<bool> {
        let direction: Direction = direction
            .parse()
            .map_err(|_| AppError::Validation(format!("unknown direction '{}'", direction)))?;
        self.trigger(direction)
    }

    pub fn resize(&mut self, size: ContainerSize) {
        if size != self.size {
            self.size = size;
            mark_dirty(&self.dirty, EnterMode::Immediate);
        }
    }

    pub fn set_margin(&mut self, margin: Margin) {
        if margin != self.margin {
            self.margin = margin;
            mark_dirty(&self.dirty, EnterMode::Immediate);
        }
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) -> bool {
        self.renderer.pointer_moved(x, y)
    }

    pub fn pointer_left(&mut self) -> bool {
        self.renderer.pointer_left()
    }

    /// A state change is waiting for the next [`ChartHost::paint`].
    pub fn needs_paint(&self) -> bool {
        self.dirty.get().is_some()
    }

    /// Reconcile pending changes and draw one frame.
    ///
    /// Returns `true` while transitions are still running and another frame is wanted.
    pub fn paint(&mut self, now_ms: f64) -> bool {
        if let Some(enter) = self.dirty.take() {
            let window = self.controller.window();
            let rendered = self.renderer.render(
                RenderRequest {
                    window: &window,
                    domain: self.controller.domain(),
                    size: self.size,
                    margin: self.margin,
                    enter,
                },
                now_ms,
            );
            self.stale = !rendered;
            if !rendered {
                log_warn!(
                    LogComponent::Presentation("ChartHost"),
                    "skipping draw: {} candles in a {:.0}x{:.0} container",
                    window.len(),
                    self.size.width,
                    self.size.height
                );
            }
        }
        if self.stale {
            return false;
        }

        if let Err(e) = self.renderer.draw(&mut self.backend, now_ms) {
            log_error!(LogComponent::Presentation("ChartHost"), "draw failed: {}", e);
            return false;
        }
        !self.renderer.is_settled(now_ms)
    }

    pub fn snapshot(&self) -> HostSnapshot {
        let window = self.controller.window();
        HostSnapshot {
            is_animating: self.controller.is_animating(),
            current_price: window.latest_close().unwrap_or_default(),
            candle_count: window.len(),
        }
    }

    pub fn controller(&self) -> &SimulatorController<S, StdRng> {
        &self.controller
    }

    pub fn renderer(&self) -> &ChartRenderer {
        &self.renderer
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
