use super::axis::{format_currency, time_ticks, value_ticks};
use super::display_list::{DrawCommand, RenderBackend, TextAlign, TextBaseline};
use super::scene::{Band, Scene};
use super::transition::{DomainTransition, Transition};
use crate::domain::chart::{
    BandScale, Color, ContainerSize, EnterMode, LinearScale, Margin, PlotArea, PriceDomain,
    ScaleCalculator, ScaleMapping, diff_keyed,
};
use crate::domain::errors::RenderingResult;
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{Candle, CandleWindow};
use crate::{log_debug, log_info};
use chrono::NaiveDate;
use std::collections::HashSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Visual constants of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub enter_duration_ms: f64,
    pub exit_duration_ms: f64,
    pub axis_duration_ms: f64,
    pub value_tick_count: usize,
    /// Label every n-th candle on the time axis.
    pub time_label_stride: usize,
    pub wick_width: f64,
    pub font: String,
    pub bullish: Color,
    pub bearish: Color,
    pub background: Color,
    pub grid: Color,
    pub axis: Color,
    pub crosshair: Color,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            enter_duration_ms: 400.0,
            exit_duration_ms: 300.0,
            axis_duration_ms: 300.0,
            value_tick_count: 10,
            time_label_stride: 8,
            wick_width: 1.0,
            font: "11px sans-serif".to_string(),
            bullish: Color::BULLISH,
            bearish: Color::BEARISH,
            background: Color::BACKGROUND,
            grid: Color::GRID,
            axis: Color::AXIS,
            crosshair: Color::CROSSHAIR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    /// Nothing rendered yet; no scene exists.
    Uninitialized,
    /// Scene created, waiting for the first drawable request.
    Initialized,
    /// At least one request has been laid out.
    Rendering,
}

/// Everything one render pass needs from the host.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub window: &'a CandleWindow,
    /// Value-axis domain; computed from the window when absent.
    pub domain: Option<PriceDomain>,
    pub size: ContainerSize,
    pub margin: Margin,
    pub enter: EnterMode,
}

/// Pointer position inside the plot, container pixels.
///
/// The price under the pointer is read off the value axis each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crosshair {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone)]
struct Layout {
    size: ContainerSize,
    plot: PlotArea,
    mapping: ScaleMapping,
}

/// Reconciles candle windows into a retained scene and draws it.
pub struct ChartRenderer {
    style: ChartStyle,
    state: RendererState,
    scene: Scene,
    layout: Option<Layout>,
    value_axis: Option<DomainTransition>,
    crosshair: Option<Crosshair>,
}

impl ChartRenderer {
    pub fn new(style: ChartStyle) -> Self {
        Self {
            style,
            state: RendererState::Uninitialized,
            scene: Scene::new(),
            layout: None,
            value_axis: None,
            crosshair: None,
        }
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn crosshair(&self) -> Option<Crosshair> {
        self.crosshair
    }

    /// Plot rectangle of the last accepted request.
    pub fn plot_area(&self) -> Option<PlotArea> {
        self.layout.as_ref().map(|layout| layout.plot)
    }

    /// Value-axis domain currently on screen.
    pub fn current_domain(&self, now_ms: f64) -> Option<PriceDomain> {
        self.value_axis.map(|axis| axis.domain_at(now_ms))
    }

    /// Reconcile the scene against `request.window`.
    ///
    /// Returns `false` and leaves everything untouched when the window is empty
    /// or the plot has no area.
    pub fn render(&mut self, request: RenderRequest<'_>, now_ms: f64) -> bool {
        let plot = PlotArea::new(request.size, &request.margin);
        if request.window.is_empty() || plot.is_empty() {
            log_debug!(
                LogComponent::Infrastructure("ChartRenderer"),
                "skipping render: {} candles, plot {:.0}x{:.0}",
                request.window.len(),
                plot.width,
                plot.height
            );
            return false;
        }
        let Some(domain) = request.domain.or_else(|| ScaleCalculator::compute_domain(request.window.iter())) else {
            return false;
        };

        if self.state == RendererState::Uninitialized {
            self.state = RendererState::Initialized;
            log_info!(
                LogComponent::Infrastructure("ChartRenderer"),
                "scene initialized at {:.0}x{:.0}",
                request.size.width,
                request.size.height
            );
        }

        let mapping = ScaleMapping::new(request.window.dates(), domain, &plot);
        match self.value_axis.as_mut() {
            Some(axis) => axis.retarget(domain, now_ms, self.style.axis_duration_ms),
            None => self.value_axis = Some(DomainTransition::settled(domain)),
        }

        self.reconcile(request.window, &mapping.x, request.enter, now_ms);
        if self.crosshair.is_some_and(|c| !plot.contains(c.x, c.y)) {
            self.crosshair = None;
        }

        self.layout = Some(Layout { size: request.size, plot, mapping });
        self.state = RendererState::Rendering;
        true
    }

    fn reconcile(&mut self, window: &CandleWindow, x: &BandScale, enter: EnterMode, now_ms: f64) {
        let diff = diff_keyed(self.scene.live_keys(), x.keys().iter().copied());
        if !diff.is_unchanged() {
            log_debug!(
                LogComponent::Infrastructure("ChartRenderer"),
                "diff: +{} ~{} -{}",
                diff.entering.len(),
                diff.continuing.len(),
                diff.exiting.len()
            );
        }

        let entering: HashSet<NaiveDate> = diff.entering.iter().copied().collect();
        let reveal = match enter {
            EnterMode::Animated => Some(Transition::new(now_ms, self.style.enter_duration_ms)),
            EnterMode::Immediate => None,
        };

        for (candle, band) in layout_bands(&window.to_vec(), x) {
            if entering.contains(&candle.date) {
                self.scene.enter(candle, band, reveal);
            } else {
                self.scene.update(candle, band);
            }
        }

        // Evicted candles slide out past the left edge while they fade
        let step = x.step();
        let left_edge = x.position_at(0);
        let count = diff.exiting.len();
        let fade = Transition::new(now_ms, self.style.exit_duration_ms);
        for (i, date) in diff.exiting.iter().enumerate() {
            self.scene.exit(date, left_edge - step * (count - i) as f64, fade);
        }
    }

    /// Track the pointer. Returns whether the crosshair changed.
    pub fn pointer_moved(&mut self, x: f64, y: f64) -> bool {
        let next = self
            .layout
            .as_ref()
            .and_then(|layout| layout.plot.contains(x, y).then_some(Crosshair { x, y }));
        let changed = next != self.crosshair;
        self.crosshair = next;
        changed
    }

    pub fn pointer_left(&mut self) -> bool {
        self.crosshair.take().is_some()
    }

    /// Every transition has completed at `now_ms`.
    pub fn is_settled(&self, now_ms: f64) -> bool {
        self.value_axis.is_none_or(|axis| axis.is_finished(now_ms)) && self.scene.is_settled(now_ms)
    }

    /// Display list for `now_ms`; empty until a request has been accepted.
    pub fn frame(&mut self, now_ms: f64) -> Vec<DrawCommand> {
        self.scene.prune(now_ms);
        let (Some(layout), Some(axis)) = (self.layout.as_ref(), self.value_axis) else {
            return Vec::new();
        };

        let plot = layout.plot;
        let y = LinearScale::new(axis.domain_at(now_ms), (plot.height, 0.0));
        let mut commands = vec![DrawCommand::Clear {
            width: layout.size.width,
            height: layout.size.height,
            color: self.style.background,
        }];

        self.push_value_axis(&mut commands, &plot, &y);
        self.push_time_axis(&mut commands, &plot, &layout.mapping.x);
        self.push_candles(&mut commands, &plot, &y, now_ms);
        if let Some(crosshair) = self.crosshair {
            let price = y.invert(crosshair.y - plot.y);
            self.push_crosshair(&mut commands, &plot, crosshair, price);
        }
        commands
    }

    /// Build the frame for `now_ms` and hand it to `backend`.
    pub fn draw<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, now_ms: f64) -> RenderingResult<()> {
        let commands = self.frame(now_ms);
        if commands.is_empty() {
            return Ok(());
        }
        backend.present(&commands)
    }

    fn push_value_axis(&self, commands: &mut Vec<DrawCommand>, plot: &PlotArea, y: &LinearScale) {
        for tick in value_ticks(y, self.style.value_tick_count) {
            let py = plot.y + tick.position;
            commands.push(self.line((plot.x, py), (plot.right(), py), self.style.grid, false));
            commands.push(self.label(plot.x - 6.0, py, tick.label, TextAlign::Right, TextBaseline::Middle));
        }
        commands.push(self.line((plot.x, plot.y), (plot.x, plot.bottom()), self.style.axis, false));
    }

    fn push_time_axis(&self, commands: &mut Vec<DrawCommand>, plot: &PlotArea, x: &BandScale) {
        let bottom = plot.bottom();
        commands.push(self.line((plot.x, bottom), (plot.right(), bottom), self.style.axis, false));
        for tick in time_ticks(x, self.style.time_label_stride) {
            let px = plot.x + tick.position;
            commands.push(self.line((px, bottom), (px, bottom + 4.0), self.style.axis, false));
            commands.push(self.label(px, bottom + 8.0, tick.label, TextAlign::Center, TextBaseline::Top));
        }
    }

    fn push_candles(&self, commands: &mut Vec<DrawCommand>, plot: &PlotArea, y: &LinearScale, now_ms: f64) {
        commands.push(DrawCommand::PushClip { x: plot.x, y: plot.y, width: plot.width, height: plot.height });
        for mark in self.scene.frames(now_ms) {
            let color = if mark.bearish { self.style.bearish } else { self.style.bullish };
            let center = plot.x + mark.x + mark.width / 2.0;
            commands.push(DrawCommand::Line {
                from: (center, plot.y + y.map(mark.high)),
                to: (center, plot.y + y.map(mark.low)),
                color,
                width: self.style.wick_width,
                opacity: mark.opacity,
                dashed: false,
            });

            let top = plot.y + y.map(mark.body_top);
            let bottom = plot.y + y.map(mark.body_bottom);
            commands.push(DrawCommand::Rect {
                x: plot.x + mark.x,
                y: top,
                width: mark.width,
                height: bottom - top,
                color,
                opacity: mark.opacity,
            });
        }
        commands.push(DrawCommand::PopClip);
    }

    fn push_crosshair(&self, commands: &mut Vec<DrawCommand>, plot: &PlotArea, crosshair: Crosshair, price: f64) {
        let color = self.style.crosshair;
        commands.push(self.line((crosshair.x, plot.y), (crosshair.x, plot.bottom()), color, true));
        commands.push(self.line((plot.x, crosshair.y), (plot.right(), crosshair.y), color, true));
        commands.push(DrawCommand::Rect {
            x: 2.0,
            y: crosshair.y - 9.0,
            width: (plot.x - 4.0).max(0.0),
            height: 18.0,
            color,
            opacity: 1.0,
        });
        commands.push(DrawCommand::Text {
            x: plot.x - 6.0,
            y: crosshair.y,
            text: format_currency(price),
            color: self.style.background,
            font: self.style.font.clone(),
            align: TextAlign::Right,
            baseline: TextBaseline::Middle,
        });
    }

    fn line(&self, from: (f64, f64), to: (f64, f64), color: Color, dashed: bool) -> DrawCommand {
        DrawCommand::Line { from, to, color, width: 1.0, opacity: 1.0, dashed }
    }

    fn label(&self, x: f64, y: f64, text: String, align: TextAlign, baseline: TextBaseline) -> DrawCommand {
        DrawCommand::Text { x, y, text, color: self.style.axis, font: self.style.font.clone(), align, baseline }
    }
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(ChartStyle::default())
    }
}

fn band_for(candle: &Candle, x: &BandScale) -> Option<(Candle, Band)> {
    x.position(&candle.date).map(|left| (*candle, Band { x: left, width: x.bandwidth() }))
}

#[cfg(feature = "parallel")]
fn layout_bands(candles: &[Candle], x: &BandScale) -> Vec<(Candle, Band)> {
    candles.par_iter().filter_map(|candle| band_for(candle, x)).collect()
}

#[cfg(not(feature = "parallel"))]
fn layout_bands(candles: &[Candle], x: &BandScale) -> Vec<(Candle, Band)> {
    candles.iter().filter_map(|candle| band_for(candle, x)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(days: u32) -> CandleWindow {
        let candles = (1..=days).map(|d| {
            let date = NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
            let base = 100.0 + d as f64;
            Candle::new(date, base, base + 3.0, base - 3.0, base + 1.0)
        });
        CandleWindow::from_candles(60, candles)
    }

    fn request(window: &CandleWindow) -> RenderRequest<'_> {
        RenderRequest {
            window,
            domain: None,
            size: ContainerSize::new(800.0, 400.0),
            margin: Margin::default(),
            enter: EnterMode::Immediate,
        }
    }

    #[test]
    fn empty_window_is_a_no_op() {
        let mut renderer = ChartRenderer::default();
        let empty = CandleWindow::new(60);
        assert!(!renderer.render(request(&empty), 0.0));
        assert_eq!(renderer.state(), RendererState::Uninitialized);
        assert!(renderer.frame(0.0).is_empty());
    }

    #[test]
    fn zero_sized_container_is_a_no_op() {
        let mut renderer = ChartRenderer::default();
        let data = window(3);
        let mut req = request(&data);
        req.size = ContainerSize::new(0.0, 0.0);
        assert!(!renderer.render(req, 0.0));
        assert!(renderer.scene().is_empty());
    }

    #[test]
    fn first_render_draws_every_candle() {
        let mut renderer = ChartRenderer::default();
        let data = window(10);
        assert!(renderer.render(request(&data), 0.0));
        assert_eq!(renderer.state(), RendererState::Rendering);
        assert_eq!(renderer.scene().len(), 10);

        let rects = renderer.frame(0.0).iter().filter(|c| matches!(c, DrawCommand::Rect { .. })).count();
        assert_eq!(rects, 10);
        assert!(renderer.is_settled(0.0));
    }

    #[test]
    fn crosshair_only_inside_the_plot() {
        let mut renderer = ChartRenderer::default();
        let data = window(5);
        renderer.render(request(&data), 0.0);

        assert!(!renderer.pointer_moved(10.0, 10.0));
        assert!(renderer.pointer_moved(200.0, 100.0));
        assert!(renderer.crosshair().is_some());
        assert!(renderer.pointer_left());
        assert!(renderer.crosshair().is_none());
    }
}
