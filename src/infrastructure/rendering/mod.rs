//! Display-list renderer for the candlestick chart.
//!
//! [`ChartRenderer`] keeps a retained [`scene::Scene`] and emits
//! [`DrawCommand`]s each frame; a [`RenderBackend`] turns them into pixels.

pub mod axis;
pub mod canvas_backend;
pub mod chart_renderer;
pub mod display_list;
pub mod scene;
pub mod transition;

pub use canvas_backend::CanvasBackend;
pub use chart_renderer::{ChartRenderer, ChartStyle, Crosshair, RenderRequest, RendererState};
pub use display_list::{DrawCommand, RecordingBackend, RenderBackend, TextAlign, TextBaseline};
