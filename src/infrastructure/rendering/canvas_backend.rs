use super::display_list::{DrawCommand, RenderBackend};
use crate::domain::chart::ContainerSize;
use crate::domain::errors::{RenderError, RenderingResult};
use crate::domain::logging::LogComponent;
use crate::log_trace;
use js_sys::Array;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const DASH_PATTERN: [f64; 2] = [4.0, 4.0];

/// Canvas 2D sink for display lists.
pub struct CanvasBackend {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    pixel_ratio: f64,
}

impl CanvasBackend {
    pub fn new(canvas: HtmlCanvasElement) -> RenderingResult<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(|e| RenderError::Canvas(format!("getContext failed: {:?}", e)))?
            .ok_or_else(|| RenderError::Canvas("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::Canvas("context is not CanvasRenderingContext2d".to_string()))?;

        let pixel_ratio = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio()).max(1.0);
        Ok(Self { canvas, context, pixel_ratio })
    }

    /// Look the canvas up by element id.
    pub fn from_element_id(id: &str) -> RenderingResult<Self> {
        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
            .ok_or_else(|| RenderError::Canvas(format!("no element with id '{}'", id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| RenderError::Canvas(format!("element '{}' is not a canvas", id)))?;
        Self::new(canvas)
    }

    /// CSS size of the canvas as laid out by the page.
    pub fn css_size(&self) -> ContainerSize {
        ContainerSize::new(self.canvas.client_width() as f64, self.canvas.client_height() as f64)
    }

    /// Match the backing store to `size` CSS pixels at the device pixel ratio.
    pub fn resize(&self, size: ContainerSize) -> RenderingResult<()> {
        self.canvas.set_width((size.width * self.pixel_ratio).round().max(0.0) as u32);
        self.canvas.set_height((size.height * self.pixel_ratio).round().max(0.0) as u32);
        let ratio = self.pixel_ratio;
        self.context
            .set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0)
            .map_err(|e| RenderError::Canvas(format!("setTransform failed: {:?}", e)))
    }

    fn set_dash(&self, dashed: bool) -> Result<(), JsValue> {
        let pattern = Array::new();
        if dashed {
            for segment in DASH_PATTERN {
                pattern.push(&JsValue::from_f64(segment));
            }
        }
        self.context.set_line_dash(&pattern)
    }

    fn execute(&self, command: &DrawCommand) -> Result<(), JsValue> {
        let ctx = &self.context;
        match command {
            DrawCommand::Clear { width, height, color } => {
                ctx.clear_rect(0.0, 0.0, *width, *height);
                ctx.set_global_alpha(1.0);
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill_rect(0.0, 0.0, *width, *height);
            }
            DrawCommand::Line { from, to, color, width, opacity, dashed } => {
                self.set_dash(*dashed)?;
                ctx.set_global_alpha(*opacity);
                ctx.set_stroke_style_str(&color.to_css());
                ctx.set_line_width(*width);
                ctx.begin_path();
                ctx.move_to(from.0, from.1);
                ctx.line_to(to.0, to.1);
                ctx.stroke();
            }
            DrawCommand::Rect { x, y, width, height, color, opacity } => {
                ctx.set_global_alpha(*opacity);
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill_rect(*x, *y, *width, *height);
            }
            DrawCommand::Text { x, y, text, color, font, align, baseline } => {
                ctx.set_global_alpha(1.0);
                ctx.set_fill_style_str(&color.to_css());
                ctx.set_font(font);
                ctx.set_text_align(align.as_ref());
                ctx.set_text_baseline(baseline.as_ref());
                ctx.fill_text(text, *x, *y)?;
            }
            DrawCommand::PushClip { x, y, width, height } => {
                ctx.save();
                ctx.begin_path();
                ctx.rect(*x, *y, *width, *height);
                ctx.clip();
            }
            DrawCommand::PopClip => ctx.restore(),
        }
        Ok(())
    }
}

impl RenderBackend for CanvasBackend {
    fn present(&mut self, commands: &[DrawCommand]) -> RenderingResult<()> {
        for command in commands {
            self.execute(command).map_err(|e| RenderError::Draw(format!("{:?}", e)))?;
        }
        self.context.set_global_alpha(1.0);
        log_trace!(LogComponent::Infrastructure("Canvas"), "presented {} commands", commands.len());
        Ok(())
    }
}
