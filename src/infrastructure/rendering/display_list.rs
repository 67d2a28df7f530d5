use crate::domain::chart::Color;
use crate::domain::errors::RenderingResult;
use serde::Serialize;
use strum::AsRefStr;

/// Horizontal anchor of a text command, named as canvas expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Vertical anchor of a text command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TextBaseline {
    Top,
    Middle,
    Bottom,
}

/// One drawing primitive, in container pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        width: f64,
        height: f64,
        color: Color,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
        width: f64,
        opacity: f64,
        dashed: bool,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
        opacity: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        color: Color,
        font: String,
        align: TextAlign,
        baseline: TextBaseline,
    },
    /// Restrict following commands to a rectangle until the matching [`DrawCommand::PopClip`].
    PushClip {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    PopClip,
}

/// Sink that turns a frame's display list into pixels.
pub trait RenderBackend {
    fn present(&mut self, commands: &[DrawCommand]) -> RenderingResult<()>;
}

/// Keeps every presented frame; used by tests and headless hosts.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    frames: Vec<Vec<DrawCommand>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn last_frame(&self) -> Option<&[DrawCommand]> {
        self.frames.last().map(Vec::as_slice)
    }

    pub fn frames(&self) -> &[Vec<DrawCommand>] {
        &self.frames
    }

    /// Text of every label in the last frame, in draw order.
    pub fn last_labels(&self) -> Vec<String> {
        self.last_frame()
            .unwrap_or_default()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl RenderBackend for RecordingBackend {
    fn present(&mut self, commands: &[DrawCommand]) -> RenderingResult<()> {
        self.frames.push(commands.to_vec());
        Ok(())
    }
}
