use derive_more::Constructor;
use serde::{Deserialize, Serialize};

/// Value Object - price range mapped to the plot's vertical extent
#[derive(Debug, Clone, Copy, PartialEq, Constructor, Serialize, Deserialize)]
pub struct PriceDomain {
    pub min: f64,
    pub max: f64,
}

impl PriceDomain {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, price: f64) -> bool {
        (self.min..=self.max).contains(&price)
    }

    /// Linear blend towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(&self, other: &PriceDomain, t: f64) -> PriceDomain {
        let t = t.clamp(0.0, 1.0);
        PriceDomain {
            min: self.min + (other.min - self.min) * t,
            max: self.max + (other.max - self.max) * t,
        }
    }
}

/// Value Object - space reserved around the plot for axes
#[derive(Debug, Clone, Copy, PartialEq, Constructor, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self { top: 20.0, right: 30.0, bottom: 30.0, left: 60.0 }
    }
}

/// Value Object - container size supplied by the host, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Constructor, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

/// Inner rectangle where candles are drawn, in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn new(size: ContainerSize, margin: &Margin) -> Self {
        Self {
            x: margin.left,
            y: margin.top,
            width: (size.width - margin.left - margin.right).max(0.0),
            height: (size.height - margin.top - margin.bottom).max(0.0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether a container-space point falls inside the plot (edges included).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// How brand-new candles appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnterMode {
    /// Drawn at final extents (initial load, resets).
    #[default]
    Immediate,
    /// Grown from the open price (per-candle reveal).
    Animated,
}

/// Value Object - Color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::new(r, g, b, 1.0)
    }

    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self { a: alpha, ..*self }
    }

    /// CSS `rgba()` form understood by canvas fill and stroke styles.
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            self.a
        )
    }

    pub const BULLISH: Color = Color::from_hex(0x22C55E);
    pub const BEARISH: Color = Color::from_hex(0xEF4444);
    pub const BACKGROUND: Color = Color::from_hex(0x111827);
    pub const GRID: Color = Color::new(1.0, 1.0, 1.0, 0.08);
    pub const AXIS: Color = Color::from_hex(0x9CA3AF);
    pub const CROSSHAIR: Color = Color::from_hex(0xE5E7EB);
}
