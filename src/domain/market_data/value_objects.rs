use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Smallest price any stored candle field may take.
pub const MIN_PRICE: f64 = 0.01;

/// Clamp a price to the positive floor.
pub fn floor_price(price: f64) -> f64 {
    price.max(MIN_PRICE)
}

/// Round to cents, the precision prices are displayed with.
pub fn round_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// True when two prices are indistinguishable at 2-decimal precision.
pub fn same_cents(a: f64, b: f64) -> bool {
    round_cents(a) == round_cents(b)
}

/// Value Object - requested price movement
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    StrumDisplay,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Direction {
    #[strum(serialize = "up")]
    #[serde(rename = "up")]
    Up,
    #[strum(serialize = "down")]
    #[serde(rename = "down")]
    Down,
}

impl Direction {
    /// Target reached from `last_close` by moving `magnitude` in this direction.
    pub fn target_from(&self, last_close: f64, magnitude: f64) -> f64 {
        match self {
            Self::Up => last_close + magnitude,
            Self::Down => floor_price(last_close - magnitude),
        }
    }
}
