//! Chart geometry: domains, scales and keyed reconciliation.

pub mod diff;
pub mod scale;
pub mod value_objects;

pub use diff::{KeyedDiff, diff_keyed};
pub use scale::{BandScale, LinearScale, ScaleCalculator, ScaleMapping};
pub use value_objects::*;
