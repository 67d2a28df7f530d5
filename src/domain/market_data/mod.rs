//! Candle value objects and the bounded rolling window.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
