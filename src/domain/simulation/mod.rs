//! Synthetic price generation.

pub mod config;
pub mod generator;

pub use config::SimulationConfig;
pub use generator::{PriceWalkGenerator, WalkParams};
