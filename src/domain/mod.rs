//! Framework-free core: candles, price-walk generation and chart scales.

pub mod chart;
pub mod errors;
pub mod logging;
pub mod market_data;
pub mod simulation;
