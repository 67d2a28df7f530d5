use crate::domain::errors::ConfigError;
use crate::domain::market_data::{DEFAULT_WINDOW_CAPACITY, MIN_PRICE};
use serde::{Deserialize, Serialize};

/// Tunables of the price walk and of the reveal animation.
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Days of synthetic history created at start-up.
    pub history_length: usize,
    pub starting_price: f64,
    /// Candles generated per simulation run.
    pub simulation_steps: usize,
    /// Distance between the last close and a run's target.
    pub price_change: f64,
    /// Half-width of the uniform daily move used for history.
    pub daily_move: f64,
    /// Upper bound of the extra wick length above and below the body.
    pub wick_range: f64,
    /// Half-width of the uniform noise added to every path step.
    pub random_move: f64,
    pub drift_multiplier: f64,
    /// Floor applied to the running close while generating history.
    pub running_floor: f64,
    pub step_delay_ms: u64,
    pub window_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            history_length: 60,
            starting_price: 100.0,
            simulation_steps: 5,
            price_change: 20.0,
            daily_move: 5.0,
            wick_range: 5.0,
            random_move: 8.0,
            drift_multiplier: 1.5,
            running_floor: 10.0,
            step_delay_ms: 400,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
        }
    }
}

impl SimulationConfig {
    /// Parse a JSON document and validate the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid { field, reason: reason.into() }
        }

        if self.simulation_steps == 0 {
            return Err(invalid("simulation_steps", "must be at least 1"));
        }
        if self.window_capacity == 0 {
            return Err(invalid("window_capacity", "must be at least 1"));
        }
        if !self.starting_price.is_finite() || self.starting_price < MIN_PRICE {
            return Err(invalid("starting_price", format!("must be >= {MIN_PRICE}")));
        }

        let non_negative = [
            ("price_change", self.price_change),
            ("daily_move", self.daily_move),
            ("wick_range", self.wick_range),
            ("random_move", self.random_move),
            ("drift_multiplier", self.drift_multiplier),
            ("running_floor", self.running_floor),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("must be finite and non-negative, got {value}")));
            }
        }

        Ok(())
    }
}
