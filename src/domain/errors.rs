use thiserror::Error;

/// Precondition violations raised by the price-walk generator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("path needs at least one step")]
    ZeroSteps,
    #[error("target price must be finite and at least {min}, got {value}")]
    InvalidTarget { value: f64, min: f64 },
    #[error("starting price must be finite and positive, got {0}")]
    InvalidStartingPrice(f64),
    #[error("calendar overflow after {0}")]
    DateOverflow(chrono::NaiveDate),
    #[error("no candle to continue from")]
    EmptyWindow,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("canvas unavailable: {0}")]
    Canvas(String),
    #[error("drawing failed: {0}")]
    Draw(String),
}

/// Top-level error surfaced to the presentation layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Simulation Error: {0}")]
    Simulation(#[from] SimulationError),
    #[error("Config Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Rendering Error: {0}")]
    Rendering(#[from] RenderError),
    #[error("Validation Error: {0}")]
    Validation(String),
}

pub type SimulationResult<T> = Result<T, SimulationError>;
pub type RenderingResult<T> = Result<T, RenderError>;
pub type AppResult<T> = Result<T, AppError>;
