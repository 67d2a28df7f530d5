pub mod chart_host;
pub mod wasm_api;

pub use chart_host::{ChartHost, HostSnapshot};
