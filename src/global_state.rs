//! Signals the Leptos shell reads; the wasm API publishes a host snapshot
//! into them after every call and every painted frame.

crate::host_signals! {
    is_animating: bool = false,
    current_price: f64 = 0.0,
    candle_count: usize = 0,
    last_error: Option<String> = None,
}
