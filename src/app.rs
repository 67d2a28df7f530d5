use leptos::html::Canvas;
use leptos::*;

use crate::domain::logging::LogComponent;
use crate::global_state::{candle_count, current_price, is_animating, last_error};
use crate::infrastructure::rendering::axis::format_currency;
use crate::log_debug;
use crate::presentation::wasm_api;

const CANVAS_ID: &str = "price-sim-canvas";

fn error_text(error: wasm_bindgen::JsValue) -> String {
    error.as_string().unwrap_or_else(|| format!("{:?}", error))
}

/// Page shell: header with the latest close, the chart canvas and the run controls.
#[component]
pub fn App() -> impl IntoView {
    view! {
        <style>
            {r#"
            .price-sim-app {
                font-family: -apple-system, BlinkMacSystemFont, sans-serif;
                background: #0b1120;
                min-height: 100vh;
                padding: 20px;
                color: #e5e7eb;
            }
            .header {
                display: flex;
                justify-content: space-between;
                align-items: baseline;
                margin-bottom: 12px;
            }
            .price-value {
                font-family: 'Courier New', monospace;
                font-size: 24px;
                font-weight: 700;
            }
            .price-label {
                font-size: 12px;
                color: #9ca3af;
            }
            .chart-canvas {
                width: 100%;
                height: 420px;
                border-radius: 8px;
                cursor: crosshair;
                display: block;
            }
            .controls {
                display: flex;
                gap: 10px;
                margin-top: 12px;
            }
            .sim-btn {
                padding: 8px 18px;
                border: none;
                border-radius: 6px;
                font-weight: 600;
                color: white;
                cursor: pointer;
            }
            .sim-btn:disabled { opacity: 0.4; cursor: not-allowed; }
            .sim-btn.up { background: #16a34a; }
            .sim-btn.down { background: #dc2626; }
            .sim-btn.reset { background: #374151; }
            .error { color: #f87171; margin-top: 8px; }
            "#}
        </style>
        <div class="price-sim-app">
            <Header />
            <ChartCanvas />
            <Controls />
        </div>
    }
}

#[component]
fn Header() -> impl IntoView {
    let price = current_price();
    let count = candle_count();

    view! {
        <div class="header">
            <div>
                <div class="price-value">{move || format_currency(price.get())}</div>
                <div class="price-label">"Last close"</div>
            </div>
            <div>
                <div class="price-value">{move || count.get().to_string()}</div>
                <div class="price-label">"Candles"</div>
            </div>
        </div>
    }
}

fn resize_to(canvas: &web_sys::HtmlCanvasElement) {
    let (width, height) = (canvas.client_width() as f64, canvas.client_height() as f64);
    log_debug!(LogComponent::Presentation("App"), "resize to {}x{}", width, height);
    let _ = wasm_api::resize_chart(width, height);
}

#[component]
fn ChartCanvas() -> impl IntoView {
    let canvas_ref = create_node_ref::<Canvas>();

    // Mount once the canvas exists, then size it after the first layout
    create_effect(move |mounted: Option<bool>| {
        if mounted == Some(true) {
            return true;
        }
        let Some(canvas) = canvas_ref.get() else {
            return false;
        };
        if let Err(e) = wasm_api::mount_canvas((*canvas).clone(), None) {
            last_error().set(Some(error_text(e)));
            return true;
        }
        request_animation_frame(move || resize_to(&canvas));
        true
    });

    let _ = window_event_listener(ev::resize, move |_| {
        if let Some(canvas) = canvas_ref.get_untracked() {
            resize_to(&canvas);
        }
    });

    let on_mouse_move = move |event: ev::MouseEvent| {
        let _ = wasm_api::pointer_move(event.offset_x() as f64, event.offset_y() as f64);
    };
    let on_mouse_leave = move |_event: ev::MouseEvent| {
        let _ = wasm_api::pointer_leave();
    };

    view! {
        <canvas
            id=CANVAS_ID
            class="chart-canvas"
            node_ref=canvas_ref
            on:mousemove=on_mouse_move
            on:mouseleave=on_mouse_leave
        />
    }
}

#[component]
fn Controls() -> impl IntoView {
    let animating = is_animating();
    let error = last_error();

    let trigger = move |direction: &'static str| {
        match wasm_api::trigger_simulation(direction) {
            Ok(_) => error.set(None),
            Err(e) => error.set(Some(error_text(e))),
        }
    };

    view! {
        <div class="controls">
            <button class="sim-btn up" disabled=move || animating.get() on:click=move |_| trigger("up")>
                "▲ Up"
            </button>
            <button class="sim-btn down" disabled=move || animating.get() on:click=move |_| trigger("down")>
                "▼ Down"
            </button>
            <button
                class="sim-btn reset"
                disabled=move || animating.get()
                on:click=move |_| {
                    if let Err(e) = wasm_api::reset_chart() {
                        error.set(Some(error_text(e)));
                    }
                }
            >
                "Reset"
            </button>
        </div>
        <Show when=move || error.get().is_some()>
            <div class="error">{move || error.get().unwrap_or_default()}</div>
        </Show>
    }
}
