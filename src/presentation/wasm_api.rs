//! JavaScript surface of the chart: one chart per page, held in a thread-local.

use super::chart_host::{ChartHost, HostSnapshot};
use crate::domain::chart::{ContainerSize, Margin};
use crate::domain::errors::{AppError, AppResult};
use crate::domain::logging::LogComponent;
use crate::domain::simulation::SimulationConfig;
use crate::global_state::globals;
use crate::infrastructure::rendering::CanvasBackend;
use crate::infrastructure::timers::{BrowserScheduler, FrameLoop};
use crate::{log_error, log_info};
use chrono::Utc;
use leptos::SignalSet;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

type BrowserHost = ChartHost<BrowserScheduler, CanvasBackend>;

thread_local! {
    static HOST: RefCell<Option<BrowserHost>> = const { RefCell::new(None) };
    static FRAMES: RefCell<FrameLoop> = RefCell::new(FrameLoop::default());
}

impl From<AppError> for JsValue {
    fn from(error: AppError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

fn request_frame() {
    FRAMES.with(|frames| frames.borrow_mut().request(on_frame));
}

fn on_frame(timestamp: f64) {
    FRAMES.with(|frames| frames.borrow_mut().clear());
    let snapshot = HOST.with(|host| {
        let mut host = host.borrow_mut();
        let host = host.as_mut()?;
        if host.paint(timestamp) {
            request_frame();
        }
        Some(host.snapshot())
    });
    if let Some(snapshot) = snapshot {
        publish(snapshot);
    }
}

fn publish(snapshot: HostSnapshot) {
    let globals = globals();
    globals.is_animating.set(snapshot.is_animating);
    globals.current_price.set(snapshot.current_price);
    globals.candle_count.set(snapshot.candle_count);
}

/// Run `f` against the mounted host, then schedule a frame if anything changed.
fn with_host<T>(f: impl FnOnce(&mut BrowserHost) -> AppResult<T>) -> Result<T, JsValue> {
    let result = HOST.with(|host| {
        let mut host = host.borrow_mut();
        let host = host
            .as_mut()
            .ok_or_else(|| AppError::Validation("chart is not mounted".to_string()))?;
        let value = f(host)?;
        Ok::<_, AppError>((value, host.needs_paint(), host.snapshot()))
    });

    match result {
        Ok((value, needs_paint, snapshot)) => {
            publish(snapshot);
            if needs_paint {
                request_frame();
            }
            Ok(value)
        }
        Err(error) => {
            log_error!(LogComponent::Presentation("WasmApi"), "{}", error);
            globals().last_error.set(Some(error.to_string()));
            Err(error.into())
        }
    }
}

/// Mount the chart on the canvas with id `canvas_id` and generate its history.
///
/// `config_json` may override any field of the simulation config.
#[wasm_bindgen(js_name = mountChart)]
pub fn mount_chart(canvas_id: &str, config_json: Option<String>) -> Result<(), JsValue> {
    install(CanvasBackend::from_element_id(canvas_id).map_err(AppError::from), config_json.as_deref())
}

/// Same as [`mount_chart`] for a canvas the caller already holds.
pub fn mount_canvas(canvas: HtmlCanvasElement, config_json: Option<&str>) -> Result<(), JsValue> {
    install(CanvasBackend::new(canvas).map_err(AppError::from), config_json)
}

fn install(backend: AppResult<CanvasBackend>, config_json: Option<&str>) -> Result<(), JsValue> {
    let build = || -> AppResult<BrowserHost> {
        let config = match config_json {
            Some(json) => SimulationConfig::from_json(json)?,
            None => SimulationConfig::default(),
        };
        let backend = backend?;
        let size = backend.css_size();
        backend.resize(size)?;

        let rng = StdRng::from_entropy();
        let mut host = ChartHost::new(config, BrowserScheduler::new(), rng, backend, size, request_frame)?;
        host.reset(Utc::now().date_naive())?;
        Ok(host)
    };

    let host = build().map_err(|error| {
        log_error!(LogComponent::Presentation("WasmApi"), "mount failed: {}", error);
        JsValue::from(error)
    })?;

    let snapshot = host.snapshot();
    log_info!(
        LogComponent::Presentation("WasmApi"),
        "chart mounted with {} candles, last close {:.2}",
        snapshot.candle_count,
        snapshot.current_price
    );
    HOST.with(|slot| *slot.borrow_mut() = Some(host));
    FRAMES.with(|frames| frames.borrow_mut().cancel());
    publish(snapshot);
    request_frame();
    Ok(())
}

/// Container resized; sizes are CSS pixels.
#[wasm_bindgen(js_name = resizeChart)]
pub fn resize_chart(width: f64, height: f64) -> Result<(), JsValue> {
    with_host(|host| {
        let size = ContainerSize::new(width.max(0.0), height.max(0.0));
        host.backend_mut().resize(size)?;
        host.resize(size);
        Ok(())
    })
}

/// Space kept around the plot for the axes, in CSS pixels.
#[wasm_bindgen(js_name = setChartMargin)]
pub fn set_chart_margin(top: f64, right: f64, bottom: f64, left: f64) -> Result<(), JsValue> {
    with_host(|host| {
        host.set_margin(Margin::new(top.max(0.0), right.max(0.0), bottom.max(0.0), left.max(0.0)));
        Ok(())
    })
}

/// Start a run towards `"up"` or `"down"`. Resolves to `false` when a run is already in flight.
#[wasm_bindgen(js_name = triggerSimulation)]
pub fn trigger_simulation(direction: &str) -> Result<bool, JsValue> {
    with_host(|host| host.trigger_named(direction))
}

#[wasm_bindgen(js_name = isAnimating)]
pub fn is_animating() -> bool {
    HOST.with(|host| {
        host.try_borrow()
            .ok()
            .and_then(|host| host.as_ref().map(|h| h.controller().is_animating()))
            .unwrap_or(false)
    })
}

/// Pointer position relative to the container.
#[wasm_bindgen(js_name = pointerMove)]
pub fn pointer_move(x: f64, y: f64) -> Result<(), JsValue> {
    let changed = with_host(|host| Ok(host.pointer_moved(x, y)))?;
    if changed {
        request_frame();
    }
    Ok(())
}

#[wasm_bindgen(js_name = pointerLeave)]
pub fn pointer_leave() -> Result<(), JsValue> {
    let changed = with_host(|host| Ok(host.pointer_left()))?;
    if changed {
        request_frame();
    }
    Ok(())
}

/// Replace the history with a fresh one ending today. Refused while animating.
#[wasm_bindgen(js_name = resetChart)]
pub fn reset_chart() -> Result<bool, JsValue> {
    with_host(|host| host.reset(Utc::now().date_naive()))
}

