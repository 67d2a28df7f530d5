#![cfg(target_arch = "wasm32")]

use leptos::*;
use price_sim_wasm::global_state::{candle_count, is_animating, last_error};
use price_sim_wasm::presentation::wasm_api::{
    is_animating as host_is_animating, mount_canvas, pointer_leave, pointer_move, reset_chart, resize_chart,
    set_chart_margin, trigger_simulation,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlCanvasElement;
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

fn attach_canvas() -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement = document.create_element("canvas").unwrap().dyn_into().unwrap();
    canvas.set_attribute("style", "width: 640px; height: 320px").unwrap();
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

#[wasm_bindgen_test]
fn mount_publishes_the_history() {
    mount_canvas(attach_canvas(), None).unwrap();
    assert_eq!(candle_count().get_untracked(), 60);
    assert!(!is_animating().get_untracked());
    resize_chart(800.0, 400.0).unwrap();
}

#[wasm_bindgen_test]
fn run_locks_the_controls() {
    mount_canvas(attach_canvas(), Some(r#"{"step_delay_ms": 50}"#)).unwrap();

    assert!(trigger_simulation("up").unwrap());
    assert!(host_is_animating());
    assert!(is_animating().get_untracked());
    assert!(!trigger_simulation("down").unwrap());
    assert!(!reset_chart().unwrap());
}

#[wasm_bindgen_test]
fn bad_input_surfaces_an_error() {
    mount_canvas(attach_canvas(), None).unwrap();
    assert!(trigger_simulation("sideways").is_err());
    assert!(last_error().get_untracked().is_some());

    assert!(mount_canvas(attach_canvas(), Some(r#"{"simulation_steps": 0}"#)).is_err());
}

fn pixel_ratio() -> f64 {
    web_sys::window().map_or(1.0, |w| w.device_pixel_ratio()).max(1.0)
}

#[wasm_bindgen_test]
fn resize_rescales_the_backing_store() {
    let canvas = attach_canvas();
    mount_canvas(canvas.clone(), None).unwrap();

    resize_chart(500.0, 250.0).unwrap();
    assert_eq!(canvas.width(), (500.0 * pixel_ratio()).round() as u32);
    assert_eq!(canvas.height(), (250.0 * pixel_ratio()).round() as u32);

    // Too small for the margins: accepted, the chart just stops drawing
    resize_chart(30.0, 20.0).unwrap();
    assert_eq!(canvas.width(), (30.0 * pixel_ratio()).round() as u32);
    assert_eq!(candle_count().get_untracked(), 60);
}

#[wasm_bindgen_test]
fn margin_and_pointer_calls_reach_the_mounted_chart() {
    mount_canvas(attach_canvas(), None).unwrap();
    resize_chart(640.0, 320.0).unwrap();
    set_chart_margin(10.0, 10.0, 30.0, 80.0).unwrap();

    pointer_move(300.0, 150.0).unwrap();
    pointer_move(5.0, 5.0).unwrap();
    pointer_leave().unwrap();
    pointer_leave().unwrap();
    assert!(!host_is_animating());
    assert_eq!(candle_count().get_untracked(), 60);
}
