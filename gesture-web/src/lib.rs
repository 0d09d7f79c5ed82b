//! Gesture Web - hand gesture and facial expression matching game
//!
//! Entry point for WASM module. Only contains:
//! - Module declarations
//! - wasm_bindgen entry points that delegate to submodules

mod bridge;
pub mod classifier;
pub mod config;
pub mod game;
pub mod landmarks;

use wasm_bindgen::prelude::*;

// Re-export wasm_bindgen functions for JS access
pub use bridge::{
    begin_face_tick, begin_hand_tick, check_current, configure_engine, get_debug_overlay_text,
    get_engine_config, get_game_snapshot, get_gesture_guide, report_detector_failure,
    report_detector_ready, reset_score, resume_game, set_detector_latency, set_webcam, skip_target,
    start_game, stop_game, submit_face_detection, submit_hand_landmarks, submit_no_face, BridgeError,
};

// ============================================================================
// CONSOLE LOGGING
// ============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    bridge::init_logging(tracing::Level::INFO);
    console_log!("✅ Gesture engine loaded ({} targets)", classifier::TargetLabel::all().len());
}
