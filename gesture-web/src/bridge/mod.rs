//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod console;
mod debug_overlay;
mod error;
mod game_integration;
mod landmarks;

pub use console::init_logging;
pub use debug_overlay::{get_debug_overlay_text, set_detector_latency};
pub use error::BridgeError;
pub use game_integration::{
    check_current, configure_engine, get_engine_config, get_game_snapshot, get_gesture_guide,
    reset_score, resume_game, set_webcam, skip_target, start_game, stop_game,
};
pub use landmarks::{
    begin_face_tick, begin_hand_tick, report_detector_failure, report_detector_ready,
    submit_face_detection, submit_hand_landmarks, submit_no_face,
};
