//! Game integration - owns the engine instance and its timers
//!
//! The engine lives in a thread-local (WASM is single-threaded). Every
//! entry point borrows it for the duration of one call; timer callbacks
//! borrow it again when they fire.

use std::cell::RefCell;

use tracing::{error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::BridgeError;
use crate::classifier::gesture_guide;
use crate::config::EngineConfig;
use crate::game::{Command, Engine, ScheduledResolution};

thread_local! {
    static ENGINE: RefCell<Engine> = RefCell::new(Engine::new(EngineConfig::default(), entropy_seed()));
}

/// `SmallRng` seed without an OS entropy source
fn entropy_seed() -> u64 {
    let random = js_sys::Math::random() * u64::MAX as f64;
    random as u64 ^ js_sys::Date::now() as u64
}

/// Monotonic milliseconds, falling back to wall clock outside a window
pub(crate) fn now_ms() -> u64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now) as u64
}

pub(crate) fn with_engine<R>(f: impl FnOnce(&mut Engine) -> R) -> R {
    ENGINE.with(|cell| f(&mut cell.borrow_mut()))
}

// ============================================================================
// RESOLUTION TIMER
// ============================================================================

fn set_timeout(ticket: ScheduledResolution) -> Result<i32, BridgeError> {
    let window = web_sys::window().ok_or(BridgeError::NoWindow)?;
    let callback = Closure::once_into_js(move || {
        with_engine(|engine| engine.resolve(ticket, now_ms()));
    });
    let delay = i32::try_from(ticket.delay_ms).unwrap_or(i32::MAX);
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
        .map_err(|e| BridgeError::Timer(format!("{e:?}")))
}

/// Arm the one-shot timer for a confirmed match. If no timer can be set
/// the ticket resolves immediately so the session never stays locked.
pub(crate) fn schedule_resolution(ticket: ScheduledResolution) {
    if let Err(err) = set_timeout(ticket) {
        error!(error = %err, "could not schedule resolution, resolving now");
        with_engine(|engine| engine.resolve(ticket, now_ms()));
    }
}

fn run_command(command: Command) {
    if let Some(ticket) = with_engine(|engine| engine.command(command, now_ms())) {
        schedule_resolution(ticket);
    }
}

// ============================================================================
// WASM ENTRY POINTS - game control
// ============================================================================

#[wasm_bindgen]
pub fn start_game() {
    run_command(Command::Start);
}

#[wasm_bindgen]
pub fn stop_game() {
    run_command(Command::Stop);
}

#[wasm_bindgen]
pub fn resume_game() {
    run_command(Command::Resume);
}

#[wasm_bindgen]
pub fn skip_target() {
    run_command(Command::Skip);
}

#[wasm_bindgen]
pub fn reset_score() {
    run_command(Command::ResetScore);
}

/// Manual "check" button
#[wasm_bindgen]
pub fn check_current() {
    run_command(Command::Check);
}

#[wasm_bindgen]
pub fn set_webcam(on: bool) {
    with_engine(|engine| engine.set_webcam(on));
}

// ============================================================================
// WASM ENTRY POINTS - state and config
// ============================================================================

/// Everything the page renders, as JSON
#[wasm_bindgen]
pub fn get_game_snapshot() -> Result<String, JsValue> {
    let snapshot = with_engine(|engine| engine.snapshot());
    Ok(serde_json::to_string(&snapshot).map_err(BridgeError::from)?)
}

#[wasm_bindgen]
pub fn get_gesture_guide() -> Result<String, JsValue> {
    Ok(serde_json::to_string(&gesture_guide()).map_err(BridgeError::from)?)
}

/// Replace the live config with a (possibly partial) JSON override
#[wasm_bindgen]
pub fn configure_engine(json: &str) -> Result<(), JsValue> {
    let config = EngineConfig::from_json(json)?;
    with_engine(|engine| engine.reconfigure(config));
    info!("config override applied");
    Ok(())
}

#[wasm_bindgen]
pub fn get_engine_config() -> Result<String, JsValue> {
    Ok(with_engine(|engine| engine.config().to_json())?)
}
