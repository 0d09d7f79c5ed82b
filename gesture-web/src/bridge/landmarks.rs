//! Detector input - landmark buffers from the JS detectors
//!
//! The host runs the hand and face detectors on its own intervals. Each
//! firing first claims a tick (`begin_*_tick`), runs inference, then
//! hands the result over here. Malformed buffers count as "nothing
//! detected" for that tick.

use tracing::warn;
use wasm_bindgen::prelude::*;

use super::game_integration::{now_ms, schedule_resolution, with_engine};
use super::BridgeError;
use crate::classifier::ExpressionProbabilities;
use crate::game::{FaceFrame, Modality};
use crate::landmarks::{parse_hands, FaceLandmarks};

fn parse_modality(modality: &str) -> Result<Modality, BridgeError> {
    modality.parse().map_err(BridgeError::UnknownModality)
}

/// Expression probabilities JSON (`{"happy":0.9,...}`) plus the flat
/// eye/mouth buffer
pub(crate) fn parse_face_frame(probabilities_json: &str, flat_face: &[f32]) -> Result<FaceFrame, BridgeError> {
    Ok(FaceFrame {
        probabilities: ExpressionProbabilities::from_json(probabilities_json)?,
        landmarks: FaceLandmarks::from_flat(flat_face)?,
    })
}

fn submit_face(frame: Option<FaceFrame>) {
    if let Some(ticket) = with_engine(|engine| engine.on_face_frame(frame, now_ms())) {
        schedule_resolution(ticket);
    }
}

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Returns false when the previous hand tick is still running or hand
/// detection is unavailable
#[wasm_bindgen]
pub fn begin_hand_tick() -> bool {
    with_engine(|engine| engine.begin_tick(Modality::Hand))
}

#[wasm_bindgen]
pub fn begin_face_tick() -> bool {
    with_engine(|engine| engine.begin_tick(Modality::Face))
}

/// Flat Float32Array of `num_hands × 21 × 3` values
#[wasm_bindgen]
pub fn submit_hand_landmarks(flat_data: &[f32], num_hands: usize) {
    let hands = parse_hands(flat_data, num_hands);
    if let Some(ticket) = with_engine(|engine| engine.on_hand_frame(hands, now_ms())) {
        schedule_resolution(ticket);
    }
}

#[wasm_bindgen]
pub fn submit_face_detection(probabilities_json: &str, flat_face: &[f32]) {
    let frame = match parse_face_frame(probabilities_json, flat_face) {
        Ok(frame) => Some(frame),
        Err(err) => {
            warn!(error = %err, "malformed face detection, treating as no face");
            None
        }
    };
    submit_face(frame);
}

#[wasm_bindgen]
pub fn submit_no_face() {
    submit_face(None);
}

#[wasm_bindgen]
pub fn report_detector_ready(modality: &str) -> Result<(), JsValue> {
    let modality = parse_modality(modality)?;
    with_engine(|engine| engine.report_ready(modality));
    Ok(())
}

/// Detector failed to load; the other modality keeps running
#[wasm_bindgen]
pub fn report_detector_failure(modality: &str, message: &str) -> Result<(), JsValue> {
    let modality = parse_modality(modality)?;
    with_engine(|engine| engine.report_failure(modality, message));
    Ok(())
}
