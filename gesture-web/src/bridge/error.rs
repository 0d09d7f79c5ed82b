//! Errors surfaced at the JS boundary

use std::fmt;
use wasm_bindgen::JsValue;

use crate::landmarks::LandmarkError;

#[derive(Debug)]
pub enum BridgeError {
    UnknownModality(String),
    Landmarks(LandmarkError),
    Json(serde_json::Error),
    /// No `window` global (worker context)
    NoWindow,
    Timer(String),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::UnknownModality(reason) => f.write_str(reason),
            BridgeError::Landmarks(e) => write!(f, "bad landmarks: {e}"),
            BridgeError::Json(e) => write!(f, "json error: {e}"),
            BridgeError::NoWindow => f.write_str("no window object available"),
            BridgeError::Timer(reason) => write!(f, "setTimeout failed: {reason}"),
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BridgeError::Landmarks(e) => Some(e),
            BridgeError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LandmarkError> for BridgeError {
    fn from(err: LandmarkError) -> Self {
        BridgeError::Landmarks(err)
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Json(err)
    }
}

impl From<BridgeError> for JsValue {
    fn from(err: BridgeError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
