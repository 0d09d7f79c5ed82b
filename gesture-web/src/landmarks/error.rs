//! Errors raised while turning detector output into landmark frames

use std::fmt;
use wasm_bindgen::JsValue;

/// Malformed landmark input. Always scoped to a single frame.
#[derive(Debug, Clone, PartialEq)]
pub enum LandmarkError {
    /// A fixed-size group had the wrong number of points
    WrongPointCount {
        group: &'static str,
        expected: usize,
        got: usize,
    },
    /// A variable-size group had fewer points than its layout needs
    TooFewPoints {
        group: &'static str,
        min: usize,
        got: usize,
    },
    /// Flat buffer is not a whole number of points or is too short
    TruncatedBuffer { expected: usize, got: usize },
    /// NaN or infinite coordinate
    NonFinite { group: &'static str, index: usize },
}

impl fmt::Display for LandmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LandmarkError::WrongPointCount { group, expected, got } => {
                write!(f, "{group}: expected {expected} points, got {got}")
            }
            LandmarkError::TooFewPoints { group, min, got } => {
                write!(f, "{group}: expected at least {min} points, got {got}")
            }
            LandmarkError::TruncatedBuffer { expected, got } => {
                write!(f, "landmark buffer length {got} (expected {expected})")
            }
            LandmarkError::NonFinite { group, index } => {
                write!(f, "{group}: point {index} has a non-finite coordinate")
            }
        }
    }
}

impl std::error::Error for LandmarkError {}

impl From<LandmarkError> for JsValue {
    fn from(err: LandmarkError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
