//! Landmark module - typed landmark frames from the external detectors
//!
//! Re-exports only. All logic in submodules.

mod error;
mod face;
mod hand;
mod point;

pub use error::LandmarkError;
pub use face::{
    FaceLandmarks, EYE_POINTS, FACE_FLAT_MIN_LEN, MOUTH_INNER_BOTTOM, MOUTH_INNER_TOP,
    MOUTH_LEFT_CORNER, MOUTH_MIN_POINTS, MOUTH_RIGHT_CORNER,
};
pub use hand::{
    parse_hands, HandLandmarks, HAND_FLAT_LEN, HAND_POINTS, INDEX_DIP, INDEX_MCP, INDEX_PIP,
    INDEX_TIP, MAX_HANDS, MIDDLE_DIP, MIDDLE_MCP, MIDDLE_PIP, MIDDLE_TIP, PINKY_DIP, PINKY_MCP,
    PINKY_PIP, PINKY_TIP, RING_DIP, RING_MCP, RING_PIP, RING_TIP, THUMB_CMC, THUMB_IP,
    THUMB_MCP, THUMB_TIP, WRIST,
};
pub use point::LandmarkPoint;
