//! Hand landmark frame (MediaPipe Hands - 21 points)

use super::{LandmarkError, LandmarkPoint};

// ============================================================================
// HAND LANDMARK INDICES
// ============================================================================

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Points per hand
pub const HAND_POINTS: usize = 21;

/// Floats per hand in the flat JS buffer (x, y, z per point)
pub const HAND_FLAT_LEN: usize = HAND_POINTS * 3;

/// The hand detector is configured for at most two hands
pub const MAX_HANDS: usize = 2;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One detected hand in anatomical order
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [LandmarkPoint; HAND_POINTS],
}

impl HandLandmarks {
    /// Build from exactly 21 points
    pub fn from_points(points: &[LandmarkPoint]) -> Result<Self, LandmarkError> {
        let points: [LandmarkPoint; HAND_POINTS] =
            points
                .try_into()
                .map_err(|_| LandmarkError::WrongPointCount {
                    group: "hand",
                    expected: HAND_POINTS,
                    got: points.len(),
                })?;

        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(LandmarkError::NonFinite {
                group: "hand",
                index,
            });
        }

        Ok(Self { points })
    }

    /// Build from 63 floats (x, y, z per point)
    pub fn from_flat(data: &[f32]) -> Result<Self, LandmarkError> {
        if data.len() != HAND_FLAT_LEN {
            return Err(LandmarkError::TruncatedBuffer {
                expected: HAND_FLAT_LEN,
                got: data.len(),
            });
        }
        let points: Vec<LandmarkPoint> = data
            .chunks_exact(3)
            .map(|c| LandmarkPoint::new(c[0], c[1], c[2]))
            .collect();
        Self::from_points(&points)
    }

    pub fn point(&self, index: usize) -> LandmarkPoint {
        self.points[index]
    }

    pub fn points(&self) -> &[LandmarkPoint; HAND_POINTS] {
        &self.points
    }
}

/// Parse the flat buffer the JS detector callback hands over.
///
/// Layout is `num_hands × 21 × 3` floats. Anything past [`MAX_HANDS`] is
/// dropped; a buffer too short for the hands it claims is rejected whole.
pub fn parse_hands(flat_data: &[f32], num_hands: usize) -> Result<Vec<HandLandmarks>, LandmarkError> {
    let actual_hands = num_hands.min(MAX_HANDS);
    let needed = actual_hands * HAND_FLAT_LEN;
    if flat_data.len() < needed {
        return Err(LandmarkError::TruncatedBuffer {
            expected: needed,
            got: flat_data.len(),
        });
    }

    flat_data[..needed]
        .chunks_exact(HAND_FLAT_LEN)
        .map(HandLandmarks::from_flat)
        .collect()
}
