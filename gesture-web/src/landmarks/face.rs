//! Face landmark groups used by the wink override
//!
//! Only the eye and mouth contours are kept. Slices of the 68-point
//! face layout: left eye 36-41, right eye 42-47, mouth 48-67.

use super::{LandmarkError, LandmarkPoint};

/// Points per eye contour: corner, two upper lid, corner, two lower lid
pub const EYE_POINTS: usize = 6;

/// Outer lip (12) plus inner lip (8)
pub const MOUTH_MIN_POINTS: usize = 20;

/// Mouth indices relative to the start of the mouth group
pub const MOUTH_LEFT_CORNER: usize = 0;
pub const MOUTH_RIGHT_CORNER: usize = 6;
pub const MOUTH_INNER_TOP: usize = 14;
pub const MOUTH_INNER_BOTTOM: usize = 18;

/// Smallest flat buffer accepted by [`FaceLandmarks::from_flat`]
pub const FACE_FLAT_MIN_LEN: usize = (EYE_POINTS * 2 + MOUTH_MIN_POINTS) * 3;

#[derive(Clone, Debug, PartialEq)]
pub struct FaceLandmarks {
    pub left_eye: [LandmarkPoint; EYE_POINTS],
    pub right_eye: [LandmarkPoint; EYE_POINTS],
    pub mouth: Vec<LandmarkPoint>,
}

impl FaceLandmarks {
    pub fn new(
        left_eye: &[LandmarkPoint],
        right_eye: &[LandmarkPoint],
        mouth: &[LandmarkPoint],
    ) -> Result<Self, LandmarkError> {
        let left_eye = eye_group("left_eye", left_eye)?;
        let right_eye = eye_group("right_eye", right_eye)?;

        if mouth.len() < MOUTH_MIN_POINTS {
            return Err(LandmarkError::TooFewPoints {
                group: "mouth",
                min: MOUTH_MIN_POINTS,
                got: mouth.len(),
            });
        }
        check_finite("mouth", mouth)?;

        Ok(Self {
            left_eye,
            right_eye,
            mouth: mouth.to_vec(),
        })
    }

    /// Flat layout: 6 left-eye points, 6 right-eye points, then the mouth
    pub fn from_flat(data: &[f32]) -> Result<Self, LandmarkError> {
        if data.len() < FACE_FLAT_MIN_LEN || data.len() % 3 != 0 {
            return Err(LandmarkError::TruncatedBuffer {
                expected: FACE_FLAT_MIN_LEN,
                got: data.len(),
            });
        }
        let points: Vec<LandmarkPoint> = data
            .chunks_exact(3)
            .map(|c| LandmarkPoint::new(c[0], c[1], c[2]))
            .collect();
        let (left, rest) = points.split_at(EYE_POINTS);
        let (right, mouth) = rest.split_at(EYE_POINTS);
        Self::new(left, right, mouth)
    }
}

fn eye_group(
    group: &'static str,
    points: &[LandmarkPoint],
) -> Result<[LandmarkPoint; EYE_POINTS], LandmarkError> {
    check_finite(group, points)?;
    points
        .try_into()
        .map_err(|_| LandmarkError::WrongPointCount {
            group,
            expected: EYE_POINTS,
            got: points.len(),
        })
}

fn check_finite(group: &'static str, points: &[LandmarkPoint]) -> Result<(), LandmarkError> {
    match points.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(LandmarkError::NonFinite { group, index }),
        None => Ok(()),
    }
}
