//! Feature extraction for gesture and expression rules
//!
//! Pure geometry over landmark points. No decisions are made here; the
//! classifiers compare these numbers against their thresholds.
//!
//! Image `y` grows downward, so "above" means a smaller `y`.

use nalgebra::distance;

use crate::landmarks::{
    HandLandmarks, LandmarkPoint, EYE_POINTS, MOUTH_INNER_BOTTOM, MOUTH_INNER_TOP,
    MOUTH_LEFT_CORNER, MOUTH_MIN_POINTS, MOUTH_RIGHT_CORNER,
};

/// Below this a width is treated as degenerate
const MIN_SPAN: f32 = 1e-4;

/// Planar Euclidean distance between two points
pub fn planar_distance(a: LandmarkPoint, b: LandmarkPoint) -> f32 {
    distance(&a.planar(), &b.planar())
}

/// Distance between two named points of one hand
pub fn hand_distance(hand: &HandLandmarks, a: usize, b: usize) -> f32 {
    planar_distance(hand.point(a), hand.point(b))
}

/// `point` sits above `reference` by more than `margin`
pub fn is_above(point: LandmarkPoint, reference: LandmarkPoint, margin: f32) -> bool {
    point.y < reference.y - margin
}

/// `point` sits below `reference` by more than `margin`
pub fn is_below(point: LandmarkPoint, reference: LandmarkPoint, margin: f32) -> bool {
    point.y > reference.y + margin
}

/// Fingertip above its PIP joint
pub fn finger_extended(hand: &HandLandmarks, tip: usize, pip: usize) -> bool {
    is_above(hand.point(tip), hand.point(pip), 0.0)
}

/// Fingertip below its PIP joint
pub fn finger_curled(hand: &HandLandmarks, tip: usize, pip: usize) -> bool {
    is_below(hand.point(tip), hand.point(pip), 0.0)
}

pub fn horizontal_gap(a: LandmarkPoint, b: LandmarkPoint) -> f32 {
    (a.x - b.x).abs()
}

pub fn vertical_gap(a: LandmarkPoint, b: LandmarkPoint) -> f32 {
    (a.y - b.y).abs()
}

/// Eye aspect ratio over a 6-point eye contour
///
/// `EAR = (|p1 - p5| + |p2 - p4|) / (2 |p0 - p3|)`
///
/// Returns `None` for the wrong number of points or a zero-width eye.
pub fn eye_aspect_ratio(eye: &[LandmarkPoint]) -> Option<f32> {
    if eye.len() != EYE_POINTS {
        return None;
    }
    let width = planar_distance(eye[0], eye[3]);
    if width < MIN_SPAN {
        return None;
    }
    let vertical = planar_distance(eye[1], eye[5]) + planar_distance(eye[2], eye[4]);
    Some(vertical / (2.0 * width))
}

/// Mouth opening as inner-lip height over corner-to-corner width
///
/// Returns `None` when the mouth group is too short or has zero width.
pub fn mouth_aspect_ratio(mouth: &[LandmarkPoint]) -> Option<f32> {
    if mouth.len() < MOUTH_MIN_POINTS {
        return None;
    }
    let width = planar_distance(mouth[MOUTH_LEFT_CORNER], mouth[MOUTH_RIGHT_CORNER]);
    if width < MIN_SPAN {
        return None;
    }
    let height = planar_distance(mouth[MOUTH_INNER_TOP], mouth[MOUTH_INNER_BOTTOM]);
    Some(height / width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> LandmarkPoint {
        LandmarkPoint::new(x, y, 0.0)
    }

    /// Eye of width 0.1 whose lids are `opening` apart
    fn eye(opening: f32) -> [LandmarkPoint; 6] {
        let half = opening / 2.0;
        [
            p(0.0, 0.5),
            p(0.03, 0.5 - half),
            p(0.07, 0.5 - half),
            p(0.1, 0.5),
            p(0.07, 0.5 + half),
            p(0.03, 0.5 + half),
        ]
    }

    #[test]
    fn test_planar_distance_ignores_depth() {
        let a = LandmarkPoint::new(0.0, 0.0, -5.0);
        let b = LandmarkPoint::new(0.3, 0.4, 2.0);
        assert!((planar_distance(a, b) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_above_below_use_margin() {
        let tip = p(0.5, 0.40);
        let joint = p(0.5, 0.45);
        assert!(is_above(tip, joint, 0.02));
        assert!(!is_above(tip, joint, 0.06));
        assert!(is_below(joint, tip, 0.02));
    }

    #[test]
    fn test_ear_open_eye() {
        let ear = eye_aspect_ratio(&eye(0.04)).unwrap();
        assert!((ear - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_ear_closed_eye() {
        let ear = eye_aspect_ratio(&eye(0.01)).unwrap();
        assert!((ear - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_ear_rejects_wrong_layout() {
        assert_eq!(eye_aspect_ratio(&eye(0.04)[..5]), None);
        assert_eq!(eye_aspect_ratio(&[p(0.5, 0.5); 6]), None);
    }

    #[test]
    fn test_mouth_ratio() {
        let mut mouth = vec![p(0.5, 0.7); 20];
        mouth[MOUTH_LEFT_CORNER] = p(0.4, 0.7);
        mouth[MOUTH_RIGHT_CORNER] = p(0.6, 0.7);
        mouth[MOUTH_INNER_TOP] = p(0.5, 0.67);
        mouth[MOUTH_INNER_BOTTOM] = p(0.5, 0.75);
        let mar = mouth_aspect_ratio(&mouth).unwrap();
        assert!((mar - 0.4).abs() < 1e-5);
        assert_eq!(mouth_aspect_ratio(&mouth[..19]), None);
    }
}
