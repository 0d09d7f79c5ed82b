//! Rule-based hand gesture classification
//!
//! Every gesture is a [`RuleTable`] of geometric conditions. The tables
//! overlap geometrically, so they are applied in a fixed precedence and
//! the first accepted one wins:
//!
//! 1. two-hand heart (only with two hands)
//! 2. korean heart
//! 3. rock
//! 4. thumbs up / thumbs down
//! 5. love sign
//! 6. peace sign
//!
//! Korean heart excludes both thumbs rules and rock excludes the love
//! sign, so no frame can satisfy two accepted gestures.

use tracing::debug;

use super::features::{
    finger_curled, finger_extended, hand_distance, horizontal_gap, is_above, is_below,
    planar_distance, vertical_gap,
};
use super::{Classification, DebugMap, DebugValue, GestureLabel, RuleTable};
use crate::config::GestureThresholds;
use crate::landmarks::{
    HandLandmarks, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP, RING_PIP,
    RING_TIP, THUMB_IP, THUMB_MCP, THUMB_TIP, WRIST,
};

/// Non-thumb fingertips
const FINGERTIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ThumbDirection {
    Up,
    Down,
}

pub struct GestureClassifier {
    thresholds: GestureThresholds,
}

impl GestureClassifier {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    /// Classify one frame of 0-2 hands. Extra hands are ignored.
    pub fn classify(&self, hands: &[HandLandmarks]) -> Classification {
        let t = &self.thresholds;
        let mut debug = DebugMap::new();
        debug.insert("hands".into(), DebugValue::Number(hands.len() as f32));

        let Some(primary) = hands.first() else {
            return Classification::none().with_debug(debug);
        };

        if let [first, second, ..] = hands {
            let heart = two_hand_heart(first, second, t);
            heart.record("two_hand_heart", &mut debug);
            debug.insert(
                "two_hand_heart.confidence".into(),
                DebugValue::Number(heart.confidence()),
            );
            if heart.accepted(t.heart_acceptance) {
                debug!(confidence = heart.confidence(), "two_hand_heart accepted");
                return Classification::new(GestureLabel::TwoHandHeart, heart.confidence())
                    .with_debug(debug);
            }
        }

        match self.single_hand(primary, &mut debug) {
            Some((label, confidence)) => {
                debug!(gesture = label.as_str(), confidence, "gesture accepted");
                Classification::new(label, confidence).with_debug(debug)
            }
            None => Classification::none().with_debug(debug),
        }
    }

    fn single_hand(&self, hand: &HandLandmarks, debug: &mut DebugMap) -> Option<(GestureLabel, f32)> {
        let t = &self.thresholds;

        let korean = korean_heart(hand, t);
        let rock = rock(hand);
        let thumbs_up = thumbs(hand, t, ThumbDirection::Up);
        let thumbs_down = thumbs(hand, t, ThumbDirection::Down);
        let love = love_sign(hand, t);
        let peace = peace_sign(hand, t);

        korean.record("korean_heart", debug);
        rock.record("rock", debug);
        thumbs_up.record("thumbs_up", debug);
        thumbs_down.record("thumbs_down", debug);
        love.record("love_sign", debug);
        peace.record("peace_sign", debug);
        debug.insert(
            "thumb_index_distance".into(),
            DebugValue::Number(hand_distance(hand, THUMB_TIP, INDEX_TIP)),
        );
        debug.insert(
            "korean_heart.confidence".into(),
            DebugValue::Number(korean.confidence()),
        );

        let simple = t.simple_confidence;

        if korean_accepted(&korean, &thumbs_up, &thumbs_down, t) {
            Some((GestureLabel::KoreanHeart, korean.confidence()))
        } else if rock.all_passed() && !love.all_passed() {
            Some((GestureLabel::Rock, simple))
        } else if thumbs_up.all_passed() {
            Some((GestureLabel::ThumbsUp, simple))
        } else if thumbs_down.all_passed() {
            Some((GestureLabel::ThumbsDown, simple))
        } else if love.all_passed() {
            Some((GestureLabel::LoveSign, simple))
        } else if peace.all_passed() {
            Some((GestureLabel::PeaceSign, simple))
        } else {
            None
        }
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(GestureThresholds::default())
    }
}

// ============================================================================
// RULE TABLES
// ============================================================================

/// Tips must touch and neither thumbs rule may hold
fn korean_accepted(
    korean: &RuleTable,
    thumbs_up: &RuleTable,
    thumbs_down: &RuleTable,
    t: &GestureThresholds,
) -> bool {
    korean.accepted(t.korean_acceptance)
        && !thumbs_up.all_passed()
        && !thumbs_down.all_passed()
}

pub(crate) fn korean_heart(hand: &HandLandmarks, t: &GestureThresholds) -> RuleTable {
    let w = &t.korean_weights;
    let wrist = hand.point(WRIST);
    let thumb_tip = hand.point(THUMB_TIP);
    let index_tip = hand.point(INDEX_TIP);

    RuleTable::new()
        .gate(
            "tips_close",
            w.tips_close,
            planar_distance(thumb_tip, index_tip) < t.korean_tip_distance,
        )
        .check(
            "fingers_raised",
            w.fingers_raised,
            is_above(thumb_tip, wrist, t.korean_raise_margin)
                && is_above(index_tip, wrist, t.korean_raise_margin),
        )
        .check(
            "thumb_bent",
            w.thumb_bent,
            is_above(thumb_tip, hand.point(THUMB_IP), t.korean_bend_margin),
        )
        .check(
            "index_bent",
            w.index_bent,
            is_above(index_tip, hand.point(INDEX_PIP), t.korean_bend_margin),
        )
        .check(
            "fingers_extended",
            w.fingers_extended,
            planar_distance(thumb_tip, wrist) > t.korean_extension
                && planar_distance(index_tip, wrist) > t.korean_extension,
        )
}

/// `first` plays the left hand of the heart, `second` the right
pub(crate) fn two_hand_heart(
    first: &HandLandmarks,
    second: &HandLandmarks,
    t: &GestureThresholds,
) -> RuleTable {
    let w = &t.heart_weights;
    let (l_thumb, l_index, l_wrist) = (
        first.point(THUMB_TIP),
        first.point(INDEX_TIP),
        first.point(WRIST),
    );
    let (r_thumb, r_index, r_wrist) = (
        second.point(THUMB_TIP),
        second.point(INDEX_TIP),
        second.point(WRIST),
    );
    let margin = t.heart_raise_margin;

    let thumb_distance = planar_distance(l_thumb, r_thumb);
    let index_distance = planar_distance(l_index, r_index);
    let wrist_gap = horizontal_gap(l_wrist, r_wrist);

    RuleTable::new()
        .check(
            "hands_raised",
            w.hands_raised,
            is_above(l_thumb, l_wrist, margin)
                && is_above(l_index, l_wrist, margin)
                && is_above(r_thumb, r_wrist, margin)
                && is_above(r_index, r_wrist, margin),
        )
        .check(
            "thumbs_close",
            w.thumbs_close,
            thumb_distance < t.heart_thumbs_close,
        )
        .check(
            "indexes_separated",
            w.indexes_separated,
            index_distance > thumb_distance * t.heart_index_spread_ratio,
        )
        .check(
            "heart_shape",
            w.heart_shape,
            is_below(l_index, l_thumb, t.heart_index_drop)
                && is_below(r_index, r_thumb, t.heart_index_drop),
        )
        .check(
            "same_height",
            w.same_height,
            vertical_gap(l_thumb, r_thumb) < t.heart_same_height,
        )
        .check(
            "facing_each_other",
            w.facing_each_other,
            l_thumb.x < l_index.x && r_thumb.x > r_index.x,
        )
        .check(
            "hands_close",
            w.hands_close,
            wrist_gap < t.heart_wrist_gap_max && wrist_gap > t.heart_wrist_gap_min,
        )
        .check(
            "fingers_extended",
            w.fingers_extended,
            planar_distance(l_index, l_wrist) > t.heart_index_extension
                && planar_distance(r_index, r_wrist) > t.heart_index_extension,
        )
}

pub(crate) fn rock(hand: &HandLandmarks) -> RuleTable {
    RuleTable::new()
        .require("index_extended", finger_extended(hand, INDEX_TIP, INDEX_PIP))
        .require("pinky_extended", finger_extended(hand, PINKY_TIP, PINKY_PIP))
        .require("middle_curled", finger_curled(hand, MIDDLE_TIP, MIDDLE_PIP))
        .require("ring_curled", finger_curled(hand, RING_TIP, RING_PIP))
}

fn thumbs(hand: &HandLandmarks, t: &GestureThresholds, direction: ThumbDirection) -> RuleTable {
    let wrist = hand.point(WRIST);
    let tip = hand.point(THUMB_TIP);
    let ip = hand.point(THUMB_IP);
    let mcp = hand.point(THUMB_MCP);

    let (displaced, chain, curled) = match direction {
        ThumbDirection::Up => (
            is_above(tip, wrist, t.thumb_vertical),
            tip.y < ip.y && ip.y < mcp.y,
            FINGERTIPS
                .iter()
                .filter(|&&f| hand.point(f).y > wrist.y - t.thumb_curl_margin)
                .count(),
        ),
        ThumbDirection::Down => (
            is_below(tip, wrist, t.thumb_vertical),
            tip.y > ip.y && ip.y > mcp.y,
            FINGERTIPS
                .iter()
                .filter(|&&f| hand.point(f).y < wrist.y + t.thumb_curl_margin)
                .count(),
        ),
    };

    RuleTable::new()
        .require("thumb_displaced", displaced)
        .require("thumb_chain", chain)
        .require("fingers_curled", curled >= t.thumb_min_curled)
        .require(
            "thumb_isolated",
            hand_distance(hand, THUMB_TIP, INDEX_TIP) > t.thumb_separation,
        )
}

pub(crate) fn thumbs_up(hand: &HandLandmarks, t: &GestureThresholds) -> RuleTable {
    thumbs(hand, t, ThumbDirection::Up)
}

pub(crate) fn thumbs_down(hand: &HandLandmarks, t: &GestureThresholds) -> RuleTable {
    thumbs(hand, t, ThumbDirection::Down)
}

pub(crate) fn love_sign(hand: &HandLandmarks, t: &GestureThresholds) -> RuleTable {
    let wrist = hand.point(WRIST);
    let raised = |tip: usize| is_above(hand.point(tip), wrist, t.love_raise);
    let folded = |tip: usize| hand.point(tip).y > wrist.y - t.love_fold;

    RuleTable::new()
        .require("thumb_raised", raised(THUMB_TIP))
        .require("index_raised", raised(INDEX_TIP))
        .require("pinky_raised", raised(PINKY_TIP))
        .require("middle_ring_folded", folded(MIDDLE_TIP) && folded(RING_TIP))
}

pub(crate) fn peace_sign(hand: &HandLandmarks, t: &GestureThresholds) -> RuleTable {
    let reference = hand.point(INDEX_PIP);

    RuleTable::new()
        .require("index_extended", is_above(hand.point(INDEX_TIP), reference, 0.0))
        .require("middle_extended", is_above(hand.point(MIDDLE_TIP), reference, 0.0))
        .require(
            "ring_pinky_folded",
            is_below(hand.point(RING_TIP), reference, 0.0)
                && is_below(hand.point(PINKY_TIP), reference, 0.0),
        )
        .require(
            "separated",
            horizontal_gap(hand.point(INDEX_TIP), hand.point(MIDDLE_TIP)) > t.peace_spread,
        )
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::classifier::TargetLabel;
    use crate::landmarks::LandmarkPoint;

    fn classify(hands: &[HandLandmarks]) -> Option<TargetLabel> {
        GestureClassifier::default().classify(hands).label
    }

    fn gesture(g: GestureLabel) -> Option<TargetLabel> {
        Some(TargetLabel::Gesture(g))
    }

    #[test]
    fn test_no_hands_is_none() {
        let result = GestureClassifier::default().classify(&[]);
        assert!(result.is_none());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_thumbs_up() {
        assert_eq!(classify(&[thumbs_up_pose()]), gesture(GestureLabel::ThumbsUp));
    }

    #[test]
    fn test_thumbs_down() {
        assert_eq!(
            classify(&[mirror_vertical(&thumbs_up_pose())]),
            gesture(GestureLabel::ThumbsDown)
        );
    }

    #[test]
    fn test_thumbs_confidence_is_fixed() {
        let result = GestureClassifier::default().classify(&[thumbs_up_pose()]);
        assert!((result.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_korean_heart() {
        let result = GestureClassifier::default().classify(&[korean_heart_pose()]);
        assert_eq!(result.label, gesture(GestureLabel::KoreanHeart));
        assert!((result.confidence - 1.0).abs() < 1e-6);
        assert_eq!(
            result.debug.get("korean_heart.tips_close"),
            Some(&DebugValue::Flag(true))
        );
    }

    #[test]
    fn test_rock() {
        assert_eq!(classify(&[rock_pose()]), gesture(GestureLabel::Rock));
    }

    #[test]
    fn test_love_sign_not_swallowed_by_rock() {
        let hand = love_sign_pose();
        assert!(rock(&hand).all_passed());
        assert_eq!(classify(&[hand]), gesture(GestureLabel::LoveSign));
    }

    #[test]
    fn test_peace_sign() {
        assert_eq!(classify(&[peace_sign_pose()]), gesture(GestureLabel::PeaceSign));
    }

    #[test]
    fn test_open_palm_matches_nothing() {
        assert_eq!(classify(&[open_palm_pose()]), None);
    }

    #[test]
    fn test_two_hand_heart() {
        let result = GestureClassifier::default().classify(&[heart_left_pose(), heart_right_pose()]);
        assert_eq!(result.label, gesture(GestureLabel::TwoHandHeart));
        assert!(result.confidence > 0.65);
    }

    #[test]
    fn test_two_hands_without_heart_fall_back_to_first_hand() {
        let second = shifted(&thumbs_up_pose(), 0.3, 0.0);
        assert_eq!(
            classify(&[thumbs_up_pose(), second]),
            gesture(GestureLabel::ThumbsUp)
        );
    }

    #[test]
    fn test_single_heart_half_is_not_two_hand_heart() {
        assert_ne!(
            classify(&[heart_left_pose()]),
            gesture(GestureLabel::TwoHandHeart)
        );
    }

    #[test]
    fn test_korean_heart_needs_touching_tips() {
        // Every other korean-heart condition holds, tips 0.1 apart
        let t = GestureThresholds::default();
        let mut points: Vec<LandmarkPoint> = korean_heart_pose().points().to_vec();
        points[INDEX_TIP] = LandmarkPoint::new(0.59, 0.56, 0.0);
        let hand = HandLandmarks::from_points(&points).unwrap();
        let table = korean_heart(&hand, &t);
        assert!((table.confidence() - 0.6).abs() < 1e-5);
        assert!(!table.accepted(t.korean_acceptance - 0.1));
        assert_ne!(classify(&[hand]), gesture(GestureLabel::KoreanHeart));
    }

    #[test]
    fn test_korean_heart_and_thumbs_up_disjoint() {
        // Slide the index tip toward the thumb tip of a thumbs-up pose
        let t = GestureThresholds::default();
        let base = thumbs_up_pose();
        let thumb = base.point(THUMB_TIP);
        for step in 0..=40 {
            let d = step as f32 * 0.005;
            let mut points: Vec<LandmarkPoint> = base.points().to_vec();
            points[INDEX_TIP] = LandmarkPoint::new(thumb.x + d, thumb.y + 0.005, 0.0);
            let hand = HandLandmarks::from_points(&points).unwrap();

            let korean = korean_heart(&hand, &t);
            let up = thumbs_up(&hand, &t);
            let down = thumbs_down(&hand, &t);
            assert!(
                !(korean_accepted(&korean, &up, &down, &t) && up.all_passed()),
                "both fired at offset {d}"
            );
        }
    }

    #[test]
    fn test_thumbs_tolerates_one_loose_finger() {
        let mut points: Vec<LandmarkPoint> = thumbs_up_pose().points().to_vec();
        points[PINKY_TIP] = LandmarkPoint::new(0.59, 0.45, 0.0);
        let hand = HandLandmarks::from_points(&points).unwrap();
        assert_eq!(classify(&[hand]), gesture(GestureLabel::ThumbsUp));
    }

    #[test]
    fn test_thumbs_rejects_two_loose_fingers() {
        let mut points: Vec<LandmarkPoint> = thumbs_up_pose().points().to_vec();
        points[PINKY_TIP] = LandmarkPoint::new(0.59, 0.45, 0.0);
        points[RING_TIP] = LandmarkPoint::new(0.56, 0.45, 0.0);
        let hand = HandLandmarks::from_points(&points).unwrap();
        assert_ne!(classify(&[hand]), gesture(GestureLabel::ThumbsUp));
    }

    #[test]
    fn test_thresholds_are_tunable() {
        let mut t = GestureThresholds::default();
        t.thumb_vertical = 0.5;
        let classifier = GestureClassifier::new(t);
        assert_eq!(classifier.classify(&[thumbs_up_pose()]).label, None);
    }

    #[test]
    fn test_every_fixture_yields_at_most_one_label() {
        let t = GestureThresholds::default();
        for hand in [thumbs_up_pose(), korean_heart_pose(), rock_pose(), love_sign_pose(), peace_sign_pose(), open_palm_pose()] {
            let korean = korean_heart(&hand, &t);
            let up = thumbs_up(&hand, &t);
            let down = thumbs_down(&hand, &t);
            let love = love_sign(&hand, &t);
            let accepted = [
                korean_accepted(&korean, &up, &down, &t),
                rock(&hand).all_passed() && !love.all_passed(),
                up.all_passed() && !korean_accepted(&korean, &up, &down, &t),
                down.all_passed(),
            ];
            assert!(accepted.iter().filter(|a| **a).count() <= 1);
        }
    }
}
