//! Landmarks → classifier → voting → session, through the public API

use gesture_web::classifier::{ExpressionLabel, ExpressionProbabilities, GestureLabel, TargetLabel};
use gesture_web::config::EngineConfig;
use gesture_web::game::{Command, Engine, FaceFrame, GameStatus, Modality, ScheduledResolution};
use gesture_web::landmarks::{parse_hands, FaceLandmarks};

const THUMBS_UP: TargetLabel = TargetLabel::Gesture(GestureLabel::ThumbsUp);
const HEART: TargetLabel = TargetLabel::Gesture(GestureLabel::TwoHandHeart);
const HAPPY: TargetLabel = TargetLabel::Expression(ExpressionLabel::Happy);
const WINK: TargetLabel = TargetLabel::Expression(ExpressionLabel::Wink);

fn flatten(points: &[(f32, f32)]) -> Vec<f32> {
    points.iter().flat_map(|&(x, y)| [x, y, 0.0]).collect()
}

fn thumbs_up_flat() -> Vec<f32> {
    flatten(&[
        (0.50, 0.60),
        (0.45, 0.58), (0.43, 0.52), (0.42, 0.46), (0.42, 0.40),
        (0.50, 0.52), (0.50, 0.50), (0.50, 0.55), (0.50, 0.60),
        (0.53, 0.52), (0.53, 0.50), (0.53, 0.55), (0.53, 0.60),
        (0.56, 0.52), (0.56, 0.50), (0.56, 0.55), (0.56, 0.60),
        (0.59, 0.52), (0.59, 0.50), (0.59, 0.55), (0.59, 0.60),
    ])
}

const HEART_LEFT: [(f32, f32); 21] = [
    (0.30, 0.80),
    (0.33, 0.74), (0.37, 0.64), (0.42, 0.54), (0.46, 0.45),
    (0.34, 0.66), (0.38, 0.58), (0.43, 0.53), (0.48, 0.50),
    (0.32, 0.66), (0.36, 0.60), (0.40, 0.56), (0.44, 0.54),
    (0.30, 0.67), (0.33, 0.62), (0.37, 0.59), (0.41, 0.57),
    (0.28, 0.69), (0.31, 0.65), (0.34, 0.62), (0.37, 0.61),
];

fn two_hand_heart_flat() -> Vec<f32> {
    let right: Vec<(f32, f32)> = HEART_LEFT.iter().map(|&(x, y)| (1.0 - x, y)).collect();
    let mut flat = flatten(&HEART_LEFT);
    flat.extend(flatten(&right));
    flat
}

/// Eye of width 0.1 with the given aspect ratio
fn eye(x0: f32, ear: f32) -> Vec<(f32, f32)> {
    let half = ear * 0.1 / 2.0;
    vec![
        (x0, 0.4),
        (x0 + 0.03, 0.4 - half),
        (x0 + 0.07, 0.4 - half),
        (x0 + 0.1, 0.4),
        (x0 + 0.07, 0.4 + half),
        (x0 + 0.03, 0.4 + half),
    ]
}

/// Closed mouth, 20 points, corners at 0 and 6
fn mouth() -> Vec<(f32, f32)> {
    let mut m = vec![(0.5, 0.7); 20];
    m[0] = (0.4, 0.7);
    m[6] = (0.6, 0.7);
    m[14] = (0.5, 0.69);
    m[18] = (0.5, 0.71);
    m
}

fn face_flat(left_ear: f32, right_ear: f32) -> Vec<f32> {
    let mut points = eye(0.3, left_ear);
    points.extend(eye(0.6, right_ear));
    points.extend(mouth());
    flatten(&points)
}

fn face_frame(probabilities: &str, left_ear: f32, right_ear: f32) -> FaceFrame {
    FaceFrame {
        probabilities: ExpressionProbabilities::from_json(probabilities).unwrap(),
        landmarks: FaceLandmarks::from_flat(&face_flat(left_ear, right_ear)).unwrap(),
    }
}

fn ready_engine(sequence: Vec<TargetLabel>) -> Engine {
    let mut engine = Engine::with_sequence(EngineConfig::default(), 42, sequence);
    engine.report_ready(Modality::Hand);
    engine.report_ready(Modality::Face);
    engine
}

fn hand_tick(engine: &mut Engine, flat: &[f32], hands: usize, now: u64) -> Option<ScheduledResolution> {
    assert!(engine.begin_tick(Modality::Hand));
    engine.on_hand_frame(parse_hands(flat, hands), now)
}

fn face_tick(engine: &mut Engine, frame: FaceFrame, now: u64) -> Option<ScheduledResolution> {
    assert!(engine.begin_tick(Modality::Face));
    engine.on_face_frame(Some(frame), now)
}

#[test]
fn test_thumbs_up_then_happy_completes_sequence() {
    let mut engine = ready_engine(vec![THUMBS_UP, HAPPY]);
    let thumbs = thumbs_up_flat();

    assert_eq!(hand_tick(&mut engine, &thumbs, 1, 0), None);
    let ticket = hand_tick(&mut engine, &thumbs, 1, 100).expect("second frame confirms");
    assert_eq!(engine.snapshot().score, 1);
    assert_eq!(engine.snapshot().message, "🎉 Correct! +1 Point");

    assert!(engine.resolve(ticket, 100 + ticket.delay_ms));
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.target, Some(HAPPY));
    assert_eq!((snapshot.position, snapshot.total), (2, 2));

    let happy = r#"{"happy": 0.91, "neutral": 0.05, "fearful": 0.04}"#;
    face_tick(&mut engine, face_frame(happy, 0.3, 0.3), 3000);
    let ticket = face_tick(&mut engine, face_frame(happy, 0.3, 0.3), 3500).expect("happy confirms");
    assert_eq!(ticket.delay_ms, 3000);

    assert!(engine.resolve(ticket, 6500));
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.status, GameStatus::Completed);
    assert_eq!(snapshot.message, "🏆 Sequence complete! Final score: 2");
    assert_eq!((snapshot.position, snapshot.total), (1, 14));
}

#[test]
fn test_two_hand_heart_needs_three_frames() {
    let mut engine = ready_engine(vec![HEART]);
    let heart = two_hand_heart_flat();
    assert_eq!(hand_tick(&mut engine, &heart, 2, 0), None);
    assert_eq!(hand_tick(&mut engine, &heart, 2, 100), None);
    assert!(hand_tick(&mut engine, &heart, 2, 200).is_some());
}

#[test]
fn test_wink_overrides_expression_model() {
    let mut engine = ready_engine(vec![WINK]);
    let neutral = r#"{"neutral": 0.95, "happy": 0.05}"#;
    face_tick(&mut engine, face_frame(neutral, 0.20, 0.32), 0);
    let ticket = face_tick(&mut engine, face_frame(neutral, 0.20, 0.32), 500);
    assert!(ticket.is_some());
    let decision = engine.decision(Modality::Face).unwrap();
    assert_eq!(decision.label, WINK);
    assert!((decision.confidence - 0.9).abs() < 1e-6);
}

#[test]
fn test_truncated_hand_buffer_is_no_detection() {
    let mut engine = ready_engine(vec![THUMBS_UP]);
    let thumbs = thumbs_up_flat();
    hand_tick(&mut engine, &thumbs, 1, 0);
    // Claims two hands but carries one
    assert_eq!(hand_tick(&mut engine, &thumbs, 2, 100), None);
    assert_eq!(engine.snapshot().score, 0);
}

#[test]
fn test_pause_blocks_matches_until_resume() {
    let mut engine = ready_engine(vec![THUMBS_UP]);
    let thumbs = thumbs_up_flat();
    engine.command(Command::Stop, 0);
    hand_tick(&mut engine, &thumbs, 1, 10);
    assert_eq!(hand_tick(&mut engine, &thumbs, 1, 20), None);

    engine.command(Command::Resume, 30);
    assert!(hand_tick(&mut engine, &thumbs, 1, 40).is_some());
}

#[test]
fn test_partial_config_override() {
    let config = EngineConfig::from_json(r#"{"game": {"cooldown_ms": 100}}"#).unwrap();
    assert_eq!(config.game.cooldown_ms, 100);
    assert_eq!(config.game.resolution_delay_ms, 1500);
    assert_eq!(config.voting.capacity, 5);
}
