//! Expression classification: external probabilities plus wink override
//!
//! The external expression model has no wink class, so winks come from
//! eye geometry. Each eye is tracked as open/closed with a hysteresis
//! band between `ear_closed` and `ear_open`; inside the band an eye keeps
//! its previous state.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::features::{eye_aspect_ratio, mouth_aspect_ratio};
use super::{Classification, DebugMap, DebugValue, ExpressionLabel};
use crate::config::ExpressionThresholds;
use crate::landmarks::FaceLandmarks;

/// Probability per base expression as reported by the external model
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExpressionProbabilities {
    values: BTreeMap<ExpressionLabel, f32>,
}

impl ExpressionProbabilities {
    /// Unknown keys and `wink` are dropped; values are clamped to [0, 1]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f32)>) -> Self {
        let mut values = BTreeMap::new();
        for (name, p) in pairs {
            match name.parse::<ExpressionLabel>() {
                Ok(ExpressionLabel::Wink) | Err(_) => {
                    debug!(label = name, "ignoring expression key");
                }
                Ok(label) if p.is_finite() => {
                    values.insert(label, p.clamp(0.0, 1.0));
                }
                Ok(label) => warn!(label = label.as_str(), "non-finite expression probability"),
            }
        }
        Self { values }
    }

    /// Parse the JSON object the face model emits, e.g. `{"happy": 0.93, ...}`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, f32> = serde_json::from_str(json)?;
        Ok(Self::from_pairs(raw.iter().map(|(k, v)| (k.as_str(), *v))))
    }

    pub fn get(&self, label: ExpressionLabel) -> Option<f32> {
        self.values.get(&label).copied()
    }

    /// Highest-probability label; ties go to the earlier label
    pub fn top(&self) -> Option<(ExpressionLabel, f32)> {
        self.values
            .iter()
            .fold(None, |best: Option<(ExpressionLabel, f32)>, (&label, &p)| match best {
                Some((_, best_p)) if best_p >= p => best,
                _ => Some((label, p)),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeState {
    Open,
    Closed,
}

impl EyeState {
    fn update(self, ear: f32, t: &ExpressionThresholds) -> Self {
        if ear < t.ear_closed {
            EyeState::Closed
        } else if ear > t.ear_open {
            EyeState::Open
        } else {
            self
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            EyeState::Open => "open",
            EyeState::Closed => "closed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WinkPath {
    Strict,
    Relaxed,
}

pub struct ExpressionClassifier {
    thresholds: ExpressionThresholds,
    left_eye: EyeState,
    right_eye: EyeState,
}

impl ExpressionClassifier {
    pub fn new(thresholds: ExpressionThresholds) -> Self {
        Self {
            thresholds,
            left_eye: EyeState::Open,
            right_eye: EyeState::Open,
        }
    }

    pub fn eye_states(&self) -> (EyeState, EyeState) {
        (self.left_eye, self.right_eye)
    }

    /// Forget eye history (camera turned off, face lost for good)
    pub fn reset(&mut self) {
        self.left_eye = EyeState::Open;
        self.right_eye = EyeState::Open;
    }

    /// Classify one face frame
    pub fn classify(&mut self, probabilities: &ExpressionProbabilities, face: &FaceLandmarks) -> Classification {
        let t = &self.thresholds;
        let mut debug = DebugMap::new();

        let base = probabilities.top();
        if let Some((label, p)) = base {
            debug.insert("base".into(), DebugValue::from(label.as_str()));
            debug.insert("base_probability".into(), DebugValue::Number(p));
        }

        let wink = match (
            eye_aspect_ratio(&face.left_eye),
            eye_aspect_ratio(&face.right_eye),
        ) {
            (Some(left_ear), Some(right_ear)) => {
                self.left_eye = self.left_eye.update(left_ear, t);
                self.right_eye = self.right_eye.update(right_ear, t);
                let mouth = mouth_aspect_ratio(&face.mouth);

                debug.insert("ear_left".into(), DebugValue::Number(left_ear));
                debug.insert("ear_right".into(), DebugValue::Number(right_ear));
                debug.insert("left_eye".into(), DebugValue::from(self.left_eye.as_str()));
                debug.insert("right_eye".into(), DebugValue::from(self.right_eye.as_str()));
                if let Some(mar) = mouth {
                    debug.insert("mouth_ratio".into(), DebugValue::Number(mar));
                }

                detect_wink(self.left_eye, self.right_eye, left_ear, right_ear, mouth, t)
            }
            _ => {
                debug.insert("ear_degenerate".into(), DebugValue::Flag(true));
                None
            }
        };

        match (wink, base) {
            (Some(path), _) => {
                let confidence = match path {
                    WinkPath::Strict => t.wink_confidence,
                    WinkPath::Relaxed => t.relaxed_wink_confidence,
                };
                let path_name = match path {
                    WinkPath::Strict => "strict",
                    WinkPath::Relaxed => "tongue_out",
                };
                debug.insert("wink".into(), DebugValue::from(path_name));
                debug!(path = path_name, "wink overrides expression model");
                Classification::new(ExpressionLabel::Wink, confidence).with_debug(debug)
            }
            (None, Some((label, p))) => Classification::new(label, p).with_debug(debug),
            (None, None) => Classification::none().with_debug(debug),
        }
    }
}

impl Default for ExpressionClassifier {
    fn default() -> Self {
        Self::new(ExpressionThresholds::default())
    }
}

fn detect_wink(
    left: EyeState,
    right: EyeState,
    left_ear: f32,
    right_ear: f32,
    mouth_ratio: Option<f32>,
    t: &ExpressionThresholds,
) -> Option<WinkPath> {
    let one_closed = left != right;
    if one_closed && (left_ear - right_ear).abs() > t.ear_significance {
        return Some(WinkPath::Strict);
    }

    let tongue_out = mouth_ratio.is_some_and(|m| m > t.tongue_mouth_ratio);
    let any_closed = left == EyeState::Closed || right == EyeState::Closed;
    if tongue_out && any_closed {
        return Some(WinkPath::Relaxed);
    }

    None
}
