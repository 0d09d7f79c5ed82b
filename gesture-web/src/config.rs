//! Engine configuration - every empirical threshold and timing constant
//!
//! Defaults are the values the game was tuned with against webcam footage.
//! They are starting points, not verified optima; override any subset
//! with a partial JSON document through [`EngineConfig::from_json`].

use std::fmt;

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

// ============================================================================
// GESTURES
// ============================================================================

/// Weights for the single-hand finger heart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KoreanHeartWeights {
    pub tips_close: f32,
    pub fingers_raised: f32,
    pub thumb_bent: f32,
    pub index_bent: f32,
    pub fingers_extended: f32,
}

impl Default for KoreanHeartWeights {
    fn default() -> Self {
        Self {
            tips_close: 0.4,
            fingers_raised: 0.2,
            thumb_bent: 0.15,
            index_bent: 0.15,
            fingers_extended: 0.1,
        }
    }
}

/// Weights for the two-hand heart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoHandHeartWeights {
    pub hands_raised: f32,
    pub thumbs_close: f32,
    pub indexes_separated: f32,
    pub heart_shape: f32,
    pub same_height: f32,
    pub facing_each_other: f32,
    pub hands_close: f32,
    pub fingers_extended: f32,
}

impl Default for TwoHandHeartWeights {
    fn default() -> Self {
        Self {
            hands_raised: 0.2,
            thumbs_close: 0.2,
            indexes_separated: 0.15,
            heart_shape: 0.15,
            same_height: 0.1,
            facing_each_other: 0.1,
            hands_close: 0.05,
            fingers_extended: 0.05,
        }
    }
}

/// Geometric thresholds for the hand gesture rules (normalized units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    /// Confidence reported by the boolean-AND rules
    pub simple_confidence: f32,

    // Korean heart
    pub korean_tip_distance: f32,
    pub korean_raise_margin: f32,
    pub korean_bend_margin: f32,
    pub korean_extension: f32,
    pub korean_acceptance: f32,
    pub korean_weights: KoreanHeartWeights,

    // Two-hand heart
    pub heart_raise_margin: f32,
    pub heart_thumbs_close: f32,
    pub heart_index_spread_ratio: f32,
    pub heart_index_drop: f32,
    pub heart_same_height: f32,
    pub heart_wrist_gap_min: f32,
    pub heart_wrist_gap_max: f32,
    pub heart_index_extension: f32,
    pub heart_acceptance: f32,
    pub heart_weights: TwoHandHeartWeights,

    // Thumbs up / down
    pub thumb_vertical: f32,
    pub thumb_curl_margin: f32,
    pub thumb_min_curled: usize,
    pub thumb_separation: f32,

    // Love sign
    pub love_raise: f32,
    pub love_fold: f32,

    // Peace sign
    pub peace_spread: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            simple_confidence: 0.8,

            korean_tip_distance: 0.05,
            korean_raise_margin: 0.02,
            korean_bend_margin: 0.01,
            korean_extension: 0.05,
            korean_acceptance: 0.6,
            korean_weights: KoreanHeartWeights::default(),

            heart_raise_margin: 0.03,
            heart_thumbs_close: 0.18,
            heart_index_spread_ratio: 1.2,
            heart_index_drop: 0.02,
            heart_same_height: 0.12,
            heart_wrist_gap_min: 0.1,
            heart_wrist_gap_max: 0.5,
            heart_index_extension: 0.08,
            heart_acceptance: 0.65,
            heart_weights: TwoHandHeartWeights::default(),

            thumb_vertical: 0.08,
            thumb_curl_margin: 0.03,
            thumb_min_curled: 3,
            thumb_separation: 0.05,

            love_raise: 0.1,
            love_fold: 0.05,

            peace_spread: 0.05,
        }
    }
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

/// Eye/mouth geometry thresholds for the wink override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionThresholds {
    /// EAR below this marks an eye closed
    pub ear_closed: f32,
    /// EAR above this marks an eye open; between the two the state holds
    pub ear_open: f32,
    /// Minimum EAR difference between the eyes for a strict wink
    pub ear_significance: f32,
    /// Mouth aspect ratio that reads as "tongue out"
    pub tongue_mouth_ratio: f32,
    pub wink_confidence: f32,
    pub relaxed_wink_confidence: f32,
}

impl Default for ExpressionThresholds {
    fn default() -> Self {
        Self {
            ear_closed: 0.27,
            ear_open: 0.28,
            ear_significance: 0.01,
            tongue_mouth_ratio: 0.3,
            wink_confidence: 0.9,
            relaxed_wink_confidence: 0.75,
        }
    }
}

// ============================================================================
// VOTING / GAME / TICKS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    pub capacity: usize,
    pub required_count: usize,
    pub two_hand_heart_required: usize,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            required_count: 2,
            two_hand_heart_required: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTiming {
    /// Minimum gap between two accepted matches
    pub cooldown_ms: u64,
    /// Delay before the target advances after a match
    pub resolution_delay_ms: u64,
    /// Delay before the reset after the last target of a sequence
    pub completion_delay_ms: u64,
}

impl Default for GameTiming {
    fn default() -> Self {
        Self {
            cooldown_ms: 3000,
            resolution_delay_ms: 1500,
            completion_delay_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    pub hand_interval_ms: u32,
    pub face_interval_ms: u32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            hand_interval_ms: 100,
            face_interval_ms: 500,
        }
    }
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub gesture: GestureThresholds,
    pub expression: ExpressionThresholds,
    pub voting: VotingConfig,
    pub game: GameTiming,
    pub ticks: TickConfig,
}

/// Errors that can occur while loading a config override
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "config parse failed: {e}"),
            ConfigError::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl From<ConfigError> for JsValue {
    fn from(err: ConfigError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON override; missing keys keep defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.voting;
        if v.capacity == 0 {
            return Err(ConfigError::Invalid("voting.capacity must be > 0".into()));
        }
        if v.required_count == 0 || v.required_count > v.capacity {
            return Err(ConfigError::Invalid(format!(
                "voting.required_count must be in 1..={}",
                v.capacity
            )));
        }
        if v.two_hand_heart_required == 0 || v.two_hand_heart_required > v.capacity {
            return Err(ConfigError::Invalid(format!(
                "voting.two_hand_heart_required must be in 1..={}",
                v.capacity
            )));
        }

        let e = &self.expression;
        if e.ear_closed > e.ear_open {
            return Err(ConfigError::Invalid(
                "expression.ear_closed must not exceed expression.ear_open".into(),
            ));
        }

        if self.gesture.thumb_min_curled > 4 {
            return Err(ConfigError::Invalid(
                "gesture.thumb_min_curled counts four fingers at most".into(),
            ));
        }

        if self.ticks.hand_interval_ms == 0 || self.ticks.face_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick intervals must be > 0".into()));
        }

        Ok(())
    }
}
