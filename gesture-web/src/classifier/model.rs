//! Target labels - every gesture and expression a round can ask for
//!
//! Wire names (`thumbs_up`, `happy`, ...) match what the JS host and the
//! external expression model use.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Hand gestures recognised by the rule classifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    ThumbsUp,
    ThumbsDown,
    KoreanHeart,
    Rock,
    LoveSign,
    PeaceSign,
    TwoHandHeart,
}

/// Facial expressions. `Wink` is synthesized from eye geometry and
/// never arrives from the external model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionLabel {
    Neutral,
    Happy,
    Sad,
    Angry,
    Surprised,
    Disgusted,
    Wink,
}

/// Anything a game round can ask the player to show
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetLabel {
    Expression(ExpressionLabel),
    Gesture(GestureLabel),
}

/// How-to text shown next to a gesture target
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GuideEntry {
    pub label: TargetLabel,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    pub tips: &'static str,
}

/// Unknown wire name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown label '{}'", self.0)
    }
}

impl std::error::Error for UnknownLabel {}

impl GestureLabel {
    pub const ALL: [GestureLabel; 7] = [
        GestureLabel::ThumbsUp,
        GestureLabel::ThumbsDown,
        GestureLabel::KoreanHeart,
        GestureLabel::Rock,
        GestureLabel::LoveSign,
        GestureLabel::PeaceSign,
        GestureLabel::TwoHandHeart,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::ThumbsUp => "thumbs_up",
            GestureLabel::ThumbsDown => "thumbs_down",
            GestureLabel::KoreanHeart => "korean_heart",
            GestureLabel::Rock => "rock",
            GestureLabel::LoveSign => "love_sign",
            GestureLabel::PeaceSign => "peace_sign",
            GestureLabel::TwoHandHeart => "two_hand_heart",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GestureLabel::ThumbsUp => "Thumbs Up",
            GestureLabel::ThumbsDown => "Thumbs Down",
            GestureLabel::KoreanHeart => "Korean Heart",
            GestureLabel::Rock => "Rock",
            GestureLabel::LoveSign => "Love Sign",
            GestureLabel::PeaceSign => "Peace Sign",
            GestureLabel::TwoHandHeart => "Two-Hand Heart",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            GestureLabel::ThumbsUp => "👍",
            GestureLabel::ThumbsDown => "👎",
            GestureLabel::KoreanHeart => "🤏",
            GestureLabel::Rock => "🤘",
            GestureLabel::LoveSign => "🤟",
            GestureLabel::PeaceSign => "✌️",
            GestureLabel::TwoHandHeart => "💖",
        }
    }

    fn instructions(&self) -> (&'static str, &'static str) {
        match self {
            GestureLabel::ThumbsUp => (
                "Make a fist and extend your thumb upward",
                "Keep other fingers closed, thumb pointing up",
            ),
            GestureLabel::ThumbsDown => (
                "Make a fist and extend your thumb downward",
                "Keep other fingers closed, thumb pointing down",
            ),
            GestureLabel::KoreanHeart => (
                "Touch thumb tip and index finger tip to form a small heart",
                "Make a tiny heart shape with thumb and index finger",
            ),
            GestureLabel::Rock => (
                "Extend index finger and pinky, fold middle and ring fingers",
                "Tuck your thumb in so it doesn't read as a love sign",
            ),
            GestureLabel::LoveSign => (
                "Extend thumb, index finger, and pinky (I Love You in ASL)",
                "Keep middle and ring fingers folded down",
            ),
            GestureLabel::PeaceSign => (
                "Extend index and middle fingers in a V shape",
                "Keep ring and pinky fingers folded, make a clear V",
            ),
            GestureLabel::TwoHandHeart => (
                "Use both hands to form a heart shape above your head",
                "Bring both hands together, thumbs touching at top, fingers forming heart",
            ),
        }
    }
}

impl ExpressionLabel {
    /// Labels the external model reports probabilities for
    pub const PROBABILITY_LABELS: [ExpressionLabel; 6] = [
        ExpressionLabel::Neutral,
        ExpressionLabel::Happy,
        ExpressionLabel::Sad,
        ExpressionLabel::Angry,
        ExpressionLabel::Surprised,
        ExpressionLabel::Disgusted,
    ];

    pub const ALL: [ExpressionLabel; 7] = [
        ExpressionLabel::Neutral,
        ExpressionLabel::Happy,
        ExpressionLabel::Sad,
        ExpressionLabel::Angry,
        ExpressionLabel::Surprised,
        ExpressionLabel::Disgusted,
        ExpressionLabel::Wink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpressionLabel::Neutral => "neutral",
            ExpressionLabel::Happy => "happy",
            ExpressionLabel::Sad => "sad",
            ExpressionLabel::Angry => "angry",
            ExpressionLabel::Surprised => "surprised",
            ExpressionLabel::Disgusted => "disgusted",
            ExpressionLabel::Wink => "wink",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ExpressionLabel::Neutral => "Neutral",
            ExpressionLabel::Happy => "Happy",
            ExpressionLabel::Sad => "Sad",
            ExpressionLabel::Angry => "Angry",
            ExpressionLabel::Surprised => "Surprised",
            ExpressionLabel::Disgusted => "Disgusted",
            ExpressionLabel::Wink => "Wink",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ExpressionLabel::Neutral => "😐",
            ExpressionLabel::Happy => "😄",
            ExpressionLabel::Sad => "😢",
            ExpressionLabel::Angry => "😠",
            ExpressionLabel::Surprised => "😲",
            ExpressionLabel::Disgusted => "🤢",
            ExpressionLabel::Wink => "😜",
        }
    }
}

impl TargetLabel {
    /// The full target set, expressions first
    pub fn all() -> Vec<TargetLabel> {
        ExpressionLabel::ALL
            .iter()
            .copied()
            .map(TargetLabel::Expression)
            .chain(GestureLabel::ALL.iter().copied().map(TargetLabel::Gesture))
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetLabel::Expression(e) => e.as_str(),
            TargetLabel::Gesture(g) => g.as_str(),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TargetLabel::Expression(e) => e.display_name(),
            TargetLabel::Gesture(g) => g.display_name(),
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            TargetLabel::Expression(e) => e.emoji(),
            TargetLabel::Gesture(g) => g.emoji(),
        }
    }

    pub fn is_gesture(&self) -> bool {
        matches!(self, TargetLabel::Gesture(_))
    }
}

impl From<GestureLabel> for TargetLabel {
    fn from(label: GestureLabel) -> Self {
        TargetLabel::Gesture(label)
    }
}

impl From<ExpressionLabel> for TargetLabel {
    fn from(label: ExpressionLabel) -> Self {
        TargetLabel::Expression(label)
    }
}

impl FromStr for GestureLabel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GestureLabel::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

impl FromStr for ExpressionLabel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExpressionLabel::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

impl FromStr for TargetLabel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<ExpressionLabel>()
            .map(TargetLabel::Expression)
            .or_else(|_| s.parse::<GestureLabel>().map(TargetLabel::Gesture))
    }
}

impl fmt::Display for TargetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guide entries for every gesture, in target order
pub fn gesture_guide() -> Vec<GuideEntry> {
    GestureLabel::ALL
        .iter()
        .map(|g| {
            let (description, tips) = g.instructions();
            GuideEntry {
                label: TargetLabel::Gesture(*g),
                name: g.display_name(),
                emoji: g.emoji(),
                description,
                tips,
            }
        })
        .collect()
}
