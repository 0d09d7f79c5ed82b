//! Classifier module - landmarks to labeled, voted decisions
//!
//! Rust owns the whole recognition path: feature extraction, the gesture
//! rule tables, the wink override on top of the external expression
//! model, and the voting window that stabilizes per-frame output.

mod buffer;
mod classification;
mod expression;
pub mod features;
mod gesture;
mod model;
mod rules;

pub use buffer::{StableDecision, VotingWindow};
pub use classification::{Classification, DebugMap, DebugValue};
pub use expression::{EyeState, ExpressionClassifier, ExpressionProbabilities};
pub use gesture::GestureClassifier;
pub use model::{gesture_guide, ExpressionLabel, GestureLabel, GuideEntry, TargetLabel, UnknownLabel};
pub use rules::{RuleCheck, RuleTable};

#[cfg(test)]
pub(crate) use expression::fixtures as face_fixtures;
#[cfg(test)]
pub(crate) use gesture::fixtures as hand_fixtures;
