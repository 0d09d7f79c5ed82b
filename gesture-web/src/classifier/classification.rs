//! Per-tick classification result with structured debug values

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::TargetLabel;

/// Debug value attached to a classification (read by the overlay, never
/// by control flow)
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DebugValue {
    Flag(bool),
    Number(f32),
    Text(String),
}

impl fmt::Display for DebugValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebugValue::Flag(v) => f.write_str(if *v { "✓" } else { "✗" }),
            DebugValue::Number(v) => write!(f, "{v:.3}"),
            DebugValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for DebugValue {
    fn from(v: bool) -> Self {
        DebugValue::Flag(v)
    }
}

impl From<f32> for DebugValue {
    fn from(v: f32) -> Self {
        DebugValue::Number(v)
    }
}

impl From<&str> for DebugValue {
    fn from(v: &str) -> Self {
        DebugValue::Text(v.to_string())
    }
}

pub type DebugMap = BTreeMap<String, DebugValue>;

/// One classifier output for one detection tick
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Classification {
    pub label: Option<TargetLabel>,
    pub confidence: f32,
    pub debug: DebugMap,
}

impl Classification {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(label: impl Into<TargetLabel>, confidence: f32) -> Self {
        Self {
            label: Some(label.into()),
            confidence: confidence.clamp(0.0, 1.0),
            debug: DebugMap::new(),
        }
    }

    pub fn with_debug(mut self, debug: DebugMap) -> Self {
        self.debug = debug;
        self
    }

    pub fn is_none(&self) -> bool {
        self.label.is_none()
    }
}
