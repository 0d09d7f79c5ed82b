//! Per-modality detection cadence
//!
//! The host drives hand detection every 100 ms and face detection every
//! 500 ms. A ticker refuses a new tick while the previous one is still in
//! flight, so slow inference never stacks up behind itself.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Hand,
    Face,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Hand => "hand",
            Modality::Face => "face",
        }
    }

    pub fn other(&self) -> Modality {
        match self {
            Modality::Hand => Modality::Face,
            Modality::Face => Modality::Hand,
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hand" | "gesture" => Ok(Modality::Hand),
            "face" | "expression" => Ok(Modality::Face),
            other => Err(format!("unknown modality: {other}")),
        }
    }
}

/// Coarse detector state shown to the player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickerStatus {
    /// Detector still initializing
    Loading,
    Running,
    /// Camera off
    Suspended,
    /// Detector failed to initialize; the other modality keeps running
    Inactive,
}

#[derive(Clone, Debug)]
pub struct DetectionTicker {
    modality: Modality,
    interval_ms: u32,
    enabled: bool,
    ready: bool,
    in_flight: bool,
    skipped: u64,
    failure: Option<String>,
}

impl DetectionTicker {
    pub fn new(modality: Modality, interval_ms: u32) -> Self {
        Self {
            modality,
            interval_ms,
            enabled: true,
            ready: false,
            in_flight: false,
            skipped: 0,
            failure: None,
        }
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn set_interval(&mut self, interval_ms: u32) {
        self.interval_ms = interval_ms;
    }

    /// Ticks dropped because the previous one had not finished
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Whether frames for this modality should be classified at all
    pub fn is_running(&self) -> bool {
        self.enabled && self.ready && self.failure.is_none()
    }

    pub fn status(&self) -> TickerStatus {
        if self.failure.is_some() {
            TickerStatus::Inactive
        } else if !self.enabled {
            TickerStatus::Suspended
        } else if !self.ready {
            TickerStatus::Loading
        } else {
            TickerStatus::Running
        }
    }

    /// Claim the next tick; `false` means skip this one
    pub fn begin(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        if self.in_flight {
            self.skipped += 1;
            debug!(modality = %self.modality, skipped = self.skipped, "tick skipped, previous still running");
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn suspend(&mut self) {
        self.enabled = false;
        self.in_flight = false;
    }

    pub fn resume(&mut self) {
        self.enabled = true;
    }

    pub fn mark_ready(&mut self) {
        self.ready = true;
        self.failure = None;
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(modality = %self.modality, %reason, "detector unavailable");
        self.failure = Some(reason);
        self.in_flight = false;
    }
}
