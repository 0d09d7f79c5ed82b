//! Debug overlay text
//!
//! Detector latencies reported by JS plus the engine's per-modality
//! classifier state, formatted for a `<pre>` element.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use wasm_bindgen::prelude::*;

use super::game_integration::with_engine;
use crate::classifier::{DebugMap, DebugValue};
use crate::game::{Engine, Modality};

/// Smoothed detector latencies
#[derive(Default)]
struct Metrics {
    hand_latency_ms: f32,
    face_latency_ms: f32,
}

impl Metrics {
    fn record(&mut self, modality: Modality, ms: f32) {
        let slot = match modality {
            Modality::Hand => &mut self.hand_latency_ms,
            Modality::Face => &mut self.face_latency_ms,
        };
        // First sample seeds the average
        *slot = if *slot == 0.0 { ms } else { *slot * 0.9 + ms * 0.1 };
    }

    fn latency(&self, modality: Modality) -> f32 {
        match modality {
            Modality::Hand => self.hand_latency_ms,
            Modality::Face => self.face_latency_ms,
        }
    }
}

thread_local! {
    static METRICS: RefCell<Metrics> = RefCell::new(Metrics::default());
}

/// Collapse rule flags into `table passed/total`; other values print as
/// `key=value`
fn summarize(debug: &DebugMap) -> String {
    let mut parts = Vec::new();
    let mut tables: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for (key, value) in debug {
        match (key.split_once('.'), value) {
            (Some((table, _)), DebugValue::Flag(passed)) => {
                let entry = tables.entry(table).or_default();
                entry.1 += 1;
                if *passed {
                    entry.0 += 1;
                }
            }
            _ => parts.push(format!("{key}={value}")),
        }
    }
    parts.extend(
        tables
            .into_iter()
            .map(|(table, (passed, total))| format!("{table} {passed}/{total}")),
    );
    parts.join(" ")
}

fn format_overlay(engine: &Engine, metrics: &Metrics) -> String {
    let mut out = String::new();
    for modality in [Modality::Hand, Modality::Face] {
        let ticker = engine.ticker(modality);
        let last = engine.last_classification(modality);
        let _ = write!(
            out,
            "{modality}: {:?} | {:.0}ms | skipped {}",
            ticker.status(),
            metrics.latency(modality),
            ticker.skipped()
        );
        if let Some(reason) = ticker.failure() {
            let _ = write!(out, " ({reason})");
        }
        out.push('\n');

        let frame = last
            .label
            .map_or_else(|| "-".to_string(), |l| format!("{} {:.2}", l.as_str(), last.confidence));
        let stable = engine.decision(modality).map_or_else(
            || "-".to_string(),
            |d| format!("{} {:.2} ({:.0}%)", d.label.as_str(), d.confidence, d.consistency),
        );
        let _ = writeln!(out, "  frame: {frame} | stable: {stable}");
        if !last.debug.is_empty() {
            let _ = writeln!(out, "  {}", summarize(&last.debug));
        }
    }

    let session = engine.session();
    let (position, total) = session.progress();
    let target = session
        .current_target()
        .map_or("-", |t| t.as_str());
    let _ = write!(
        out,
        "Target: {target} | {position}/{total} | score {} | {:?}{}",
        session.score(),
        session.status(),
        if session.is_locked() { " 🔒" } else { "" }
    );
    out
}

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Detector inference time for one tick (called from JS)
#[wasm_bindgen]
pub fn set_detector_latency(modality: &str, ms: f32) {
    // Ignore garbage timings (tab backgrounded, first frame)
    if !(0.0..=5000.0).contains(&ms) {
        return;
    }
    if let Ok(modality) = modality.parse::<Modality>() {
        METRICS.with(|m| m.borrow_mut().record(modality, ms));
    }
}

/// Formatted overlay text (called from JS to update HTML)
#[wasm_bindgen]
pub fn get_debug_overlay_text() -> String {
    METRICS.with(|m| {
        let metrics = m.borrow();
        with_engine(|engine| format_overlay(engine, &metrics))
    })
}
