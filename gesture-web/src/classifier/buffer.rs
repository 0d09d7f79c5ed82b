//! Voting window for per-frame classifications
//!
//! Keeps the last N classifications (N = 5 by default) and turns them into
//! one stable decision. A single-frame false positive can never win:
//! a label needs `required_count` hits inside the window (3 for the
//! two-hand heart, 2 for everything else).

use std::collections::VecDeque;

use serde::Serialize;

use super::{Classification, GestureLabel, TargetLabel};
use crate::config::VotingConfig;

/// Stabilized decision for one tick
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StableDecision {
    pub label: TargetLabel,
    /// Average confidence over the label's entries in the window
    pub confidence: f32,
    pub occurrences: usize,
    /// `occurrences / capacity` as a percentage
    pub consistency: f32,
}

/// Rolling window of the most recent classifications, oldest first
pub struct VotingWindow {
    entries: VecDeque<Classification>,
    config: VotingConfig,
}

impl VotingWindow {
    pub fn new(config: VotingConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity),
            config,
        }
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Occurrences a label needs before it may win
    pub fn required_count(&self, label: TargetLabel) -> usize {
        match label {
            TargetLabel::Gesture(GestureLabel::TwoHandHeart) => self.config.two_hand_heart_required,
            _ => self.config.required_count,
        }
    }

    /// Push one tick's classification (evicting the oldest when full) and
    /// return the decision for the updated window.
    pub fn push(&mut self, classification: Classification) -> Option<StableDecision> {
        if self.entries.len() >= self.config.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(classification);
        self.decide()
    }

    /// Highest `occurrences / capacity × average confidence` among labels
    /// that meet their required count. Ties keep the label seen first.
    pub fn decide(&self) -> Option<StableDecision> {
        let mut stats: Vec<(TargetLabel, usize, f32)> = Vec::new();
        for entry in &self.entries {
            let Some(label) = entry.label else { continue };
            match stats.iter_mut().find(|(l, _, _)| *l == label) {
                Some((_, count, total)) => {
                    *count += 1;
                    *total += entry.confidence;
                }
                None => stats.push((label, 1, entry.confidence)),
            }
        }

        let capacity = self.config.capacity as f32;
        let mut best: Option<(f32, StableDecision)> = None;
        for (label, count, total) in stats {
            if count < self.required_count(label) {
                continue;
            }
            let average = total / count as f32;
            let score = (count as f32 / capacity) * average;
            if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
                best = Some((
                    score,
                    StableDecision {
                        label,
                        confidence: average,
                        occurrences: count,
                        consistency: count as f32 / capacity * 100.0,
                    },
                ));
            }
        }

        best.map(|(_, decision)| decision)
    }

    /// Clear the window (camera off, modality suspended)
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for VotingWindow {
    fn default() -> Self {
        Self::new(VotingConfig::default())
    }
}
