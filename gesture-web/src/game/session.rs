//! Game progression state machine
//!
//! `NotStarted → Active ⇄ Paused`, and `Active → Completed` when the last
//! target of a sequence is matched. Every mutation goes through
//! [`GameSession::dispatch`].
//!
//! A confirmed match sets `match_lock`, scores immediately and hands back
//! a [`ScheduledResolution`] ticket. The host fires the ticket after its
//! delay; until then no second match can be confirmed. Tickets carry the
//! session generation, which `start`, `stop` and completion bump, so a
//! ticket scheduled for an older session is discarded. A match scored just
//! before `stop` still advances, but only once play resumes.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::classifier::TargetLabel;
use crate::config::GameTiming;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    NotStarted,
    Active,
    Paused,
    Completed,
}

/// Deferred match resolution; fire through [`GameEvent::Resolve`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ScheduledResolution {
    pub generation: u64,
    pub index: usize,
    pub delay_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Start,
    Stop,
    Resume,
    Skip,
    ResetScore,
    /// Stabilized decision from either modality
    Decision(TargetLabel),
    /// Manual check of whatever the player is currently showing
    Check(Option<TargetLabel>),
    Resolve(ScheduledResolution),
}

/// What a dispatched event did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transition {
    pub applied: bool,
    pub scheduled: Option<ScheduledResolution>,
}

impl Transition {
    fn ignored() -> Self {
        Self::default()
    }

    fn applied() -> Self {
        Self {
            applied: true,
            scheduled: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GameSession {
    sequence: Vec<TargetLabel>,
    index: usize,
    score: u32,
    status: GameStatus,
    last_match_time: Option<u64>,
    match_lock: bool,
    /// Scored target whose resolution was cut off by `stop`
    pending_advance: bool,
    generation: u64,
    message: String,
    timing: GameTiming,
}

/// Fresh uniform permutation of every target (Fisher-Yates)
pub fn shuffled_targets<R: Rng + ?Sized>(rng: &mut R) -> Vec<TargetLabel> {
    let mut targets = TargetLabel::all();
    targets.shuffle(rng);
    targets
}

impl GameSession {
    pub fn new(timing: GameTiming) -> Self {
        Self {
            sequence: Vec::new(),
            index: 0,
            score: 0,
            status: GameStatus::NotStarted,
            last_match_time: None,
            match_lock: false,
            pending_advance: false,
            generation: 0,
            message: String::new(),
            timing,
        }
    }

    /// Active session over a fixed sequence (replays, scripted rounds)
    pub fn from_sequence(timing: GameTiming, sequence: Vec<TargetLabel>) -> Self {
        let mut session = Self::new(timing);
        session.sequence = sequence;
        session.status = GameStatus::Active;
        session.generation = 1;
        session
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == GameStatus::Active
    }

    pub fn is_started(&self) -> bool {
        self.status != GameStatus::NotStarted
    }

    pub fn sequence(&self) -> &[TargetLabel] {
        &self.sequence
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_locked(&self) -> bool {
        self.match_lock
    }

    pub fn last_match_time(&self) -> Option<u64> {
        self.last_match_time
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timing(&self) -> &GameTiming {
        &self.timing
    }

    /// Timing changes apply to matches confirmed after the call
    pub fn set_timing(&mut self, timing: GameTiming) {
        self.timing = timing;
    }

    pub fn current_target(&self) -> Option<TargetLabel> {
        if self.is_started() {
            self.sequence.get(self.index).copied()
        } else {
            None
        }
    }

    /// `(index + 1, length)` once a sequence exists, `(0, 0)` before
    pub fn progress(&self) -> (usize, usize) {
        if self.sequence.is_empty() {
            (0, 0)
        } else {
            (self.index + 1, self.sequence.len())
        }
    }

    // ------------------------------------------------------------------
    // Transition function
    // ------------------------------------------------------------------

    /// Apply one event at time `now` (milliseconds, monotonic)
    pub fn dispatch<R: Rng + ?Sized>(&mut self, event: GameEvent, now: u64, rng: &mut R) -> Transition {
        match event {
            GameEvent::Start => self.start(rng),
            GameEvent::Stop => self.stop(),
            GameEvent::Resume => self.resume(rng),
            GameEvent::Skip => self.skip(rng),
            GameEvent::ResetScore => self.reset_score(),
            GameEvent::Decision(label) => self.evaluate_match(label, now),
            GameEvent::Check(current) => self.check(current, now),
            GameEvent::Resolve(ticket) => self.resolve(ticket, rng),
        }
    }

    fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Transition {
        self.sequence = shuffled_targets(rng);
        self.index = 0;
        self.score = 0;
        self.match_lock = false;
        self.pending_advance = false;
        self.last_match_time = None;
        self.status = GameStatus::Active;
        self.generation += 1;
        self.message = "Game started! Show the target".into();
        info!(generation = self.generation, targets = self.sequence.len(), "game started");
        Transition::applied()
    }

    fn stop(&mut self) -> Transition {
        if self.status != GameStatus::Active {
            return Transition::ignored();
        }
        if self.match_lock {
            debug!(index = self.index, "pending resolution deferred until resume");
            self.pending_advance = true;
        }
        self.status = GameStatus::Paused;
        self.match_lock = false;
        self.generation += 1;
        self.message = "Game paused".into();
        info!(index = self.index, score = self.score, "game paused");
        Transition::applied()
    }

    fn resume<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Transition {
        if !matches!(self.status, GameStatus::Paused | GameStatus::Completed) {
            return Transition::ignored();
        }
        self.status = GameStatus::Active;
        self.last_match_time = None;
        if std::mem::take(&mut self.pending_advance) {
            self.advance(rng);
            if self.status == GameStatus::Completed {
                return Transition::applied();
            }
        }
        self.message = "Game resumed".into();
        info!(index = self.index, score = self.score, "game resumed");
        Transition::applied()
    }

    fn skip<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Transition {
        if !self.is_active() || self.match_lock {
            return Transition::ignored();
        }
        self.index += 1;
        if self.index >= self.sequence.len() {
            self.sequence = shuffled_targets(rng);
            self.index = 0;
            debug!("sequence exhausted by skip, reshuffled");
        }
        self.message = "Skipped".into();
        Transition::applied()
    }

    fn reset_score(&mut self) -> Transition {
        self.score = 0;
        self.last_match_time = None;
        self.message = "Score reset!".into();
        Transition::applied()
    }

    fn evaluate_match(&mut self, decision: TargetLabel, now: u64) -> Transition {
        if !self.is_active()
            || self.current_target() != Some(decision)
            || self.match_lock
            || self.pending_advance
        {
            return Transition::ignored();
        }
        if let Some(last) = self.last_match_time {
            if now.saturating_sub(last) <= self.timing.cooldown_ms {
                debug!(label = decision.as_str(), "match suppressed by cooldown");
                return Transition::ignored();
            }
        }

        self.match_lock = true;
        self.score += 1;
        self.last_match_time = Some(now);

        let last_target = self.index + 1 == self.sequence.len();
        let delay_ms = if last_target {
            self.timing.completion_delay_ms
        } else {
            self.timing.resolution_delay_ms
        };
        self.message = "🎉 Correct! +1 Point".into();
        info!(label = decision.as_str(), score = self.score, index = self.index, "match confirmed");

        Transition {
            applied: true,
            scheduled: Some(ScheduledResolution {
                generation: self.generation,
                index: self.index,
                delay_ms,
            }),
        }
    }

    fn check(&mut self, current: Option<TargetLabel>, now: u64) -> Transition {
        if !self.is_active() {
            return Transition::ignored();
        }
        match current {
            Some(label) if Some(label) == self.current_target() => self.evaluate_match(label, now),
            _ => {
                let shown = current.map_or("None", |l| l.display_name());
                self.message = format!("Try again! You showed: {shown}");
                Transition::applied()
            }
        }
    }

    fn resolve<R: Rng + ?Sized>(&mut self, ticket: ScheduledResolution, rng: &mut R) -> Transition {
        if ticket.generation != self.generation || ticket.index != self.index || !self.match_lock {
            debug!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "stale resolution discarded"
            );
            return Transition::ignored();
        }
        self.advance(rng);
        Transition::applied()
    }

    /// Move past a scored target, completing the sequence after the last one
    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.index + 1 >= self.sequence.len() {
            let final_score = self.score;
            self.status = GameStatus::Completed;
            self.sequence = shuffled_targets(rng);
            self.index = 0;
            self.score = 0;
            self.last_match_time = None;
            self.match_lock = false;
            self.generation += 1;
            self.message = format!("🏆 Sequence complete! Final score: {final_score}");
            info!(final_score, "sequence completed");
        } else {
            self.index += 1;
            self.match_lock = false;
            self.message.clear();
        }
    }
}
