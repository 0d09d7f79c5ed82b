//! Game module - sequence progression, detection cadence and the engine
//! that connects them to the classifiers

mod engine;
mod session;
mod ticker;

pub use engine::{Command, Engine, FaceFrame, GameSnapshot};
pub use session::{shuffled_targets, GameEvent, GameSession, GameStatus, ScheduledResolution, Transition};
pub use ticker::{DetectionTicker, Modality, TickerStatus};
