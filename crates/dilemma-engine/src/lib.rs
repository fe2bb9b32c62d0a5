//! Dilemma Engine
//!
//! Turn engine for an Iterated Prisoner's Dilemma played by a human
//! against one of six computer strategies. Rendering and raw input live
//! behind [`SessionPort`]; this crate owns the decisions, the scoring and
//! the cross-session career record.

mod career;
mod error;
mod random;
mod scoring;
mod session;
mod strategy;

pub use career::{CareerRecord, CareerStore, FileCareerStore, MemoryStore};
pub use error::{EngineError, PersistenceError, Result};
pub use random::{RandomSource, SeededRng};
pub use scoring::{payoff, RollingAverages, RollingBuffer, Scoreboard, BUFFER_CAPACITY};
pub use session::{
    Outcome, Phase, PlayerInput, RoundConfig, RoundResult, Session, SessionConfig,
    SessionController, SessionPort, SessionSummary,
};
pub use strategy::{execute_strategy, Move, RoundView, StrategyId, StrategyState};
