//! Strategy definitions and execution

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::random::RandomSource;
use crate::scoring::RollingAverages;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Cooperate,
    Defect,
}

impl Move {
    /// Single-letter form used in move histories
    pub fn letter(self) -> char {
        match self {
            Move::Cooperate => 'C',
            Move::Defect => 'D',
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Cooperate => write!(f, "Cooperate"),
            Move::Defect => write!(f, "Defect"),
        }
    }
}

/// The six computer opponents, in menu order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyId {
    /// Coin flip every round.
    Random,
    /// Mirrors the player's move from two entries back.
    TitForTat,
    /// Tit-for-Tat, except every Nth round is a coin flip.
    RandomTitForTat,
    /// Cooperates until the player defects once, then always defects.
    Grudge,
    /// Plays randomly, punishes a second defection, then mostly forgives.
    PeaceMaker,
    /// Scripted opening, then picks whichever move has paid better lately.
    Adaptive,
}

impl StrategyId {
    pub const ALL: [StrategyId; 6] = [
        StrategyId::Random,
        StrategyId::TitForTat,
        StrategyId::RandomTitForTat,
        StrategyId::Grudge,
        StrategyId::PeaceMaker,
        StrategyId::Adaptive,
    ];

    /// 1-based position in the selection menu
    pub fn index(self) -> u8 {
        match self {
            StrategyId::Random => 1,
            StrategyId::TitForTat => 2,
            StrategyId::RandomTitForTat => 3,
            StrategyId::Grudge => 4,
            StrategyId::PeaceMaker => 5,
            StrategyId::Adaptive => 6,
        }
    }

    /// Look up a strategy by its 1-based menu position
    pub fn from_index(index: u8) -> Result<Self, EngineError> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.index() == index)
            .ok_or_else(|| EngineError::InvalidStrategy(index.to_string()))
    }

    pub fn name(self) -> &'static str {
        match self {
            StrategyId::Random => "Random",
            StrategyId::TitForTat => "Tit-for-Tat",
            StrategyId::RandomTitForTat => "Random-Tit-for-Tat",
            StrategyId::Grudge => "Grudge",
            StrategyId::PeaceMaker => "PeaceMaker",
            StrategyId::Adaptive => "Adaptive",
        }
    }

    /// Label written before the win count in the career record file
    pub fn label(self) -> &'static str {
        match self {
            StrategyId::Random => "Random: ",
            StrategyId::TitForTat => "Tit-for-Tat: ",
            StrategyId::RandomTitForTat => "Random-Tit-for-Tat: ",
            StrategyId::Grudge => "Grudge: ",
            StrategyId::PeaceMaker => "PeaceMaker: ",
            StrategyId::Adaptive => "Adaptive: ",
        }
    }

    /// Get a human-readable description of a strategy
    pub fn description(self) -> &'static str {
        match self {
            StrategyId::Random => "Randomly cooperates or defects each round.",
            StrategyId::TitForTat => "Mirrors your earlier moves back at you.",
            StrategyId::RandomTitForTat => {
                "Mirrors your moves, but every so often plays at random."
            }
            StrategyId::Grudge => "Cooperates until betrayed, then defects forever.",
            StrategyId::PeaceMaker => {
                "Plays randomly until you defect twice, retaliates, then mostly forgives."
            }
            StrategyId::Adaptive => {
                "Defects three rounds, cooperates three, then plays whatever has paid off."
            }
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyId {
    type Err = EngineError;

    /// Accepts a menu index, a display name or a record label
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<u8>() {
            return Self::from_index(index);
        }
        let name = trimmed.trim_end_matches(':');
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| EngineError::InvalidStrategy(s.to_string()))
    }
}

/// Per-session private state of the active strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyState {
    Random,
    TitForTat,
    RandomTitForTat {
        /// Every `interval`-th call is a coin flip.
        interval: u32,
        counter: u32,
    },
    Grudge {
        triggered: bool,
    },
    PeaceMaker,
    Adaptive,
}

impl StrategyState {
    /// Fresh state for a new session.
    ///
    /// `trigger_interval` is only read by Random-Tit-for-Tat.
    pub fn new(id: StrategyId, trigger_interval: u32) -> Self {
        match id {
            StrategyId::Random => StrategyState::Random,
            StrategyId::TitForTat => StrategyState::TitForTat,
            StrategyId::RandomTitForTat => StrategyState::RandomTitForTat {
                interval: trigger_interval.max(1),
                counter: 1,
            },
            StrategyId::Grudge => StrategyState::Grudge { triggered: false },
            StrategyId::PeaceMaker => StrategyState::PeaceMaker,
            StrategyId::Adaptive => StrategyState::Adaptive,
        }
    }

    pub fn id(&self) -> StrategyId {
        match self {
            StrategyState::Random => StrategyId::Random,
            StrategyState::TitForTat => StrategyId::TitForTat,
            StrategyState::RandomTitForTat { .. } => StrategyId::RandomTitForTat,
            StrategyState::Grudge { .. } => StrategyId::Grudge,
            StrategyState::PeaceMaker => StrategyId::PeaceMaker,
            StrategyState::Adaptive => StrategyId::Adaptive,
        }
    }
}

/// Everything a strategy may look at when choosing its move
#[derive(Clone, Copy, Debug)]
pub struct RoundView<'a> {
    /// Player moves so far, including the move of the current round
    pub player_history: &'a [Move],
    /// Opponent moves from earlier rounds
    pub opponent_history: &'a [Move],
    /// Current round, 1-based
    pub round: u32,
    pub averages: &'a RollingAverages,
}

/// Execute a strategy for one round
///
/// # Arguments
/// * `state` - The active strategy and its private state
/// * `view` - Histories, round index and rolling averages
/// * `rng` - Random source for strategies that flip coins
pub fn execute_strategy(
    state: &mut StrategyState,
    view: &RoundView<'_>,
    rng: &mut dyn RandomSource,
) -> Move {
    match state {
        StrategyState::Random => execute_random(rng),
        StrategyState::TitForTat => execute_tit_for_tat(view.player_history),
        StrategyState::RandomTitForTat { interval, counter } => {
            let chosen = if *counter % *interval == 0 {
                execute_random(rng)
            } else {
                execute_tit_for_tat(view.player_history)
            };
            *counter += 1;
            chosen
        }
        StrategyState::Grudge { triggered } => {
            execute_grudge(triggered, view.player_history)
        }
        StrategyState::PeaceMaker => execute_peace_maker(view.player_history, rng),
        StrategyState::Adaptive => execute_adaptive(view.round, view.averages),
    }
}

/// Random: even odds each round
fn execute_random(rng: &mut dyn RandomSource) -> Move {
    if rng.coin_flip() {
        Move::Cooperate
    } else {
        Move::Defect
    }
}

/// Tit-for-Tat: copy the player's move two entries back.
///
/// With fewer than two entries the most recent one is copied.
fn execute_tit_for_tat(player_history: &[Move]) -> Move {
    match player_history.len() {
        0 => Move::Cooperate,
        1 => player_history[0],
        len => player_history[len - 2],
    }
}

/// Grudge: once the player defects, defect for the rest of the session
fn execute_grudge(triggered: &mut bool, player_history: &[Move]) -> Move {
    if player_history.last() == Some(&Move::Defect) {
        *triggered = true;
    }

    if *triggered {
        Move::Defect
    } else {
        Move::Cooperate
    }
}

/// PeaceMaker: graduated response keyed on the player's total defections
fn execute_peace_maker(player_history: &[Move], rng: &mut dyn RandomSource) -> Move {
    // Rescanned every round; the tally only ever grows
    let defections = player_history
        .iter()
        .filter(|m| **m == Move::Defect)
        .count();

    match defections {
        2 => Move::Defect,
        n if n > 2 => {
            if rng.coin_flip() {
                Move::Cooperate
            } else {
                execute_tit_for_tat(player_history)
            }
        }
        _ => execute_random(rng),
    }
}

/// Adaptive: three defections, three cooperations, then follow the averages
fn execute_adaptive(round: u32, averages: &RollingAverages) -> Move {
    match round {
        0..=3 => Move::Defect,
        4..=6 => Move::Cooperate,
        _ if averages.favors_cooperation() => Move::Cooperate,
        _ => Move::Defect,
    }
}
