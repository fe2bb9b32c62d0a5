//! Payoff matrix, running totals and the rolling buffers read by Adaptive

use std::collections::VecDeque;

use serde::Serialize;

use crate::strategy::Move;

/// Number of samples a rolling buffer keeps
pub const BUFFER_CAPACITY: usize = 6;

/// Payoff matrix for the Prisoner's Dilemma
/// Returns (player_payoff, opponent_payoff)
pub fn payoff(player: Move, opponent: Move) -> (u8, u8) {
    match (player, opponent) {
        (Move::Cooperate, Move::Cooperate) => (2, 2),
        (Move::Defect, Move::Cooperate) => (3, 0),
        (Move::Cooperate, Move::Defect) => (0, 3),
        (Move::Defect, Move::Defect) => (1, 1),
    }
}

/// FIFO of the most recent [`BUFFER_CAPACITY`] opponent payoffs
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RollingBuffer {
    values: VecDeque<u32>,
}

impl RollingBuffer {
    pub fn new() -> Self {
        Self {
            values: VecDeque::with_capacity(BUFFER_CAPACITY + 1),
        }
    }

    /// Append a sample, evicting the oldest once over capacity
    pub fn push(&mut self, value: u32) {
        self.values.push_back(value);
        if self.values.len() > BUFFER_CAPACITY {
            self.values.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn sum(&self) -> u32 {
        self.values.iter().sum()
    }

    /// Mean over the full capacity, not over the samples held.
    ///
    /// A buffer that is not yet full averages toward zero.
    pub fn average(&self) -> f64 {
        self.sum() as f64 / BUFFER_CAPACITY as f64
    }

    /// Samples oldest first
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.values.iter().copied()
    }
}

/// Opponent payoffs bucketed by the player's move in that round
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RollingAverages {
    cooperate: RollingBuffer,
    defect: RollingBuffer,
}

impl RollingAverages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket is chosen by the player's move alone, whatever the opponent played.
    pub fn record(&mut self, player_move: Move, opponent_payoff: u8) {
        match player_move {
            Move::Cooperate => self.cooperate.push(opponent_payoff as u32),
            Move::Defect => self.defect.push(opponent_payoff as u32),
        }
    }

    pub fn cooperate(&self) -> &RollingBuffer {
        &self.cooperate
    }

    pub fn defect(&self) -> &RollingBuffer {
        &self.defect
    }

    /// True only when the cooperate average strictly beats the defect average
    pub fn favors_cooperation(&self) -> bool {
        self.cooperate.average() > self.defect.average()
    }
}

/// Running totals for one session
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    player: u32,
    opponent: u32,
    averages: RollingAverages,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score one round: award payoffs and feed the rolling buffers
    pub fn apply(&mut self, player_move: Move, opponent_move: Move) -> (u8, u8) {
        let (player_payoff, opponent_payoff) = payoff(player_move, opponent_move);
        self.player += player_payoff as u32;
        self.opponent += opponent_payoff as u32;
        self.averages.record(player_move, opponent_payoff);
        (player_payoff, opponent_payoff)
    }

    pub fn player_total(&self) -> u32 {
        self.player
    }

    pub fn opponent_total(&self) -> u32 {
        self.opponent
    }

    pub fn averages(&self) -> &RollingAverages {
        &self.averages
    }
}
