//! Session state machine and the front-end port it drives

use std::io;

use serde::{Deserialize, Serialize};

use crate::career::{CareerRecord, CareerStore};
use crate::error::{EngineError, Result};
use crate::random::RandomSource;
use crate::scoring::Scoreboard;
use crate::strategy::{execute_strategy, Move, RoundView, StrategyId, StrategyState};

/// Bounds for the number of rounds drawn at session start
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundConfig {
    pub min_rounds: u32,
    pub max_rounds: u32,
}

impl RoundConfig {
    /// Uniform in [6, 20]
    pub fn standard() -> Self {
        Self { min_rounds: 6, max_rounds: 20 }
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Parameters fixed once when the strategy is selected
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Configured round count; one extra round is played on top of it.
    pub round_count: u32,
    /// Random-Tit-for-Tat coin-flip interval, in [1, round_count].
    pub trigger_interval: u32,
}

impl SessionConfig {
    pub fn draw(rules: &RoundConfig, rng: &mut dyn RandomSource) -> Self {
        let round_count = rng.range_inclusive(rules.min_rounds, rules.max_rounds);
        let trigger_interval = rng.range_inclusive(1, round_count);
        Self { round_count, trigger_interval }
    }

    /// Rounds actually played: the loop bound is inclusive
    pub fn rounds_to_play(&self) -> u32 {
        self.round_count + 1
    }
}

/// Where a session is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingStrategySelection,
    /// Holds the 1-based index of the round about to be played.
    RoundInProgress(u32),
    RoundsComplete,
    Finalized,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::AwaitingStrategySelection => "awaiting strategy selection",
            Phase::RoundInProgress(_) => "in progress",
            Phase::RoundsComplete => "complete",
            Phase::Finalized => "finalized",
        }
    }
}

/// Result of a single round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub player_move: Move,
    pub opponent_move: Move,
    pub player_payoff: u8,
    pub opponent_payoff: u8,
    pub player_total: u32,
    pub opponent_total: u32,
}

/// How a finished session went for the player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
    Tied,
}

impl Outcome {
    pub fn from_scores(player: u32, opponent: u32) -> Self {
        match player.cmp(&opponent) {
            std::cmp::Ordering::Greater => Outcome::Won,
            std::cmp::Ordering::Less => Outcome::Lost,
            std::cmp::Ordering::Equal => Outcome::Tied,
        }
    }

    /// Only a strict win counts toward the career record
    pub fn player_won(self) -> bool {
        self == Outcome::Won
    }
}

/// Everything worth showing or keeping about a finished session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub strategy: StrategyId,
    pub config: SessionConfig,
    pub rounds_played: u32,
    pub player_history: Vec<Move>,
    pub opponent_history: Vec<Move>,
    pub rounds: Vec<RoundResult>,
    pub player_score: u32,
    pub opponent_score: u32,
    pub outcome: Outcome,
}

impl SessionSummary {
    /// Pretty JSON transcript of the session
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn player_won(&self) -> bool {
        self.outcome.player_won()
    }
}

/// One game against one strategy
#[derive(Clone, Debug)]
pub struct Session {
    phase: Phase,
    config: SessionConfig,
    strategy: Option<StrategyState>,
    player_history: Vec<Move>,
    opponent_history: Vec<Move>,
    scoreboard: Scoreboard,
    rounds: Vec<RoundResult>,
    credited: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::AwaitingStrategySelection,
            config: SessionConfig::default(),
            strategy: None,
            player_history: Vec::new(),
            opponent_history: Vec::new(),
            scoreboard: Scoreboard::new(),
            rounds: Vec::new(),
            credited: false,
        }
    }

    /// Lock in the opponent, draw the session parameters and open round 1
    pub fn select_strategy(
        &mut self,
        id: StrategyId,
        rules: &RoundConfig,
        rng: &mut dyn RandomSource,
    ) -> Result<&SessionConfig> {
        self.expect_phase(Phase::AwaitingStrategySelection)?;

        let config = SessionConfig::draw(rules, rng);
        log::info!(
            "session vs {}: {} rounds configured ({} to play), trigger interval {}",
            id,
            config.round_count,
            config.rounds_to_play(),
            config.trigger_interval
        );

        self.config = config;
        self.strategy = Some(StrategyState::new(id, config.trigger_interval));
        self.player_history = Vec::with_capacity(config.rounds_to_play() as usize);
        self.opponent_history = Vec::with_capacity(config.rounds_to_play() as usize);
        self.scoreboard = Scoreboard::new();
        self.rounds = Vec::with_capacity(config.rounds_to_play() as usize);
        self.phase = Phase::RoundInProgress(1);

        Ok(&self.config)
    }

    /// Play the current round with the player's move
    pub fn play_round(&mut self, player_move: Move, rng: &mut dyn RandomSource) -> Result<RoundResult> {
        let round = match self.phase {
            Phase::RoundInProgress(round) => round,
            other => {
                return Err(EngineError::InvalidPhase {
                    expected: Phase::RoundInProgress(0).name(),
                    found: other.name(),
                })
            }
        };
        let Some(strategy) = self.strategy.as_mut() else {
            return Err(EngineError::InvalidPhase {
                expected: Phase::RoundInProgress(0).name(),
                found: Phase::AwaitingStrategySelection.name(),
            });
        };

        self.player_history.push(player_move);
        let view = RoundView {
            player_history: &self.player_history,
            opponent_history: &self.opponent_history,
            round,
            averages: self.scoreboard.averages(),
        };
        let opponent_move = execute_strategy(strategy, &view, rng);
        self.opponent_history.push(opponent_move);

        let (player_payoff, opponent_payoff) = self.scoreboard.apply(player_move, opponent_move);
        let result = RoundResult {
            round,
            player_move,
            opponent_move,
            player_payoff,
            opponent_payoff,
            player_total: self.scoreboard.player_total(),
            opponent_total: self.scoreboard.opponent_total(),
        };
        self.rounds.push(result);

        log::debug!(
            "round {}: player {} / opponent {} -> {}+{} ({} - {})",
            round,
            player_move.letter(),
            opponent_move.letter(),
            player_payoff,
            opponent_payoff,
            result.player_total,
            result.opponent_total
        );

        self.phase = if round >= self.config.rounds_to_play() {
            Phase::RoundsComplete
        } else {
            Phase::RoundInProgress(round + 1)
        };

        Ok(result)
    }

    /// Credit the career record with the result.
    ///
    /// The session stays in [`Phase::RoundsComplete`] until [`Session::finalize`],
    /// so the record can be saved and the end reported first.
    pub fn conclude(&mut self, career: &mut CareerRecord) -> Result<SessionSummary> {
        self.expect_phase(Phase::RoundsComplete)?;
        if self.credited {
            return Err(EngineError::InvalidPhase {
                expected: Phase::RoundsComplete.name(),
                found: "already credited",
            });
        }
        let summary = self.summary()?;

        career.record(summary.strategy, summary.player_won());
        self.credited = true;

        log::info!(
            "session vs {} finished {:?}: {} - {}",
            summary.strategy,
            summary.outcome,
            summary.player_score,
            summary.opponent_score
        );

        Ok(summary)
    }

    /// Close a credited session
    pub fn finalize(&mut self) -> Result<()> {
        self.expect_phase(Phase::RoundsComplete)?;
        if !self.credited {
            return Err(EngineError::InvalidPhase {
                expected: "credited",
                found: Phase::RoundsComplete.name(),
            });
        }
        self.phase = Phase::Finalized;
        Ok(())
    }

    fn summary(&self) -> Result<SessionSummary> {
        let strategy = self.strategy.as_ref().ok_or(EngineError::InvalidPhase {
            expected: Phase::RoundsComplete.name(),
            found: Phase::AwaitingStrategySelection.name(),
        })?;
        let player_score = self.scoreboard.player_total();
        let opponent_score = self.scoreboard.opponent_total();

        Ok(SessionSummary {
            strategy: strategy.id(),
            config: self.config,
            rounds_played: self.rounds.len() as u32,
            player_history: self.player_history.clone(),
            opponent_history: self.opponent_history.clone(),
            rounds: self.rounds.clone(),
            player_score,
            opponent_score,
            outcome: Outcome::from_scores(player_score, opponent_score),
        })
    }

    fn expect_phase(&self, expected: Phase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidPhase {
                expected: expected.name(),
                found: self.phase.name(),
            })
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn strategy(&self) -> Option<&StrategyState> {
        self.strategy.as_ref()
    }

    pub fn player_history(&self) -> &[Move] {
        &self.player_history
    }

    pub fn opponent_history(&self) -> &[Move] {
        &self.opponent_history
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }
}

/// A move as resolved by the front-end
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerInput {
    Move(Move),
    /// Input that did not resolve to a move; the round is asked again.
    Invalid,
}

/// Input and display collaborator driven by [`SessionController`]
pub trait SessionPort {
    fn select_strategy(&mut self) -> io::Result<StrategyId>;

    /// Blocks until the player answers for `round`
    fn player_move(&mut self, round: u32) -> io::Result<PlayerInput>;

    fn report_round(&mut self, result: &RoundResult) -> io::Result<()>;

    fn report_session_end(&mut self, summary: &SessionSummary, career: &CareerRecord) -> io::Result<()>;

    fn ask_play_again(&mut self) -> io::Result<bool>;
}

/// Drives sessions through a [`SessionPort`]
pub struct SessionController<P, R> {
    port: P,
    rng: R,
    rules: RoundConfig,
}

impl<P: SessionPort, R: RandomSource> SessionController<P, R> {
    pub fn new(port: P, rng: R) -> Self {
        Self {
            port,
            rng,
            rules: RoundConfig::standard(),
        }
    }

    /// Play one full session: credit `career`, save it, report the end,
    /// then close the session.
    pub fn play_session<S: CareerStore>(
        &mut self,
        career: &mut CareerRecord,
        store: &S,
    ) -> Result<SessionSummary> {
        let mut session = Session::new();
        let id = self.port.select_strategy()?;
        session.select_strategy(id, &self.rules, &mut self.rng)?;

        while let Phase::RoundInProgress(round) = session.phase() {
            let player_move = self.next_player_move(round)?;
            let result = session.play_round(player_move, &mut self.rng)?;
            self.port.report_round(&result)?;
        }

        let summary = session.conclude(career)?;
        store.save(career)?;
        self.port.report_session_end(&summary, career)?;
        session.finalize()?;

        Ok(summary)
    }

    /// Play sessions until the player quits; saves the record after each one
    pub fn run<S: CareerStore>(&mut self, store: &S) -> Result<Vec<SessionSummary>> {
        let mut career = store.load()?;
        let mut summaries = Vec::new();

        loop {
            summaries.push(self.play_session(&mut career, store)?);

            if !self.port.ask_play_again()? {
                break;
            }
        }

        Ok(summaries)
    }

    fn next_player_move(&mut self, round: u32) -> Result<Move> {
        loop {
            match self.port.player_move(round)? {
                PlayerInput::Move(m) => return Ok(m),
                PlayerInput::Invalid => {
                    log::warn!("round {}: input did not resolve to a move, asking again", round);
                }
            }
        }
    }

    pub fn into_port(self) -> P {
        self.port
    }
}
