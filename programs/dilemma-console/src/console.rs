//! Terminal implementation of the session port

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use colored::Colorize;
use dialoguer::{Confirm, Input, Select};
use dilemma_engine::{
    CareerRecord, Move, Outcome, PlayerInput, RoundConfig, RoundResult, SessionPort,
    SessionSummary, StrategyId,
};

/// Prompts on stdin, reports on stdout
pub struct ConsolePort {
    transcript_dir: Option<PathBuf>,
    sessions: u32,
}

impl ConsolePort {
    pub fn new(transcript_dir: Option<PathBuf>) -> Self {
        Self {
            transcript_dir,
            sessions: 0,
        }
    }

    fn write_transcript(&self, summary: &SessionSummary) -> io::Result<()> {
        let Some(dir) = &self.transcript_dir else {
            return Ok(());
        };
        fs::create_dir_all(dir)?;
        let json = summary.to_json().map_err(io::Error::other)?;
        let (path, mut file) = create_transcript(dir, self.sessions)?;
        file.write_all(json.as_bytes())?;
        log::info!("{:<32}{:<32}", "saved       transcript", path.display());
        Ok(())
    }
}

/// Open the first unused `session-<n>.json` in `dir`, counting up from `first`.
/// Transcripts from earlier runs are never overwritten.
fn create_transcript(dir: &Path, first: u32) -> io::Result<(PathBuf, File)> {
    let mut n = first;
    loop {
        let path = dir.join(format!("session-{}.json", n));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                n = n.checked_add(1).ok_or_else(|| {
                    io::Error::new(io::ErrorKind::AlreadyExists, "no free transcript name")
                })?;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Resolve typed input to a move; anything else is invalid
pub fn parse_move(text: &str) -> PlayerInput {
    match text.trim().to_ascii_lowercase().as_str() {
        "c" | "cooperate" => PlayerInput::Move(Move::Cooperate),
        "d" | "defect" => PlayerInput::Move(Move::Defect),
        _ => PlayerInput::Invalid,
    }
}

fn history_line(history: &[Move]) -> String {
    history
        .iter()
        .map(|m| m.letter().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

impl SessionPort for ConsolePort {
    fn select_strategy(&mut self) -> io::Result<StrategyId> {
        let choices = StrategyId::ALL
            .iter()
            .map(|id| format!("{:<20}{}", id.name(), id.description()))
            .collect::<Vec<String>>();
        let selection = Select::new()
            .with_prompt("\nChoose your opponent")
            .items(choices.as_slice())
            .default(0)
            .interact()
            .map_err(io::Error::other)?;
        let id = StrategyId::ALL.get(selection).copied().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "selection out of range")
        })?;
        println!("\n{} {}\n", "Playing against".bold(), id.name().yellow().bold());
        Ok(id)
    }

    fn player_move(&mut self, round: u32) -> io::Result<PlayerInput> {
        let text: String = Input::<String>::new()
            .with_prompt(format!("Round {:>2}  (C)ooperate or (D)efect", round))
            .interact_text()
            .map_err(io::Error::other)?;
        let input = parse_move(&text);
        if input == PlayerInput::Invalid {
            println!("{}", "Error: please answer C or D".red());
        }
        Ok(input)
    }

    fn report_round(&mut self, result: &RoundResult) -> io::Result<()> {
        let opponent = match result.opponent_move {
            Move::Cooperate => result.opponent_move.to_string().green(),
            Move::Defect => result.opponent_move.to_string().red(),
        };
        println!(
            "          Bot's move: {:<10} You {:>3}  -  {:<3} Bot",
            opponent, result.player_total, result.opponent_total
        );
        Ok(())
    }

    fn report_session_end(&mut self, summary: &SessionSummary, career: &CareerRecord) -> io::Result<()> {
        self.sessions += 1;

        println!("\n{}", "Endgame Statistics".cyan().bold());
        println!("  Player history:  {}", history_line(&summary.player_history));
        println!("  Bot history:     {}", history_line(&summary.opponent_history));
        println!("  Player score:    {}", summary.player_score);
        println!("  Bot score:       {}", summary.opponent_score);
        println!();
        match summary.outcome {
            Outcome::Won => println!(
                "{}",
                "Congratulations! You won! Now try against another strategy.".green().bold()
            ),
            Outcome::Lost => println!(
                "{}",
                "You lost... Rematch against the same strategy!".red().bold()
            ),
            Outcome::Tied => println!(
                "{}",
                "You tied. Try again to prove your mastery!".blue().bold()
            ),
        }

        println!("\n{}", "Career wins".cyan());
        for (id, wins) in career.iter() {
            println!("  {:<20}{}", id.label(), wins);
        }
        println!();

        self.write_transcript(summary)
    }

    fn ask_play_again(&mut self) -> io::Result<bool> {
        Confirm::new()
            .with_prompt("Play again?")
            .default(true)
            .interact()
            .map_err(io::Error::other)
    }
}

/// Rules shown once before the first session
pub fn print_instructions(rules: &RoundConfig) {
    println!("{}", "Prisoner's Dilemma".yellow().bold());
    println!();
    println!("You and a computer opponent each choose, every round, to");
    println!("cooperate or defect. Neither side sees the other's choice first.");
    println!();
    println!("  {:<24}{:>6}{:>6}", "", "You", "Bot");
    println!("  {:<24}{:>6}{:>6}", "both cooperate", 2, 2);
    println!("  {:<24}{:>6}{:>6}", "you defect, bot cooperates", 3, 0);
    println!("  {:<24}{:>6}{:>6}", "you cooperate, bot defects", 0, 3);
    println!("  {:<24}{:>6}{:>6}", "both defect", 1, 1);
    println!();
    println!(
        "A game lasts a random number of rounds (about {} to {}).",
        rules.min_rounds, rules.max_rounds
    );
    println!("Finish ahead of the bot to add a win to your career record.");
}
