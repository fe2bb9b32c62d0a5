//! Cross-session win tally per strategy
//!
//! On disk the record is a flat, whitespace-separated token stream:
//! each strategy's label followed by its win count, all six strategies,
//! always in menu order.
//!
//! ```text
//! Random:  0 Tit-for-Tat:  2 Random-Tit-for-Tat:  0 Grudge:  1 PeaceMaker:  0 Adaptive:  4
//! ```

use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::strategy::StrategyId;

/// Player wins against each strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerRecord {
    wins: [u32; 6],
}

impl CareerRecord {
    /// All six strategies at zero
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(id: StrategyId) -> usize {
        id.index() as usize - 1
    }

    pub fn wins(&self, id: StrategyId) -> u32 {
        self.wins[Self::slot(id)]
    }

    /// Credit one win against `id` if the player won; otherwise no change
    pub fn record(&mut self, id: StrategyId, player_won: bool) {
        if player_won {
            let slot = &mut self.wins[Self::slot(id)];
            *slot = slot.saturating_add(1);
        }
    }

    pub fn total_wins(&self) -> u32 {
        self.wins.iter().sum()
    }

    /// (strategy, wins) in menu order
    pub fn iter(&self) -> impl Iterator<Item = (StrategyId, u32)> + '_ {
        StrategyId::ALL.iter().map(move |id| (*id, self.wins(*id)))
    }
}

impl fmt::Display for CareerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, wins) in self.iter() {
            write!(f, "{} {} ", id.label(), wins)?;
        }
        Ok(())
    }
}

impl FromStr for CareerRecord {
    type Err = PersistenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let expected = StrategyId::ALL.len() * 2;
        if tokens.len() != expected {
            return Err(PersistenceError::Malformed {
                reason: format!("expected {} tokens, found {}", expected, tokens.len()),
            });
        }

        let mut record = CareerRecord::new();
        for (id, pair) in StrategyId::ALL.iter().zip(tokens.chunks(2)) {
            let label = id.label().trim_end();
            if pair[0] != label {
                return Err(PersistenceError::Malformed {
                    reason: format!("expected label `{}`, found `{}`", label, pair[0]),
                });
            }
            let wins = pair[1].parse::<u32>().map_err(|_| PersistenceError::Malformed {
                reason: format!("win count `{}` for {} is not a non-negative integer", pair[1], id),
            })?;
            record.wins[Self::slot(*id)] = wins;
        }

        Ok(record)
    }
}

/// Read and write the career record as one logical step each
pub trait CareerStore {
    /// A missing record is a fresh, all-zero record
    fn load(&self) -> Result<CareerRecord, PersistenceError>;

    fn save(&self, record: &CareerRecord) -> Result<(), PersistenceError>;
}

/// Career record kept in a text file
#[derive(Clone, Debug)]
pub struct FileCareerStore {
    path: PathBuf,
}

impl FileCareerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CareerStore for FileCareerStore {
    fn load(&self) -> Result<CareerRecord, PersistenceError> {
        log::info!("{:<32}{:<32}", "loading     career record", self.path.display());
        match fs::read_to_string(&self.path) {
            Ok(contents) => contents.parse(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("{:<32}{:<32}", "no career record yet", self.path.display());
                Ok(CareerRecord::new())
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, record: &CareerRecord) -> Result<(), PersistenceError> {
        log::info!("{:<32}{:<32}", "saving      career record", self.path.display());
        fs::write(&self.path, record.to_string()).map_err(|e| self.io_error(e))
    }
}

/// In-memory store for headless runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: RefCell<Option<CareerRecord>>,
}

impl MemoryStore {
    pub fn with_record(record: CareerRecord) -> Self {
        Self {
            record: RefCell::new(Some(record)),
        }
    }
}

impl CareerStore for MemoryStore {
    fn load(&self) -> Result<CareerRecord, PersistenceError> {
        Ok((*self.record.borrow()).unwrap_or_default())
    }

    fn save(&self, record: &CareerRecord) -> Result<(), PersistenceError> {
        *self.record.borrow_mut() = Some(*record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dilemma-career-{}-{}.txt", name, std::process::id()))
    }

    #[test]
    fn test_new_record_is_all_zero() {
        let record = CareerRecord::new();
        assert_eq!(record.iter().count(), 6);
        assert!(record.iter().all(|(_, wins)| wins == 0));
    }

    #[test]
    fn test_record_win_only_touches_played_strategy() {
        let mut record = CareerRecord::new();
        record.record(StrategyId::Grudge, true);

        for (id, wins) in record.iter() {
            let expected = if id == StrategyId::Grudge { 1 } else { 0 };
            assert_eq!(wins, expected, "{}", id);
        }
    }

    #[test]
    fn test_record_loss_changes_nothing() {
        let mut record = CareerRecord::new();
        record.record(StrategyId::Adaptive, false);
        assert_eq!(record, CareerRecord::new());
    }

    #[test]
    fn test_format_matches_file_layout() {
        let mut record = CareerRecord::new();
        record.record(StrategyId::TitForTat, true);
        record.record(StrategyId::TitForTat, true);
        record.record(StrategyId::Adaptive, true);

        assert_eq!(
            record.to_string(),
            "Random:  0 Tit-for-Tat:  2 Random-Tit-for-Tat:  0 Grudge:  0 PeaceMaker:  0 Adaptive:  1 "
        );
    }

    #[test]
    fn test_parse_round_trip() {
        let mut record = CareerRecord::new();
        for (n, id) in StrategyId::ALL.iter().enumerate() {
            for _ in 0..n * 3 {
                record.record(*id, true);
            }
        }

        let parsed: CareerRecord = record.to_string().parse().unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let text = "Random: 1\nTit-for-Tat: 2\nRandom-Tit-for-Tat: 3\nGrudge: 4\nPeaceMaker: 5\nAdaptive: 6\n";
        let record: CareerRecord = text.parse().unwrap();
        assert_eq!(record.wins(StrategyId::Random), 1);
        assert_eq!(record.wins(StrategyId::Adaptive), 6);
        assert_eq!(record.total_wins(), 21);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let cases = [
            "",
            "Random: 0",
            "Random: 0 Tit-for-Tat: 0 Random-Tit-for-Tat: 0 Grudge: 0 PeaceMaker: 0 Adaptive: x",
            "Random: 0 Tit-for-Tat: -1 Random-Tit-for-Tat: 0 Grudge: 0 PeaceMaker: 0 Adaptive: 0",
            "Grudge: 0 Tit-for-Tat: 0 Random-Tit-for-Tat: 0 Random: 0 PeaceMaker: 0 Adaptive: 0",
            "Random: 0 Tit-for-Tat: 0 Random-Tit-for-Tat: 0 Grudge: 0 PeaceMaker: 0 Adaptive: 0 extra 1",
        ];
        for text in cases {
            let err = text.parse::<CareerRecord>().unwrap_err();
            assert!(matches!(err, PersistenceError::Malformed { .. }), "{:?}", text);
        }
    }

    #[test]
    fn test_file_store_missing_file_is_zeroed() {
        let path = temp_path("missing");
        let _ = fs::remove_file(&path);

        let store = FileCareerStore::new(&path);
        assert_eq!(store.load().unwrap(), CareerRecord::new());
    }

    #[test]
    fn test_file_store_round_trip() {
        let path = temp_path("round-trip");
        let store = FileCareerStore::new(&path);

        let mut record = CareerRecord::new();
        record.record(StrategyId::PeaceMaker, true);
        record.record(StrategyId::Random, true);
        store.save(&record).unwrap();

        let loaded = store.load().unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let path = temp_path("corrupt");
        fs::write(&path, "Random: lots").unwrap();

        let result = FileCareerStore::new(&path).load();
        let _ = fs::remove_file(&path);
        assert!(matches!(result, Err(PersistenceError::Malformed { .. })));
    }

    #[test]
    fn test_file_store_reports_unreadable_path() {
        // A directory cannot be read as a record
        let dir = std::env::temp_dir();
        let result = FileCareerStore::new(&dir).load();
        assert!(matches!(result, Err(PersistenceError::Io { .. })));
    }

    #[test]
    fn test_memory_store() {
        let mut record = CareerRecord::new();
        record.record(StrategyId::Grudge, true);

        let store = MemoryStore::default();
        assert_eq!(store.load().unwrap(), CareerRecord::new());
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), record);
        assert_eq!(MemoryStore::with_record(record).load().unwrap(), record);
    }
}
