//! High score leaderboard
//!
//! Keeps the top 10 scores. A finished run's score is inserted, then the
//! table is trimmed back to 10. Listeners can watch the table and receive a
//! fresh top-10 snapshot after every change.

use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("score store parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A single high score entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Assigned on insert, never reused
    pub id: u32,
    pub score: u32,
}

/// High score leaderboard, sorted by descending score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    next_id: u32,
    pub entries: Vec<ScoreRecord>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }

    /// Check if a score would make the table
    ///
    /// Zero never does; a score tying the lowest entry of a full table
    /// doesn't either.
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a score and trim back to the top 10
    ///
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn insert_and_trim(&mut self, score: u32) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        let record = ScoreRecord {
            id: self.next_id.max(1),
            score,
        };
        self.next_id = record.id + 1;

        self.entries.insert(rank - 1, record);
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn top_ten(&self) -> &[ScoreRecord] {
        &self.entries
    }

    /// Best entry, if any
    pub fn high_score(&self) -> Option<ScoreRecord> {
        self.entries.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where finished runs' scores go
pub trait ScoreStore {
    /// Record a score; returns its rank if it made the table
    fn insert_and_trim(&mut self, score: u32) -> Result<Option<usize>, StoreError>;

    fn top_ten(&self) -> Vec<ScoreRecord>;

    fn high_score(&self) -> Option<ScoreRecord>;

    /// Receive the current top 10 now and after every change
    fn watch(&mut self) -> Receiver<Vec<ScoreRecord>>;
}

/// Listeners for table changes
#[derive(Debug, Default)]
struct Watchers {
    senders: Vec<Sender<Vec<ScoreRecord>>>,
}

impl Watchers {
    fn add(&mut self, current: &[ScoreRecord]) -> Receiver<Vec<ScoreRecord>> {
        let (tx, rx) = unbounded();
        // Fresh receiver, cannot be disconnected yet
        let _ = tx.send(current.to_vec());
        self.senders.push(tx);
        rx
    }

    fn notify(&mut self, current: &[ScoreRecord]) {
        self.senders.retain(|tx| tx.send(current.to_vec()).is_ok());
    }
}

/// Score store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    table: HighScores,
    watchers: Watchers,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self {
            table: HighScores::new(),
            watchers: Watchers::default(),
        }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn insert_and_trim(&mut self, score: u32) -> Result<Option<usize>, StoreError> {
        let rank = self.table.insert_and_trim(score);
        if rank.is_some() {
            self.watchers.notify(self.table.top_ten());
        }
        Ok(rank)
    }

    fn top_ten(&self) -> Vec<ScoreRecord> {
        self.table.top_ten().to_vec()
    }

    fn high_score(&self) -> Option<ScoreRecord> {
        self.table.high_score()
    }

    fn watch(&mut self) -> Receiver<Vec<ScoreRecord>> {
        self.watchers.add(self.table.top_ten())
    }
}

/// Score store persisted as a JSON file
#[derive(Debug)]
pub struct JsonScoreStore {
    path: PathBuf,
    table: HighScores,
    watchers: Watchers,
}

impl JsonScoreStore {
    /// Open a store, starting empty if the file does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let table = match std::fs::read_to_string(&path) {
            Ok(json) => {
                let table: HighScores = serde_json::from_str(&json)?;
                log::info!("Loaded {} high scores", table.entries.len());
                table
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                HighScores::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            table,
            watchers: Watchers::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.table)?;
        std::fs::write(&self.path, json)?;
        log::info!("High scores saved ({} entries)", self.table.entries.len());
        Ok(())
    }
}

impl ScoreStore for JsonScoreStore {
    fn insert_and_trim(&mut self, score: u32) -> Result<Option<usize>, StoreError> {
        let rank = self.table.insert_and_trim(score);
        if rank.is_some() {
            self.save()?;
            self.watchers.notify(self.table.top_ten());
        }
        Ok(rank)
    }

    fn top_ten(&self) -> Vec<ScoreRecord> {
        self.table.top_ten().to_vec()
    }

    fn high_score(&self) -> Option<ScoreRecord> {
        self.table.high_score()
    }

    fn watch(&mut self) -> Receiver<Vec<ScoreRecord>> {
        self.watchers.add(self.table.top_ten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(table: &HighScores) -> Vec<u32> {
        table.top_ten().iter().map(|r| r.score).collect()
    }

    #[test]
    fn test_insert_keeps_descending_order() {
        let mut table = HighScores::new();
        assert_eq!(table.insert_and_trim(5), Some(1));
        assert_eq!(table.insert_and_trim(9), Some(1));
        assert_eq!(table.insert_and_trim(7), Some(2));
        assert_eq!(scores(&table), vec![9, 7, 5]);
        assert_eq!(table.high_score().map(|r| r.score), Some(9));
    }

    #[test]
    fn test_zero_is_not_recorded() {
        let mut table = HighScores::new();
        assert_eq!(table.insert_and_trim(0), None);
        assert!(table.is_empty());
        assert_eq!(table.high_score(), None);
    }

    #[test]
    fn test_trims_to_ten() {
        let mut table = HighScores::new();
        for score in 1..=12 {
            table.insert_and_trim(score);
        }
        assert_eq!(table.top_ten().len(), MAX_HIGH_SCORES);
        assert_eq!(scores(&table), (3..=12).rev().collect::<Vec<_>>());

        // Tying the lowest entry of a full table does not qualify
        assert!(!table.qualifies(3));
        assert_eq!(table.potential_rank(4), Some(10));
        assert_eq!(table.potential_rank(100), Some(1));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut table = HighScores::new();
        table.insert_and_trim(4);
        table.insert_and_trim(4);
        table.insert_and_trim(8);
        let mut ids: Vec<u32> = table.top_ten().iter().map(|r| r.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_memory_store_watch() {
        let mut store = MemoryScoreStore::new();
        store.insert_and_trim(3).unwrap();

        let updates = store.watch();
        assert_eq!(updates.try_recv().unwrap().len(), 1);

        store.insert_and_trim(10).unwrap();
        store.insert_and_trim(0).unwrap();
        let latest = updates.try_iter().last().unwrap();
        assert_eq!(latest.iter().map(|r| r.score).collect::<Vec<_>>(), vec![10, 3]);
        // The zero produced no update
        assert!(updates.try_recv().is_err());
    }

    #[test]
    fn test_json_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");

        let mut store = JsonScoreStore::open(&path).unwrap();
        assert!(store.top_ten().is_empty());
        store.insert_and_trim(12).unwrap();
        store.insert_and_trim(30).unwrap();

        let reopened = JsonScoreStore::open(&path).unwrap();
        assert_eq!(reopened.top_ten(), store.top_ten());
        assert_eq!(reopened.high_score().map(|r| r.score), Some(30));

        // Ids keep counting after a reload
        let mut reopened = reopened;
        reopened.insert_and_trim(1).unwrap();
        let ids: Vec<u32> = reopened.top_ten().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_json_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(JsonScoreStore::open(&path), Err(StoreError::Parse(_))));
    }
}
